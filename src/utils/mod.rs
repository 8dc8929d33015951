//! 通用工具函数：去重、文本清理、icon_hash计算、随机字符串

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use murmurhash3::murmurhash3_x86_32;
use rand::Rng;

/// 切片内容去重，保留首次出现顺序
pub fn remove_duplicates(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(items.len());

    for item in items {
        if seen.insert(item.clone()) {
            result.push(item);
        }
    }

    result
}

/// 去除字符串中所有换行符与回车符
pub fn remove_newline(s: &str) -> String {
    s.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// 格式化名称列表为 "[a, b]" 形式（用于控制台展示）
pub fn format_name_list(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// URL查询参数转义（与表单编码一致，空格转为+）
pub fn query_escape(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// 对原始字节做标准base64编码，每76字符断行并以单个换行结尾
/// （与Python base64.encodebytes的输出逐字节一致）
fn base64_lines(raw: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(raw);

    let mut formatted = String::with_capacity(encoded.len() + encoded.len() / 76 + 1);
    for (i, ch) in encoded.chars().enumerate() {
        formatted.push(ch);
        if (i + 1) % 76 == 0 {
            formatted.push('\n');
        }
    }
    // 编码长度恰为76的倍数时上面已经收尾，避免出现双换行
    if !formatted.ends_with('\n') {
        formatted.push('\n');
    }

    formatted
}

/// 计算favicon内容的icon_hash（fofa/shodan格式）
///
/// 对76字符断行的base64文本计算MurmurHash3 x86_32（种子0），
/// 按有符号十进制输出。
pub fn icon_hash(raw: &[u8]) -> String {
    let hash = murmurhash3_x86_32(base64_lines(raw).as_bytes(), 0);
    (hash as i32).to_string()
}

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成指定长度的随机字母数字串（预览服务的访问密码）
pub fn generate_random_string(length: usize, rng: &mut impl Rng) -> String {
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_remove_duplicates_keeps_first_seen_order() {
        let input = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        assert_eq!(remove_duplicates(input), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_remove_newline() {
        assert_eq!(remove_newline("a\r\nb\nc\r"), "abc");
        assert_eq!(remove_newline("无换行"), "无换行");
    }

    #[test]
    fn test_query_escape() {
        assert_eq!(
            query_escape("https://example.com/a b"),
            "https%3A%2F%2Fexample.com%2Fa+b"
        );
    }

    #[test]
    fn test_base64_lines_wraps_at_76_columns() {
        // 57字节 → 76个base64字符，恰好整行
        let exact = base64_lines(&[0u8; 57]);
        assert_eq!(exact.len(), 77);
        assert!(exact.ends_with('\n'));
        assert!(!exact.contains("\n\n"));

        // 58字节 → 跨行，行宽不超过76
        let wrapped = base64_lines(&[0u8; 58]);
        assert!(wrapped.ends_with('\n'));
        assert!(!wrapped.contains("\n\n"));
        assert!(wrapped.lines().all(|line| line.len() <= 76));
        assert_eq!(wrapped.lines().count(), 2);
    }

    #[test]
    fn test_icon_hash_deterministic_and_signed() {
        let data = b"\x00\x00\x01\x00fake-favicon-bytes";
        let h1 = icon_hash(data);
        let h2 = icon_hash(data);
        assert_eq!(h1, h2);
        // 有符号十进制，可解析为i32
        assert!(h1.parse::<i32>().is_ok());
        // 内容不同则哈希不同
        assert_ne!(h1, icon_hash(b"other-bytes"));
    }

    #[test]
    fn test_generate_random_string() {
        let mut rng = StdRng::seed_from_u64(42);
        let s = generate_random_string(10, &mut rng);
        assert_eq!(s.len(), 10);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
