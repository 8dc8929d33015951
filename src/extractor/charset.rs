//! 响应体字符集探测与解码
//! 探测顺序：BOM > Content-Type头charset参数 > HTML meta声明 > UTF-8宽容解码

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

// meta声明嗅探仅看前1024字节（与主流浏览器预扫描窗口一致）
const SNIFF_WINDOW: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([a-zA-Z0-9_\-]+)"#).expect("内置正则必然合法"));

/// 从Content-Type头中提取charset标签
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let lower = content_type.to_ascii_lowercase();
    let label = lower.split("charset=").nth(1)?;
    let label = label.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
    let label = label.split(';').next()?.trim();
    Encoding::for_label(label.as_bytes())
}

/// 从HTML前缀中嗅探meta charset声明
fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let caps = META_CHARSET_RE.captures(window)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}

/// 解码响应体为字符串
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    // BOM优先，最可靠
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return encoding.decode(bytes).0.into_owned();
    }

    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        return encoding.decode(bytes).0.into_owned();
    }

    if let Some(encoding) = charset_from_meta(bytes) {
        return encoding.decode(bytes).0.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}
