//! favicon发现与哈希
//! 候选集合 = 站点默认/favicon.ico + 页面link标签声明的图标地址，
//! 全部下载成功后计算mmh3哈希集合

use url::Url;

use crate::acquire::{HttpAcquirer, ResponseSignals};
use crate::error::HpResult;
use crate::utils::{icon_hash, remove_duplicates};

/// 解析favicon候选URL列表
///
/// 默认候选（站点根/favicon.ico）始终排第一；link声明的href以站点根
/// 为基准解析为绝对地址，解析失败的条目退回默认候选。结果去重并保留
/// 出现顺序。
pub fn resolve_candidates(base: &str, links: &[String]) -> Vec<String> {
    let Ok(base_url) = Url::parse(base) else {
        return Vec::new();
    };
    let Ok(root) = base_url.join("/") else {
        return Vec::new();
    };
    let Ok(default) = root.join("favicon.ico") else {
        return Vec::new();
    };
    let default = default.to_string();

    let mut candidates = vec![default.clone()];
    for link in links {
        match root.join(link) {
            Ok(resolved) => candidates.push(resolved.to_string()),
            Err(_) => candidates.push(default.clone()),
        }
    }

    remove_duplicates(candidates)
}

/// 下载全部候选favicon并计算哈希集合
///
/// 任意一个候选下载失败即整体失败，由调用方决定降级策略。
pub async fn resolve_favicon_hashes(
    acquirer: &HttpAcquirer,
    signals: &ResponseSignals,
) -> HpResult<Vec<String>> {
    let mut hashes = Vec::new();
    for candidate in resolve_candidates(&signals.final_url, &signals.favicon_links) {
        let bytes = acquirer.fetch_bytes(&candidate).await?;
        hashes.push(icon_hash(&bytes));
    }
    Ok(remove_duplicates(hashes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidate_first() {
        let candidates = resolve_candidates("https://example.com/admin/login", &[]);
        assert_eq!(candidates, vec!["https://example.com/favicon.ico"]);
    }

    #[test]
    fn test_relative_and_absolute_links() {
        let links = vec![
            "/static/fav.png".to_string(),
            "img/icon.ico".to_string(),
            "https://cdn.example.net/brand.ico".to_string(),
        ];
        let candidates = resolve_candidates("https://example.com/app/index.html", &links);
        // 相对路径以站点根为基准，不以页面所在目录为基准
        assert_eq!(
            candidates,
            vec![
                "https://example.com/favicon.ico",
                "https://example.com/static/fav.png",
                "https://example.com/img/icon.ico",
                "https://cdn.example.net/brand.ico",
            ]
        );
    }

    #[test]
    fn test_port_preserved() {
        let candidates = resolve_candidates("http://10.0.0.1:8080/", &[]);
        assert_eq!(candidates, vec!["http://10.0.0.1:8080/favicon.ico"]);
    }

    #[test]
    fn test_duplicate_candidates_removed() {
        let links = vec![
            "/favicon.ico".to_string(),
            "/favicon.ico".to_string(),
            "/other.ico".to_string(),
        ];
        let candidates = resolve_candidates("https://example.com/", &links);
        assert_eq!(
            candidates,
            vec![
                "https://example.com/favicon.ico",
                "https://example.com/other.ico",
            ]
        );
    }

    #[test]
    fn test_invalid_base_yields_empty() {
        assert!(resolve_candidates("not-a-url", &["/fav.ico".to_string()]).is_empty());
    }
}
