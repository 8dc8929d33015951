//! 指纹规则加载器
//! 从JSON规则文件读取规则数组，并提供规则库体检能力

use std::path::Path;

use tracing::debug;

use crate::error::{HpResult, HttprintError};
use crate::expr::shunting_yard;
use crate::rule::Rule;

pub struct RuleLoader;

impl RuleLoader {
    /// 从JSON文件加载规则数组
    pub fn load_from_file(path: &Path) -> HpResult<Vec<Rule>> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            HttprintError::RuleLoadError(format!("{}：{}", path.display(), err))
        })?;

        let rules: Vec<Rule> = serde_json::from_str(&content).map_err(|err| {
            HttprintError::RuleLoadError(format!("{}：{}", path.display(), err))
        })?;

        debug!("规则加载完成：{}，共{}条", path.display(), rules.len());
        Ok(rules)
    }

    /// 校验单条规则表达式的结构合法性
    ///
    /// 先编译为后缀序列，再模拟布尔栈的深度变化：运算符出现时栈深
    /// 不足2、或扫描结束栈深不为1，都判为结构非法。
    pub fn validate_keyword(keyword: &str) -> HpResult<()> {
        let postfix = shunting_yard(keyword)?;

        let mut depth: usize = 0;
        for token in &postfix {
            match token.as_str() {
                "&&" | "||" => {
                    if depth < 2 {
                        return Err(HttprintError::RuleParseError(format!(
                            "运算符缺少操作数：{}",
                            keyword
                        )));
                    }
                    depth -= 1;
                }
                "(" | ")" => {
                    return Err(HttprintError::RuleParseError(format!(
                        "括号不匹配：{}",
                        keyword
                    )));
                }
                _ => depth += 1,
            }
        }

        if depth != 1 {
            return Err(HttprintError::RuleParseError(format!(
                "表达式结构非法：{}",
                keyword
            )));
        }

        Ok(())
    }

    /// 规则库体检：返回全部非法规则及其错误描述
    pub fn validate(rules: &[Rule]) -> Vec<(String, String)> {
        rules
            .iter()
            .filter_map(|rule| {
                Self::validate_keyword(&rule.keyword)
                    .err()
                    .map(|err| (rule.name.clone(), err.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleCategory;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "WordPress", "type": "cms", "keyword": "body=\"wp-content\""}}]"#
        )
        .unwrap();

        let rules = RuleLoader::load_from_file(file.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "WordPress");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = RuleLoader::load_from_file(Path::new("/nonexistent/fingers.json"));
        assert!(err.is_err());
    }

    #[test]
    fn test_load_malformed_json_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(RuleLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_validate_keyword() {
        assert!(RuleLoader::validate_keyword(r#"body="a" && title="b""#).is_ok());
        assert!(RuleLoader::validate_keyword(r#"(body="a" || body="b") && cert="c""#).is_ok());
        // 缺右括号
        assert!(RuleLoader::validate_keyword(r#"(body="a" && body="b""#).is_err());
        // 多右括号
        assert!(RuleLoader::validate_keyword(r#"body="a")"#).is_err());
        // 运算符缺操作数
        assert!(RuleLoader::validate_keyword(r#"body="a" &&"#).is_err());
        // 两个裸操作数
        assert!(RuleLoader::validate_keyword(r#"body="a" body="b""#).is_err());
    }

    #[test]
    fn test_validate_reports_offenders() {
        let rules = vec![
            Rule {
                name: "Good".to_string(),
                category: RuleCategory::Cms,
                keyword: r#"body="ok""#.to_string(),
            },
            Rule {
                name: "Bad".to_string(),
                category: RuleCategory::Other,
                keyword: r#"body="x" &&"#.to_string(),
            },
        ];

        let offenders = RuleLoader::validate(&rules);
        assert_eq!(offenders.len(), 1);
        assert_eq!(offenders[0].0, "Bad");
    }
}
