//! 指纹匹配器
//! 对单个目标执行：抓取信号 → favicon哈希 → 逐条规则求值 → 按类别分组

use tracing::{debug, warn};

use crate::acquire::HttpAcquirer;
use crate::expr::{evaluate_postfix, shunting_yard, SignalView};
use crate::favicon::resolve_favicon_hashes;
use crate::rule::{MatchResult, Rule, RuleCategory, STATUS_NO_RESPONSE};
use crate::utils::{query_escape, remove_duplicates, remove_newline};

// 网页快照服务，报告页直接引用
const SCREENSHOT_SERVICE: &str = "https://s0.wp.com/mshots/v1/";

pub struct FingerMatcher {
    rules: Vec<Rule>,
}

impl FingerMatcher {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// 编译并求值单条规则表达式，编译失败按不匹配处理
    pub fn check_keyword(keyword: &str, signals: &SignalView<'_>) -> bool {
        match shunting_yard(keyword) {
            Ok(postfix) => evaluate_postfix(&postfix, signals),
            Err(err) => {
                warn!("规则表达式编译失败：{}", err);
                false
            }
        }
    }

    /// 全量规则匹配，返回（cms命中名, other命中名）
    pub fn check(&self, signals: &SignalView<'_>) -> (Vec<String>, Vec<String>) {
        let mut cms_list = Vec::new();
        let mut other_list = Vec::new();

        for rule in &self.rules {
            if Self::check_keyword(&rule.keyword, signals) {
                match rule.category {
                    RuleCategory::Cms => cms_list.push(rule.name.clone()),
                    RuleCategory::Other => other_list.push(rule.name.clone()),
                }
            }
        }

        (remove_duplicates(cms_list), remove_duplicates(other_list))
    }

    /// 对单个目标完整执行一次指纹识别
    pub async fn fingerprint(&self, acquirer: &HttpAcquirer, url: &str) -> MatchResult {
        let screenshot = format!("{}{}", SCREENSHOT_SERVICE, query_escape(url));
        let signals = acquirer.get_response(url).await;

        // 目标不可达：状态码0占位，不做规则求值
        if signals.status_code == STATUS_NO_RESPONSE {
            return MatchResult {
                url: url.to_string(),
                status_code: STATUS_NO_RESPONSE,
                title: String::new(),
                cms_list: Vec::new(),
                other_list: Vec::new(),
                screenshot,
            };
        }

        // favicon哈希失败时保留抓取结果，放弃规则求值
        let icon_hashes = match resolve_favicon_hashes(acquirer, &signals).await {
            Ok(hashes) => hashes,
            Err(err) => {
                debug!("favicon哈希失败 {}：{}", url, err);
                return MatchResult {
                    url: url.to_string(),
                    status_code: signals.status_code,
                    title: remove_newline(&signals.title),
                    cms_list: Vec::new(),
                    other_list: Vec::new(),
                    screenshot,
                };
            }
        };

        let view = SignalView {
            body: &signals.body,
            header: &signals.header_text,
            title: &signals.title,
            cert: &signals.cert_text,
            icon_hashes: &icon_hashes,
        };
        let (cms_list, other_list) = self.check(&view);

        MatchResult {
            url: url.to_string(),
            status_code: signals.status_code,
            title: remove_newline(&signals.title),
            cms_list,
            other_list,
            screenshot,
        }
    }
}
