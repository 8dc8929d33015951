//! 后缀表达式求值器与叶子谓词求值
//!
//! 刻意不做短路求值：叶子谓词都是无副作用的廉价字符串操作，
//! 全量求值保证每个谓词都被执行。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// 单个目标的只读信号视图，供谓词求值使用
#[derive(Debug, Clone, Copy)]
pub struct SignalView<'a> {
    pub body: &'a str,
    pub header: &'a str,
    pub title: &'a str,
    pub cert: &'a str,
    pub icon_hashes: &'a [String],
}

/// 谓词对应的信号字段
#[derive(Debug, Clone, Copy)]
enum SignalField {
    Body,
    Header,
    Title,
    Cert,
    IconHash,
}

// 条件前缀表：否定前缀（更长、更具体）必须排在对应的肯定前缀之前，
// 避免 body!= 被 body= 误读
const CONDITION_PREFIXES: &[(&str, SignalField, bool)] = &[
    ("body!=", SignalField::Body, true),
    ("header!=", SignalField::Header, true),
    ("title!=", SignalField::Title, true),
    ("body=", SignalField::Body, false),
    ("header=", SignalField::Header, false),
    ("title=", SignalField::Title, false),
    ("cert=", SignalField::Cert, false),
    ("icon_hash=", SignalField::IconHash, false),
];

static UNESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(.)").expect("内置正则必然合法"));

/// 去除转义字符：`\x` 折叠为 `x`
fn unescape(s: &str) -> String {
    UNESCAPE_RE.replace_all(s, "$1").into_owned()
}

/// 剥掉一层包裹的双引号
fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// 求值单个条件谓词
///
/// 识别的前缀见CONDITION_PREFIXES；剥前缀、剥一层引号、去转义后做
/// 子串包含判断（icon_hash为哈希集合的精确成员判断）。
/// 未识别的条件一律判为false（对未知谓词种类保持前向兼容）。
pub fn evaluate_condition(condition: &str, signals: &SignalView<'_>) -> bool {
    let condition = condition.trim();

    for (prefix, field, negated) in CONDITION_PREFIXES {
        if let Some(rest) = condition.strip_prefix(prefix) {
            let value = unescape(strip_quotes(rest));
            let contained = match field {
                SignalField::Body => signals.body.contains(&value),
                SignalField::Header => signals.header.contains(&value),
                SignalField::Title => signals.title.contains(&value),
                SignalField::Cert => signals.cert.contains(&value),
                SignalField::IconHash => signals.icon_hashes.iter().any(|h| h == &value),
            };
            return contained != *negated;
        }
    }

    false
}

/// 求值后缀表达式
///
/// 布尔栈从左到右扫描：运算符弹出两个操作数（不足则记录诊断并整体
/// 判为false），字面量委托给谓词求值。扫描结束栈中必须恰好剩一个
/// 值，否则视为无效表达式，同样判为false。
pub fn evaluate_postfix(postfix: &[String], signals: &SignalView<'_>) -> bool {
    let mut stack: Vec<bool> = Vec::new();

    for token in postfix {
        match token.as_str() {
            "&&" | "||" => {
                // 弹出顺序：v2为后入栈者，v1为先入栈者
                let (Some(v2), Some(v1)) = (stack.pop(), stack.pop()) else {
                    warn!("表达式操作数不足，按不匹配处理");
                    return false;
                };
                if token == "&&" {
                    stack.push(v1 && v2);
                } else {
                    stack.push(v1 || v2);
                }
            }
            condition => stack.push(evaluate_condition(condition, signals)),
        }
    }

    if stack.len() != 1 {
        warn!("无效表达式：求值结束栈中剩余{}个值", stack.len());
        return false;
    }

    stack[0]
}
