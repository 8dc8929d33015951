//! 表达式编译器
//! 将规则关键字表达式分词，并用Shunting-Yard算法转为后缀序列

use tracing::warn;

use crate::error::{HpResult, HttprintError};

/// 运算符优先级：&& 高于 ||
fn precedence(op: &str) -> u8 {
    match op {
        "&&" => 2,
        "||" => 1,
        _ => 0,
    }
}

/// 表达式分词
///
/// 引号外按空白切分；`(`/`)`在引号外作为独立token；`&&`/`||`为双字符
/// 运算符；`\"`转义的引号不翻转引号状态（反斜杠在此阶段被消耗）。
/// 括号计数不归零时输出诊断，但仍返回已产出的token。
pub fn tokenize(expression: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut parens: i32 = 0;

    let mut chars = expression.chars().peekable();
    while let Some(ch) = chars.next() {
        if escaped {
            token.push(ch);
            escaped = false;
            continue;
        }

        if ch == '\\' {
            if chars.peek() == Some(&'"') {
                escaped = true;
            } else {
                token.push(ch);
            }
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            token.push(ch);
            continue;
        }

        match ch {
            '(' | ')' if !in_quotes => {
                if !token.is_empty() {
                    tokens.push(std::mem::take(&mut token));
                }
                tokens.push(ch.to_string());
                if ch == '(' {
                    parens += 1;
                } else {
                    parens -= 1;
                }
            }
            ' ' if !in_quotes => {
                if !token.is_empty() {
                    tokens.push(std::mem::take(&mut token));
                }
            }
            '&' if chars.peek() == Some(&'&') => {
                chars.next();
                if !token.is_empty() {
                    tokens.push(std::mem::take(&mut token));
                }
                tokens.push("&&".to_string());
            }
            '|' if chars.peek() == Some(&'|') => {
                chars.next();
                if !token.is_empty() {
                    tokens.push(std::mem::take(&mut token));
                }
                tokens.push("||".to_string());
            }
            _ => token.push(ch),
        }
    }

    if !token.is_empty() {
        tokens.push(token);
    }

    if parens != 0 {
        warn!("表达式括号不匹配：{}", expression);
    }

    tokens
}

/// Shunting-Yard：中缀表达式转后缀（逆波兰）序列
///
/// `&&`/`||`左结合；栈顶为更高或同级运算符（且非`(`）时先弹出；
/// `)`弹出并丢弃至配对的`(`，找不到配对则报错。
pub fn shunting_yard(expression: &str) -> HpResult<Vec<String>> {
    let mut output: Vec<String> = Vec::new();
    let mut operators: Vec<String> = Vec::new();

    for token in tokenize(expression) {
        match token.as_str() {
            "&&" | "||" => {
                while let Some(top) = operators.last() {
                    if top == "(" || precedence(&token) > precedence(top) {
                        break;
                    }
                    if let Some(op) = operators.pop() {
                        output.push(op);
                    }
                }
                operators.push(token);
            }
            "(" => operators.push(token),
            ")" => {
                loop {
                    match operators.pop() {
                        Some(op) if op == "(" => break,
                        Some(op) => output.push(op),
                        None => {
                            return Err(HttprintError::RuleParseError(format!(
                                "括号不匹配：{}",
                                expression
                            )));
                        }
                    }
                }
            }
            _ => output.push(token),
        }
    }

    while let Some(op) = operators.pop() {
        output.push(op);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(expr: &str) -> Vec<String> {
        tokenize(expr)
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(
            toks(r#"body="wp-content" && title="WordPress""#),
            vec![r#"body="wp-content""#, "&&", r#"title="WordPress""#]
        );
    }

    #[test]
    fn test_tokenize_parens_standalone() {
        assert_eq!(
            toks(r#"(a || b) && c"#),
            vec!["(", "a", "||", "b", ")", "&&", "c"]
        );
    }

    #[test]
    fn test_tokenize_parens_inside_quotes_kept() {
        assert_eq!(toks(r#"body="foo(bar)""#), vec![r#"body="foo(bar)""#]);
    }

    #[test]
    fn test_tokenize_spaces_inside_quotes_kept() {
        assert_eq!(toks(r#"title="Login Page""#), vec![r#"title="Login Page""#]);
    }

    #[test]
    fn test_tokenize_escaped_quote_does_not_toggle() {
        // \" 不翻转引号状态，反斜杠本身被消耗
        assert_eq!(
            toks(r#"body="He said \"hi\"" && c"#),
            vec![r#"body="He said "hi"""#, "&&", "c"]
        );
    }

    #[test]
    fn test_tokenize_operators_without_spaces() {
        assert_eq!(toks("a&&b||c"), vec!["a", "&&", "b", "||", "c"]);
    }

    #[test]
    fn test_shunting_yard_precedence() {
        // a || b && c 等价于 a || (b && c)
        assert_eq!(
            shunting_yard("a || b && c").unwrap(),
            vec!["a", "b", "c", "&&", "||"]
        );
        // a && b || c 等价于 (a && b) || c
        assert_eq!(
            shunting_yard("a && b || c").unwrap(),
            vec!["a", "b", "&&", "c", "||"]
        );
    }

    #[test]
    fn test_shunting_yard_left_associative() {
        assert_eq!(
            shunting_yard("a && b && c").unwrap(),
            vec!["a", "b", "&&", "c", "&&"]
        );
    }

    #[test]
    fn test_shunting_yard_parens_override() {
        assert_eq!(
            shunting_yard("(a || b) && c").unwrap(),
            vec!["a", "b", "||", "c", "&&"]
        );
    }

    #[test]
    fn test_shunting_yard_unmatched_close_paren() {
        assert!(shunting_yard("a && b)").is_err());
    }

    #[test]
    fn test_shunting_yard_unmatched_open_paren_still_produces_tokens() {
        // 缺失右括号：分词仅输出诊断，'('残留在运算符栈中被冲刷到输出
        // 求值阶段会因无效表达式判为不匹配，但编译本身不致命
        let postfix = shunting_yard("(a && b").unwrap();
        assert!(postfix.contains(&"(".to_string()));
    }
}
