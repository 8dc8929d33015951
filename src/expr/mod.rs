//! 关键字表达式引擎：分词、中缀转后缀（Shunting-Yard）、后缀求值

pub mod compiler;
pub mod eval;

pub use compiler::{shunting_yard, tokenize};
pub use eval::{evaluate_condition, evaluate_postfix, SignalView};
