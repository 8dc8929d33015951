//! 指纹规则模块：数据模型与加载器

pub mod loader;
pub mod model;

pub use loader::RuleLoader;
pub use model::{MatchResult, Rule, RuleCategory, STATUS_NO_RESPONSE};
