//! httprint - 批量Web应用指纹识别工具

// 导出全局错误类型
pub use self::error::{HpResult, HttprintError};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig};

// 导出规则模块核心接口
pub use self::rule::{MatchResult, Rule, RuleCategory, RuleLoader, STATUS_NO_RESPONSE};

// 导出表达式引擎核心接口
pub use self::expr::{evaluate_condition, evaluate_postfix, shunting_yard, tokenize, SignalView};

// 导出抓取模块核心接口
pub use self::acquire::{HttpAcquirer, ResponseSignals};

// 导出提取模块核心接口
pub use self::extractor::HtmlExtractor;

// 导出匹配与执行核心接口
pub use self::detector::FingerMatcher;
pub use self::runner::{BatchRunner, RunStats};

// 导出报告模块核心接口
pub use self::report::{ReportRecord, ReportSink};

// 导出预览服务
pub use self::server::PreviewServer;

// 声明所有子模块
pub mod acquire;
pub mod config;
pub mod detector;
pub mod error;
pub mod expr;
pub mod extractor;
pub mod favicon;
pub mod report;
pub mod rule;
pub mod runner;
pub mod server;
pub mod utils;
