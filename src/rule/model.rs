//! 指纹规则与匹配结果数据模型
//! 仅存储数据，无业务逻辑，支持序列化/反序列化

use serde::{Deserialize, Serialize};

/// 终态失败哨兵状态码：两阶段抓取均未取得响应
/// 与任何真实HTTP状态码（>=100）可区分
pub const STATUS_NO_RESPONSE: u16 = 0;

/// 规则分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Cms,
    /// 非cms一律归入other（未知分类字符串同样按other处理）
    #[serde(other)]
    Other,
}

/// 指纹规则：名称 + 分类 + 布尔关键字表达式
/// 加载后不可变，整个批次内只读共享
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(rename = "type")]
    pub category: RuleCategory,
    pub keyword: String,
}

/// 单个目标的匹配结果
/// 每个输入URL恰好产出一条，抓取失败也不例外
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub url: String,
    pub status_code: u16,
    pub title: String,
    pub cms_list: Vec<String>,
    pub other_list: Vec<String>,
    pub screenshot: String,
}
