//! 目标抓取模块：HTTP客户端、证书文本化与UA池

pub mod cert;
pub mod client;
pub mod useragent;

pub use client::{HttpAcquirer, ResponseSignals};
