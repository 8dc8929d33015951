//! HTML提取模块：字符集解码与标签提取

pub mod charset;
pub mod html_extractor;

pub use charset::decode_body;
pub use html_extractor::HtmlExtractor;
