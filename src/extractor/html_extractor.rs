//! HTML标签提取器
//! 负责从HTML中提取<title>文本与favicon相关<link>标签的href

use std::cell::{Cell, RefCell};
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use markup5ever::interface::Attribute;
use tendril::StrTendril;

// link标签rel属性中视为favicon的取值
const FAVICON_RELS: &[&str] = &[
    "icon",
    "shortcut icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "apple-touch-startup-image",
    "mask-icon",
    "fluid-icon",
];

#[derive(Debug, Default, Clone)]
pub struct HtmlExtractor {
    title: RefCell<String>,
    in_title: Cell<bool>,
    title_done: Cell<bool>,
    favicon_hrefs: RefCell<Vec<String>>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(Tag {
                kind: TagKind::StartTag,
                name,
                attrs,
                ..
            }) => match name.as_ref() {
                "title" if !self.title_done.get() => self.in_title.set(true),
                "link" => self.extract_favicon_href(&attrs),
                _ => {}
            },
            Token::TagToken(Tag {
                kind: TagKind::EndTag,
                name,
                ..
            }) if name.as_ref() == "title" => {
                if self.in_title.get() {
                    self.in_title.set(false);
                    // 只取文档中第一个title
                    self.title_done.set(true);
                }
            }
            Token::CharacterTokens(text) => {
                if self.in_title.get() {
                    self.title.borrow_mut().push_str(&text);
                }
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从HTML字符串提取标签
    pub fn extract(&self, html: &str) -> Self {
        let tokenizer = Tokenizer::new(self.clone(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink
    }

    /// 提取link标签中favicon相关的href
    fn extract_favicon_href(&self, attrs: &[Attribute]) {
        let mut rel = None;
        let mut href = None;

        for attr in attrs {
            match attr.name.local.as_ref() {
                "rel" => rel = Some(attr.value.trim().to_lowercase()),
                "href" => href = Some(attr.value.to_string()),
                _ => {}
            }
        }

        if let (Some(r), Some(h)) = (rel, href) {
            if FAVICON_RELS.contains(&r.as_str()) && !h.is_empty() {
                self.favicon_hrefs.borrow_mut().push(h);
            }
        }
    }

    /// 获取提取到的页面标题（去除首尾空白）
    pub fn get_title(&self) -> String {
        self.title.borrow().trim().to_string()
    }

    /// 获取提取到的favicon href列表（去重，保留出现顺序）
    pub fn get_favicon_hrefs(&self) -> Vec<String> {
        crate::utils::remove_duplicates(self.favicon_hrefs.borrow().clone())
    }
}
