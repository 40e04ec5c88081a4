use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::news::NewsItem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsListResponse {
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsDetailResponse {
    #[serde(flatten)]
    pub item: NewsItem,
    pub detail_html: String,
}

impl From<NewsItem> for NewsDetailResponse {
    fn from(item: NewsItem) -> Self {
        let source = if item.detail_markdown.trim().is_empty() {
            item.description.as_str()
        } else {
            item.detail_markdown.as_str()
        };
        let detail_html = render_markdown(source);
        Self { item, detail_html }
    }
}

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
