use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub source: String,
    pub url: String,
    pub date: String,
    pub description: String,
    pub summary: String,
    pub short_description: String,
    #[serde(default)]
    pub detail_markdown: String,
    pub score: i64,
    #[serde(default)]
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
}
