use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Duration;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::news::NewsItem;
use crate::services::news_cache::NewsCache;
use crate::utils::time::Clock;

/// How many top stories are inspected per refresh.
pub const TOP_STORY_CANDIDATES: usize = 5;
pub const MAX_NEWS_ITEMS: usize = 3;
pub const GENERATED_URL_PREFIX: &str = "/static/generated";
pub const CACHE_FILE_NAME: &str = "news_cache.json";

const CHAT_MODEL: &str = "gpt-3.5-turbo";
const IMAGE_MODEL: &str = "gpt-image-1-mini";
const SHORT_DESCRIPTION_CHARS: usize = 160;

const HEADLINE_SYSTEM_PROMPT: &str = r#"You are the senior tech editor of a developer-focused video channel.
Your readers are busy working developers and students; within three seconds they should feel "I need to know this".

Headline rules:
- Point at what the change really means for the industry.
- Include a concrete number or impact when the title allows it.
- Speak to practitioners' concerns (interviews, legacy, productivity).
- Use one or two emoji for attention.

Summary rules:
- Two or three plain sentences, no markdown.
- First the conclusion, then why it matters now, then what the reader should watch.

Detail rules (markdown, after DETAIL:):
SUMMARY: one punchy line
## Key points
- concrete change, figure or case
- practical impact
- technical significance
## Why it matters now
- hiring, interviews or projects
- where the industry is heading
- what to learn next

Output format (mandatory):
HEADLINE: ...
SUMMARY: ...
DETAIL:
..."#;

const DETAIL_SYSTEM_PROMPT: &str = r#"Given a tech article title, write only a detailed summary in exactly this format:
SUMMARY: one-sentence conclusion
## Key claims
- claim 1
- claim 2
- claim 3
## Why it matters
- operational meaning
- relevance to current technology trends"#;

#[derive(Debug, Clone)]
pub struct NewsSettings {
    pub hn_base_url: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub generated_dir: PathBuf,
    pub ttl: Duration,
}

impl NewsSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hn_base_url: config.hn_base_url.trim_end_matches('/').to_string(),
            openai_base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            openai_api_key: config.openai_api_key.clone(),
            cache_file: Some(Path::new(&config.news_cache_dir).join(CACHE_FILE_NAME)),
            generated_dir: PathBuf::from(&config.generated_dir),
            ttl: Duration::seconds(config.news_ttl_seconds),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HnItem {
    title: Option<String>,
    url: Option<String>,
    by: Option<String>,
    #[serde(default)]
    score: i64,
}

/// Headline, summary and markdown detail extracted from a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRewrite {
    pub headline: String,
    pub summary: String,
    pub detail: String,
}

#[derive(Clone)]
pub struct NewsService {
    client: Client,
    settings: NewsSettings,
    cache: Arc<Mutex<NewsCache>>,
    clock: Arc<dyn Clock>,
}

impl NewsService {
    pub fn new(settings: NewsSettings, client: Client, clock: Arc<dyn Clock>) -> Self {
        let cache = NewsCache::new(settings.cache_file.clone(), settings.ttl, clock.clone());
        Self {
            client,
            settings,
            cache: Arc::new(Mutex::new(cache)),
            clock,
        }
    }

    fn llm_enabled(&self) -> bool {
        self.settings.openai_api_key.is_some()
    }

    /// Current headlines: memory cache, then the cache file, then a fresh
    /// fetch. Never fails; a failed fetch yields the built-in headlines,
    /// which are cached like any other result.
    pub async fn get_tech_news(&self) -> Vec<NewsItem> {
        let mut cache = self.cache.lock().await;
        if let Some(items) = cache.get() {
            tracing::debug!("news served from memory cache");
            return items;
        }
        if cache.load_from_file().await {
            if let Some(items) = cache.get() {
                tracing::info!("news loaded from cache file");
                return items;
            }
        }

        tracing::info!("fetching fresh tech news");
        let items = match self.fetch_top_stories().await {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                tracing::warn!("no usable stories returned, using fallback news");
                self.fallback_news().await
            }
            Err(e) => {
                tracing::warn!(error = ?e, "news fetch failed, using fallback news");
                self.fallback_news().await
            }
        };
        cache.store(items.clone()).await;
        items
    }

    pub async fn find(&self, id: &str) -> Option<NewsItem> {
        self.get_tech_news()
            .await
            .into_iter()
            .find(|item| item.id == id)
    }

    async fn fetch_top_stories(&self) -> Result<Vec<NewsItem>> {
        let url = format!("{}/topstories.json", self.settings.hn_base_url);
        let story_ids: Vec<i64> = self
            .client
            .get(&url)
            .timeout(StdDuration::from_secs(5))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut items = Vec::new();
        for story_id in story_ids.into_iter().take(TOP_STORY_CANDIDATES) {
            let story = match self.fetch_story(story_id).await {
                Ok(story) => story,
                Err(e) => {
                    tracing::warn!(story_id, error = ?e, "skipping story");
                    continue;
                }
            };
            let (Some(title), Some(url)) = (story.title.as_deref(), story.url.as_deref()) else {
                continue;
            };

            let mut item = self.build_item(story_id, title, url, &story).await;
            self.enrich(&mut item).await;
            items.push(item);
            if items.len() >= MAX_NEWS_ITEMS {
                break;
            }
        }
        Ok(items)
    }

    async fn fetch_story(&self, story_id: i64) -> Result<HnItem> {
        let url = format!("{}/item/{}.json", self.settings.hn_base_url, story_id);
        let story = self
            .client
            .get(&url)
            .timeout(StdDuration::from_secs(3))
            .send()
            .await?
            .error_for_status()?
            .json::<HnItem>()
            .await?;
        Ok(story)
    }

    async fn build_item(&self, story_id: i64, original_title: &str, url: &str, story: &HnItem) -> NewsItem {
        let posted_by = format!(
            "Posted by {} with {} points",
            story.by.as_deref().unwrap_or("Anonymous"),
            story.score
        );

        let rewrite = if self.llm_enabled() {
            match self.rewrite_headline(original_title).await {
                Ok(rewrite) => Some(rewrite),
                Err(e) => {
                    tracing::warn!(story_id, error = ?e, "headline rewrite failed, keeping original");
                    None
                }
            }
        } else {
            None
        };

        let (title, description, detail) = match rewrite {
            Some(r) => {
                let description = if r.summary.is_empty() { posted_by } else { r.summary };
                (r.headline, description, r.detail)
            }
            None => (original_title.to_string(), posted_by, String::new()),
        };

        NewsItem {
            id: story_id.to_string(),
            title,
            original_title: original_title.to_string(),
            source: "HackerNews".to_string(),
            url: url.to_string(),
            date: self.today(),
            short_description: truncate_chars(&description, SHORT_DESCRIPTION_CHARS),
            summary: description.clone(),
            description,
            detail_markdown: detail,
            score: story.score,
            emoji: String::new(),
            image_url: None,
            image_alt: None,
        }
    }

    async fn rewrite_headline(&self, original_title: &str) -> Result<ParsedRewrite> {
        let user = format!(
            "Write a punchy headline and a short summary for this English tech article title.\n\nOriginal title:\n{}",
            original_title
        );
        let content = self.chat(HEADLINE_SYSTEM_PROMPT, &user, 2500).await?;
        tracing::debug!(%content, "headline rewrite response");

        let mut parsed = parse_headline_and_summary(&content, original_title);
        if parsed.detail.is_empty() {
            parsed.detail = self.generate_detail(original_title).await;
        }
        Ok(parsed)
    }

    /// Second-chance detail when the rewrite omitted it; empty on failure.
    async fn generate_detail(&self, title: &str) -> String {
        match self
            .chat(DETAIL_SYSTEM_PROMPT, &format!("Title: {}", title), 800)
            .await
        {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(error = ?e, "detail generation failed");
                String::new()
            }
        }
    }

    async fn chat(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let api_key = self
            .settings
            .openai_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;
        let payload = json!({
            "model": CHAT_MODEL,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": 0.7,
            "max_tokens": max_tokens
        });

        let res = self
            .client
            .post(format!("{}/chat/completions", self.settings.openai_base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(StdDuration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }

    async fn request_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let api_key = self
            .settings
            .openai_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;
        let payload = json!({
            "model": IMAGE_MODEL,
            "prompt": prompt,
            "size": "1536x1024",
            "quality": "low"
        });

        let res = self
            .client
            .post(format!("{}/images/generations", self.settings.openai_base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(StdDuration::from_secs(120))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI image API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        let encoded = body
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("b64_json"))
            .and_then(|b| b.as_str())
            .filter(|b| !b.is_empty())
            .ok_or_else(|| anyhow::anyhow!("image response has no data"))?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| anyhow::anyhow!("invalid image payload: {}", e))?;
        Ok(bytes)
    }

    /// Public URL of the illustration for `raw_id`, generating it on first use.
    async fn illustration(&self, prompt: &str, raw_id: &str) -> Option<String> {
        if !self.llm_enabled() {
            return None;
        }
        let filename = safe_image_name(raw_id);
        let public_url = format!("{}/{}", GENERATED_URL_PREFIX, filename);
        let file_path = self.settings.generated_dir.join(&filename);
        if tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
            return Some(public_url);
        }

        let bytes = match self.request_image(prompt).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = ?e, "illustration generation failed");
                return None;
            }
        };
        match save_image(&self.settings.generated_dir, &file_path, bytes).await {
            Ok(()) => Some(public_url),
            Err(e) => {
                tracing::warn!(error = %e, path = %file_path.display(), "failed to save illustration");
                None
            }
        }
    }

    async fn enrich(&self, item: &mut NewsItem) {
        let basis = if item.original_title.is_empty() {
            item.title.clone()
        } else {
            item.original_title.clone()
        };
        item.emoji = pick_emoji(&basis).to_string();
        let prompt = build_image_prompt(&basis);
        if let Some(url) = self.illustration(&prompt, &item.id).await {
            item.image_url = Some(url);
            item.image_alt = Some(prompt);
        }
    }

    fn today(&self) -> String {
        self.clock.now().format("%Y-%m-%d").to_string()
    }

    /// Built-in headlines used when the news API is unreachable.
    pub async fn fallback_news(&self) -> Vec<NewsItem> {
        let date = self.today();
        let seeds = [
            (
                "fallback_1",
                "🚀 Kubernetes 1.29 lands: a new era of performance",
                "Kubernetes 1.29 Release",
                "Kubernetes Blog",
                "https://kubernetes.io/blog/",
                "The latest release improves performance and adds new APIs. Meet the future of container orchestration.",
                "## Key claims\n- Performance improvements\n- New APIs\n\n## Why it matters\n- Container orchestration keeps maturing",
                100,
            ),
            (
                "fallback_2",
                "🤖 Docker Desktop gets built-in AI: a productivity jump",
                "Docker Desktop AI Integration",
                "Docker",
                "https://www.docker.com/blog/",
                "Docker Desktop now ships AI-assisted image analysis. Container management just got smarter.",
                "## Key claims\n- AI features integrated\n- Higher productivity\n\n## Why it matters\n- Better developer workflows",
                85,
            ),
            (
                "fallback_3",
                "⚡ Microservices take over the enterprise",
                "Microservices Architecture Enterprise Trend",
                "DevOps Digest",
                "https://devops.com/",
                "Microservice architectures are becoming the mainstream in enterprise environments. A new paradigm for distributed systems.",
                "## Key claims\n- Growing adoption of microservices\n- Enterprise rollouts\n\n## Why it matters\n- The future of distributed systems",
                72,
            ),
        ];

        let mut items = Vec::with_capacity(seeds.len());
        for (id, title, original_title, source, url, description, detail, score) in seeds {
            let mut item = NewsItem {
                id: id.to_string(),
                title: title.to_string(),
                original_title: original_title.to_string(),
                source: source.to_string(),
                url: url.to_string(),
                date: date.clone(),
                description: description.to_string(),
                summary: description.to_string(),
                short_description: first_sentence(description),
                detail_markdown: detail.to_string(),
                score,
                emoji: String::new(),
                image_url: None,
                image_alt: None,
            };
            self.enrich(&mut item).await;
            items.push(item);
        }
        items
    }
}

async fn save_image(dir: &Path, file_path: &Path, bytes: Vec<u8>) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(file_path, bytes).await
}

fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex must compile"))
}

pub fn pick_emoji(title: &str) -> &'static str {
    let text = title.to_lowercase();
    let has_any = |keys: &[&str]| keys.iter().any(|k| text.contains(k));

    if has_any(&["ai", "artificial intelligence", "ml", "machine learning"]) {
        "🤖"
    } else if has_any(&["cloud", "aws", "gcp", "azure", "datacenter"]) {
        "☁️"
    } else if has_any(&["kubernetes", "k8s"]) {
        "🚢"
    } else if text.contains("docker") {
        "🐳"
    } else if has_any(&["security", "vulnerability", "breach", "zero-day"]) {
        "🔒"
    } else if has_any(&["data", "database", "analytics", "warehouse"]) {
        "📊"
    } else if has_any(&["chip", "semiconductor", "gpu", "cpu"]) {
        "🧠"
    } else if has_any(&["robot", "automation"]) {
        "🦾"
    } else {
        "📰"
    }
}

pub fn build_image_prompt(title: &str) -> String {
    format!(
        "Create a clean, modern, editorial illustration for a tech news article. \
         Style: flat illustration, minimal shapes, subtle gradients. \
         No text, no logos, no brand marks. \
         High-contrast, minimal, professional. \
         Theme: {}",
        title.trim()
    )
}

/// Strips markdown headers, bullets and emphasis, and collapses blank lines.
pub fn clean_summary(text: &str) -> String {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    static BULLET: OnceLock<Regex> = OnceLock::new();
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();

    if text.is_empty() {
        return String::new();
    }
    let cleaned = cached_regex(&HEADER, r"(?m)^#{1,6}\s*").replace_all(text, "");
    let cleaned = cached_regex(&BULLET, r"(?m)^[-*\x{2022}]\s+").replace_all(&cleaned, "");
    let cleaned = cleaned.replace("**", "").replace("__", "");
    cached_regex(&BLANK_LINES, r"\n{2,}")
        .replace_all(&cleaned, "\n")
        .trim()
        .to_string()
}

/// Splits a rewrite into its `HEADLINE:`, `SUMMARY:` and `DETAIL:` parts.
///
/// Markers are only honoured before `DETAIL:`; everything after it belongs to
/// the detail. Lines following the summary without a `DETAIL:` marker are
/// treated as detail too.
pub fn parse_headline_and_summary(content: &str, fallback_title: &str) -> ParsedRewrite {
    let mut headline = String::new();
    let mut summary = String::new();
    let mut detail_lines: Vec<&str> = Vec::new();
    let mut in_detail = false;
    let mut after_summary = false;

    for line in content.lines() {
        let stripped = line.trim();
        if in_detail {
            detail_lines.push(line);
        } else if let Some(rest) = stripped.strip_prefix("HEADLINE:") {
            headline = rest.trim().to_string();
        } else if let Some(rest) = stripped.strip_prefix("SUMMARY:") {
            summary = rest.trim().to_string();
            after_summary = true;
        } else if let Some(rest) = stripped.strip_prefix("DETAIL:") {
            in_detail = true;
            let rest = rest.trim();
            if !rest.is_empty() {
                detail_lines.push(rest);
            }
        } else if after_summary {
            detail_lines.push(line);
        }
    }

    if headline.is_empty() {
        headline = fallback_title.to_string();
    }
    ParsedRewrite {
        headline,
        summary: clean_summary(&summary),
        detail: detail_lines.join("\n").trim().to_string(),
    }
}

pub fn safe_image_name(raw_id: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let safe = cached_regex(&UNSAFE, r"[^a-zA-Z0-9_-]").replace_all(raw_id, "_");
    format!("news_{}.png", safe)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn first_sentence(text: &str) -> String {
    match text.find(". ") {
        Some(pos) => text[..=pos].to_string(),
        None => text.to_string(),
    }
}
