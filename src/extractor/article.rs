use scraper::{Html, Node, Selector};
use std::sync::LazyLock;
use tracing::{info, instrument};

use crate::extractor::model::{ContentType, ExtractError, ExtractedContent};
use crate::fetcher::Fetcher;

/// Pages with less visible text than this are treated as extraction failures.
pub const MIN_ARTICLE_CHARS: usize = 100;

pub const UNTITLED: &str = "No title";

const INVISIBLE_ELEMENTS: [&str; 2] = ["script", "style"];

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Failed to parse title selector"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleText {
    pub title: String,
    pub text: String,
}

/// Page title plus all visible text, whitespace collapsed to single spaces.
pub fn html_to_text(html: &str) -> ArticleText {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let fragments = document.tree.root().descendants().filter_map(|node| {
        let Node::Text(text) = node.value() else {
            return None;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| INVISIBLE_ELEMENTS.iter().any(|name| *name == element.name()))
        });
        (!hidden).then_some(&**text)
    });

    let text = fragments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    ArticleText { title, text }
}

#[instrument(skip(fetcher))]
pub async fn extract_article(fetcher: &Fetcher, url: &str) -> Result<ExtractedContent, ExtractError> {
    let page = fetcher.fetch(url).await?;
    let ArticleText { title, text } = html_to_text(&page.body_utf8);

    if text.chars().count() < MIN_ARTICLE_CHARS {
        return Err(ExtractError::ContentTooShort(ContentType::Article));
    }

    info!(chars = text.len(), charset = page.charset, "article scraped");
    Ok(ExtractedContent {
        title,
        content: text,
        content_type: ContentType::Article,
        url: url.to_string(),
    })
}
