//! Web-page text extraction.
//!
//! Fetches a URL and reduces the HTML to its visible text: script, style, and
//! noscript subtrees are dropped entirely, and the remaining text nodes are joined
//! with newlines so paragraph boundaries survive into chunking.

use reqwest::Client;
use ego_tree::NodeRef;
use scraper::{Html, Node};
use url::Url;

use super::ExtractError;

/// Elements whose entire subtree carries no visible text.
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Fetch a URL and return its visible text.
pub async fn fetch_text(client: &Client, url: &Url) -> Result<String, ExtractError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|err| ExtractError::Fetch(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Fetch(format!("unexpected status {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|err| ExtractError::Fetch(err.to_string()))?;

    let text = visible_text(&body);
    if text.is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    Ok(text)
}

/// Strip markup from an HTML document, returning newline-separated visible text.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces = Vec::new();
    collect_text(document.tree.root(), &mut pieces);
    pieces.join("\n")
}

fn collect_text(node: NodeRef<'_, Node>, pieces: &mut Vec<String>) {
    if let Some(element) = node.value().as_element()
        && SKIPPED_ELEMENTS.contains(&element.name())
    {
        return;
    }

    if let Some(text) = node.value().as_text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }
    }

    for child in node.children() {
        collect_text(child, pieces);
    }
}

#[cfg(test)]
mod tests {
    use super::visible_text;

    #[test]
    fn strips_script_and_style_subtrees() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>console.log("hidden");</script></head>
            <body><h1>Support portal</h1><p>Open a ticket.</p>
            <noscript>enable javascript</noscript></body></html>"#;
        let text = visible_text(html);
        assert_eq!(text, "Support portal\nOpen a ticket.");
    }

    #[test]
    fn paragraphs_are_newline_separated() {
        let html = "<body><p>first</p><p>second</p><div>third</div></body>";
        assert_eq!(visible_text(html), "first\nsecond\nthird");
    }

    #[test]
    fn markup_without_text_collapses_to_empty() {
        let html = "<body><script>var x = 1;</script><img src='x.png'></body>";
        assert_eq!(visible_text(html), "");
    }
}
