//! Placement hints: anchor-text suggestions and the placement context sentence.

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_ANCHOR_TEXT: &str = "Read more";

const KEYWORD_TEMPLATES: &[&str] = &["professional {keyword}", "{keyword} services"];
const GENERIC_ANCHORS: &[&str] = &["learn more", "read more"];
const MAX_KEYWORD_ANCHORS: usize = 2;

/// Failure while shaping one candidate pair. Skips that pair only.
#[derive(Debug, Error)]
pub enum CandidateScoringError {
    #[error("malformed website URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },
}

/// Brand name from a site's domain: `https://www.acme-plumbing.co.uk` → "Acme Plumbing".
///
/// URLs without a scheme are read as https. Anything that still does not parse
/// to a host is an error.
pub fn extract_brand_name(website: &str) -> Result<String, CandidateScoringError> {
    let trimmed = website.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let malformed = |reason: String| CandidateScoringError::MalformedUrl {
        url: website.to_string(),
        reason,
    };

    let url = Url::parse(&candidate).map_err(|e| malformed(e.to_string()))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| malformed("no host".to_string()))?;

    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or_default();
    if label.is_empty() {
        return Err(malformed("empty domain label".to_string()));
    }

    Ok(label
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().to_string() + chars.as_str(),
    }
}

/// Ordered anchor-text suggestions: brand name, keyword templates for the first
/// one or two keywords, then generic fallbacks. Case-insensitive duplicates are
/// dropped.
pub fn suggest_anchor_texts(
    website: &str,
    keywords: &[String],
) -> Result<Vec<String>, CandidateScoringError> {
    let mut suggestions: Vec<String> = Vec::new();
    let mut push = |text: String| {
        let text = text.trim().to_string();
        if !text.is_empty()
            && !suggestions
                .iter()
                .any(|s: &String| s.eq_ignore_ascii_case(&text))
        {
            suggestions.push(text);
        }
    };

    if !website.trim().is_empty() {
        push(extract_brand_name(website)?);
    }

    for keyword in keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORD_ANCHORS)
    {
        for template in KEYWORD_TEMPLATES {
            push(template.replace("{keyword}", keyword));
        }
    }

    for generic in GENERIC_ANCHORS {
        push(generic.to_string());
    }

    Ok(suggestions)
}

/// First suggestion, or "Read more" when there is none.
pub fn primary_anchor_text(suggestions: &[String]) -> String {
    suggestions
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_ANCHOR_TEXT.to_string())
}

/// One-line hint for where the link fits on the candidate page.
pub fn placement_context(title: &str, url: &str) -> String {
    let subject = if title.trim().is_empty() {
        url.trim()
    } else {
        title.trim()
    };
    format!("Natural mention within the article \"{subject}\", near related content")
}
