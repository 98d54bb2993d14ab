use crate::types::{AgentError, Candidate, ImageRef, Result, SourceKind};
use feed_rs::model::Entry;
use feed_rs::parser;
use std::collections::HashSet;
use tracing::debug;

/// Turns syndication feed documents into normalized candidates.
pub struct FeedParser {
    seen_urls: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_urls: HashSet::new(),
        }
    }

    /// Parse `content` and return at most `limit` candidates in document order.
    /// Entries without a link, and repeated links, are dropped.
    pub fn parse_candidates(&mut self, content: &str, limit: usize) -> Result<Vec<Candidate>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AgentError::Parse(format!("Failed to parse feed: {}", e)))?;

        let candidates = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.parse_entry(entry))
            .take(limit)
            .collect::<Vec<_>>();

        debug!("Parsed {} candidates", candidates.len());
        Ok(candidates)
    }

    fn parse_entry(&mut self, entry: Entry) -> Option<Candidate> {
        let link = entry.links.first()?.href.trim().to_string();
        if link.is_empty() || !self.seen_urls.insert(link.clone()) {
            debug!("Skipping entry without a fresh link: {}", link);
            return None;
        }

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .filter(|s| !s.trim().is_empty());

        let author = entry
            .authors
            .first()
            .map(|a| a.name.clone())
            .filter(|name| !name.trim().is_empty());

        Some(Candidate {
            title,
            link,
            image: image_ref(&entry),
            author,
            summary,
            origin: SourceKind::Feed,
        })
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Media attachments win over thumbnails; only image-typed (or untyped) media counts.
fn image_ref(entry: &Entry) -> Option<ImageRef> {
    let media = entry.media.iter().flat_map(|m| m.content.iter()).find_map(|c| {
        let is_image = c
            .content_type
            .as_ref()
            .map(|media_type| media_type.ty().as_str() == "image")
            .unwrap_or(true);
        match (&c.url, is_image) {
            (Some(url), true) => Some(ImageRef::Media(url.as_str().to_string())),
            _ => None,
        }
    });

    media.or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .find(|uri| !uri.is_empty())
            .map(ImageRef::Thumbnail)
    })
}
