use crate::types::{AgentError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Cleaned content shorter than this (in characters) is not worth a generation call.
pub const MIN_CONTENT_CHARS: usize = 50;

static TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z][^>]*>").expect("valid regex"));
static TRUNCATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\.\.\.|…)?\s*\[\+?\d+\s*chars?\]").expect("valid regex"));
static APPEARED_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)The post .{0,300}? appeared first on [^.]*\.?").expect("valid regex"));
static CONTINUE_READING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:continue|keep) reading(?:\s*(?:\.+|…|→|»))?\s*$").expect("valid regex"));
static PAID_PLANS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)only available in (?:paid|professional and corporate) plans").expect("valid regex"));
static TRAILING_ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:\[(?:\.\.\.|…)\]|\.\.\.|…)\s*$").expect("valid regex"));

/// Reduce a raw feed/API summary to plain prose.
pub fn clean_text(raw: &str) -> String {
    let text = decode_entities(raw);
    let text = TAGS.replace_all(&text, " ");
    let text = TRUNCATION_MARKER.replace_all(&text, "");
    let text = APPEARED_FIRST.replace_all(&text, "");
    let text = PAID_PLANS.replace_all(&text, "");
    let text = CONTINUE_READING.replace(&text, "");

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    TRAILING_ELLIPSIS.replace(&collapsed, "").trim().to_string()
}

/// Clean `raw` and reject it when too little prose survives.
pub fn normalize_content(raw: &str) -> Result<String> {
    let cleaned = clean_text(raw);
    let length = cleaned.chars().count();
    if length < MIN_CONTENT_CHARS {
        return Err(AgentError::InsufficientContent {
            length,
            minimum: MIN_CONTENT_CHARS,
        });
    }
    Ok(cleaned)
}

/// Truncate on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#8217;", "'")
        .replace("&#8216;", "'")
        .replace("&#8220;", "\"")
        .replace("&#8221;", "\"")
        .replace("&#8230;", "…")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_truncation_markers() {
        let raw = "<p>Markets rallied on Tuesday&nbsp;after the central bank held rates steady.</p> \
                   Analysts expect more gains... [+2381 chars]";
        assert_eq!(
            clean_text(raw),
            "Markets rallied on Tuesday after the central bank held rates steady. Analysts expect more gains"
        );
    }

    #[test]
    fn strips_feed_boilerplate() {
        let raw = "A new phone launched today with a bigger battery. \
                   The post New phone launches appeared first on Example Blog. Continue reading...";
        assert_eq!(clean_text(raw), "A new phone launched today with a bigger battery.");
    }

    #[test]
    fn continue_reading_is_only_dropped_at_the_end() {
        let prose = "Investors continue reading the signals from the central bank with care.";
        assert_eq!(clean_text(prose), prose);

        assert_eq!(
            clean_text("Flood defences were raised overnight along the river. Continue reading →"),
            "Flood defences were raised overnight along the river."
        );
    }

    #[test]
    fn escaped_markup_is_removed_and_bare_comparisons_survive() {
        assert_eq!(
            clean_text("&lt;b&gt;Bold&lt;/b&gt; claims were made &amp; denied"),
            "Bold claims were made & denied"
        );
        assert_eq!(
            clean_text("Margins held: profits < 5% while costs > 3% of revenue."),
            "Margins held: profits < 5% while costs > 3% of revenue."
        );
        assert_eq!(clean_text("Before<!-- tracking -->after<br/>end"), "Before after end");
    }

    #[test]
    fn paid_plan_placeholder_cleans_to_nothing() {
        assert_eq!(clean_text("ONLY AVAILABLE IN PAID PLANS"), "");
    }

    #[test]
    fn rejects_short_content() {
        let err = normalize_content("<b>Too short</b> [+12 chars]").unwrap_err();
        assert!(matches!(
            err,
            AgentError::InsufficientContent { length: 9, minimum: 50 }
        ));
    }

    #[test]
    fn accepts_content_at_threshold() {
        let exactly = "A".repeat(MIN_CONTENT_CHARS);
        assert_eq!(normalize_content(&exactly).unwrap(), exactly);

        let one_short = "A".repeat(MIN_CONTENT_CHARS - 1);
        assert!(normalize_content(&one_short).is_err());
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
