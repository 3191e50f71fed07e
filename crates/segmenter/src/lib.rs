//! # Segmenter
//!
//! Parses raw model replies into presentation segments using the fixed
//! textual grammar `【EXPRESSION】MIDDLE<JAPANESE_TEXT>`:
//!
//! - `expression` - trimmed EXPRESSION capture
//! - `action` - the first parenthesized run inside MIDDLE, if any
//! - `text_cn` - MIDDLE with parenthesized runs removed, trimmed
//! - `text_jp` - trimmed JAPANESE_TEXT capture; feeds speech synthesis and
//!   never appears in the reply envelope
//!
//! Zero matches is not an error: the reply degrades to exactly one fallback
//! segment carrying the raw text, so non-empty input never yields an empty
//! segment list.

use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// One structured unit of a model reply. Transient: produced per reply,
/// consumed by the outbound envelope, never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Segment {
    pub expression: String,
    pub action: String,
    pub text_cn: String,
    /// Synthesis input only; not part of the wire payload.
    #[serde(skip)]
    pub text_jp: String,
    pub audio_url: String,
}

/// Expression used by the fallback segment when no grammar match is found.
pub const FALLBACK_EXPRESSION: &str = "default";

/// Reply segmenter with pre-compiled grammar patterns.
#[derive(Debug, Clone)]
pub struct ResponseSegmenter {
    main: Regex,
    action: Regex,
}

impl Default for ResponseSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSegmenter {
    pub fn new() -> Self {
        // Non-greedy captures; `.` does not cross newlines.
        let main = Regex::new("【(.+?)】(.+?)<(.+?)>").expect("main segment pattern is valid");
        let action = Regex::new(r"\((.+?)\)").expect("action pattern is valid");
        Self { main, action }
    }

    /// Scans `raw` for all non-overlapping grammar matches. `audio_url` is
    /// left empty on every segment; the caller fills it after synthesis.
    pub fn segment(&self, raw: &str) -> Vec<Segment> {
        let mut segments = Vec::new();

        for caps in self.main.captures_iter(raw) {
            let expression = caps[1].trim().to_string();
            let middle = caps[2].trim();
            let text_jp = caps[3].trim().to_string();

            let (action, text_cn) = match self.action.captures(middle) {
                Some(action_caps) => {
                    let action = action_caps[1].trim().to_string();
                    let stripped = self.action.replace_all(middle, "");
                    (action, stripped.trim().to_string())
                }
                None => (String::new(), middle.to_string()),
            };

            segments.push(Segment {
                expression,
                action,
                text_cn,
                text_jp,
                audio_url: String::new(),
            });
        }

        if segments.is_empty() {
            warn!("No structured segments in model reply, returning the raw text");
            segments.push(Segment {
                expression: FALLBACK_EXPRESSION.to_string(),
                action: String::new(),
                text_cn: raw.to_string(),
                text_jp: String::new(),
                audio_url: String::new(),
            });
        }

        segments
    }

    /// The MIDDLE capture of the first grammar match, or `raw` itself when
    /// the reply has no structured form. Used to build memory summaries
    /// without stage directions around them.
    pub fn first_spoken_text<'a>(&self, raw: &'a str) -> &'a str {
        match self.main.captures(raw) {
            Some(caps) => caps.get(2).map(|m| m.as_str()).unwrap_or(raw),
            None => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_match_with_action() {
        let segmenter = ResponseSegmenter::new();
        let segments = segmenter.segment("【joy】(wave)Hello<こんにちは>");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].expression, "joy");
        assert_eq!(segments[0].action, "wave");
        assert_eq!(segments[0].text_cn, "Hello");
        assert_eq!(segments[0].text_jp, "こんにちは");
        assert_eq!(segments[0].audio_url, "");
    }

    #[test]
    fn match_without_action_leaves_action_empty() {
        let segmenter = ResponseSegmenter::new();
        let segments = segmenter.segment("【calm】你好呀<やあ>");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].expression, "calm");
        assert_eq!(segments[0].action, "");
        assert_eq!(segments[0].text_cn, "你好呀");
        assert_eq!(segments[0].text_jp, "やあ");
    }

    #[test]
    fn multiple_matches_in_order() {
        let segmenter = ResponseSegmenter::new();
        let raw = "【joy】早上好<おはよう>【shy】(低头)嗯……<うん>";
        let segments = segmenter.segment(raw);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].expression, "joy");
        assert_eq!(segments[0].text_cn, "早上好");
        assert_eq!(segments[1].expression, "shy");
        assert_eq!(segments[1].action, "低头");
        assert_eq!(segments[1].text_cn, "嗯……");
    }

    #[test]
    fn action_extraction_takes_first_and_strips_all() {
        let segmenter = ResponseSegmenter::new();
        let segments = segmenter.segment("【joy】(wave)Hi(nod)there<やあ>");

        assert_eq!(segments[0].action, "wave");
        assert_eq!(segments[0].text_cn, "Hithere");
    }

    #[test]
    fn captures_are_trimmed() {
        let segmenter = ResponseSegmenter::new();
        let segments = segmenter.segment("【 joy 】 ( wave ) Hello < こんにちは >");

        assert_eq!(segments[0].expression, "joy");
        assert_eq!(segments[0].action, "wave");
        assert_eq!(segments[0].text_cn, "Hello");
        assert_eq!(segments[0].text_jp, "こんにちは");
    }

    #[test]
    fn no_match_yields_single_fallback_segment() {
        let segmenter = ResponseSegmenter::new();
        let raw = "plain text without any markers";
        let segments = segmenter.segment(raw);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].expression, FALLBACK_EXPRESSION);
        assert_eq!(segments[0].action, "");
        assert_eq!(segments[0].text_cn, raw);
        assert_eq!(segments[0].text_jp, "");
        assert_eq!(segments[0].audio_url, "");
    }

    #[test]
    fn first_spoken_text_prefers_first_middle_capture() {
        let segmenter = ResponseSegmenter::new();
        assert_eq!(
            segmenter.first_spoken_text("【joy】(wave)你好<こんにちは>【shy】再见<さよなら>"),
            "(wave)你好"
        );
        assert_eq!(segmenter.first_spoken_text("no markers"), "no markers");
    }

    #[test]
    fn serializes_without_japanese_text() {
        let segmenter = ResponseSegmenter::new();
        let segments = segmenter.segment("【joy】Hello<こんにちは>");
        let json = serde_json::to_value(&segments[0]).unwrap();

        assert_eq!(json["expression"], "joy");
        assert_eq!(json["text_cn"], "Hello");
        assert_eq!(json["audio_url"], "");
        assert!(json.get("text_jp").is_none());
    }
}
