//! Clipboard content model
//!
//! One clipboard snapshot is one [`ClipboardPayload`]: a closed sum over the
//! three kinds this system synchronizes. Every policy that needs to branch
//! on kind (serialize, deserialize, equality, emptiness) matches the enum
//! exhaustively, so adding a kind is a compile-enforced change.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of empty input; an image carrying this hash is an empty payload.
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Compute the lowercase hex SHA-256 of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// The kind of a payload, without kind-specific attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Image,
    Files,
}

/// Text clipboard content with up to three independent representations.
///
/// This is the JSON body of a `.text.json` artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtf: Option<String>,
}

impl TextBundle {
    pub fn is_empty(&self) -> bool {
        self.text.as_ref().is_none_or(|t| t.is_empty())
            && self.html.as_ref().is_none_or(|h| h.is_empty())
            && self.rtf.as_ref().is_none_or(|r| r.is_empty())
    }

    /// Loose equality: two bundles match if any one representation is
    /// present on both sides and equal.
    ///
    /// Different platforms decorate the same copy with different sets of
    /// representations (e.g. HTML present only on one side), so requiring
    /// all three to match would defeat echo suppression.
    pub fn matches(&self, other: &TextBundle) -> bool {
        fn both_equal(a: &Option<String>, b: &Option<String>) -> bool {
            matches!((a, b), (Some(x), Some(y)) if x == y)
        }
        both_equal(&self.text, &other.text)
            || both_equal(&self.html, &other.html)
            || both_equal(&self.rtf, &other.rtf)
    }
}

/// A single PNG image plus its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub png: Vec<u8>,
    /// Lowercase hex SHA-256 of `png`. Equality and dedup go through this.
    pub sha256: String,
}

impl ImagePayload {
    pub fn from_png(png: Vec<u8>) -> Self {
        let sha256 = sha256_hex(&png);
        Self { png, sha256 }
    }

    pub fn is_empty(&self) -> bool {
        self.sha256 == EMPTY_SHA256
    }
}

/// An ordered list of absolute file paths. Order is irrelevant for equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListPayload {
    pub paths: Vec<String>,
}

impl FileListPayload {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn same_set(&self, other: &FileListPayload) -> bool {
        let mut a = self.paths.clone();
        let mut b = other.paths.clone();
        a.sort();
        b.sort();
        a == b
    }
}

/// One clipboard snapshot, the unit of synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    Text(TextBundle),
    Image(ImagePayload),
    Files(FileListPayload),
}

impl ClipboardPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            ClipboardPayload::Text(_) => PayloadKind::Text,
            ClipboardPayload::Image(_) => PayloadKind::Image,
            ClipboardPayload::Files(_) => PayloadKind::Files,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ClipboardPayload::Text(t) => t.is_empty(),
            ClipboardPayload::Image(i) => i.is_empty(),
            ClipboardPayload::Files(f) => f.is_empty(),
        }
    }

    /// Kind-specific equality used by every suppression check.
    ///
    /// Payloads of different kinds never match.
    pub fn same_content(&self, other: &ClipboardPayload) -> bool {
        match (self, other) {
            (ClipboardPayload::Text(a), ClipboardPayload::Text(b)) => a.matches(b),
            (ClipboardPayload::Image(a), ClipboardPayload::Image(b)) => a.sha256 == b.sha256,
            (ClipboardPayload::Files(a), ClipboardPayload::Files(b)) => a.same_set(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(t: &str) -> TextBundle {
        TextBundle {
            text: Some(t.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn text_bundle_emptiness() {
        assert!(TextBundle::default().is_empty());
        assert!(TextBundle {
            text: Some(String::new()),
            html: Some(String::new()),
            rtf: None,
        }
        .is_empty());
        assert!(!text("x").is_empty());
    }

    #[test]
    fn text_bundles_match_on_any_shared_representation() {
        let plain_only = text("hello");
        let plain_and_html = TextBundle {
            text: Some("hello".to_string()),
            html: Some("<b>hello</b>".to_string()),
            rtf: None,
        };
        assert!(plain_only.matches(&plain_and_html));

        let html_only = TextBundle {
            html: Some("<b>hello</b>".to_string()),
            ..Default::default()
        };
        assert!(html_only.matches(&plain_and_html));
        assert!(!plain_only.matches(&html_only));
        assert!(!text("hello").matches(&text("world")));
    }

    #[test]
    fn absent_representations_never_match() {
        assert!(!TextBundle::default().matches(&TextBundle::default()));
    }

    #[test]
    fn image_empty_iff_hash_of_empty_input() {
        assert!(ImagePayload::from_png(Vec::new()).is_empty());
        assert!(!ImagePayload::from_png(vec![0x89, 0x50, 0x4e, 0x47]).is_empty());
    }

    #[test]
    fn image_equality_is_by_hash() {
        let a = ClipboardPayload::Image(ImagePayload::from_png(vec![1, 2, 3]));
        let b = ClipboardPayload::Image(ImagePayload::from_png(vec![1, 2, 3]));
        let c = ClipboardPayload::Image(ImagePayload::from_png(vec![4, 5, 6]));
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn file_list_equality_ignores_order() {
        let a = ClipboardPayload::Files(FileListPayload::new(vec![
            "/a/x".to_string(),
            "/a/y".to_string(),
        ]));
        let b = ClipboardPayload::Files(FileListPayload::new(vec![
            "/a/y".to_string(),
            "/a/x".to_string(),
        ]));
        assert!(a.same_content(&b));
    }

    #[test]
    fn different_kinds_never_match() {
        let t = ClipboardPayload::Text(text("x"));
        let i = ClipboardPayload::Image(ImagePayload::from_png(b"x".to_vec()));
        assert!(!t.same_content(&i));
    }

    #[test]
    fn text_bundle_json_omits_absent_representations() {
        let json = serde_json::to_string(&text("hi")).expect("serialize");
        assert_eq!(json, r#"{"text":"hi"}"#);
        let back: TextBundle = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, text("hi"));
    }
}
