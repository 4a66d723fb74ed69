// WHY: centralized separator recognition so heading keywords can be localized
// without touching the merge logic

use super::normalization::normalize_paragraph;

/// Scene-break markers recognized at the start of a paragraph
pub const DEFAULT_SCENE_BREAKS: &[&str] = &["* * *"];

/// Heading keywords recognized case-insensitively when followed by a space
pub const DEFAULT_HEADING_KEYWORDS: &[&str] = &["CHAPTER", "PART"];

/// Recognizes paragraphs that mark a structural break rather than prose
#[derive(Debug, Clone)]
pub struct SeparatorMatcher {
    scene_breaks: Vec<String>,
    /// Stored uppercased so each paragraph is uppercased once and compared by prefix
    heading_keywords: Vec<String>,
}

impl SeparatorMatcher {
    /// Create matcher from explicit token sets
    /// WHY: markers are compared against normalized paragraphs, so they get the same treatment
    pub fn new<S, K>(scene_breaks: &[S], heading_keywords: &[K]) -> Self
    where
        S: AsRef<str>,
        K: AsRef<str>,
    {
        Self {
            scene_breaks: scene_breaks
                .iter()
                .map(|s| normalize_paragraph(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
            heading_keywords: heading_keywords
                .iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Check if a normalized paragraph starts with a scene-break marker
    pub fn is_scene_break(&self, text: &str) -> bool {
        self.scene_breaks.iter().any(|marker| text.starts_with(marker.as_str()))
    }

    /// Check if a normalized paragraph is a chapter/part style heading
    /// WHY: "Partial" or "Chapters" must not match, so a space has to follow the keyword
    pub fn is_heading(&self, text: &str) -> bool {
        if self.heading_keywords.is_empty() {
            return false;
        }
        let upper = text.to_uppercase();
        self.heading_keywords.iter().any(|keyword| {
            upper
                .strip_prefix(keyword.as_str())
                .is_some_and(|rest| rest.starts_with(' '))
        })
    }

    /// Check if a normalized paragraph is any kind of separator
    pub fn is_separator(&self, text: &str) -> bool {
        self.is_scene_break(text) || self.is_heading(text)
    }
}

impl Default for SeparatorMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_BREAKS, DEFAULT_HEADING_KEYWORDS)
    }
}

/// Pad a separator with a blank line on either side
pub fn pad_separator(text: &str) -> String {
    format!("\n{text}\n")
}
