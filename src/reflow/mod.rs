// WHY: the reflow engine is a pure, streaming state machine with no knowledge of
// documents or I/O, so it can be driven chunk by chunk and tested on plain strings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod normalization;
pub mod separators;

// Re-export core types
pub use normalization::{normalize_paragraph, normalize_paragraph_into};
pub use separators::{pad_separator, SeparatorMatcher};

/// Configuration for paragraph merging and separator recognition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowRules {
    /// Heading keywords (e.g. "CHAPTER", "PART"), matched case-insensitively
    pub heading_keywords: Vec<String>,
    /// Markers that start a scene-break paragraph
    pub scene_breaks: Vec<String>,
    /// Characters that end a sentence and stop a merge
    pub terminal_punctuation: Vec<char>,
}

impl Default for ReflowRules {
    fn default() -> Self {
        Self {
            heading_keywords: separators::DEFAULT_HEADING_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            scene_breaks: separators::DEFAULT_SCENE_BREAKS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            terminal_punctuation: vec!['.', '!', '?'],
        }
    }
}

impl ReflowRules {
    /// Reject rule sets that would silently disable part of the engine
    pub fn validate(&self) -> Result<()> {
        if self.terminal_punctuation.is_empty() {
            anyhow::bail!("At least one sentence-terminal character is required");
        }
        for keyword in &self.heading_keywords {
            if keyword.trim().is_empty() {
                anyhow::bail!("Heading keywords must not be empty");
            }
            if keyword.chars().any(char::is_whitespace) {
                anyhow::bail!("Heading keyword contains whitespace: {keyword:?}");
            }
        }
        if self.scene_breaks.iter().any(|marker| marker.trim().is_empty()) {
            anyhow::bail!("Scene-break markers must not be empty");
        }
        Ok(())
    }

    /// Build the separator matcher these rules describe
    pub fn separator_matcher(&self) -> SeparatorMatcher {
        SeparatorMatcher::new(&self.scene_breaks, &self.heading_keywords)
    }
}

/// Counters collected during one reflow pass
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflowStats {
    /// Raw paragraphs consumed
    pub paragraphs_in: u64,
    /// Cleaned paragraphs produced
    pub paragraphs_out: u64,
    /// Paragraphs concatenated onto their predecessor
    pub merged: u64,
    /// Separator paragraphs emitted
    pub separators: u64,
    /// Paragraphs that normalized to nothing
    pub empty_dropped: u64,
}

/// Streaming paragraph reflow engine
///
/// Paragraphs are pushed in document order; merge state is carried across calls,
/// so feeding the document in several chunks gives the same result as one call.
pub struct ParagraphReflower {
    terminal_punctuation: Vec<char>,
    separators: SeparatorMatcher,
    output: Vec<String>,
    /// Whether the last output entry is a padded separator
    last_is_separator: bool,
    scratch: String,
    stats: ReflowStats,
}

impl ParagraphReflower {
    /// Create a reflower with custom rules
    pub fn new(rules: &ReflowRules) -> Self {
        Self {
            terminal_punctuation: rules.terminal_punctuation.clone(),
            separators: rules.separator_matcher(),
            output: Vec::new(),
            last_is_separator: false,
            scratch: String::new(),
            stats: ReflowStats::default(),
        }
    }

    /// Feed one raw paragraph
    pub fn push(&mut self, raw: &str) {
        self.stats.paragraphs_in += 1;
        normalize_paragraph_into(raw, &mut self.scratch);

        if self.separators.is_separator(&self.scratch) {
            debug!("Separator paragraph: {}", self.scratch);
            self.output.push(pad_separator(&self.scratch));
            self.last_is_separator = true;
            self.stats.separators += 1;
            return;
        }

        if self.scratch.is_empty() {
            self.stats.empty_dropped += 1;
            return;
        }

        let continues = match self.output.last() {
            Some(last) => {
                !self.last_is_separator && !ends_sentence(&self.terminal_punctuation, last)
            }
            None => false,
        };

        match self.output.last_mut() {
            // WHY: the sentence runs across the paragraph break, join with one space
            Some(last) if continues => {
                last.push(' ');
                last.push_str(&self.scratch);
                self.stats.merged += 1;
            }
            _ => {
                self.output.push(self.scratch.clone());
                self.last_is_separator = false;
            }
        }
    }

    /// Feed a batch of raw paragraphs in order
    pub fn extend<I, S>(&mut self, paragraphs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for paragraph in paragraphs {
            self.push(paragraph.as_ref());
        }
    }

    /// Statistics so far; `paragraphs_out` is only filled in by `finish`
    pub fn stats(&self) -> &ReflowStats {
        &self.stats
    }

    /// Cleaned paragraphs produced so far
    pub fn paragraphs(&self) -> &[String] {
        &self.output
    }

    /// Consume the reflower and return the cleaned paragraphs with final statistics
    pub fn finish(mut self) -> (Vec<String>, ReflowStats) {
        self.stats.paragraphs_out = self.output.len() as u64;
        (self.output, self.stats)
    }
}

impl Default for ParagraphReflower {
    fn default() -> Self {
        Self::new(&ReflowRules::default())
    }
}

fn ends_sentence(terminal_punctuation: &[char], text: &str) -> bool {
    text.chars()
        .next_back()
        .is_some_and(|ch| terminal_punctuation.contains(&ch))
}

/// Reflow a full paragraph sequence with default rules
pub fn reflow_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> Vec<String> {
    reflow_paragraphs_with(paragraphs, &ReflowRules::default())
}

/// Reflow a full paragraph sequence with custom rules
pub fn reflow_paragraphs_with<S: AsRef<str>>(paragraphs: &[S], rules: &ReflowRules) -> Vec<String> {
    let mut reflower = ParagraphReflower::new(rules);
    reflower.extend(paragraphs);
    reflower.finish().0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_across_paragraph_break() {
        let result = reflow_paragraphs(&["The cat sat", "on the mat."]);
        assert_eq!(result, vec!["The cat sat on the mat."]);
    }

    #[test]
    fn test_sentence_boundary_keeps_paragraphs() {
        let result = reflow_paragraphs(&["The cat sat.", "It was tired."]);
        assert_eq!(result, vec!["The cat sat.", "It was tired."]);

        let result = reflow_paragraphs(&["Really?", "Yes!", "Fine"]);
        assert_eq!(result, vec!["Really?", "Yes!", "Fine"]);
    }

    #[test]
    fn test_scene_break_is_standalone() {
        let result = reflow_paragraphs(&["He left the", "* * *", "room and", "slept."]);
        assert_eq!(result, vec!["He left the", "\n* * *\n", "room and slept."]);
    }

    #[test]
    fn test_heading_is_padded() {
        let result = reflow_paragraphs(&["Chapter One", "It began"]);
        assert_eq!(result, vec!["\nChapter One\n", "It began"]);
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        let mut reflower = ParagraphReflower::default();
        reflower.extend(["", "   ", "Start of", "", "\t", "a sentence."]);
        let (paragraphs, stats) = reflower.finish();

        assert_eq!(paragraphs, vec!["Start of a sentence."]);
        assert_eq!(stats.paragraphs_in, 6);
        assert_eq!(stats.paragraphs_out, 1);
        assert_eq!(stats.empty_dropped, 4);
        assert_eq!(stats.merged, 1);
    }

    #[test]
    fn test_progress_visible_before_finish() {
        let mut reflower = ParagraphReflower::default();
        reflower.extend(["Half a", "sentence"]);
        assert_eq!(reflower.paragraphs(), ["Half a sentence"]);
        assert_eq!(reflower.stats().paragraphs_in, 2);
        assert_eq!(reflower.stats().merged, 1);
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(reflow_paragraphs(&empty).is_empty());
    }

    #[test]
    fn test_merge_always_inserts_one_space() {
        let result = reflow_paragraphs(&["\u{201C}Wait", "\u{201D} she said."]);
        assert_eq!(result, vec!["\u{201C}Wait \u{201D} she said."]);
    }

    #[test]
    fn test_chunked_feed_matches_single_pass() {
        let paragraphs = [
            "One sentence",
            "continues here.",
            "Another",
            "* * *",
            "split",
            "across",
            "chunks.",
        ];
        let whole = reflow_paragraphs(&paragraphs);

        let mut reflower = ParagraphReflower::default();
        for chunk in paragraphs.chunks(2) {
            reflower.extend(chunk);
        }
        assert_eq!(reflower.finish().0, whole);
    }

    #[test]
    fn test_custom_terminal_punctuation() {
        let rules = ReflowRules {
            terminal_punctuation: vec!['.', '!', '?', '\u{3002}'],
            ..Default::default()
        };
        let result = reflow_paragraphs_with(&["终于到了\u{3002}", "下一段"], &rules);
        assert_eq!(result, vec!["终于到了\u{3002}", "下一段"]);
    }

    #[test]
    fn test_rules_validation() {
        assert!(ReflowRules::default().validate().is_ok());

        let rules = ReflowRules { terminal_punctuation: vec![], ..Default::default() };
        assert!(rules.validate().is_err());

        let rules = ReflowRules {
            heading_keywords: vec!["two words".into()],
            ..Default::default()
        };
        assert!(rules.validate().is_err());

        let rules = ReflowRules { scene_breaks: vec!["  ".into()], ..Default::default() };
        assert!(rules.validate().is_err());
    }
}
