pub mod document;
pub mod pipeline;
pub mod reflow;

// Re-export main types for convenient access
pub use reflow::{
    normalize_paragraph, reflow_paragraphs, reflow_paragraphs_with, ParagraphReflower, ReflowRules,
    ReflowStats, SeparatorMatcher,
};

// Re-export document adapter and pipeline entry points
pub use document::{read_paragraphs, write_paragraphs, DocumentError, DocumentStats};
pub use pipeline::{reflow_document, PipelineConfig, RunStats};
