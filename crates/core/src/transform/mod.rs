//! Import rewriting and comment stripping for synced examples.

pub mod content;
pub mod rules;

pub use content::{transform_content, TransformReport, TransformStep, Transformer};
pub use rules::{RuleSet, TransformRules};

/// File extensions whose contents are transformed; everything else is
/// copied verbatim.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "js", "tsx", "jsx"];

/// Whether a file with this extension (without the dot) is transformed.
pub fn is_source_extension(ext: &str) -> bool {
    SOURCE_EXTENSIONS.contains(&ext)
}
