//! Extraction of inline reasoning from model replies.
//!
//! Reasoning-capable models prefix their answer with a `<think>...</think>` block.
//! [`extract`] splits a raw reply into that reasoning and the answer the user should
//! see.  The raw reply is what the transcript keeps; the split is recomputed every time a
//! turn is displayed.

use std::sync::LazyLock;

use regex::Regex;

/// Tag that opens a reasoning region.
pub const THINK_OPEN: &str = "<think>";

/// Tag that closes a reasoning region.
pub const THINK_CLOSE: &str = "</think>";

static THINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?s){}(.*?){}",
        regex::escape(THINK_OPEN),
        regex::escape(THINK_CLOSE)
    ))
    .expect("think block pattern is valid")
});

/// A raw reply split into reasoning and visible answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Trimmed inner text of the first reasoning region, if there was one.
    pub reasoning: Option<String>,

    /// The reply with every reasoning region removed.
    pub visible_answer: String,
}

/// Splits `raw` into its first reasoning region and the visible answer.
///
/// Every complete region is removed from the answer, not only the first.  The text left
/// between regions is trimmed, blank pieces are dropped, and the rest are joined with a
/// blank line.  A region in the middle of a sentence therefore breaks it into two
/// paragraphs: `"Hello <think>x</think> world"` becomes `"Hello\n\nworld"`, not
/// `"Hello  world"`.  An open tag without a matching close tag is not a region: the reply
/// is returned unchanged.
pub fn extract(raw: &str) -> ExtractionResult {
    let Some(captures) = THINK_BLOCK.captures(raw) else {
        return ExtractionResult {
            reasoning: None,
            visible_answer: raw.to_string(),
        };
    };
    let reasoning = captures
        .get(1)
        .map(|inner| inner.as_str().trim().to_string());
    let visible_answer = THINK_BLOCK
        .split(raw)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    ExtractionResult {
        reasoning,
        visible_answer,
    }
}
