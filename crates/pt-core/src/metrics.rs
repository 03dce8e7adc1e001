//! Deterministic label metrics.
//!
//! Node width and height are derived from label text alone, with no
//! measurement against an actual rendering font, so repeated compiles of the
//! same input agree byte for byte across platforms.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Wrapping and sizing policy for node labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelMetricsConfig {
    /// Maximum graphemes per wrapped line.
    pub max_line_graphemes: usize,
    /// Pixel width budgeted per grapheme.
    pub grapheme_width: u32,
    /// Pixel height per wrapped line.
    pub line_height: u32,
    /// Total horizontal padding added to the widest line.
    pub horizontal_padding: u32,
    /// Total vertical padding added to the line stack.
    pub vertical_padding: u32,
}

impl Default for LabelMetricsConfig {
    fn default() -> Self {
        Self {
            max_line_graphemes: 16,
            grapheme_width: 6,
            line_height: 13,
            horizontal_padding: 12,
            vertical_padding: 10,
        }
    }
}

/// Label measurement engine built from a [`LabelMetricsConfig`].
#[derive(Debug, Clone, Default)]
pub struct LabelMetrics {
    config: LabelMetricsConfig,
}

impl LabelMetrics {
    #[must_use]
    pub const fn new(config: LabelMetricsConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &LabelMetricsConfig {
        &self.config
    }

    /// Word-wrap a label at the configured line width. A single word longer
    /// than the line budget is hard-split so no line ever overflows.
    #[must_use]
    pub fn wrap_label(&self, label: &str) -> Vec<String> {
        let max = self.config.max_line_graphemes.max(1);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in label.split_whitespace() {
            for piece in split_overlong_word(word, max) {
                let piece_len = grapheme_count(&piece);
                if current.is_empty() {
                    current.push_str(&piece);
                    current_len = piece_len;
                } else if current_len + 1 + piece_len <= max {
                    current.push(' ');
                    current.push_str(&piece);
                    current_len += 1 + piece_len;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(&piece);
                    current_len = piece_len;
                }
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Width and height of a wrapped label, in pixels.
    #[must_use]
    pub fn measure(&self, label: &str) -> (u32, u32) {
        let lines = self.wrap_label(label);
        let widest = lines
            .iter()
            .map(|line| grapheme_count(line))
            .max()
            .unwrap_or(0)
            .max(1);

        let width = widest as u32 * self.config.grapheme_width + self.config.horizontal_padding;
        let height = lines.len() as u32 * self.config.line_height + self.config.vertical_padding;
        (width, height)
    }
}

fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

fn split_overlong_word(word: &str, max: usize) -> Vec<String> {
    if grapheme_count(word) <= max {
        return vec![word.to_string()];
    }

    let graphemes: Vec<&str> = word.graphemes(true).collect();
    graphemes
        .chunks(max)
        .map(|chunk| chunk.concat())
        .collect()
}
