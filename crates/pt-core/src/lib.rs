#![forbid(unsafe_code)]

mod metrics;

pub use metrics::{LabelMetrics, LabelMetricsConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance applied when sibling probabilities are checked against 1.
pub const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CompileErrorCode {
    #[default]
    Indentation,
    ProbabilityRange,
    ProbabilitySum,
}

impl CompileErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indentation => "probtree/error/indentation",
            Self::ProbabilityRange => "probtree/error/probability-range",
            Self::ProbabilitySum => "probtree/error/probability-sum",
        }
    }
}

/// A compile failure, always located at an absolute source line.
///
/// The compiler is fail-fast: the first error aborts the pipeline and no
/// partial element list escapes.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("line {line}: {message}")]
    Indentation { message: String, line: usize },
    #[error("line {line}: {message}")]
    ProbabilityRange { message: String, line: usize },
    #[error("line {line}: {message}")]
    ProbabilitySum { message: String, line: usize },
}

impl CompileError {
    #[must_use]
    pub fn indentation(message: impl Into<String>, line: usize) -> Self {
        Self::Indentation {
            message: message.into(),
            line,
        }
    }

    #[must_use]
    pub fn probability_range(message: impl Into<String>, line: usize) -> Self {
        Self::ProbabilityRange {
            message: message.into(),
            line,
        }
    }

    #[must_use]
    pub fn probability_sum(message: impl Into<String>, line: usize) -> Self {
        Self::ProbabilitySum {
            message: message.into(),
            line,
        }
    }

    #[must_use]
    pub const fn code(&self) -> CompileErrorCode {
        match self {
            Self::Indentation { .. } => CompileErrorCode::Indentation,
            Self::ProbabilityRange { .. } => CompileErrorCode::ProbabilityRange,
            Self::ProbabilitySum { .. } => CompileErrorCode::ProbabilitySum,
        }
    }

    /// Absolute line number the error is attributed to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Indentation { line, .. }
            | Self::ProbabilityRange { line, .. }
            | Self::ProbabilitySum { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Indentation { message, .. }
            | Self::ProbabilityRange { message, .. }
            | Self::ProbabilitySum { message, .. } => message,
        }
    }
}

/// One physical input line after scanning: content with the indentation
/// stripped, the measured indentation width, and the absolute line number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SourceLine {
    pub text: String,
    pub indent_width: usize,
    pub line_number: usize,
}

/// One node of the probability tree.
///
/// `label` holds the raw line content until the resolver splits off the
/// probability annotation. `cumulative` is the product of stated
/// probabilities along the path from the root, `None` past the first
/// unannotated link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TreeNode {
    pub label: String,
    pub probability: Option<f64>,
    pub cumulative: Option<f64>,
    pub children: Vec<TreeNode>,
    pub line_number: usize,
}

impl TreeNode {
    #[must_use]
    pub fn new(label: impl Into<String>, line_number: usize) -> Self {
        Self {
            label: label.into(),
            probability: None,
            cumulative: None,
            children: Vec::new(),
            line_number,
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::node_count)
            .sum::<usize>()
    }

    /// Depth of this subtree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Leaves of this subtree in source order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&TreeNode> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.children.is_empty() {
                leaves.push(node);
            } else {
                for child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        leaves
    }
}

/// Node payload in the shape the consuming graph library expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NodeData {
    pub id: String,
    pub label: String,
    pub prob: String,
    pub width: u32,
    pub height: u32,
}

/// Edge payload; `label` mirrors the target node's `prob` string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

/// A compiled element in the external graph-library format. The `group`
/// discriminator ("nodes"/"edges") is that library's contract and is
/// serialized verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "group")]
pub enum GraphElement {
    #[serde(rename = "nodes")]
    Node { data: NodeData },
    #[serde(rename = "edges")]
    Edge { data: EdgeData },
}

impl GraphElement {
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(self, Self::Node { .. })
    }

    #[must_use]
    pub const fn is_edge(&self) -> bool {
        matches!(self, Self::Edge { .. })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Node { data } => &data.id,
            Self::Edge { data } => &data.id,
        }
    }
}

/// Canonical display form of a probability: a percentage with at most four
/// decimal places, trailing zeros trimmed. Input spelling (fraction or
/// percentage) does not survive normalization.
#[must_use]
pub fn format_percent(probability: f64) -> String {
    let scaled = probability * 100.0;
    let mut text = format!("{scaled:.4}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text.push('%');
    text
}
