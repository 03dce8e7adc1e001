#![forbid(unsafe_code)]

//! Compiler from indentation-structured probability-tree text to flat graph
//! elements.
//!
//! The pipeline runs leaves-first over the previous stage's output:
//!
//! 1. [`scanner`] splits text into indentation-annotated lines,
//! 2. [`tree_builder`] folds them into a single rooted tree via a depth
//!    stack,
//! 3. [`resolver`] splits labels from probability annotations and validates
//!    range and sibling sums,
//! 4. [`element_compiler`] emits node and edge records with stable pre-order
//!    ids and deterministic display dimensions.
//!
//! Each invocation is synchronous, pure, and fail-fast: the first error
//! aborts the pipeline and no partial result escapes. Callers that swap a
//! displayed graph should keep the previous one on failure.

mod element_compiler;
mod resolver;
mod scanner;
mod tree_builder;

pub use pt_core::{
    CompileError, CompileErrorCode, EdgeData, GraphElement, LabelMetrics, LabelMetricsConfig,
    NodeData, SourceLine, TreeNode,
};

/// Compile `text` into graph elements with the default label metrics.
///
/// `starting_line` offsets every reported line number: an error on local
/// line `k` (1-based) is attributed to absolute line `starting_line + k`.
/// Input with no significant lines compiles to an empty element list.
pub fn parse_text(
    text: &str,
    starting_line: usize,
) -> Result<Vec<GraphElement>, CompileError> {
    parse_text_with_metrics(text, starting_line, &LabelMetrics::default())
}

/// [`parse_text`] with an explicit label wrapping/sizing policy.
pub fn parse_text_with_metrics(
    text: &str,
    starting_line: usize,
    metrics: &LabelMetrics,
) -> Result<Vec<GraphElement>, CompileError> {
    Ok(match parse_tree(text, starting_line)? {
        Some(root) => element_compiler::compile(&root, metrics),
        None => Vec::new(),
    })
}

/// Run the pipeline up to the resolved tree, for tooling that inspects the
/// tree itself (counts, depth, cumulative probabilities) rather than the
/// compiled elements. `Ok(None)` means the input had no significant lines.
pub fn parse_tree(text: &str, starting_line: usize) -> Result<Option<TreeNode>, CompileError> {
    let Some(mut root) = tree_builder::build(scanner::scan(text, starting_line))? else {
        return Ok(None);
    };
    resolver::resolve(&mut root)?;
    Ok(Some(root))
}
