use chumsky::prelude::*;
use pt_core::{CompileError, SUM_TOLERANCE, TreeNode};

/// Resolve raw line content into label + probability, validate probability
/// syntax, range, and sibling sums, and compute cumulative path
/// probabilities. Mutates the tree in place; the parser owns it exclusively
/// during this pass.
pub(crate) fn resolve(root: &mut TreeNode) -> Result<(), CompileError> {
    resolve_annotations(root)?;
    // The root is the unconditioned event. A root annotation is retained as
    // informational but never enters a sum check.
    root.cumulative = Some(1.0);
    validate_and_propagate(root)
}

fn resolve_annotations(node: &mut TreeNode) -> Result<(), CompileError> {
    let (label, annotation) = split_annotation(&node.label);
    if let Some(token) = annotation {
        node.probability = Some(parse_probability(&token, node.line_number)?);
    }
    node.label = label;

    for child in &mut node.children {
        resolve_annotations(child)?;
    }
    Ok(())
}

fn validate_and_propagate(node: &mut TreeNode) -> Result<(), CompileError> {
    // Sum check only when there are real siblings and every one of them is
    // annotated; an only child is exempt regardless of its stated value.
    if node.children.len() >= 2
        && node
            .children
            .iter()
            .all(|child| child.probability.is_some())
    {
        let sum: f64 = node
            .children
            .iter()
            .filter_map(|child| child.probability)
            .sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(CompileError::probability_sum(
                format!("sibling probabilities sum to {sum}, expected 1"),
                node.line_number,
            ));
        }
    }

    let path = node.cumulative;
    for child in &mut node.children {
        child.cumulative = match (path, child.probability) {
            (Some(path), Some(own)) => Some(path * own),
            _ => None,
        };
        validate_and_propagate(child)?;
    }
    Ok(())
}

/// Split `"Heads (50%)"` into `("Heads", Some("50%"))`.
///
/// A trailing parenthesized group is committed as a probability annotation
/// only when its content starts like a number; any other group
/// (`"Heads (maybe)"`) stays part of the label.
fn split_annotation(text: &str) -> (String, Option<String>) {
    let trimmed = text.trim_end();
    if !trimmed.ends_with(')') {
        return (trimmed.to_string(), None);
    }
    let Some(open) = trimmed.rfind('(') else {
        return (trimmed.to_string(), None);
    };

    let content = &trimmed[open + 1..trimmed.len() - 1];
    let looks_numeric = content
        .trim()
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if !looks_numeric {
        return (trimmed.to_string(), None);
    }

    (
        trimmed[..open].trim_end().to_string(),
        Some(content.to_string()),
    )
}

/// Parser for the annotation token: `<float>` or `<float>%`, optionally
/// padded with spaces.
fn probability_parser<'a>() -> impl Parser<'a, &'a str, (String, bool), extra::Err<Rich<'a, char>>>
{
    let ws = just(' ').repeated().to(());
    let digits = any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1);

    let integral = digits.clone().then(just('.').then(digits.clone()).or_not());
    let fractional = just('.').then(digits);
    let number = integral.to_slice().or(fractional.to_slice());

    ws.ignore_then(number)
        .then(just('%').or_not())
        .then_ignore(ws)
        .then_ignore(end())
        .map(|(number, percent): (&str, Option<char>)| (number.to_string(), percent.is_some()))
}

fn parse_probability(token: &str, line: usize) -> Result<f64, CompileError> {
    let (output, errors) = probability_parser().parse(token).into_output_errors();
    let parsed = if errors.is_empty() { output } else { None };
    let Some((number, percent)) = parsed else {
        let detail = errors
            .first()
            .map_or_else(|| "expected <float> or <float>%".to_string(), ToString::to_string);
        return Err(CompileError::probability_range(
            format!("malformed probability '{}': {detail}", token.trim()),
            line,
        ));
    };

    let value: f64 = number.parse().map_err(|_| {
        CompileError::probability_range(
            format!("malformed probability '{}'", token.trim()),
            line,
        )
    })?;
    let value = if percent { value / 100.0 } else { value };

    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CompileError::probability_range(
            format!("probability '{}' is outside [0, 1]", token.trim()),
            line,
        ));
    }
    Ok(value)
}
