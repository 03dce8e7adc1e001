use pt_core::{CompileError, SourceLine, TreeNode};

/// Fold the scanned line sequence into a single rooted tree.
///
/// Uses a depth stack of open nodes, shallowest first; a node folds into its
/// parent's children as it is popped. Returns `Ok(None)` when the input has
/// no significant lines.
pub(crate) fn build(
    lines: impl Iterator<Item = Result<SourceLine, CompileError>>,
) -> Result<Option<TreeNode>, CompileError> {
    let mut stack: Vec<(usize, TreeNode)> = Vec::new();

    for line in lines {
        let line = line?;
        let node = TreeNode::new(line.text, line.line_number);

        if stack.is_empty() {
            if line.indent_width != 0 {
                return Err(CompileError::indentation(
                    "first line must not be indented",
                    line.line_number,
                ));
            }
            stack.push((0, node));
            continue;
        }

        if line.indent_width == 0 {
            return Err(CompileError::indentation(
                "multiple root lines; a probability tree has exactly one root",
                line.line_number,
            ));
        }

        let innermost = stack
            .last()
            .map(|(indent, _)| *indent)
            .unwrap_or_default();
        if line.indent_width > innermost {
            // Strictly deeper than the innermost open node: first child of it.
            stack.push((line.indent_width, node));
            continue;
        }

        // Re-indent outward: pop levels at or below this width. The width
        // must match a popped level exactly; falling strictly between two
        // stack levels is ambiguous and rejected rather than rounded.
        let mut matched = false;
        while stack
            .last()
            .is_some_and(|(indent, _)| *indent >= line.indent_width)
        {
            if stack
                .last()
                .is_some_and(|(indent, _)| *indent == line.indent_width)
            {
                matched = true;
            }
            fold_top(&mut stack);
        }

        if !matched {
            return Err(CompileError::indentation(
                format!(
                    "indentation width {} does not match any open ancestor level",
                    line.indent_width
                ),
                line.line_number,
            ));
        }
        stack.push((line.indent_width, node));
    }

    while stack.len() > 1 {
        fold_top(&mut stack);
    }
    Ok(stack.pop().map(|(_, root)| root))
}

fn fold_top(stack: &mut Vec<(usize, TreeNode)>) {
    if let Some((_, done)) = stack.pop()
        && let Some((_, parent)) = stack.last_mut()
    {
        parent.children.push(done);
    }
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::scanner::scan;
    use pt_core::{CompileError, TreeNode};

    fn build_text(text: &str) -> Result<Option<TreeNode>, CompileError> {
        build(scan(text, 0))
    }

    #[test]
    fn empty_input_builds_no_tree() {
        assert_eq!(build_text("").expect("blank input is fine"), None);
        assert_eq!(build_text("\n  \n").expect("blank input is fine"), None);
    }

    #[test]
    fn single_line_becomes_root() {
        let root = build_text("Coin Flip")
            .expect("should build")
            .expect("should have a root");
        assert_eq!(root.label, "Coin Flip");
        assert!(root.children.is_empty());
    }

    #[test]
    fn children_attach_in_source_order() {
        let root = build_text("Root\n  A\n  B\n  C")
            .expect("should build")
            .expect("should have a root");
        let labels: Vec<&str> = root
            .children
            .iter()
            .map(|child| child.label.as_str())
            .collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn deeper_lines_nest() {
        let root = build_text("Root\n  A\n    A1\n    A2\n  B")
            .expect("should build")
            .expect("should have a root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children.len(), 2);
        assert_eq!(root.children[0].children[1].label, "A2");
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn sibling_depth_need_not_be_uniform_across_branches() {
        // Each branch defines its own child depth; only consistency within a
        // branch matters.
        let root = build_text("Root\n  A\n      A1\n  B\n   B1")
            .expect("should build")
            .expect("should have a root");
        assert_eq!(root.children[0].children[0].label, "A1");
        assert_eq!(root.children[1].children[0].label, "B1");
    }

    #[test]
    fn indented_first_line_is_rejected() {
        let error = build_text("  Root").expect_err("should fail");
        assert!(matches!(error, CompileError::Indentation { line: 1, .. }));
    }

    #[test]
    fn second_root_is_rejected() {
        let error = build_text("Root\n  Child\nOther").expect_err("should fail");
        assert!(matches!(error, CompileError::Indentation { line: 3, .. }));
    }

    #[test]
    fn ambiguous_reindent_is_rejected() {
        let error = build_text("A\n  B\n    C\n B2").expect_err("should fail");
        assert!(matches!(error, CompileError::Indentation { line: 4, .. }));
    }

    #[test]
    fn reindent_between_open_levels_is_rejected() {
        let error = build_text("A\n   B\n  C").expect_err("should fail");
        assert!(matches!(error, CompileError::Indentation { line: 3, .. }));
    }

    #[test]
    fn line_numbers_survive_into_nodes() {
        let root = build_text("Root\n\n  Child")
            .expect("should build")
            .expect("should have a root");
        assert_eq!(root.line_number, 1);
        assert_eq!(root.children[0].line_number, 3);
    }
}
