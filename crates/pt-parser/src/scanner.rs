use pt_core::{CompileError, SourceLine};

/// Split input text into significant lines, measuring leading indentation.
///
/// Blank (whitespace-only) lines are skipped. Line numbers are 1-based and
/// offset by `starting_line`, so an error on local line `k` reports
/// `starting_line + k`. The sequence is lazy; the tree builder consumes it
/// eagerly.
pub(crate) fn scan(
    text: &str,
    starting_line: usize,
) -> impl Iterator<Item = Result<SourceLine, CompileError>> + '_ {
    text.split('\n').enumerate().filter_map(move |(index, raw)| {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.trim().is_empty() {
            return None;
        }
        Some(scan_line(raw, starting_line + index + 1))
    })
}

fn scan_line(raw: &str, line_number: usize) -> Result<SourceLine, CompileError> {
    let mut indent_width = 0usize;
    for c in raw.chars() {
        match c {
            ' ' => indent_width += 1,
            // Never silently normalized: a tab would make depth ambiguous.
            '\t' => {
                return Err(CompileError::indentation(
                    "tab character in indentation; indent with spaces only",
                    line_number,
                ));
            }
            _ => break,
        }
    }

    Ok(SourceLine {
        text: raw[indent_width..].trim_end().to_string(),
        indent_width,
        line_number,
    })
}
