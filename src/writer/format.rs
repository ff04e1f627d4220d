//! Source text normalization applied to services, models and the index
//! before writing.

use std::fmt::Debug;

/// Normalizes generated source text.
pub trait Formatter: Debug + Send + Sync {
    /// Return the normalized form of `text`.
    fn format(&self, text: &str) -> String;
}

/// Re-indents by bracket depth.
///
/// Every line is trimmed and indented by one level per open `(`, `{` or `[`
/// that ended a previous line. A line starting with a closing bracket drops
/// one level first. Comment lines never change the depth. Doc comment
/// continuation lines get their leading space back, whitespace-only lines
/// become empty and runs of blank lines collapse to one.
#[derive(Debug, Clone, Copy)]
pub struct IndentFormatter {
    width: usize,
}

impl Default for IndentFormatter {
    fn default() -> Self {
        Self { width: 4 }
    }
}

impl Formatter for IndentFormatter {
    fn format(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut depth: usize = 0;
        let mut previous_blank = true;

        for raw in text.lines() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                if !previous_blank {
                    out.push('\n');
                }
                previous_blank = true;
                continue;
            }
            previous_blank = false;

            let mut level = depth;
            let is_comment = trimmed.starts_with(['*', '/']);
            if !is_comment && trimmed.ends_with(['(', '{', '[']) {
                depth += 1;
            }
            if !is_comment && trimmed.starts_with([')', '}', ']']) && level > 0 {
                depth -= 1;
                level -= 1;
            }

            out.extend(std::iter::repeat_n(' ', level * self.width));
            if trimmed.starts_with('*') {
                out.push(' ');
            }
            out.push_str(trimmed);
            out.push('\n');
        }

        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn format(text: &str) -> String {
        IndentFormatter::default().format(text)
    }

    #[test]
    fn test_reindents_by_bracket_depth() {
        let input = "export const a = {\nb: [\n1,\n],\nc: call(\nx,\n),\n};\n";
        let expected =
            "export const a = {\n    b: [\n        1,\n    ],\n    c: call(\n        x,\n    ),\n};\n";
        assert_eq!(format(input), expected);
    }

    #[test]
    fn test_else_branch_stays_at_block_level() {
        let input = "if (x) {\na();\n} else {\nb();\n}\n";
        assert_eq!(format(input), "if (x) {\n    a();\n} else {\n    b();\n}\n");
    }

    #[test]
    fn test_doc_comment_and_blank_lines() {
        let input = "\n\n/**\n* Pet\n*/\n\n\n\nexport type Pet = {\n  id: string;\n};\n\n\n";
        assert_eq!(
            format(input),
            "/**\n * Pet\n */\n\nexport type Pet = {\n    id: string;\n};\n"
        );
    }

    #[test]
    fn test_comment_brackets_do_not_indent() {
        let input = "/**\n* List pets (\n* {\n*/\n// open [\nexport const a = 1;\n";
        assert_eq!(
            format(input),
            "/**\n * List pets (\n * {\n */\n// open [\nexport const a = 1;\n"
        );
    }

    #[test]
    fn test_unbalanced_close_does_not_underflow() {
        assert_eq!(format("}\n}\nx\n"), "}\n}\nx\n");
    }

    #[test]
    fn test_idempotent() {
        let input = "a = {\nb: {\nc: 1,\n},\n};\n";
        let once = format(input);
        assert_eq!(format(&once), once);
    }
}
