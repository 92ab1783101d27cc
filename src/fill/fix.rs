//! Diagnostics, suggested fixes and applying them to source text.

use serde::Serialize;

use crate::analysis::Span;

/// Replace `start..end` (byte offsets) with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedFix {
    pub message: String,
    pub edits: Vec<TextEdit>,
}

/// A fillable literal found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// File name relative to the program root.
    pub file: String,
    /// The literal's braces.
    pub span: Span,
    pub message: String,
    pub fixes: Vec<SuggestedFix>,
}

/// Apply edits to `source`. Edits are applied back to front; of two
/// overlapping edits the one starting first (the outer one) wins, and edits
/// outside the source are ignored.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits
        .iter()
        .filter(|e| {
            e.start <= e.end
                && e.end <= source.len()
                && source.is_char_boundary(e.start)
                && source.is_char_boundary(e.end)
        })
        .collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<&TextEdit> = Vec::with_capacity(sorted.len());
    for edit in sorted {
        match kept.last() {
            Some(prev) if edit.start < prev.end => {}
            _ => kept.push(edit),
        }
    }

    let mut out = source.to_string();
    for edit in kept.iter().rev() {
        out.replace_range(edit.start..edit.end, &edit.new_text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, end: usize, text: &str) -> TextEdit {
        TextEdit {
            start,
            end,
            new_text: text.to_string(),
        }
    }

    #[test]
    fn test_apply_edits_back_to_front() {
        let source = "a = T{}; b = U{}";
        let edits = vec![edit(13, 16, "U{X: 1}"), edit(4, 7, "T{Y: 2}")];
        assert_eq!(apply_edits(source, &edits), "a = T{Y: 2}; b = U{X: 1}");
    }

    #[test]
    fn test_overlapping_edits_keep_outermost() {
        let source = "0123456789";
        let edits = vec![edit(3, 5, "inner"), edit(2, 8, "OUTER"), edit(8, 9, "x")];
        assert_eq!(apply_edits(source, &edits), "01OUTERx9");
    }

    #[test]
    fn test_out_of_range_edits_are_ignored() {
        let source = "abc";
        let edits = vec![edit(2, 10, "zzz"), edit(0, 1, "A")];
        assert_eq!(apply_edits(source, &edits), "Abc");
    }
}
