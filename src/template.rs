//! Extraction of `{{ ... }}` expressions from query templates.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    // Non-greedy so `{{a}} and {{b}}` yields two matches.
    Regex::new(r"\{\{(.*?)\}\}").expect("expression pattern is valid")
});

/// One occurrence of an embedded expression inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expression<'a> {
    /// Full delimited text, e.g. `{{ user.id }}`.
    pub raw: &'a str,
    /// Text between the delimiters, untrimmed.
    pub body: &'a str,
    /// Byte range of `raw` inside the template.
    pub span: (usize, usize),
}

impl Expression<'_> {
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.span.0..self.span.1
    }
}

/// Every expression occurrence in left-to-right order, duplicates included.
#[must_use]
pub fn scan(template: &str) -> Vec<Expression<'_>> {
    EXPRESSION
        .captures_iter(template)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;
            Some(Expression {
                raw: whole.as_str(),
                body: body.as_str(),
                span: (whole.start(), whole.end()),
            })
        })
        .collect()
}

/// Replace each occurrence, in order, with the text `render` produces for it.
pub(crate) fn rewrite<F>(template: &str, occurrences: &[Expression<'_>], mut render: F) -> String
where
    F: FnMut(usize, &Expression<'_>) -> String,
{
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for (idx, expr) in occurrences.iter().enumerate() {
        out.push_str(&template[cursor..expr.span.0]);
        out.push_str(&render(idx, expr));
        cursor = expr.span.1;
    }
    out.push_str(&template[cursor..]);
    out
}
