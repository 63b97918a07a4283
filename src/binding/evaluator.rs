use std::collections::HashMap;

use serde_json::Value as JsonValue;

use super::context::RuntimeContext;
use crate::error::BindingError;
use crate::template;
use crate::types::RowValues;

/// Evaluated value for each distinct expression, keyed by its delimited text
/// (e.g. `{{ user.id }}`).
pub type EvaluatedBindings = HashMap<String, RowValues>;

/// Boundary to the host's expression engine.
///
/// Implementations evaluate every expression found in `template` against the
/// runtime context, including file attachment lookups, and apply the
/// escaping policy to every value that renders as text when `escape` is set. A failure for any
/// expression fails the whole call.
pub trait BindingEvaluator: Send + Sync {
    /// # Errors
    /// Returns the first `BindingError` encountered.
    fn evaluate(
        &self,
        template: &str,
        context: &RuntimeContext,
        escape: bool,
    ) -> Result<EvaluatedBindings, BindingError>;
}

impl<T: BindingEvaluator + ?Sized> BindingEvaluator for &T {
    fn evaluate(
        &self,
        template: &str,
        context: &RuntimeContext,
        escape: bool,
    ) -> Result<EvaluatedBindings, BindingError> {
        (**self).evaluate(template, context, escape)
    }
}

/// Dotted-path evaluator over the runtime context.
///
/// `{{ order.lines.0.sku }}` walks object keys and array indices starting at
/// the `order` variable; `{{ files.report }}` reads the `report` attachment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextEvaluator;

const FILES_ROOT: &str = "files";

impl ContextEvaluator {
    fn evaluate_one(context: &RuntimeContext, body: &str) -> Result<RowValues, BindingError> {
        let path = body.trim();
        if path.is_empty() {
            return Err(BindingError::new(body, "empty expression"));
        }
        let mut segments = path.split('.');
        let root = segments.next().unwrap_or_default();

        if root == FILES_ROOT && context.variable(FILES_ROOT).is_none() {
            let name = segments.collect::<Vec<_>>().join(".");
            return context
                .file(&name)
                .map(|content| RowValues::Text(content.to_string()))
                .ok_or_else(|| BindingError::new(body, format!("no attachment named `{name}`")));
        }

        let mut current = context
            .variable(root)
            .ok_or_else(|| BindingError::new(body, format!("unknown variable `{root}`")))?;
        for segment in segments {
            current = step(current, segment)
                .ok_or_else(|| BindingError::new(body, format!("no field `{segment}`")))?;
        }
        Ok(RowValues::from_json(current))
    }
}

fn step<'a>(value: &'a JsonValue, segment: &str) -> Option<&'a JsonValue> {
    match value {
        JsonValue::Object(map) => map.get(segment),
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Double single quotes so a value can sit inside a T-SQL string literal.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    text.replace('\'', "''")
}

impl BindingEvaluator for ContextEvaluator {
    fn evaluate(
        &self,
        template: &str,
        context: &RuntimeContext,
        escape: bool,
    ) -> Result<EvaluatedBindings, BindingError> {
        let mut evaluated = EvaluatedBindings::new();
        for expr in template::scan(template) {
            if evaluated.contains_key(expr.raw) {
                continue;
            }
            let value = match Self::evaluate_one(context, expr.body)? {
                RowValues::Text(s) if escape => RowValues::Text(escape_literal(&s)),
                RowValues::JSON(v) if escape => {
                    RowValues::Text(escape_literal(&v.to_string()))
                }
                other => other,
            };
            evaluated.insert(expr.raw.to_string(), value);
        }
        Ok(evaluated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RuntimeContext {
        RuntimeContext::new()
            .with_variable("id", json!(5))
            .with_variable("user", json!({"name": "o'brien", "tags": ["a", "b"]}))
            .with_file("seed", "insert into t values (1)")
    }

    #[test]
    fn resolves_paths_and_indices() {
        let out = ContextEvaluator
            .evaluate("{{id}} {{ user.tags.1 }}", &ctx(), false)
            .unwrap();
        assert_eq!(out["{{id}}"], RowValues::Int(5));
        assert_eq!(out["{{ user.tags.1 }}"], RowValues::Text("b".into()));
    }

    #[test]
    fn escaping_doubles_quotes_only_when_asked() {
        let raw = ContextEvaluator.evaluate("{{user.name}}", &ctx(), false).unwrap();
        assert_eq!(raw["{{user.name}}"], RowValues::Text("o'brien".into()));
        let escaped = ContextEvaluator.evaluate("{{user.name}}", &ctx(), true).unwrap();
        assert_eq!(escaped["{{user.name}}"], RowValues::Text("o''brien".into()));
    }

    #[test]
    fn reads_file_attachments() {
        let out = ContextEvaluator.evaluate("{{files.seed}}", &ctx(), false).unwrap();
        assert_eq!(
            out["{{files.seed}}"],
            RowValues::Text("insert into t values (1)".into())
        );
    }

    #[test]
    fn unknown_variable_fails() {
        let err = ContextEvaluator
            .evaluate("{{id}} {{missing.x}}", &ctx(), false)
            .unwrap_err();
        assert_eq!(err.expression, "missing.x");
        assert!(err.reason.contains("missing"));
    }

    #[test]
    fn escaping_covers_serialized_objects() {
        let ctx = RuntimeContext::new().with_variable("f", json!({"k": "x' OR 1=1 --"}));
        let escaped = ContextEvaluator.evaluate("{{f}}", &ctx, true).unwrap();
        assert_eq!(
            escaped["{{f}}"],
            RowValues::Text(r#"{"k":"x'' OR 1=1 --"}"#.into())
        );
        let raw = ContextEvaluator.evaluate("{{f}}", &ctx, false).unwrap();
        assert_eq!(raw["{{f}}"], RowValues::JSON(json!({"k": "x' OR 1=1 --"})));
    }
}
