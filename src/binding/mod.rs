//! Resolution of query templates into parameterized SQL.
//!
//! A template such as `SELECT * FROM t WHERE id = {{id}}` is turned into
//! `SELECT * FROM t WHERE id = @PARAM_1` while the evaluated value of `{{id}}`
//! is stored in the runtime context's [`PreparedStatementContext`].

mod context;
mod evaluator;

pub use context::{PreparedStatementContext, RuntimeContext};
pub use evaluator::{BindingEvaluator, ContextEvaluator, EvaluatedBindings, escape_literal};

use crate::error::{BindingError, ConnectorError};
use crate::template;

/// Prefix of the generated parameter slot names.
pub const PARAM_PREFIX: &str = "PARAM_";

/// Placeholder text for the 1-based parameter `position`.
#[must_use]
pub fn placeholder(position: usize) -> String {
    format!("@{PARAM_PREFIX}{position}")
}

/// Rewrite `template` into SQL with positional placeholders.
///
/// Every occurrence gets its own placeholder and its own slot in the
/// prepared-statement context, even when the same expression appears twice.
/// The context's previous parameters are replaced only once every occurrence
/// has a value; on any failure the context is left untouched.
///
/// # Errors
/// Returns `ConnectorError::Binding` when an expression cannot be evaluated.
pub fn resolve_prepared<E>(
    template_text: &str,
    context: &mut RuntimeContext,
    evaluator: &E,
    escape: bool,
) -> Result<String, ConnectorError>
where
    E: BindingEvaluator + ?Sized,
{
    let evaluated = evaluator.evaluate(template_text, context, escape)?;
    let occurrences = template::scan(template_text);

    let mut values = Vec::with_capacity(occurrences.len());
    let mut placeholders = Vec::with_capacity(occurrences.len());
    for expr in &occurrences {
        let value = evaluated
            .get(expr.raw)
            .ok_or_else(|| BindingError::new(expr.body, "evaluator produced no value"))?;
        values.push(value.clone());
        placeholders.push(placeholder(values.len()));
    }
    context.prepared_mut().replace(values);

    Ok(template::rewrite(template_text, &occurrences, |idx, _| {
        placeholders[idx].clone()
    }))
}

/// Legacy path: splice evaluated values straight into the SQL text.
///
/// Only safe together with the evaluator's escaping policy; kept for actions
/// that have not opted into parameter binding.
///
/// # Errors
/// Returns `ConnectorError::Binding` when an expression cannot be evaluated.
pub fn render_interpolated<E>(
    template_text: &str,
    context: &RuntimeContext,
    evaluator: &E,
    escape: bool,
) -> Result<String, ConnectorError>
where
    E: BindingEvaluator + ?Sized,
{
    let evaluated = evaluator.evaluate(template_text, context, escape)?;
    let occurrences = template::scan(template_text);
    let mut literals = Vec::with_capacity(occurrences.len());
    for expr in &occurrences {
        let value = evaluated
            .get(expr.raw)
            .ok_or_else(|| BindingError::new(expr.body, "evaluator produced no value"))?;
        literals.push(value.to_literal_text());
    }
    Ok(template::rewrite(template_text, &occurrences, |idx, _| {
        literals[idx].clone()
    }))
}
