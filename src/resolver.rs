//! Field resolver
//!
//! Boundary between a GraphQL execution loop and the evaluator. The loop hands
//! over the parent object and the field arguments as JSON; the resolver builds
//! the subject record `{"value": parent, "args": {...}}`, evaluates the field's
//! compiled program against it and converts the result back to JSON.
//!
//! A resolver can narrow the parent to named paths with
//! [`FieldResolver::selecting`], so programs address parent fields by a
//! position the schema chooses rather than by the key order of the JSON object.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::evaluator::{EvaluationContext, EvaluationError, Evaluator};
use crate::ir::CompiledProgram;
use crate::model::{ModelError, Record, RuntimeValue};
use crate::registry::global_cache;

/// Errors returned by [`FieldResolver::resolve`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Parent or arguments could not be converted into runtime values
    #[error("Invalid resolver input: {0}")]
    Input(#[from] ModelError),

    /// The field program failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Resolves one field by evaluating a compiled program
#[derive(Debug, Clone)]
pub struct FieldResolver {
    program: Arc<CompiledProgram>,
    evaluator: Evaluator,
    context: EvaluationContext,
    field: Option<String>,
    selection: Option<Vec<Vec<String>>>,
}

impl FieldResolver {
    /// Resolver for `program` with the default configuration
    pub fn new(program: Arc<CompiledProgram>) -> Self {
        Self::with_config(program, EngineConfig::default())
    }

    /// Resolver for `program` with a custom configuration
    pub fn with_config(program: Arc<CompiledProgram>, config: EngineConfig) -> Self {
        let context = EvaluationContext::with_capabilities(config.capabilities());
        Self {
            program,
            evaluator: Evaluator::with_config(config),
            context,
            field: None,
            selection: None,
        }
    }

    /// Resolver whose program is stored in the process-wide cache
    ///
    /// Fields built from equal programs share a single copy.
    pub fn shared(program: CompiledProgram, config: EngineConfig) -> Self {
        let (digest, program) = global_cache().insert(program);
        log::debug!("Resolver uses shared program {digest}");
        Self::with_config(program, config)
    }

    /// Attach the field name reported in log lines
    pub fn named(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Replace the parent with a tuple of the values found at `paths`
    ///
    /// Each path is a dot-separated list of record keys and sequence indices,
    /// such as `owner.name` or `tags.0`. The tuple follows the order of
    /// `paths`; a path that does not resolve contributes unit.
    pub fn selecting<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selection = Some(
            paths
                .into_iter()
                .map(|path| path.as_ref().split('.').map(str::to_string).collect())
                .collect(),
        );
        self
    }

    /// The program evaluated for each resolution
    pub fn program(&self) -> &Arc<CompiledProgram> {
        &self.program
    }

    /// Build the subject record for `parent` and `args`
    pub fn subject(
        &self,
        parent: &JsonValue,
        args: &IndexMap<String, JsonValue>,
    ) -> Result<RuntimeValue, ModelError> {
        let args = args
            .iter()
            .map(|(name, value)| Ok((name.clone(), RuntimeValue::from_json(value)?)))
            .collect::<Result<Record, ModelError>>()?;
        let parent = RuntimeValue::from_json(parent)?;
        let value = match &self.selection {
            Some(paths) => RuntimeValue::Sequence(
                paths
                    .iter()
                    .map(|path| parent.path(path.as_slice()).cloned().unwrap_or_default())
                    .collect(),
            ),
            None => parent,
        };
        Ok(RuntimeValue::record([
            ("value", value),
            ("args", RuntimeValue::Record(args)),
        ]))
    }

    /// Resolve the field for one parent object
    pub fn resolve(
        &self,
        parent: &JsonValue,
        args: &IndexMap<String, JsonValue>,
    ) -> Result<JsonValue, ResolveError> {
        let subject = self.subject(parent, args)?;
        let field = self.field.as_deref().unwrap_or("<anonymous>");
        match self.evaluator.evaluate(&self.program, &self.context, &subject) {
            Ok(value) => {
                log::trace!("Resolved field {field}");
                Ok(value.to_json())
            }
            Err(err) => {
                if err.is_internal() {
                    log::error!("Field {field} has a malformed program: {err}");
                } else {
                    log::debug!("Field {field} failed: {err}");
                }
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Constructor, Equatable, Numeric};
    use crate::expression::Expression;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// `subject.value`; record fields project in insertion order
    fn parent() -> Expression<RuntimeValue> {
        Expression::<RuntimeValue>::identity().get_index(0)
    }

    fn args() -> Expression<RuntimeValue> {
        Expression::<RuntimeValue>::identity().get_index(1)
    }

    #[test]
    fn test_subject_shape() {
        let mut args = IndexMap::new();
        args.insert("limit".to_string(), json!(10));
        let resolver = FieldResolver::new(Arc::new(CompiledProgram::identity()));
        let subject = resolver.subject(&json!({"id": 7}), &args).unwrap();
        assert_eq!(subject.path(&["value", "id"]), Some(&RuntimeValue::Integer(7)));
        assert_eq!(subject.path(&["args", "limit"]), Some(&RuntimeValue::Integer(10)));
    }

    #[test]
    fn test_resolve_projects_parent() {
        let program = Arc::new(parent().compile());
        let resolver = FieldResolver::new(program).named("parent");
        let result = resolver.resolve(&json!({"id": 7}), &IndexMap::new()).unwrap();
        assert_eq!(result, json!({"id": 7}));
    }

    #[test]
    fn test_resolve_computes_from_arguments() {
        let limit: Expression<i64> = args().get_index(0).cast();
        let program = limit.multiply(Expression::integer(2), Numeric::integer());
        let resolver = FieldResolver::new(Arc::new(program.compile()));

        let mut args = IndexMap::new();
        args.insert("limit".to_string(), json!(21));
        assert_eq!(resolver.resolve(&JsonValue::Null, &args), Ok(json!(42)));
    }

    #[test]
    fn test_resolve_reports_evaluation_errors() {
        let program = Expression::<RuntimeValue>::identity()
            .get_index(5)
            .equal_to(Expression::literal(RuntimeValue::Unit, Constructor::any()), Equatable::structural());
        let resolver = FieldResolver::new(Arc::new(program.compile()));
        let err = resolver.resolve(&JsonValue::Null, &IndexMap::new()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Evaluation(EvaluationError::IndexOutOfRange { index: 5, size: 2 })
        );
    }

    #[test]
    fn test_selection_orders_parent_fields() {
        let resolver = FieldResolver::new(Arc::new(parent().compile()))
            .selecting(["name", "owner.id", "tags.1", "missing"]);
        let result = resolver
            .resolve(
                &json!({"id": 7, "name": "repo", "owner": {"id": 3}, "tags": ["a", "b"]}),
                &IndexMap::new(),
            )
            .unwrap();
        assert_eq!(result, json!(["repo", 3, "b", null]));
    }

    #[test]
    fn test_selected_field_feeds_arithmetic() {
        let stars: Expression<i64> = parent().get_index(1).cast();
        let program = stars.add(Expression::integer(1), Numeric::integer());
        let resolver = FieldResolver::new(Arc::new(program.compile())).selecting(["name", "stars"]);
        let result = resolver.resolve(&json!({"stars": 41, "name": "repo"}), &IndexMap::new());
        assert_eq!(result, Ok(json!(42)));
    }

    #[test]
    fn test_malformed_program_is_internal() {
        let program = CompiledProgram::lookup(crate::ir::Binding::from_raw(9));
        let resolver = FieldResolver::new(Arc::new(program)).named("broken");
        let err = resolver.resolve(&JsonValue::Null, &IndexMap::new()).unwrap_err();
        match err {
            ResolveError::Evaluation(err) => assert!(err.is_internal()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shared_resolvers_reuse_one_program() {
        let program = || CompiledProgram::literal("shared field", crate::capability::ConstructorKind::String);
        let first = FieldResolver::shared(program(), EngineConfig::default());
        let second = FieldResolver::shared(program(), EngineConfig::default());
        assert!(Arc::ptr_eq(first.program(), second.program()));
        assert!(global_cache().contains(&crate::registry::ProgramDigest::of(&program())));
        assert_eq!(second.resolve(&JsonValue::Null, &IndexMap::new()), Ok(json!("shared field")));
    }
}
