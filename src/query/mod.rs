//! jq queries over fetched data.
//!
//! jaq values are reference counted and must not live across an await point.
//! [`Query::parse`] only validates the source; [`Query::run`] compiles again
//! and evaluates synchronously, so callers on the runtime move it to a
//! blocking thread.

use jaq_core::load::{Arena, File, Loader};
use jaq_core::{Compiler, Ctx, Native, RcIter};
use jaq_json::Val;
use serde_json::Value;
use thiserror::Error as ThisError;

use crate::model::QueryOutcome;

pub mod eval;

pub use eval::{evaluate, Generator, Step};

#[derive(Debug, Clone)]
pub struct Query {
    source: String,
}

impl Query {
    /// Checks that `source` compiles. Lex, parse and undefined-name errors
    /// are reported here, before any network call is made.
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        compile(source)?;
        Ok(Self {
            source: source.to_string(),
        })
    }

    pub fn run(&self, input: Value) -> Result<QueryOutcome, QueryError> {
        let filter = compile(&self.source)?;
        let inputs = RcIter::new(core::iter::empty());
        let outputs = filter
            .run((Ctx::new([], &inputs), Val::from(input)))
            .map(|res| res.map(Value::from));
        evaluate(outputs).map_err(QueryError::Fault)
    }
}

#[derive(ThisError, Debug)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    Compile(String),
    #[error("query yielded an error: {0}")]
    Fault(String),
}

fn compile(source: &str) -> Result<jaq_core::Filter<Native<Val>>, QueryError> {
    let program = File {
        code: source,
        path: (),
    };
    let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = Arena::default();
    let modules = loader
        .load(&arena, program)
        .map_err(|errs| QueryError::Compile(format!("{errs:?}")))?;
    Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| QueryError::Compile(format!("{errs:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(query: &str, input: Value) -> QueryOutcome {
        Query::parse(query).unwrap().run(input).unwrap()
    }

    #[test]
    fn test_invalid_syntax_rejected() {
        assert!(matches!(Query::parse(".status =="), Err(QueryError::Compile(_))));
        assert!(Query::parse("][").is_err());
    }

    #[test]
    fn test_undefined_function_rejected() {
        assert!(Query::parse("no_such_function(1)").is_err());
    }

    #[test]
    fn test_path_and_comparison() {
        let outcome = run(".status == \"ok\"", json!({"status": "ok"}));
        assert!(outcome.verdict);
        assert_eq!(outcome.last, Some(json!(true)));

        let outcome = run(".data.items[0].count > 5", json!({"data": {"items": [{"count": 3}]}}));
        assert!(!outcome.verdict);
        assert_eq!(outcome.last, Some(json!(false)));
    }

    #[test]
    fn test_multiple_outputs_short_circuit() {
        // the error after `true` is never pulled
        let outcome = run("1, false, true, error(\"unreachable\")", Value::Null);
        assert!(outcome.verdict);
        assert_eq!(outcome.last, Some(json!(true)));
    }

    #[test]
    fn test_multiple_outputs_without_true() {
        let outcome = run(".[]", json!([1, 2, 3]));
        assert!(!outcome.verdict);
        assert_eq!(outcome.last, Some(json!(3)));
    }

    #[test]
    fn test_empty_output() {
        let outcome = run("empty", json!({}));
        assert_eq!(outcome, QueryOutcome::default());
    }

    #[test]
    fn test_boolean_operators() {
        let input = json!({"a": 1, "b": "x"});
        assert!(run(".a == 1 and .b == \"x\"", input.clone()).verdict);
        assert!(run(".a == 2 or (.b | length) == 1", input.clone()).verdict);
        assert!(!run(".a == 1 and (.a > 1 | not | not)", input).verdict);
    }

    #[test]
    fn test_error_value_is_fault() {
        let res = Query::parse("1, error(\"boom\")")
            .unwrap()
            .run(Value::Null);
        assert!(matches!(res, Err(QueryError::Fault(_))));
    }

    #[test]
    fn test_raw_string_input() {
        let outcome = run("startswith(\"under\")", json!("under maintenance"));
        assert!(outcome.verdict);
    }
}
