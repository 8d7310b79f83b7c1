use std::fmt::Debug;

use serde_json::Value;

use crate::model::QueryOutcome;

/// One pull from a running query.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Yield(Value),
    /// the query produced an error as a value
    Fault(String),
    Done,
}

/// Lazy source of query outputs, pulled one step at a time.
pub trait Generator {
    fn next_step(&mut self) -> Step;
}

impl<I, E> Generator for I
where
    I: Iterator<Item = Result<Value, E>>,
    E: Debug,
{
    fn next_step(&mut self) -> Step {
        match self.next() {
            Some(Ok(v)) => Step::Yield(v),
            Some(Err(e)) => Step::Fault(format!("{e:?}")),
            None => Step::Done,
        }
    }
}

/// Drives a generator until it is exhausted, faults, or yields `true`.
///
/// The first `true` ends the evaluation; nothing after it is pulled.
pub fn evaluate<G: Generator>(mut outputs: G) -> Result<QueryOutcome, String> {
    let mut outcome = QueryOutcome::default();
    loop {
        match outputs.next_step() {
            Step::Done => return Ok(outcome),
            Step::Fault(e) => return Err(e),
            Step::Yield(v) => {
                tracing::info!("jq result: {v}");
                let is_true = v == Value::Bool(true);
                outcome.last = Some(v);
                if is_true {
                    outcome.verdict = true;
                    return Ok(outcome);
                }
            }
        }
    }
}
