//! Async host entry
//!
//! Evaluation itself is synchronous and single-threaded. Hosts that run on
//! tokio use [`run_detached`] to keep a whole program off the async worker
//! threads; results come back as owned, serializable snapshots.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::runtime::{CapturedOutput, EvaluatorConfig, QuarkEvaluator, Value};

/// Lists nested deeper than this are cut off in snapshots
const MAX_SNAPSHOT_DEPTH: usize = 64;

/// Owned copy of a runtime value, free of shared cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ValueSnapshot {
    /// `none`
    None,
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i64),
    /// String
    String(String),
    /// List
    List(Vec<ValueSnapshot>),
    /// Function (parameters only)
    Function {
        /// Formal parameter names
        params: Vec<String>,
    },
}

impl ValueSnapshot {
    fn capture(value: &Value, depth: usize) -> Self {
        match value {
            Value::None => ValueSnapshot::None,
            Value::Boolean(b) => ValueSnapshot::Boolean(*b),
            Value::Integer(n) => ValueSnapshot::Integer(*n),
            Value::String(s) => ValueSnapshot::String(s.clone()),
            Value::List(items) if depth >= MAX_SNAPSHOT_DEPTH => {
                tracing::debug!(depth, dropped = items.len(), "snapshot list truncated");
                ValueSnapshot::List(Vec::new())
            }
            Value::List(items) => ValueSnapshot::List(
                items
                    .iter()
                    .map(|item| ValueSnapshot::capture(&item.borrow(), depth + 1))
                    .collect(),
            ),
            Value::Function { params, .. } => ValueSnapshot::Function {
                params: params.clone(),
            },
        }
    }

    /// Renders the snapshot as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&Value> for ValueSnapshot {
    fn from(value: &Value) -> Self {
        ValueSnapshot::capture(value, 0)
    }
}

/// Result of a detached run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Terminal value of the program
    pub value: ValueSnapshot,
    /// Lines written by `print`
    pub output: Vec<String>,
}

/// Runs `source` to completion on the blocking pool
///
/// Each call gets its own evaluator, so concurrent runs share nothing.
/// `print` output is captured into the outcome rather than written to stdout.
pub async fn run_detached(
    source: impl Into<String>,
    config: EvaluatorConfig,
) -> Result<RunOutcome> {
    let source = source.into();
    tokio::task::spawn_blocking(move || run_captured(&source, config))
        .await
        .map_err(|e| Error::HostTaskFailed {
            message: e.to_string(),
        })?
}

/// Runs `source` synchronously with captured output
pub fn run_captured(source: &str, config: EvaluatorConfig) -> Result<RunOutcome> {
    let capture = CapturedOutput::new();
    let mut evaluator = QuarkEvaluator::with_config(config).with_output(capture.clone());
    let value = evaluator.eval_str(source)?;
    Ok(RunOutcome {
        value: ValueSnapshot::from(&value),
        output: capture.lines(),
    })
}
