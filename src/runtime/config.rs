//! Evaluator configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable that caps `while` iterations
pub const MAX_ITERATIONS_ENV: &str = "QUARK_MAX_ITERATIONS";

/// Limits applied by the evaluator
///
/// The language has no limits of its own, so the default leaves every
/// field unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Maximum iterations of a single `while` loop
    pub max_iterations: Option<usize>,
}

impl EvaluatorConfig {
    /// Reads overrides from the environment; unparsable values are ignored
    pub fn from_env() -> Self {
        EvaluatorConfig {
            max_iterations: std::env::var(MAX_ITERATIONS_ENV)
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok()),
        }
    }

    /// Parses a JSON document such as `{"max_iterations": 1000}`
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Sets the loop iteration cap
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }
}
