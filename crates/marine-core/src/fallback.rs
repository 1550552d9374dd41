//! Ordered fallible attempts with a guaranteed last resort
//!
//! A chain is a list of labelled futures tried strictly in order. The first
//! `Ok` wins; every failure is logged and recorded. When all attempts fail
//! the synthetic last resort runs, so [`FallbackChain::run_or_else`] cannot
//! fail.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One boxed attempt
pub type Attempt<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Where the returned value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "endpoint", rename_all = "lowercase")]
pub enum ResultSource {
    /// A real attempt, by label
    Endpoint(String),
    /// The last resort generator
    Synthetic,
}

impl ResultSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(label) => f.write_str(label),
            Self::Synthetic => f.write_str("mock"),
        }
    }
}

/// A failed attempt
#[derive(Debug)]
pub struct AttemptFailure {
    pub label: String,
    pub error: Error,
}

/// Outcome of a chain
#[derive(Debug)]
pub struct Fallback<T> {
    pub value: T,
    pub source: ResultSource,
    /// Failures before the value was produced, in attempt order
    pub failures: Vec<AttemptFailure>,
}

impl<T> Fallback<T> {
    /// A value produced directly, without a chain
    pub fn direct(label: impl Into<String>, value: T) -> Self {
        Self {
            value,
            source: ResultSource::Endpoint(label.into()),
            failures: Vec::new(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source.is_synthetic()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fallback<U> {
        Fallback {
            value: f(self.value),
            source: self.source,
            failures: self.failures,
        }
    }
}

/// Builder for an ordered chain of attempts
pub struct FallbackChain<'a, T> {
    attempts: Vec<(String, Attempt<'a, T>)>,
}

impl<T> Default for FallbackChain<'_, T> {
    fn default() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }
}

impl<'a, T: Send + 'a> FallbackChain<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt; attempts run in the order they are added
    pub fn attempt<F>(mut self, label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'a,
    {
        self.attempts.push((label.into(), Box::pin(future)));
        self
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Run attempts in order; return the first success or the last resort
    ///
    /// Later attempts are never polled once one succeeds.
    pub async fn run_or_else(self, last_resort: impl FnOnce() -> T) -> Fallback<T> {
        let mut failures = Vec::new();
        for (label, attempt) in self.attempts {
            match attempt.await {
                Ok(value) => {
                    debug!(endpoint = %label, failed = failures.len(), "Attempt succeeded");
                    return Fallback {
                        value,
                        source: ResultSource::Endpoint(label),
                        failures,
                    };
                }
                Err(error) => {
                    warn!(endpoint = %label, error = %error, "Attempt failed, trying next");
                    failures.push(AttemptFailure { label, error });
                }
            }
        }
        warn!(failed = failures.len(), "All attempts failed, using mock result");
        Fallback {
            value: last_resort(),
            source: ResultSource::Synthetic,
            failures,
        }
    }
}
