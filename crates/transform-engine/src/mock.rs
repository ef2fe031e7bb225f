//! Deterministic engine for tests and dry runs

use crate::config::DecompositionConfig;
use crate::decomposition::Decomposition;
use crate::error::EngineError;
use crate::TransformEngine;
use ndarray::Array2;
use std::collections::VecDeque;
use tracing::info;

enum Behavior {
    Fixed(Decomposition),
    Failing(EngineError),
    Scripted(VecDeque<Result<Decomposition, EngineError>>),
}

/// Engine returning pre-built coefficient arrays
pub struct FixedEngine {
    behavior: Behavior,
    calls: usize,
    last_input_shape: Option<(usize, usize)>,
    closed: bool,
}

impl FixedEngine {
    /// Always return `decomposition`
    pub fn new(decomposition: Decomposition) -> Self {
        info!("Creating fixed transform engine");
        Self::with_behavior(Behavior::Fixed(decomposition))
    }

    /// Always fail with `error`
    pub fn failing(error: EngineError) -> Self {
        Self::with_behavior(Behavior::Failing(error))
    }

    /// Return the scripted results in order, then report the session as gone
    pub fn scripted(results: impl IntoIterator<Item = Result<Decomposition, EngineError>>) -> Self {
        Self::with_behavior(Behavior::Scripted(results.into_iter().collect()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: 0,
            last_input_shape: None,
            closed: false,
        }
    }

    /// Number of `decompose` calls so far
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Shape of the last grid handed to `decompose`
    pub fn last_input_shape(&self) -> Option<(usize, usize)> {
        self.last_input_shape
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl TransformEngine for FixedEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    fn decompose(
        &mut self,
        image: &Array2<f64>,
        _config: &DecompositionConfig,
    ) -> Result<Decomposition, EngineError> {
        if self.closed {
            return Err(EngineError::Unavailable("session shut down".into()));
        }
        self.calls += 1;
        self.last_input_shape = Some(image.dim());

        match &mut self.behavior {
            Behavior::Fixed(d) => Ok(d.clone()),
            Behavior::Failing(e) => Err(e.clone()),
            Behavior::Scripted(queue) => queue
                .pop_front()
                .unwrap_or_else(|| Err(EngineError::Unavailable("script exhausted".into()))),
        }
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        self.closed = true;
        Ok(())
    }
}
