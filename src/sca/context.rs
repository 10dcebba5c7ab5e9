//! Shared state for one or more analyses: configuration, path conventions,
//! cancellation and the deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::error;

use crate::config::ScaConfig;
use crate::error::{Result, ScaError};
use crate::sca::paths::PathClassifier;

/// Cloneable flag that stops running analyses at their next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Context threaded through the analyzer and every generator.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    config: ScaConfig,
    paths: PathClassifier,
    token: CancellationToken,
    started: Instant,
    deadline: Option<Instant>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new(ScaConfig::default())
    }
}

impl AnalysisContext {
    pub fn new(config: ScaConfig) -> Self {
        let paths = PathClassifier::from_config(&config.paths);
        Self {
            config,
            paths,
            token: CancellationToken::new(),
            started: Instant::now(),
            deadline: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Fail with `DeadlineExceeded` once `timeout` has passed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.started = Instant::now();
        self.deadline = Some(self.started + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Replace the classifier built from configuration, e.g. to add rules.
    pub fn with_classifier(mut self, paths: PathClassifier) -> Self {
        self.paths = paths;
        self
    }

    pub fn config(&self) -> &ScaConfig {
        &self.config
    }

    pub fn paths(&self) -> &PathClassifier {
        &self.paths
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Called before each file; stops work once cancelled or late.
    pub fn checkpoint(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(ScaError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            let now = Instant::now();
            if now >= deadline {
                let elapsed = now.duration_since(self.started);
                error!(elapsed_ms = elapsed.as_millis() as u64, "analysis deadline exceeded");
                return Err(ScaError::DeadlineExceeded {
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
        }
        Ok(())
    }
}
