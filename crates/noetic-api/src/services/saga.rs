//! Compensating-action runner for writes that span more than one store.
//!
//! A [`Saga`] collects named compensation steps as forward steps succeed.
//! On failure, [`Saga::abort`] runs them newest-first and reports either the
//! original cause or, if a compensation itself failed,
//! [`Error::RollbackFailed`].

use futures::future::BoxFuture;
use tracing::{error, warn};

use noetic_core::{Error, Result};

type Compensation<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a>;

/// Stack of compensation steps for one multi-store operation.
pub struct Saga<'a> {
    operation: &'static str,
    steps: Vec<(&'static str, Compensation<'a>)>,
}

impl<'a> Saga<'a> {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            steps: Vec::new(),
        }
    }

    /// Register the compensation for a forward step that just succeeded.
    pub fn on_failure<F>(&mut self, step: &'static str, compensation: F)
    where
        F: FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a,
    {
        self.steps.push((step, Box::new(compensation)));
    }

    /// Number of registered compensations.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every forward step succeeded; drop the compensations.
    pub fn commit(self) {}

    /// Run compensations newest-first and return the error to surface.
    ///
    /// Stops at the first failing compensation.
    pub async fn abort(self, cause: Error) -> Error {
        let operation = self.operation;
        for (step, compensate) in self.steps.into_iter().rev() {
            if let Err(rollback_err) = compensate().await {
                error!(
                    subsystem = "saga",
                    op = operation,
                    step,
                    cause = %cause,
                    error = %rollback_err,
                    "Compensation failed, stores are inconsistent"
                );
                return Error::RollbackFailed {
                    operation,
                    step,
                    cause: format!("{}; rollback error: {}", cause, rollback_err),
                };
            }
            warn!(
                subsystem = "saga",
                op = operation,
                step,
                cause = %cause,
                "Compensation applied"
            );
        }
        cause
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use noetic_core::ErrorKind;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_abort_runs_newest_first_and_returns_cause() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new("test");
        for step in ["first", "second", "third"] {
            let order = order.clone();
            saga.on_failure(step, move || {
                async move {
                    order.lock().unwrap().push(step);
                    Ok(())
                }
                .boxed()
            });
        }
        assert_eq!(saga.len(), 3);

        let err = saga.abort(Error::Embedding("down".to_string())).await;
        assert!(matches!(err, Error::Embedding(_)));
        assert_eq!(*order.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_failed_compensation_is_rollback_failed() {
        let ran_first = Arc::new(Mutex::new(false));
        let mut saga = Saga::new("delete_knowledge");
        {
            let ran_first = ran_first.clone();
            saga.on_failure("first", move || {
                async move {
                    *ran_first.lock().unwrap() = true;
                    Ok(())
                }
                .boxed()
            });
        }
        saga.on_failure("restore_row", || {
            async { Err(Error::Internal("db gone".to_string())) }.boxed()
        });

        let err = saga.abort(Error::VectorIndex("timeout".to_string())).await;
        match &err {
            Error::RollbackFailed {
                operation,
                step,
                cause,
            } => {
                assert_eq!(*operation, "delete_knowledge");
                assert_eq!(*step, "restore_row");
                assert!(cause.contains("timeout"));
                assert!(cause.contains("db gone"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(!*ran_first.lock().unwrap());
    }

    #[tokio::test]
    async fn test_commit_skips_compensations() {
        let ran = Arc::new(Mutex::new(false));
        let mut saga = Saga::new("test");
        let flag = ran.clone();
        saga.on_failure("step", move || {
            async move {
                *flag.lock().unwrap() = true;
                Ok(())
            }
            .boxed()
        });
        saga.commit();
        assert!(!*ran.lock().unwrap());
    }

    #[tokio::test]
    async fn test_empty_saga_returns_cause() {
        let saga = Saga::new("noop");
        assert!(saga.is_empty());
        let err = saga.abort(Error::InvalidCredentials).await;
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    }
}
