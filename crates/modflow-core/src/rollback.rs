//! Compensating actions for partially applied workflows
//!
//! A [`RollbackStack`] is created fresh by each command. An action is pushed
//! only after the forward step it reverses has succeeded, and the stack is
//! unwound newest first.

use tracing::{info, warn};

use crate::error::WorkflowResult;

type Action<'a> = Box<dyn FnOnce() -> WorkflowResult<()> + 'a>;

/// A reversal that failed while unwinding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackFailure {
    pub label: String,
    pub message: String,
}

/// Outcome of [`RollbackStack::run_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Number of reversals invoked
    pub attempted: usize,
    /// Reversals that returned an error, in the order they ran
    pub failures: Vec<RollbackFailure>,
}

impl RollbackReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// LIFO list of compensating actions
#[derive(Default)]
pub struct RollbackStack<'a> {
    actions: Vec<(String, Action<'a>)>,
}

impl<'a> RollbackStack<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reversal of a step that has just succeeded
    pub fn push<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> WorkflowResult<()> + 'a,
    {
        self.actions.push((label.into(), Box::new(action)));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Labels of registered actions, oldest first
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|(label, _)| label.as_str())
    }

    /// Run every action newest to oldest, continuing past failures
    ///
    /// Each action runs exactly once and the stack is empty afterwards.
    pub fn run_all(&mut self) -> RollbackReport {
        let mut report = RollbackReport::default();

        while let Some((label, action)) = self.actions.pop() {
            report.attempted += 1;
            info!(step = %label, "rolling back");
            if let Err(e) = action() {
                warn!(step = %label, error = %e, "rollback step failed");
                report.failures.push(RollbackFailure {
                    label,
                    message: e.to_string(),
                });
            }
        }

        report
    }

    /// Drop all actions without running them
    pub fn discard(mut self) {
        self.actions.clear();
    }
}

impl std::fmt::Debug for RollbackStack<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollbackStack")
            .field("actions", &self.labels().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[test]
    fn test_runs_in_reverse_order() {
        let log = RefCell::new(Vec::new());
        let mut stack = RollbackStack::new();
        for step in ["clone", "registry", "package list"] {
            let log = &log;
            stack.push(step, move || {
                log.borrow_mut().push(step);
                Ok(())
            });
        }

        let report = stack.run_all();
        assert_eq!(report.attempted, 3);
        assert!(report.is_clean());
        assert_eq!(*log.borrow(), vec!["package list", "registry", "clone"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_walk() {
        let log = RefCell::new(Vec::new());
        let mut stack = RollbackStack::new();
        stack.push("first", || {
            log.borrow_mut().push("first");
            Ok(())
        });
        stack.push("broken", || {
            Err(WorkflowError::Io {
                path: PathBuf::from("go.work"),
                message: "permission denied".into(),
            })
        });
        stack.push("last", || {
            log.borrow_mut().push("last");
            Ok(())
        });

        let report = stack.run_all();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].label, "broken");
        assert_eq!(*log.borrow(), vec!["last", "first"]);
    }

    #[test]
    fn test_run_all_twice_runs_each_action_once() {
        let count = RefCell::new(0);
        let mut stack = RollbackStack::new();
        stack.push("only", || {
            *count.borrow_mut() += 1;
            Ok(())
        });

        stack.run_all();
        let second = stack.run_all();
        assert_eq!(second.attempted, 0);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_discard_skips_actions() {
        let ran = RefCell::new(false);
        let mut stack = RollbackStack::new();
        stack.push("never", || {
            *ran.borrow_mut() = true;
            Ok(())
        });
        assert_eq!(stack.labels().collect::<Vec<_>>(), vec!["never"]);

        stack.discard();
        assert!(!*ran.borrow());
    }
}
