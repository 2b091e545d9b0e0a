use crate::platform::AccountHandle;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub customer_id: String,
    pub status: ExecutionStatus,
    pub return_value: Option<String>,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn ok(customer_id: &str, value: String) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            status: ExecutionStatus::Ok,
            return_value: Some(value),
            error: None,
        }
    }

    pub fn failed(customer_id: &str, error: String) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            status: ExecutionStatus::Error,
            return_value: None,
            error: Some(error),
        }
    }
}

/// Runs one worker per account on bounded scoped threads, then hands every
/// outcome plus the opaque context to the aggregator.
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    max_parallel: usize,
}

impl ParallelExecutor {
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
        }
    }

    pub fn execute_in_parallel<W, A, T>(
        &self,
        accounts: &[&dyn AccountHandle],
        worker: W,
        aggregator: A,
        context: &str,
    ) -> Result<T>
    where
        W: Fn(&dyn AccountHandle) -> Result<String> + Sync,
        A: FnOnce(Vec<ExecutionResult>, &str) -> Result<T>,
    {
        debug!(
            "fan-out accounts={} max_parallel={}",
            accounts.len(),
            self.max_parallel
        );

        let mut results = Vec::with_capacity(accounts.len());
        for batch in accounts.chunks(self.max_parallel) {
            let worker = &worker;
            let batch_results: Vec<ExecutionResult> = thread::scope(|s| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|&account| (account.customer_id(), s.spawn(move || worker(account))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(customer_id, handle)| match handle.join() {
                        Ok(Ok(value)) => ExecutionResult::ok(customer_id, value),
                        Ok(Err(err)) => {
                            warn!("worker failed for account {customer_id}: {err:#}");
                            ExecutionResult::failed(customer_id, format!("{err:#}"))
                        }
                        Err(_) => {
                            warn!("worker panicked for account {customer_id}");
                            ExecutionResult::failed(customer_id, "worker panicked".to_string())
                        }
                    })
                    .collect()
            });
            results.extend(batch_results);
        }

        aggregator(results, context)
    }
}
