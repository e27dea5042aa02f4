//! Bounded retry with a recovery step between attempts.
//!
//! ```ignore
//! let entitled = RetryPolicy::default()
//!     .run(
//!         "entitled",
//!         || async { oracle.entitled(&query).await },
//!         || async { remote.reconnect(addr).await.map(drop) },
//!     )
//!     .await?;
//! ```

use std::future::Future;

use tracing::{error, warn};

use super::DomainError;

/// How often an oracle call is attempted.
///
/// Only transient failures are retried, with no delay: the recovery step
/// (rebuilding the channel) runs instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run `operation`, calling `recover` before each retry.
    ///
    /// # Errors
    ///
    /// The first non-transient error, the last error once attempts are
    /// exhausted, or the error of a failed recovery.
    pub async fn run<T, Op, OpFut, Rec, RecFut>(
        &self,
        operation_name: &str,
        mut operation: Op,
        mut recover: Rec,
    ) -> Result<T, DomainError>
    where
        Op: FnMut() -> OpFut,
        OpFut: Future<Output = Result<T, DomainError>>,
        Rec: FnMut() -> RecFut,
        RecFut: Future<Output = Result<(), DomainError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() || attempt >= self.max_attempts => {
                    error!(
                        operation = %operation_name,
                        attempt,
                        error = %e,
                        "Operation failed"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        operation = %operation_name,
                        attempt,
                        error = %e,
                        "Operation failed, recovering before retry"
                    );
                    if let Err(recovery) = recover().await {
                        error!(
                            operation = %operation_name,
                            attempt,
                            error = %recovery,
                            "Recovery failed, giving up"
                        );
                        return Err(recovery);
                    }
                }
            }
        }
    }
}
