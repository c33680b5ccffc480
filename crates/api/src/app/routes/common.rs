use ledgerbank_ledger::{LedgerError, StoreError};

/// Run a blocking engine call off the async worker threads.
///
/// The Postgres store bridges sync-to-async with `Handle::block_on`, which
/// must not run on a runtime worker; `spawn_blocking` keeps both store
/// flavors safe.
pub async fn run_blocking<T: Send + 'static>(
    f: impl FnOnce() -> Result<T, LedgerError> + Send + 'static,
) -> Result<T, LedgerError> {
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(LedgerError::Storage(StoreError::Backend(format!(
            "task join: {e}"
        )))),
    }
}
