use anyhow::Result;

/// Everything in signalnoise runs on one thread. Storage is async only so that file access
/// doesn't stall the watcher loop.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
