use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Waits for ctrl-c and cancels `cancelation`. Returns early if something else cancelled it.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, stopping");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
