use gale_core::prelude::ShutdownHandle;
use tokio::signal;

pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime) -> ShutdownHandle {
    let handle = ShutdownHandle::new();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        if signal::ctrl_c().await.is_err() {
            log::warn!("Failed to listen for Ctrl-C, early stop is unavailable");
            return;
        }
        println!("Received shutdown signal, draining virtual users...");
        listener_handle.shutdown();
    });

    handle
}
