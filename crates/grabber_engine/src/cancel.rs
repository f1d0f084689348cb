use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use engine_logging::{engine_info, engine_warn};

use crate::ProcessHandle;

/// Cooperative stop flag shared between a job and whoever may cancel it.
///
/// The flag only ever goes from unset to set. While a stage runs, its process is
/// registered here so [`request_stop`](Self::request_stop) can kill it directly.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    stopped: AtomicBool,
    signal: tokio_util::sync::CancellationToken,
    process: Mutex<Option<ProcessHandle>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stop flag and kills the registered process, if any. Repeated calls are no-ops.
    pub fn request_stop(&self) {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        engine_info!("Stop requested");
        self.inner.signal.cancel();
        if let Some(process) = self.slot().as_ref() {
            process.terminate();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once a stop has been requested.
    pub async fn cancelled(&self) {
        self.inner.signal.cancelled().await;
    }

    /// Makes `process` the current process. If a stop already happened it is killed right away.
    pub fn register_process(&self, process: ProcessHandle) {
        let mut slot = self.slot();
        if let Some(previous) = slot.as_ref() {
            engine_warn!(
                "Registering {} while {} is still current",
                process.program(),
                previous.program()
            );
        }
        if self.is_stopped() {
            process.terminate();
        }
        *slot = Some(process);
    }

    /// Forgets the current process and returns it.
    pub fn clear_process(&self) -> Option<ProcessHandle> {
        self.slot().take()
    }

    pub fn has_process(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProcessHandle>> {
        self.inner
            .process
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("stopped", &self.is_stopped())
            .field("process", &*self.slot())
            .finish()
    }
}
