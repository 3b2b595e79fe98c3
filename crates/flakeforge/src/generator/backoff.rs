use core::time::Duration;

/// How a blocking generator waits after exhausting the sequence for the
/// current millisecond.
///
/// The wait is always followed by a fresh clock read, so the granularity only
/// trades CPU for latency; it never affects correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Busy-spin with a CPU pause hint. Lowest latency, burns a core.
    Spin,
    /// Yield the thread to the scheduler between clock reads.
    Yield,
    /// Sleep for the given duration between clock reads.
    Sleep(Duration),
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Sleep(Duration::from_micros(100))
    }
}

impl Backoff {
    /// Blocks the current thread once according to the policy.
    pub fn wait(&self) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep(dur) => std::thread::sleep(*dur),
        }
    }
}
