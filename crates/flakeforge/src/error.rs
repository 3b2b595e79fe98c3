/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeforge` can emit.
///
/// Exhausting the sequence within a millisecond is deliberately **not** an
/// error: generation blocks until the clock advances instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The machine ID does not fit the machine ID field of the layout.
    ///
    /// Raised at construction time. A process without a valid identity
    /// should not serve.
    #[error("machine id {machine_id} is outside the valid range [0, {max}]")]
    InvalidMachineId {
        /// The rejected machine ID.
        machine_id: i64,
        /// The largest machine ID the layout can represent.
        max: u64,
    },

    /// The requested bit widths do not describe a usable 63-bit layout.
    #[error(
        "invalid bit layout: {timestamp_bits} timestamp + {machine_id_bits} machine id + \
         {sequence_bits} sequence bits (each field needs at least 1 bit, 63 bits total at most)"
    )]
    InvalidLayout {
        /// Width of the timestamp field.
        timestamp_bits: u8,
        /// Width of the machine ID field.
        machine_id_bits: u8,
        /// Width of the sequence field.
        sequence_bits: u8,
    },

    /// The wall clock moved backwards relative to the last issued ID.
    ///
    /// The generator state is left untouched. Callers receive this as a
    /// generation failure; it is never retried or absorbed internally
    /// because doing so risks duplicate or misordered IDs.
    #[error("clock moved backwards by {drift_ms}ms")]
    ClockDrift {
        /// How far behind the last issued timestamp the clock reads.
        drift_ms: u64,
    },

    /// The clock reads before the configured epoch, or so far after it that
    /// the elapsed time no longer fits the timestamp field.
    #[error("timestamp {millis}ms since unix epoch is outside the representable range")]
    TimestampOutOfRange {
        /// The raw clock reading, in milliseconds since the Unix epoch.
        millis: u64,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
