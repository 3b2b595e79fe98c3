#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    generator::{Backoff, IdGenStatus, Mutex},
    id::{BitLayout, SnowflakeId, SnowflakeParts},
    time::TimeSource,
    Error, Result,
};

/// The timestamp and sequence of the most recently issued ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LastIssued {
    /// Milliseconds since the generator's epoch.
    timestamp: u64,
    sequence: u64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// Every call reads the clock and updates `(last_timestamp, sequence)` inside
/// one critical section, so concurrent callers can never observe the same
/// state pair and emit duplicate IDs. The critical section performs no I/O.
///
/// Construct one per process and share it by reference or [`Arc`]; each
/// instance needs a machine ID that is unique across the fleet.
///
/// ## Clock handling
/// - Same millisecond: the sequence increments. Once it is exhausted the
///   blocking [`generate`] waits for the next millisecond.
/// - Clock advanced: the sequence resets to zero.
/// - Clock moved backwards: [`Error::ClockDrift`] is returned and the state is
///   left untouched.
///
/// ## See Also
/// - [`BitLayout`] for custom field widths
/// - [`TimeSource`] for injecting a test clock
///
/// [`Arc`]: std::sync::Arc
/// [`generate`]: Self::generate
pub struct SnowflakeGenerator<T>
where
    T: TimeSource,
{
    state: Mutex<Option<LastIssued>>,
    layout: BitLayout,
    machine_id: u64,
    epoch: u64,
    backoff: Backoff,
    time: T,
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator with the reference [`BitLayout::TWITTER`]
    /// layout.
    ///
    /// # Parameters
    ///
    /// - `machine_id`: A unique identifier for the worker generating IDs. It
    ///   is encoded into every generated ID.
    /// - `epoch`: The zero point for timestamps, in milliseconds since the
    ///   Unix epoch. It must lie in the past and be shared across the fleet.
    /// - `time`: A [`TimeSource`] implementation (e.g. [`SystemClock`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` is negative or
    /// larger than [`BitLayout::max_machine_id`].
    ///
    /// # Example
    /// ```
    /// use flakeforge::{SnowflakeGenerator, SystemClock, DEFAULT_EPOCH};
    ///
    /// let generator = SnowflakeGenerator::new(5, DEFAULT_EPOCH, SystemClock).unwrap();
    /// let id = generator.generate().unwrap();
    /// assert_eq!(generator.parse(id).machine_id, 5);
    /// ```
    ///
    /// [`SystemClock`]: crate::SystemClock
    pub fn new(machine_id: i64, epoch: u64, time: T) -> Result<Self> {
        Self::with_layout(BitLayout::TWITTER, machine_id, epoch, time)
    }

    /// Creates a new generator with a custom [`BitLayout`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` does not fit the
    /// layout's machine ID field.
    pub fn with_layout(layout: BitLayout, machine_id: i64, epoch: u64, time: T) -> Result<Self> {
        let max = layout.max_machine_id();
        let machine_id = u64::try_from(machine_id)
            .ok()
            .filter(|id| *id <= max)
            .ok_or(Error::InvalidMachineId { machine_id, max })?;

        Ok(Self {
            state: Mutex::new(None),
            layout,
            machine_id,
            epoch,
            backoff: Backoff::default(),
            time,
        })
    }

    /// Replaces the wait policy used by [`Self::generate`] when the sequence
    /// is exhausted.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// The epoch, in milliseconds since the Unix epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn layout(&self) -> BitLayout {
        self.layout
    }

    /// Decodes an ID produced under this generator's layout. The returned
    /// timestamp is relative to [`Self::epoch`]; see
    /// [`SnowflakeParts::unix_millis`].
    #[must_use]
    pub fn parse(&self, id: SnowflakeId) -> SnowflakeParts {
        self.layout.decompose(id)
    }

    /// Generates the next ID, blocking the calling thread while the sequence
    /// for the current millisecond is exhausted.
    ///
    /// The wait re-checks the clock according to the configured [`Backoff`];
    /// it ends as soon as the clock reaches the next millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockDrift`] if the clock moved backwards.
    /// - [`Error::TimestampOutOfRange`] if the clock is before the epoch or
    ///   past the end of the timestamp field.
    /// - [`Error::LockPoisoned`] if a std mutex was poisoned.
    pub fn generate(&self) -> Result<SnowflakeId> {
        let backoff = self.backoff;
        self.generate_with(|_| backoff.wait())
    }

    /// Generates the next ID, invoking `wait` with the resume time (the
    /// `yield_until` of [`IdGenStatus::Pending`]) each time the sequence is
    /// exhausted, then retrying.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_with(&self, mut wait: impl FnMut(u64)) -> Result<SnowflakeId> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_until } => wait(yield_until),
            }
        }
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_until })`: The sequence is exhausted;
    ///   retry once the clock reads `yield_until` or later
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`]. On error the generator state is unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(machine_id = self.machine_id)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Read under the lock so clock order matches state order.
        let now = self.time.current_millis();
        if let Some(last) = *state {
            let last_millis = self.epoch + last.timestamp;
            if now < last_millis {
                return Err(Self::cold_clock_behind(now, last_millis));
            }
        }
        let timestamp = self.elapsed_since_epoch(now)?;

        let next = match *state {
            Some(last) if last.timestamp == timestamp => {
                if last.sequence < self.layout.max_sequence() {
                    LastIssued {
                        timestamp,
                        sequence: last.sequence + 1,
                    }
                } else {
                    return Ok(IdGenStatus::Pending {
                        yield_until: self.epoch + last.timestamp + 1,
                    });
                }
            }
            _ => LastIssued {
                timestamp,
                sequence: 0,
            },
        };

        *state = Some(next);
        Ok(IdGenStatus::Ready {
            id: self
                .layout
                .compose(next.timestamp, self.machine_id, next.sequence),
        })
    }

    #[cfg(feature = "async-tokio")]
    pub(crate) fn current_millis(&self) -> u64 {
        self.time.current_millis()
    }

    fn elapsed_since_epoch(&self, now: u64) -> Result<u64> {
        now.checked_sub(self.epoch)
            .filter(|elapsed| *elapsed <= self.layout.max_timestamp())
            .ok_or(Error::TimestampOutOfRange { millis: now })
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        let drift_ms = last - now;
        #[cfg(feature = "tracing")]
        tracing::warn!(drift_ms, "clock moved backwards, refusing to generate");
        Error::ClockDrift { drift_ms }
    }
}
