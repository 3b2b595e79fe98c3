use crate::SnowflakeId;

/// Represents the result of a single, non-blocking attempt to generate an ID.
///
/// This type models the outcome of [`SnowflakeGenerator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the sequence is exhausted for the current
///   millisecond and no ID can be produced until the clock reaches
///   `yield_until`.
///
/// This allows non-blocking generation loops and custom backoff strategies.
///
/// # Example
///
/// ```
/// use flakeforge::{IdGenStatus, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_000
///     }
/// }
///
/// let generator = SnowflakeGenerator::new(1, 0, FixedTime).unwrap();
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_until } => println!("Back off until: {yield_until}"),
/// }
/// ```
///
/// [`SnowflakeGenerator::try_poll_id`]: crate::SnowflakeGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for the
    /// current millisecond.
    Pending {
        /// The clock reading (milliseconds since the Unix epoch, inclusive) at
        /// which generation may resume.
        yield_until: u64,
    },
}
