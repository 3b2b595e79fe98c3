use core::time::Duration;

use crate::{IdGenStatus, Result, SnowflakeGenerator, SnowflakeId, TimeSource};

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Generates the next ID, awaiting Tokio's timer instead of blocking the
    /// thread while the sequence is exhausted.
    ///
    /// The lock is never held across an `.await`.
    ///
    /// # Errors
    ///
    /// Same as [`SnowflakeGenerator::generate`].
    ///
    /// # Example
    /// ```
    /// use flakeforge::{SnowflakeGenerator, SystemClock, DEFAULT_EPOCH};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let generator = SnowflakeGenerator::new(1, DEFAULT_EPOCH, SystemClock).unwrap();
    /// let id = generator.generate_async().await.unwrap();
    /// assert_eq!(generator.parse(id).machine_id, 1);
    /// # }
    /// ```
    pub async fn generate_async(&self) -> Result<SnowflakeId> {
        loop {
            let yield_until = match self.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_until } => yield_until,
            };

            let now = self.current_millis();
            if now < yield_until {
                tokio::time::sleep(Duration::from_millis(yield_until - now)).await;
            } else {
                tokio::task::yield_now().await;
            }
        }
    }
}
