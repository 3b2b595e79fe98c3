//! Time-ordered, k-sortable 64-bit Snowflake IDs.
//!
//! A [`SnowflakeGenerator`] packs milliseconds since a custom epoch, a fixed
//! machine ID and a per-millisecond sequence into a non-negative `i64`:
//!
//! ```text
//!  | reserved (1) | timestamp (41) | machine ID (10) | sequence (12) |
//! ```
//!
//! IDs from one generator are strictly increasing. IDs from different
//! generators are unique as long as every generator has its own machine ID.
//!
//! ```
//! use flakeforge::{SnowflakeGenerator, SystemClock, DEFAULT_EPOCH};
//!
//! let generator = SnowflakeGenerator::new(23, DEFAULT_EPOCH, SystemClock)?;
//! let a = generator.generate()?;
//! let b = generator.generate()?;
//! assert!(a < b);
//! # Ok::<(), flakeforge::Error>(())
//! ```
//!
//! ## Features
//!
//! - `parking-lot`: use `parking_lot::Mutex` (no lock poisoning)
//! - `async-tokio`: [`SnowflakeGenerator::generate_async`]
//! - `serde`: `Serialize`/`Deserialize` for [`SnowflakeId`]
//! - `tracing`: trace spans on generation and a warning on clock drift

mod error;
mod generator;
mod id;
mod runtime;
#[cfg(feature = "serde")]
pub mod serde;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
