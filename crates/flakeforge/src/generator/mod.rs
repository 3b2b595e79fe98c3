mod backoff;
mod lock;
mod mutex;
mod status;
#[cfg(test)]
mod tests;

pub use backoff::*;
pub use lock::*;
pub use mutex::*;
pub use status::*;
