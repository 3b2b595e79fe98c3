#[cfg(feature = "async-tokio")]
mod tokio;
