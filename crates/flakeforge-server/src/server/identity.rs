//! Worker identity derived from deployment placement.
//!
//! In a Kubernetes `StatefulSet` every pod gets a stable ordinal suffix
//! (`id-generator-0`, `id-generator-1`, ...). That ordinal becomes the
//! Snowflake machine ID, so no coordination between workers is needed as long
//! as the replica count stays within the machine ID field.

use serde::Serialize;

/// Failure to derive a machine ID from a worker name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("no numeric part found in worker name {name:?}")]
    NoDigits { name: String },

    #[error("numeric part {digits:?} of worker name {name:?} does not fit in a machine id")]
    TooLarge { name: String, digits: String },
}

/// Extracts the first run of ASCII digits in `name` as a machine ID.
///
/// ```text
/// "id-generator-1023"  -> 1023
/// "worker7-canary-2"   -> 7
/// ```
pub fn machine_id_from_name(name: &str) -> Result<i64, IdentityError> {
    let start = name
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| IdentityError::NoDigits {
            name: name.to_owned(),
        })?;
    let rest = &name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    digits.parse().map_err(|_| IdentityError::TooLarge {
        name: name.to_owned(),
        digits: digits.to_owned(),
    })
}

/// Who this worker is, as reported by `/health`.
///
/// Only `machine_id` takes part in ID generation; the rest is deployment
/// metadata for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerIdentity {
    pub machine_id: i64,
    pub pod_name: String,
    pub pod_uid: Option<String>,
    pub node_name: Option<String>,
}
