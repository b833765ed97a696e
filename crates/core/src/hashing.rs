//! Opaque identifiers stamped on customers and orders.
//!
//! Neither hash is a credential; they are random handles the admin console
//! can show or link to without exposing sequential ids.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::types::Timestamp;

/// Number of random bytes behind a customer hash (32 hex characters).
pub const CUSTOMER_HASH_BYTES: usize = 16;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Lowercase hex encoding of `len` random bytes from the thread RNG.
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Fresh opaque hash for a new customer.
pub fn generate_customer_hash() -> String {
    random_hex(CUSTOMER_HASH_BYTES)
}

/// Fresh opaque hash for a new order, bound to its creation instant.
pub fn generate_order_hash(created_at: Timestamp) -> String {
    let seed = format!("{}:{}", uuid::Uuid::new_v4(), created_at.timestamp_micros());
    sha256_hex(seed.as_bytes())
}
