//! Payment reference generation.

use uuid::Uuid;

/// Creates a fresh provider-facing transaction reference.
///
/// The reference is the correlation key between an order row and the
/// payment provider's session; a UNIQUE constraint on the orders table
/// backs up the uniqueness of the UUID.
pub fn new_reference() -> String {
    format!("txn_{}", Uuid::new_v4().simple())
}
