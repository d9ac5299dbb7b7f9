//! Shared types for the storefront.
//!
//! Typed identifiers, integer-cents money, and the per-request identity
//! resolved once at the HTTP boundary and passed explicitly into the core.

pub mod identity;
pub mod ids;
pub mod money;

pub use identity::{Identity, Role};
pub use ids::{CartId, OrderId, ProductId, SessionToken, UserId};
pub use money::Money;
