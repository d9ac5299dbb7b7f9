//! Domain layer for the storefront.
//!
//! This crate provides the relational data model (products, carts, orders)
//! and the pure rules that govern it:
//! - the order status state machine with its per-transition stock effects
//! - cart item validation
//! - the domain error taxonomy
//!
//! Persistence lives behind the `store` crate's port; nothing in here
//! performs I/O.

pub mod cart;
pub mod error;
pub mod order;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem, CartLine, CartOwner};
pub use error::{CartError, OrderError};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use product::Product;
pub use status::{OrderStatus, StockEffect, Transition};
