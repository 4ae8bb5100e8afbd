//! Domain models for admin.

pub mod order;
pub mod session;

pub use linen_loft_core::AdminRole;
pub use order::{Order, OrderLineItem, OrderUpdate};
pub use session::{CurrentAdmin, keys as session_keys};
