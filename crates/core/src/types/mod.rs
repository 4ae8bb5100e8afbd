//! Core types for Linen Loft.

pub mod id;
pub mod status;

pub use id::*;
pub use status::*;
