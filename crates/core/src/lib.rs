//! Linen Loft Core - Shared domain types.
//!
//! This crate provides the types shared by every Linen Loft component:
//! - `storefront` - Public catalog search API
//! - `admin` - Order back-office API
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The order status graph lives here so that every component
//! agrees on which transitions are legal.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, order/payment statuses and admin roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
