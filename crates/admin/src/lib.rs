//! Linen Loft admin library.
//!
//! Back-office API for order management: listing with analytics, single
//! order status changes and bulk actions. Business rules live in
//! [`orders::OrderLifecycle`]; the HTTP layer in [`routes`] adds session
//! authentication and JSON error handling.
//!
//! # Security
//!
//! Every `/api/admin` route requires a logged-in admin. Only `admin` and
//! `super_admin` roles may change orders.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod orders;
pub mod routes;
pub mod state;
