//! Linen Loft storefront library.
//!
//! Public catalog search: a [`search::SearchEngine`] ranks products held in a
//! [`catalog::CatalogStore`] and the HTTP layer exposes it as
//! `GET /api/search`. The crate is split into a library and a thin binary so
//! the engine and router can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod search;
pub mod state;
