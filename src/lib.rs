//! Shopping-list price comparison across nearby vendors.
//!
//! The engine in [`comparison`] is pure: given a list, vendors, prices, an
//! optional user location, a favorite set and a sort criterion it returns a
//! ranked, annotated result. The rest of the crate wires it to Postgres and
//! an axum HTTP surface.

pub mod app;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod location;
pub mod savings;
pub mod session;
pub mod state;
