//! Event management REST API: organizers publish events, users register,
//! rate, subscribe and favorite them, administrators read aggregate totals.
//!
//! Layering: handlers parse requests and drive the pure guard/projection
//! functions in [`domain`], reading and writing rows only through the
//! injected [`store::Store`] capability.

pub mod auth;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
