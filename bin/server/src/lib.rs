//! authgate HTTP gateway.
//!
//! This crate wires the multi-datacenter OAuth bridge into an axum server:
//! the callback interceptor, the token and userinfo endpoints, and a
//! sign-in flow that consumes them.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
