//! Client library for the restaurant and supermarket point-of-sale backend.
//!
//! [`api::ApiClient`] is the single entry point to the backend; every
//! feature service in [`pos`] is built on an [`api::ApiHook`] from it.

pub mod api;
pub mod cache;
pub mod config;
pub mod logging;
pub mod pos;
pub mod session;
pub mod tenant;
