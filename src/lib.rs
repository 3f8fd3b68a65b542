//! imgfit - image size targeting and format conversion
//!
//! HTTP front end for the `size-fit` crate.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
