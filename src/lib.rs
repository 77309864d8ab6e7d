//! Pixkey
//!
//! Hides text in RGB PNG images behind a compact key.
//! This library exposes modules for integration testing.

pub mod api;
pub mod cli;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
