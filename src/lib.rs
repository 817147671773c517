//! BuildForge - Backend Library
//!
//! Build orchestration backend: turns uploaded source files (or GitHub
//! repositories) into packaged executables with provenance artifacts.

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
