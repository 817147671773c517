//! Business logic services.

pub mod build_service;
pub mod hasher;
pub mod provenance;
pub mod remote;
pub mod toolchain;
