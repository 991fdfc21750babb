//! Core use-case services.
//!
//! # Responsibility
//! - Validate raw caller input and orchestrate repository calls.
//! - Keep CLI/presentation layers decoupled from storage details.

pub mod catalog_service;
