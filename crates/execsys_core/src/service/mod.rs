//! Core use-case services.
//!
//! # Responsibility
//! - Compose locator, scanner and codec calls into use-case level APIs.
//! - Keep the CLI layer decoupled from filesystem details.

pub mod completion_service;
