//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Name-keyed collections
//! - Time sources
//! - Logging utilities

pub mod collections;
pub mod time;
pub mod logging;
