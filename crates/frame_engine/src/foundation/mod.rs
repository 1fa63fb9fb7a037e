//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and the object transform
//! - Frame timing
//! - Logging setup

pub mod math;
pub mod time;
pub mod logging;
