//! # Domain Models
//!
//! This crate contains pure launcher types with a single dependency (`serde`).
//! Keep it lean: no I/O, no process handling, no arithmetic beyond defaults.

pub mod config;
pub mod constants;
pub mod manifest;
pub mod stage;
