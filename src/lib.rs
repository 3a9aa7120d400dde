//! avs3probe - raw AVS3 video stream detection and inspection
//!
//! This library crate exposes the CLI's building blocks for integration testing.

pub mod config;
pub mod report;
