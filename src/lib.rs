//! Library crate for lead-scan-rs exposing reusable modules.
pub mod backend;
pub mod clipboard;
pub mod config;
pub mod contract;
pub mod error;
pub mod render;
pub mod server;
pub mod types;
pub mod view;
