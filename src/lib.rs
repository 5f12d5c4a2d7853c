//! handctl: maps per-frame hand poses to debounced virtual-HID
//! commands. See the `pipeline` module for the end-to-end flow and
//! `mapper` for the per-frame core.

pub mod cli;
pub mod config;
pub mod gestures;
pub mod logging;
pub mod mapper;
pub mod pipeline;
pub mod pose;
pub mod protocol;
