#![forbid(unsafe_code)]

//! Document lifecycle and file-watch coordination for `mdpad`.
//!
//! The [`host::HostController`] owns windows, file I/O and watches. Each window
//! runs a [`ui::UiController`] that renders Markdown and tracks edited state.
//! The two sides only talk through the typed messages in [`bridge`].

pub mod bridge;
pub mod config;
pub mod disk_io;
pub mod editor;
pub mod error;
pub mod file_kind;
pub mod host;
pub mod markdown;
pub mod platform;
pub mod ui;
pub mod watch;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};

/// Hard cap on file sizes we will load into memory.
pub const MAX_FILE_BYTES: u64 = 64 * 1024 * 1024;
