//! Standalone runner for the controller-bridged relayer.
//!
//! The `relayer-bridge` binary delivers batches of relay messages read from
//! a file to dry-run chain endpoints. Unless told to run standalone, it
//! attaches a controller speaking line-delimited JSON over stdin and stdout.

#![forbid(unsafe_code)]
#![deny(
    // warnings,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    rust_2018_idioms
)]

extern crate alloc;

pub mod batches;
pub mod commands;
pub mod components;
pub mod entry;
pub mod stdio;
