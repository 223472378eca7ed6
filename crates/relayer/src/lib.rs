#![forbid(unsafe_code)]
#![deny(
    // warnings,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]

//! IBC relayer with a controller bridge.
//!
//! Every batch of relay messages is offered to a controller living in the
//! process that embeds the relayer, over a blocking call/reply [`bridge`].
//! The controller either lets the batch through, in which case it is
//! submitted to the source and destination chains by the [`link`], or
//! takes it over. The controller can in turn ask the relayer to deliver a
//! batch on its behalf, through [`host::Host::dispatch`].

extern crate alloc;

pub mod action;
pub mod bridge;
pub mod chain;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod link;
pub mod msgs;
pub mod path_end;
pub mod registry;
pub mod util;

#[cfg(test)]
mod test_utils;
