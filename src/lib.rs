// #![deny(warnings)]

#![warn(unused_extern_crates)]
// Enable some groups of clippy lints.
#![deny(clippy::suspicious)]
#![deny(clippy::perf)]
// Specific lints to enforce.
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::disallowed_types)]
#![deny(clippy::manual_let_else)]
#![allow(clippy::unreachable)]
// The transport and crypto seams are consumed generically inside this crate,
// we don't need the futures to be nameable or Send bounded.
#![allow(async_fn_in_trait)]

pub mod asn1;
pub mod cache;
pub mod config;
pub(crate) mod constants;
pub mod crypto;
pub mod error;
pub mod net;
pub mod proto;
pub mod seq_number;

pub use crate::constants::PROTOCOL_VERSION;
