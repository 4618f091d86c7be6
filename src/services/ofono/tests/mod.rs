//! Unit tests for the wire codec, capability gate, enumerations and
//! property decoding. No bus involved.

#![allow(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod properties;
mod types;
