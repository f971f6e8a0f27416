//! BatchPress: batch image conversion and archiving.
//!
//! The binary wires the `bp-*` crates together; this library exposes the
//! bootstrap and command layers so they can be driven from tests.

pub mod bootstrap;
pub mod commands;
