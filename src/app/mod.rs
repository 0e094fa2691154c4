//! Application core: light domain logic, zero I/O.
//!
//! The photometric state engine, duty derivation, the anti-flash guard and
//! the attribute mapping live here.  All interaction with hardware, storage
//! and the network happens through **port traits** defined in [`ports`],
//! so this layer is fully testable without real peripherals.

pub mod attributes;
pub mod commands;
pub mod engine;
pub mod guard;
pub mod input;
pub mod photometry;
pub mod ports;
pub mod presets;
pub mod report;
pub mod state;
