//! Fuzz target: `decode_raw`
//!
//! Drives arbitrary (cluster, attribute, type tag, payload) tuples into the
//! attribute decoder and asserts that it never panics and that every
//! accepted write carries an in-range startup code.
//!
//! cargo fuzz run fuzz_attribute_decode

#![no_main]

use cctlight::app::attributes::decode_raw;
use cctlight::app::commands::LightCommand;
use cctlight::app::state::StartupBehavior;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }
    let cluster = u16::from_le_bytes([data[0], data[1]]);
    let attribute = u16::from_le_bytes([data[2], data[3]]);
    let type_tag = data[4];

    if let Ok(LightCommand::SetStartupBehavior(b)) = decode_raw(cluster, attribute, type_tag, &data[5..]) {
        assert_eq!(StartupBehavior::from_code(b.code()), Some(b));
    }
});
