//! Attribute report bridge.
//!
//! Turns a state snapshot into the three attribute reports a controller
//! cares about and pushes them through the [`ReportSink`] port.  Delivery
//! failures are logged and the remaining reports still go out.

use log::{debug, warn};

use super::attributes::{attr, cluster, AttrValue};
use super::ports::ReportSink;
use super::state::LightState;

/// One attribute value to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeReport {
    pub cluster: u16,
    pub attribute: u16,
    pub value: AttrValue,
}

/// OnOff, CurrentLevel and ColorTemperature for `state`, in that order.
pub fn reports_for(state: &LightState) -> [AttributeReport; 3] {
    [
        AttributeReport {
            cluster: cluster::ON_OFF,
            attribute: attr::ON_OFF,
            value: AttrValue::Bool(state.is_on),
        },
        AttributeReport {
            cluster: cluster::LEVEL,
            attribute: attr::CURRENT_LEVEL,
            value: AttrValue::U8(state.brightness),
        },
        AttributeReport {
            cluster: cluster::COLOR_CONTROL,
            attribute: attr::COLOR_TEMPERATURE,
            value: AttrValue::U16(state.mireds),
        },
    ]
}

pub struct ReportBridge {
    sink: Box<dyn ReportSink>,
}

impl ReportBridge {
    pub fn new(sink: Box<dyn ReportSink>) -> Self {
        Self { sink }
    }

    /// Publish `state`.  Returns how many reports were accepted.
    pub fn publish(&mut self, state: &LightState) -> usize {
        let mut sent = 0;
        for report in reports_for(state) {
            match self.sink.send_report(&report) {
                Ok(()) => sent += 1,
                Err(e) => warn!(
                    "ReportBridge: cluster 0x{:04x} attr 0x{:04x} not sent: {}",
                    report.cluster, report.attribute, e
                ),
            }
        }
        debug!("ReportBridge: {}/3 reports sent", sent);
        sent
    }
}
