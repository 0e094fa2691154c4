//! Log-based report sink adapter.
//!
//! Implements [`ReportSink`] by writing attribute reports to the ESP-IDF
//! logger (UART / USB-CDC in production).  Used when no mesh stack is
//! linked; a Zigbee adapter would implement the same trait.

use log::info;

use crate::app::attributes::{cluster, AttrValue};
use crate::app::ports::{ReportError, ReportSink};
use crate::app::report::AttributeReport;

/// Adapter that logs every [`AttributeReport`] to the serial console.
#[derive(Default)]
pub struct LogReportSink {
    sent: u32,
}

impl LogReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports written so far.
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

fn cluster_name(id: u16) -> &'static str {
    match id {
        cluster::ON_OFF => "OnOff",
        cluster::LEVEL => "Level",
        cluster::COLOR_CONTROL => "ColorControl",
        cluster::IDENTIFY => "Identify",
        _ => "?",
    }
}

impl ReportSink for LogReportSink {
    fn send_report(&mut self, report: &AttributeReport) -> Result<(), ReportError> {
        let name = cluster_name(report.cluster);
        match report.value {
            AttrValue::Bool(v) => info!("REPORT | {} 0x{:04x} = {}", name, report.attribute, v),
            AttrValue::U8(v) | AttrValue::Enum8(v) => {
                info!("REPORT | {} 0x{:04x} = {}", name, report.attribute, v);
            }
            AttrValue::U16(v) => info!("REPORT | {} 0x{:04x} = {}", name, report.attribute, v),
        }
        self.sent += 1;
        Ok(())
    }
}
