//! Wire format of a single telemetry upload.
//!
//! The body looks like `{"timestamp":1700000000, "data":{"pulseCount":42}}`:
//! compact JSON except for one space after each top-level comma, which
//! existing collectors already expect.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

use crate::counter::PulseCount;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readings {
    pub pulse_count: PulseCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    /// Epoch seconds, or zero when network time is unavailable.
    pub timestamp: u64,
    pub data: Readings,
}

impl Telemetry {
    pub fn new(timestamp: Option<u64>, pulse_count: PulseCount) -> Self {
        Self { timestamp: timestamp.unwrap_or(0), data: Readings { pulse_count } }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut body = Vec::with_capacity(64);
        let mut ser = Serializer::with_formatter(&mut body, WireFormatter::default());
        self.serialize(&mut ser)?;
        Ok(body)
    }
}

#[derive(Default)]
struct WireFormatter {
    depth: usize,
}

impl Formatter for WireFormatter {
    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        match (first, self.depth) {
            (true, _) => Ok(()),
            (false, 1) => writer.write_all(b", "),
            (false, _) => writer.write_all(b","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Telemetry;

    fn body(telemetry: &Telemetry) -> String {
        String::from_utf8(telemetry.to_json().unwrap()).unwrap()
    }

    #[test]
    fn matches_collector_layout() {
        let telemetry = Telemetry::new(Some(1_700_000_000), 42);
        assert_eq!(body(&telemetry), r#"{"timestamp":1700000000, "data":{"pulseCount":42}}"#);
    }

    #[test]
    fn missing_time_becomes_zero() {
        let telemetry = Telemetry::new(None, 7);
        assert_eq!(telemetry.timestamp, 0);
        assert_eq!(body(&telemetry), r#"{"timestamp":0, "data":{"pulseCount":7}}"#);
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = Telemetry::new(Some(1_234), u32::MAX).to_json().unwrap();
        let second = Telemetry::new(Some(1_234), u32::MAX).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn body_is_valid_json() {
        let bytes = Telemetry::new(Some(99), 3).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["timestamp"], 99);
        assert_eq!(value["data"]["pulseCount"], 3);
    }
}
