//! Counts pulses on a GPIO and reports them to an HTTP collector.
//!
//! Everything in this library is hardware-independent. The ESP-IDF glue
//! (Wi-Fi, SNTP, HTTP client, interrupts) lives in the firmware binary.

pub mod cadence;
pub mod clock;
pub mod config;
pub mod counter;
pub mod link;
pub mod payload;
pub mod report;
pub mod upload;

pub use counter::{EdgeCounter, PulseCount};
pub use report::{Reporter, Tick, UploadOutcome};
