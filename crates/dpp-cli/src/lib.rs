//! CLI library components for the DPP bridge.

pub mod logging;
