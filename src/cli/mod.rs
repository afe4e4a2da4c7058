//! CLI utilities for snmp-mib.
//!
//! Argument parsing, output formatting and the demonstration MIB used by
//! the `mib-walk` tool.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod demo;
pub mod output;
