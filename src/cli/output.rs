//! Result rendering for the CLI tools.
//!
//! Human output mimics the net-snmp tools (`OID = TYPE: value`); JSON and
//! raw output are meant for scripts.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::stats::{Counter, StatisticsSnapshot};
use crate::{Value, VarBind, VarBindError};

/// Which registry operation produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Get,
    GetNext,
    Walk,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::GetNext => write!(f, "GETNEXT"),
            Self::Walk => write!(f, "WALK"),
        }
    }
}

/// Result of an operation, ready for output.
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub operation: String,
    pub results: Vec<VarBindResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<f64>,
}

/// A single varbind result.
#[derive(Debug, Serialize)]
pub struct VarBindResult {
    pub oid: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// A per-varbind failure.
#[derive(Debug, Serialize)]
pub struct ErrorResult {
    pub oid: String,
    pub status: String,
    pub code: i32,
}

impl From<&VarBindError> for ErrorResult {
    fn from(e: &VarBindError) -> Self {
        Self {
            oid: e.oid.to_string(),
            status: e.status().to_string(),
            code: e.status().as_i32(),
        }
    }
}

/// Selected format and rendering switches.
pub struct OutputContext {
    pub format: OutputFormat,
    pub force_hex: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            force_hex: false,
        }
    }

    /// Render and print to stdout.
    pub fn write_results(
        &self,
        operation: OperationType,
        varbinds: &[VarBind],
        errors: &[VarBindError],
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let result = self.build_result(operation, varbinds, errors, elapsed);
        let mut stdout = io::stdout().lock();
        self.write_to(&mut stdout, &result)
    }

    pub fn write_to<W: Write>(&self, w: &mut W, result: &OperationResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => self.write_human(w, result),
            OutputFormat::Json => self.write_json(w, result),
            OutputFormat::Raw => self.write_raw(w, result),
        }
    }

    pub fn build_result(
        &self,
        operation: OperationType,
        varbinds: &[VarBind],
        errors: &[VarBindError],
        elapsed: Option<Duration>,
    ) -> OperationResult {
        OperationResult {
            operation: operation.to_string(),
            results: varbinds.iter().map(|vb| self.format_varbind(vb)).collect(),
            errors: errors.iter().map(ErrorResult::from).collect(),
            timing_ms: elapsed.map(|d| d.as_secs_f64() * 1000.0),
        }
    }

    fn format_varbind(&self, vb: &VarBind) -> VarBindResult {
        let Rendered {
            type_name,
            value,
            formatted,
        } = Rendered::of(&vb.value, self.force_hex);
        VarBindResult {
            oid: vb.oid.to_string(),
            value_type: type_name.to_owned(),
            value,
            formatted,
        }
    }

    fn write_human<W: Write>(&self, w: &mut W, result: &OperationResult) -> io::Result<()> {
        for vb in &result.results {
            match (&vb.formatted, &vb.value) {
                (Some(text), _) => writeln!(w, "{} = {}: {}", vb.oid, vb.value_type, text)?,
                (None, serde_json::Value::String(s)) => {
                    writeln!(w, "{} = {}: \"{}\"", vb.oid, vb.value_type, s)?
                }
                (None, other) => writeln!(w, "{} = {}: {}", vb.oid, vb.value_type, plain(other))?,
            }
        }
        for e in &result.errors {
            writeln!(w, "Error in response: {} ({}) at {}", e.status, e.code, e.oid)?;
        }
        if let Some(ms) = result.timing_ms {
            writeln!(w, "\nTiming: {:.3}ms", ms)?;
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, w: &mut W, result: &OperationResult) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, result).map_err(io::Error::other)?;
        writeln!(w)
    }

    fn write_raw<W: Write>(&self, w: &mut W, result: &OperationResult) -> io::Result<()> {
        for vb in &result.results {
            writeln!(w, "{}\t{}", vb.oid, plain(&vb.value))?;
        }
        Ok(())
    }
}

/// A JSON value as bare text: strings unquoted, null empty.
fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One value split into its SMI type name, its JSON form and an optional
/// display form that overrides the JSON form in human output.
struct Rendered {
    type_name: &'static str,
    value: serde_json::Value,
    formatted: Option<String>,
}

impl Rendered {
    fn new(type_name: &'static str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            type_name,
            value: value.into(),
            formatted: None,
        }
    }

    fn with_text(mut self, text: impl Into<String>) -> Self {
        self.formatted = Some(text.into());
        self
    }

    fn exception(type_name: &'static str, text: &str) -> Self {
        Self::new(type_name, serde_json::Value::Null).with_text(text)
    }

    fn of(value: &Value, force_hex: bool) -> Self {
        match value {
            Value::Integer(v) => Self::new("INTEGER", *v),
            Value::OctetString(bytes) if force_hex || !is_printable(bytes) => {
                Self::new("Hex-STRING", hex_string(bytes)).with_text(format_hex_string(bytes))
            }
            Value::OctetString(bytes) => {
                Self::new("STRING", String::from_utf8_lossy(bytes).into_owned())
            }
            Value::Null => Self::new("NULL", serde_json::Value::Null),
            Value::ObjectIdentifier(oid) => Self::new("OID", oid.to_string()),
            Value::IpAddress(octets) => {
                Self::new("IpAddress", std::net::Ipv4Addr::from(*octets).to_string())
            }
            Value::Counter32(v) => Self::new("Counter32", *v),
            Value::Gauge32(v) => Self::new("Gauge32", *v),
            Value::TimeTicks(v) => Self::new("TimeTicks", *v).with_text(format!("({}) {}", v, value)),
            Value::Opaque(bytes) => {
                Self::new("Opaque", hex_string(bytes)).with_text(format_hex_string(bytes))
            }
            Value::Counter64(v) => Self::new("Counter64", *v),
            Value::NoSuchObject => Self::exception("NoSuchObject", "No Such Object available"),
            Value::NoSuchInstance => {
                Self::exception("NoSuchInstance", "No Such Instance currently exists")
            }
            Value::EndOfMibView => {
                Self::exception("EndOfMibView", "No more variables left in this MIB View")
            }
        }
    }
}

/// Write the non-zero request counters to stderr.
pub fn write_statistics(format: OutputFormat, snapshot: &StatisticsSnapshot) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(snapshot).map_err(io::Error::other)?;
            writeln!(stderr, "{}", json)
        }
        OutputFormat::Human | OutputFormat::Raw => {
            writeln!(stderr, "--- Statistics ---")?;
            for &counter in Counter::ALL {
                let n = snapshot.get(counter);
                if n != 0 {
                    writeln!(stderr, "{:<24} {}", counter.name(), n)?;
                }
            }
            Ok(())
        }
    }
}

/// Graphic ASCII and whitespace only.
fn is_printable(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
}

/// Lowercase hex, no separator.
fn hex_string(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Uppercase hex octets separated by spaces.
fn format_hex_string(bytes: &[u8]) -> String {
    let spaced: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
    spaced.join(" ")
}
