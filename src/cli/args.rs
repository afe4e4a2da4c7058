//! Command-line arguments shared by the CLI tools.

use clap::{Args, ValueEnum};

use crate::Oid;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `OID = TYPE: value`, one per line.
    #[default]
    Human,
    /// A single pretty-printed JSON document.
    Json,
    /// `OID<TAB>value`, one per line.
    Raw,
}

/// Output and diagnostics options.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format.
    #[arg(long, short = 'O', value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Print OCTET STRING values as hex even when printable.
    #[arg(long)]
    pub hex: bool,

    /// Print request counters to stderr when done.
    #[arg(long)]
    pub stats: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl OutputArgs {
    /// Install a `tracing` subscriber on stderr.
    ///
    /// `RUST_LOG` takes precedence over `-v`.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let default = match self.verbose {
            0 => "snmp_mib=warn",
            1 => "snmp_mib=debug",
            _ => "snmp_mib=trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Parse an OID argument in dotted notation.
pub fn parse_oid(s: &str) -> crate::Result<Oid> {
    Oid::parse(s.trim())
}
