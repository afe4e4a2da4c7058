//! mib-walk: walk or query the built-in demonstration MIB.
//!
//! Part of the snmp-mib CLI utilities.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use snmp_mib::cli::args::{OutputArgs, parse_oid};
use snmp_mib::cli::demo;
use snmp_mib::cli::output::{OperationType, OutputContext, write_statistics};
use snmp_mib::{Error, Oid, VarBind, VarBindError};

/// Walk the demonstration MIB with GETNEXT, or read single objects.
#[derive(Debug, Parser)]
#[command(name = "mib-walk", version, about)]
struct Args {
    #[command(flatten)]
    output: OutputArgs,

    /// Subtree to walk (dotted notation). Defaults to the whole MIB view.
    #[arg(long, value_name = "OID", conflicts_with_all = ["get", "next"])]
    start: Option<String>,

    /// Read exactly this object instead of walking.
    #[arg(long, value_name = "OID", conflicts_with = "next")]
    get: Option<String>,

    /// Read the object following this OID instead of walking.
    #[arg(long, value_name = "OID")]
    next: Option<String>,

    /// Print the demonstration MIB bases and exit.
    #[arg(long)]
    list: bool,

    /// Print elapsed time after the results.
    #[arg(long)]
    timing: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    if args.list {
        for (oid, name) in demo::subtrees() {
            println!("{oid}\t{name}");
        }
        return ExitCode::SUCCESS;
    }

    let (operation, oid) = match operation(&args) {
        Ok(op) => op,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let demo = match demo::build() {
        Ok(demo) => demo,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let (varbinds, errors) = run(&demo.registry, operation, oid);
    let elapsed = start.elapsed();

    let ctx = OutputContext {
        format: args.output.format,
        force_hex: args.output.hex,
    };
    let timing = args.timing.then_some(elapsed);
    let status = match ctx.write_results(operation, &varbinds, &errors, timing) {
        Ok(()) if errors.is_empty() => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        }
    };

    if args.output.stats
        && let Err(e) = write_statistics(args.output.format, &demo.statistics.snapshot())
    {
        eprintln!("Error writing statistics: {}", e);
    }

    demo.shutdown();
    status
}

fn operation(args: &Args) -> snmp_mib::Result<(OperationType, Oid)> {
    if let Some(oid) = &args.get {
        return Ok((OperationType::Get, parse_oid(oid)?));
    }
    if let Some(oid) = &args.next {
        return Ok((OperationType::GetNext, parse_oid(oid)?));
    }
    let oid = match &args.start {
        Some(oid) => parse_oid(oid)?,
        None => Oid::new(),
    };
    Ok((OperationType::Walk, oid))
}

fn run(
    registry: &snmp_mib::MibRegistry,
    operation: OperationType,
    oid: Oid,
) -> (Vec<VarBind>, Vec<VarBindError>) {
    match operation {
        OperationType::Get => match registry.get(&oid) {
            Ok(vb) => (vec![vb], Vec::new()),
            Err(e) => (Vec::new(), vec![e]),
        },
        OperationType::GetNext => match registry.get_next(&oid) {
            Ok(vb) => (vec![vb], Vec::new()),
            Err(e) => (Vec::new(), vec![e]),
        },
        OperationType::Walk => {
            let mut varbinds = Vec::new();
            let mut errors = Vec::new();
            // a failed read is reported and the walk goes on
            for result in registry.walk(oid) {
                match result {
                    Ok(vb) => varbinds.push(vb),
                    Err(Error::VarBind(e)) => errors.push(e),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        break;
                    }
                }
            }
            (varbinds, errors)
        }
    }
}
