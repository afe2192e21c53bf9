use anyhow::Result;
use clap::{Parser, Subcommand};

mod catalog;
mod cmd;
mod utils;

use cmd::{ExecArgs, GetArgs, ListArgs};

/// Invoke - call methods on built-in demo objects by name
///
/// Command layout:
///   invoke list <targets|methods> [--json] [-t <target>]
///   invoke get  <methods|method> [NAME] [--json] [-t <target>]
///   invoke exec <METHOD> [--param RAW ...] [--params JSON_ARRAY] [--param-file PATH] [-t <target>] [--json]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   -t / --target   Default target (or INVOKE_TARGET env)
///   RUST_LOG        Overrides the log filter derived from -v / -q
///
/// Targets:
///   example   ExampleStruct record (ExampleFunc)
///   counter   Counter record (Add, Divide, Get, Rename, Reset)
///   int       a plain integer; every call is rejected as not a record
///   nil       no object; every call is rejected as a nil target
///
/// Examples:
///   invoke list methods -t counter
///   invoke get method ExampleFunc -t example --json
///   invoke exec ExampleFunc -t example --params '[100, "x", [1, 2], 10]' --json
///   invoke exec Add -t counter --param 5
#[derive(Parser, Debug)]
#[command(
    name = "invoke",
    version,
    author,
    about = "Invoke - dynamic method dispatch by name with typed or raw JSON arguments",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Default target (example|counter|int|nil)
    #[arg(short = 't', long = "target", global = true, value_name = "TARGET")]
    target: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List targets or method names
    List(ListArgs),

    /// Get method signatures
    Get(GetArgs),

    /// Execute (invoke) a method with raw JSON payloads
    Exec(ExecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // CLI flag > INVOKE_TARGET env
    let global_target = cli.target.clone().or_else(|| {
        std::env::var("INVOKE_TARGET")
            .ok()
            .filter(|s| !s.trim().is_empty())
    });

    if let Some(t) = &global_target
        && let Err(e) = catalog::parse_target(t)
    {
        eprintln!("Invalid target '{}': {e}", t);
        std::process::exit(2);
    }

    match cli.command {
        Commands::List(mut args) => {
            if args.target.is_none() {
                args.target = global_target;
            }
            cmd::execute_list(args)
        }
        Commands::Get(mut args) => {
            if args.target.is_none() {
                args.target = global_target;
            }
            cmd::execute_get(args)
        }
        Commands::Exec(mut args) => {
            if args.target.is_none() {
                args.target = global_target;
            }
            cmd::execute_exec(args)
        }
    }
}
