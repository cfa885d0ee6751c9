use std::io::{self, Write};
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use parg_simple::arguments::{parse_args, usage};
use parg_simple::error::Result;

/// Log filter variable, e.g. `PARG_LOG=debug`.
const LOG_ENV: &str = "PARG_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(argv: &[String]) -> Result<()> {
    let cmdline = parse_args(argv)?;
    let mut out = io::stdout().lock();

    if cmdline.help {
        let exe = argv.first().map_or("simple", String::as_str);
        write!(out, "{}", usage(exe))?;
        return Ok(());
    }

    for arg in &cmdline.args {
        writeln!(out, "arg: {}", arg)?;
    }

    writeln!(out, "verbose={}", cmdline.verbose)?;
    writeln!(out, "output={}", cmdline.output.unwrap_or("(none)"))?;
    writeln!(out, "size={}", cmdline.size)?;

    info!(
        verbose = cmdline.verbose,
        size = cmdline.size,
        args = cmdline.args.len(),
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let argv: Vec<String> = std::env::args().collect();
    match run(&argv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
