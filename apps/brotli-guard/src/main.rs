//! brotli-guard - report whether Brotli support is usable.

use brotli_guard::cli::{Cli, init_tracing, run};
use brotli_guard_core::{brotli, error_chain};
use clap::Parser;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let probe = brotli::probe();
    let mut stdout = io::stdout().lock();

    match run(&cli.command, probe, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let chain = error_chain(&err);
            eprintln!("error: {}", chain.join("\n  caused by: "));
            ExitCode::from(err.exit_code())
        }
    }
}
