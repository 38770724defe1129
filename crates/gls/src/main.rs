mod args;
mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(cli::run(std::env::args())) {
        Ok(code) => code,
        Err(e) => {
            eprint!("{}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// The error and every cause beneath it, one per line.
fn error_report(error: &anyhow::Error) -> String {
    let mut report = format!("Error: {error}\n");
    for cause in error.chain().skip(1) {
        report.push_str(&format!("Caused by: {cause}\n"));
    }
    report
}
