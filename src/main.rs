//! Binary entry point: parses CLI arguments, executes the command, and
//! reports the exit code per `spec.md` §6 (`0` success, `1` usage/empty
//! terminal conditions).

use std::io::Write as _;
use std::process::ExitCode;

use clap::Parser as _;
use ragrs::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match ragrs::cli::execute(&cli) {
        Ok(output) => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            if handle.write_all(output.as_bytes()).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let stderr = std::io::stderr();
            let mut handle = stderr.lock();
            let _ = writeln!(handle, "error: {e}");
            ExitCode::FAILURE
        }
    }
}
