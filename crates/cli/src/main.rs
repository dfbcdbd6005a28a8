use std::process::ExitCode;

fn main() -> ExitCode {
    cellquote_cli::run()
}
