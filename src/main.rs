use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    reqdiag_cli::run()
}
