use std::process::ExitCode;

fn main() -> ExitCode {
    layerquote_cli::run()
}
