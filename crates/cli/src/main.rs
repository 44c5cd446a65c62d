use std::process::ExitCode;

fn main() -> ExitCode {
    quotecanvas_cli::run()
}
