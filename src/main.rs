use std::process::ExitCode;

fn main() -> ExitCode {
    bookscout::run()
}
