use std::process::ExitCode;

fn main() -> ExitCode {
    threadload::entry::run()
}
