use std::process::ExitCode;

fn main() -> ExitCode {
    match disease_progression::runner::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
