use std::process::ExitCode;

fn main() -> ExitCode {
    match reminisce_flow::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
