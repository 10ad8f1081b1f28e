use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = abtest_cli::build_cli().get_matches();
    let mut out = std::io::stdout();

    match abtest_cli::run(&matches, &mut out).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
