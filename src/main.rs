use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    intelrun::app::startup::startup().await
}
