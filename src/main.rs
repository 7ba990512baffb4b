use std::process::ExitCode;

use da_live_mcp_gateway::{cli, infra};

#[tokio::main]
async fn main() -> ExitCode {
    infra::logging::init();
    cli::run().await
}
