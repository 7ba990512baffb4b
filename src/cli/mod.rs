use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::DaAdminClient;
use crate::domain::{ContentRepository, Payload};
use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "da-live-mcp-gateway")]
#[command(about = "DA Live Admin MCP Gateway")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (default)
    Serve,
    /// Health check the service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Show service status
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Test DA Admin connectivity by listing a repository
    ListSources {
        #[arg(long)]
        org: String,
        #[arg(long)]
        repo: String,
        /// Path within the repository; root when omitted
        #[arg(long)]
        path: Option<String>,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::ListSources { org, repo, path } => match list_sources(&org, &repo, path.as_deref()).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ DA Admin request failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env_and_toml()?;
    config.validate()?;
    Ok(())
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let health_response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    let tools_response = client
        .post(format!("{}/mcp", url))
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list",
            "params": {}
        }))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await;

    match tools_response {
        Ok(resp) if resp.status().is_success() => {
            let count = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["result"]["tools"].as_array().map(Vec::len));
            match count {
                Some(n) => println!("🔧 Tools: ✅ {} available", n),
                None => println!("🔧 Tools: ❌ Unexpected response"),
            }
        }
        Ok(resp) => {
            println!("🔧 Tools: ❌ HTTP {}", resp.status());
        }
        Err(_) => {
            println!("🔧 Tools: ❌ Unavailable");
        }
    }

    let cfg = Config::from_env();
    println!("\n📋 Configuration:");
    println!("  Mode: {}", cfg.mode);
    println!("  Port: {}", cfg.port);
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );
    println!("  DA Admin: {} (timeout {} ms)", cfg.da_admin.base_url, cfg.da_admin.timeout_ms);
    println!(
        "  Credential: {}",
        if cfg.da_admin.api_token.is_some() { "configured" } else { "missing" }
    );

    Ok(())
}

async fn list_sources(org: &str, repo: &str, path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env_and_toml()?;
    cfg.da_admin.validate()?;
    let client = DaAdminClient::from_config(&cfg.da_admin)?;

    match client.list_sources(org, repo, path).await? {
        Payload::Json(listing) => {
            println!("📂 {}/{}/{} ({} entries)", org, repo, path.unwrap_or_default(), listing.sources.len());
            for source in listing.sources {
                println!("  {:?}  {}", source.kind, source.path);
            }
        }
        Payload::Raw(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Payload::Text(text) => println!("{}", text),
    }
    Ok(())
}
