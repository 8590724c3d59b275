// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::OptimizeRequest;
use crate::client::{GatewayClient, DEFAULT_BASE_URL};
use crate::config::DEFAULT_PORT;
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

/// Model gateway CLI
#[derive(Parser, Debug)]
#[command(name = "gateway-cli")]
#[command(version)]
#[command(about = "CLI tools for talking to a running model gateway", long_about = None)]
pub struct Cli {
    /// Gateway base URL [default: http://localhost:8080]
    #[arg(long, global = true, env = "GATEWAY_URL")]
    pub url: Option<String>,

    /// Host read by older client setups; only used when no URL is given
    #[arg(long = "legacy-host", global = true, env = "GOMLX_HOST", hide = true)]
    pub legacy_host: Option<String>,

    /// Port read by older client setups; only used when no URL is given
    #[arg(long = "legacy-port", global = true, env = "GOMLX_PORT", hide = true)]
    pub legacy_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the gateway is alive
    Health,

    /// Generate an embedding for a text
    Embed(EmbedArgs),

    /// Optimize a model artifact
    Optimize(OptimizeArgs),
}

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Text to embed (may be empty)
    pub text: String,

    /// Print the full vector instead of a summary
    #[arg(long)]
    pub full: bool,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Path of the model to optimize
    pub model_path: String,

    /// Training data location
    #[arg(long)]
    pub training_data: Option<String>,

    /// Where to write the optimized model
    #[arg(long)]
    pub output_path: Option<String>,
}

impl From<OptimizeArgs> for OptimizeRequest {
    fn from(args: OptimizeArgs) -> Self {
        OptimizeRequest {
            model_path: args.model_path,
            training_data: args.training_data,
            output_path: args.output_path,
        }
    }
}

impl Cli {
    /// `--url`/`GATEWAY_URL`, else `http://GOMLX_HOST:GOMLX_PORT` when either
    /// is set, else [`DEFAULT_BASE_URL`]
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        if self.legacy_host.is_none() && self.legacy_port.is_none() {
            return DEFAULT_BASE_URL.to_string();
        }

        let host = self.legacy_host.as_deref().unwrap_or("localhost");
        let port = self.legacy_port.unwrap_or(DEFAULT_PORT);
        if host.contains(':') && !host.starts_with('[') {
            format!("http://[{}]:{}", host, port)
        } else {
            format!("http://{}:{}", host, port)
        }
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let client = GatewayClient::new(cli.base_url());

    match cli.command {
        Commands::Health => {
            if !client.health_check().await {
                bail!("gateway at {} is not healthy", client.base_url());
            }
            println!("✅ {} is healthy", client.base_url());
        }
        Commands::Embed(args) => {
            let embedding = client.generate_embedding(&args.text).await?;
            if args.full {
                println!("{}", serde_json::to_string(&embedding)?);
            } else {
                let preview: Vec<String> = embedding
                    .iter()
                    .take(5)
                    .map(|v| format!("{:.4}", v))
                    .collect();
                println!("dimension: {}", embedding.len());
                println!("preview:   [{}, ...]", preview.join(", "));
            }
        }
        Commands::Optimize(args) => {
            let response = client.optimize_model(&args.into()).await?;
            println!("✅ {}", response.message);
            println!("output:  {}", response.output_path);
            for (name, value) in &response.metrics {
                println!("{:<12} {}", name, value);
            }
        }
    }

    Ok(())
}
