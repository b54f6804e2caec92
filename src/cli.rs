use crate::config::AppConfig;
use crate::indicators::IndicatorRegistry;
use crate::market::JsonFileProvider;
use crate::processor::{TechnicalRequest, TechnicalsService};
use crate::utils::today;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "stock-technicals")]
#[command(about = "Technical indicators over daily price series", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./technicals.{toml,json,yaml} if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available indicators with their default configuration
    List {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Evaluate indicators for a symbol
    Evaluate {
        /// Symbol (e.g., "AAPL")
        #[arg(short, long)]
        symbol: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,

        /// Comma-separated indicator names (e.g., "SMA,RSI,MACD")
        #[arg(short, long, default_value = "")]
        indicators: String,

        /// Indicator parameter as INDICATOR.param=value, repeatable
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Directory holding <SYMBOL>.json quote files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Write results to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Splits `KEY=VALUE` at the first `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn execute_command(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::List { pretty } => {
            let catalog = IndicatorRegistry::shared().metadata();
            println!("{}", to_json(&catalog, pretty || config.pretty)?);
        }

        Commands::Evaluate {
            symbol,
            start_date,
            end_date,
            indicators,
            params,
            data_dir,
            pretty,
            output,
        } => {
            let mut pairs = vec![
                ("symbol".to_string(), symbol),
                ("indicators".to_string(), indicators),
            ];
            if let Some(start) = start_date {
                pairs.push(("startDate".to_string(), start));
            }
            if let Some(end) = end_date {
                pairs.push(("endDate".to_string(), end));
            }
            pairs.extend(params);

            let today = today(config.timezone()?);
            let request = TechnicalRequest::from_params(pairs, today, config.lookback_days)?;
            let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
            let service = TechnicalsService::new(
                IndicatorRegistry::shared(),
                Arc::new(JsonFileProvider::new(data_dir)),
            );

            let records = service.handle(&request).await?;
            let json = to_json(&records, pretty || config.pretty)?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} records to {}", records.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}
