//! rankbridge - Main CLI Entry Point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use rankbridge::boundary;
use rankbridge::cli::{Args, Commands, Verbosity};
use rankbridge::client::RetrievalClient;
use rankbridge::config::Config;
use rankbridge::scorers::ScorerSet;
use rankbridge::types::QueryParams;
use rankbridge::{Pipeline, PipelineDefaults};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(message) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(2);
    }

    let config = Config::load(args.config.as_deref())?;

    match &args.command {
        Some(Commands::Config) => show_config(&config),
        Some(Commands::Ping) => ping(&config).await,
        None => run_query(&args, &config).await,
    }
}

fn show_config(config: &Config) -> Result<()> {
    println!("Config file: {}", Config::config_path()?.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn ping(config: &Config) -> Result<()> {
    config.validate_service()?;
    let client = build_client(config)?;

    if client.ping().await {
        println!("{} Retrieval backend is reachable", "OK".green().bold());
        Ok(())
    } else {
        eprintln!(
            "{} Retrieval backend is not reachable at {}",
            "Error:".red().bold(),
            config.service.url
        );
        std::process::exit(1);
    }
}

async fn run_query(args: &Args, config: &Config) -> Result<()> {
    config.validate_service()?;
    let verbosity = args.verbosity();

    let feature_file = args
        .scorer_config
        .clone()
        .or_else(|| config.scorers.feature_file.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No scorer configuration: set --scorer-config or scorers.feature_file")
        })?;
    let scorers = Arc::new(ScorerSet::from_file(&feature_file)?);

    let answer_dir: PathBuf = args
        .answer_dir
        .clone()
        .or_else(|| config.defaults.answer_dir.clone())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&answer_dir)?;

    if verbosity != Verbosity::Quiet {
        eprintln!("Service URL   : {}", config.service.url);
        eprintln!("Cluster       : {}", config.service.cluster_id);
        eprintln!("Collection    : {}", config.service.collection);
        eprintln!("Scorers       : {} configured", scorers.len());
        eprintln!("Answer files  : {}", answer_dir.display());
    }

    let client = build_client(config)?;
    let pipeline = Pipeline::new(
        scorers,
        client,
        answer_dir,
        PipelineDefaults {
            search_rows: config.defaults.search_rows,
            rerank_rows: config.defaults.rerank_rows,
        },
    );

    let raw = args.to_raw_params();
    let params = match QueryParams::from_raw(&raw) {
        Ok(params) => params,
        Err(err) => {
            let (status, body) = boundary::error_response(&err);
            eprintln!("{} [{}] {}", "Error:".red().bold(), status, body["message"]);
            std::process::exit(2);
        }
    };

    match pipeline.fcselect(&params).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            let (status, body) = boundary::error_response(&err);
            eprintln!("{} [{}]", "Request failed".red().bold(), status);
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}

fn build_client(config: &Config) -> Result<RetrievalClient> {
    let s = &config.service;
    Ok(RetrievalClient::new(
        &s.url,
        &s.username,
        &s.password,
        &s.cluster_id,
        &s.collection,
    )?)
}
