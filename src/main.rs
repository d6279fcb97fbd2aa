//! edgar-rag - Main CLI entry point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use edgar_rag::analytics::AnalyticsService;
use edgar_rag::cli::{Args, Commands};
use edgar_rag::config::Config;
use edgar_rag::doctor::Doctor;
use edgar_rag::embeddings::TitanEmbeddingClient;
use edgar_rag::graph::GraphClient;
use edgar_rag::llm::{BedrockChatClient, RetryPolicy};
use edgar_rag::rag::{ContextBuilder, RagPipeline};
use edgar_rag::telemetry::{TelemetryCollector, TelemetryDisplay};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{}: {}", "Error".red(), msg);
        std::process::exit(2);
    }

    let config = load_config(&args)?;

    match &args.command {
        Some(Commands::Overview { top }) => {
            run_overview(&config, *top).await?;
        }
        Some(Commands::Doctor) => {
            run_doctor(config).await?;
        }
        Some(Commands::Config) => {
            show_config(&config);
        }
        None => {
            // validate() guarantees the question is present here
            if let Some(question) = &args.question {
                run_ask(&args, &config, question).await?;
            }
        }
    }

    Ok(())
}

/// Load configuration from an explicit path or the default location,
/// with environment overrides applied
fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Config::load(),
    }
}

async fn run_ask(args: &Args, config: &Config, question: &str) -> Result<()> {
    let graph = Arc::new(GraphClient::new(&config.graph)?);
    let embedder = Arc::new(TitanEmbeddingClient::new(
        &config.bedrock,
        &config.models.embedding,
    )?);
    let chat = Arc::new(BedrockChatClient::new(
        &config.bedrock,
        config.summary_model(),
    )?);

    let telemetry = TelemetryCollector::new();
    let pipeline = RagPipeline::new(
        ContextBuilder::new(embedder, graph, config.retrieval.clone()),
        chat,
        RetryPolicy::from_config(&config.retry),
        telemetry.clone(),
    );

    let verbosity = args.verbosity();
    let spinner = if verbosity.show_progress() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Asking {}...", config.summary_model()));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let answer = pipeline.answer(question).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match answer {
        Ok(result) => {
            if args.show_context {
                println!("{}", "Context".bold());
                println!("{}", result.context.dimmed());
                println!();
            }
            println!("{}", result.result);

            if verbosity.show_summary() {
                TelemetryDisplay::new(telemetry).display_summary();
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            if verbosity.show_summary() {
                TelemetryDisplay::new(telemetry).display_summary();
            }
            std::process::exit(1);
        }
    }
}

async fn run_overview(config: &Config, top: usize) -> Result<()> {
    let graph = Arc::new(GraphClient::new(&config.graph)?);
    let analytics = AnalyticsService::new(graph);

    let overview = analytics.overview().await?;
    let holdings = analytics.top_holdings(top).await?;

    println!("\n{}", "Ownership Graph Overview".bold());
    println!("─────────────────────────────────────");
    println!("Managers:                {}", overview.managers);
    println!("Companies:               {}", overview.companies);
    println!(
        "Total assets (billions): {:.1}",
        overview.assets_in_billions
    );

    if !holdings.is_empty() {
        println!("\n{}", "Largest Holdings".bold());
        println!("─────────────────────────────────────");
        for holding in &holdings {
            println!(
                "{:<28} {:<28} {:>8.1}B",
                holding.manager, holding.company, holding.value_in_billions
            );
        }
    }
    println!();

    Ok(())
}

async fn run_doctor(config: Config) -> Result<()> {
    let doctor = Doctor::new(config);

    let report = doctor.run_checks().await?;
    report.print();

    std::process::exit(if report.is_healthy() { 0 } else { 1 });
}

fn show_config(config: &Config) {
    println!("\n{}", "edgar-rag Configuration".bold());
    println!("─────────────────────────────────────");
    println!("Graph:");
    println!("  URL:       {}", config.graph.url);
    println!("  Database:  {}", config.graph.database);
    println!();
    println!("Bedrock:");
    println!("  Endpoint:  {}", config.bedrock.endpoint);
    println!();
    println!("Models:");
    println!("  Summary:   {}", config.summary_model());
    println!("  Embedding: {}", config.models.embedding);
    println!();
    println!("Retrieval:");
    println!("  Index:     {}", config.retrieval.vector_index);
    println!("  Top k:     {}", config.retrieval.top_k);
    println!("  Score agg: {}", config.retrieval.aggregation.cypher_fn());
    println!();
    println!("Retry:");
    println!("  Attempts:  {}", config.retry.max_attempts);
    println!("  Delay:     {}s", config.retry.delay_secs);
    println!();
}
