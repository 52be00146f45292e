//! Runs a few prompts through the agent and prints the conversations.

#[macro_use]
extern crate tracing;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use agent_platform::core::conversation::Item;
use agent_platform::{Config, Secrets, Session, SessionBuilder, llm};
use agent_platform_model::ModelMessage;
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::runtime;

#[derive(Parser, Debug)]
#[command(name = "agent-platform", version, about = "Agent service")]
struct Cli {
    /// Path to the YAML config file. Without it, the config is read from
    /// the MODEL, SERVER, URLS and SECRETS environment variables.
    #[arg(short = 'c', value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Print the agent graph as a Mermaid flowchart before running.
    #[arg(long)]
    print_graph: bool,

    /// Write the agent graph as an HTML page to this path.
    #[arg(long, value_name = "PATH")]
    graph_html: Option<PathBuf>,

    /// Prompts to run, one conversation each.
    #[arg(value_name = "PROMPT", default_values_t = [
        "Add 3 and 4.".to_owned(),
        "2 * 2".to_owned(),
    ])]
    prompts: Vec<String>,
}

fn main() -> Result<()> {
    // A missing `.env` is fine, variables set in the shell win anyway.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("starting agent service");
    let cli = Cli::parse();
    let config = Config::load(cli.config_path.as_deref())
        .context("failed to load config")?;

    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(config.server.threads)
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let secrets = Secrets::load(&config.secrets.path)
        .context("failed to load secrets")?;
    debug!("secrets: {secrets:?}");
    let provider = llm::create_provider(&config, &secrets)?;

    let session = SessionBuilder::with_model_provider(provider)
        .build()
        .context("failed to build agent")?;
    if cli.print_graph {
        println!("{}", session.draw_mermaid());
    }
    if let Some(path) = &cli.graph_html {
        fs::write(path, session.draw_html()).with_context(|| {
            format!("failed to write graph to {}", path.display())
        })?;
        info!("agent graph written to {}", path.display());
    }

    for prompt in &cli.prompts {
        run_prompt(&session, prompt).await?;
    }
    Ok(())
}

async fn run_prompt(session: &Session, prompt: &str) -> Result<()> {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner} {wide_msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    progress_bar.set_message("🤔 Thinking...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let result = session.send_message(prompt).await;
    // Finish the progress bar before printing anything else.
    progress_bar.finish_and_clear();

    let conversation =
        result.with_context(|| format!("agent failed on {prompt:?}"))?;
    for item in conversation.items() {
        print_item(item);
    }
    println!();
    Ok(())
}

fn print_item(item: &Item) {
    let banner = item.banner();
    match item.message() {
        ModelMessage::User { .. } => println!("{}", banner.bright_green()),
        ModelMessage::Assistant(_) => println!("{}", banner.bright_cyan()),
        ModelMessage::Tool(_) => println!("{}", banner.bright_yellow()),
        ModelMessage::System { .. } => println!("{}", banner.bright_black()),
    }
    if item.has_gap() {
        println!();
    }
    println!("{}", item.transcript().bright_white());
}
