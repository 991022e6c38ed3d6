// src/main.rs — moodchat entry point

use clap::Parser;

use moodchat::cli::{self, Cli, Commands};
use moodchat::devserver;
use moodchat::infra::config::Config;
use moodchat::infra::{logger, paths};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // The full-screen UI owns the terminal, so its logs go to a file.
    let full_screen = matches!(cli.command, None | Some(Commands::Run)) && !cli.headless;
    if full_screen {
        logger::init_file_logging("info", &paths::log_file_path())?;
    } else if matches!(cli.command, Some(Commands::Devserver { .. })) {
        logger::init_logging("info");
    } else {
        logger::init_logging("warn");
    }

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    match &cli.command {
        None | Some(Commands::Run) => cli::run::run_client(&config, cli.headless).await,
        Some(Commands::Detect { image }) => cli::oneshot::run_detect(&config, image).await,
        Some(Commands::Stats) => cli::oneshot::run_stats(&config).await,
        Some(Commands::Chat { emotion, message }) => {
            cli::oneshot::run_chat(&config, emotion, &message.join(" ")).await
        }
        Some(Commands::Devserver { .. }) => {
            println!(
                "Dev backend on http://127.0.0.1:{} (Ctrl+C to stop)",
                config.devserver.port
            );
            devserver::serve(&config.devserver, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
        }
    }
}
