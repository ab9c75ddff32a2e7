mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;

use app::App;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{OpenWeatherMapClient, SnapshotSource, TideClient};
use error::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .init();

    if let Some(Commands::Init) = cli.command {
        Config::setup_interactive()?;
        return Ok(());
    }

    let config = if Config::exists(cli.config.as_ref()) {
        match Config::load(cli.config.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        }
    } else if cli.config.is_some() {
        eprintln!("Config file not found: {:?}", cli.config);
        std::process::exit(1);
    } else {
        tracing::warn!("No config file found - using defaults and environment");
        Config::default()
    };
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Some(Commands::Check { json }) => check(&config, json).await,
        _ => watch(&config).await,
    }
}

/// Run both providers until Ctrl-C, printing whenever either snapshot changes
async fn watch(config: &Config) -> Result<()> {
    let app = App::start(config);
    tracing::info!(
        weather = app.weather.name(),
        tides = app.tides.name(),
        "Providers started"
    );

    app.run_until(tokio::signal::ctrl_c(), |report| println!("{}", report))
        .await;

    app.stop();
    Ok(())
}

/// Single fetch from each upstream, no polling
async fn check(config: &Config, json: bool) -> Result<()> {
    let weather_client =
        OpenWeatherMapClient::new(config.openweathermap.clone(), config.location.coordinates());
    let tide_client = TideClient::from_config(config);

    let (weather, tides) = tokio::join!(weather_client.fetch(), tide_client.fetch());

    match weather {
        Ok(snapshot) if json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        Ok(snapshot) => println!(
            "{}: OK ({:.0}°F, {}, {} forecast days)",
            weather_client.name(),
            snapshot.current.temp_f,
            snapshot.current.primary().map_or("-", |c| c.main.as_str()),
            snapshot.daily.len()
        ),
        Err(e) => println!("{}: FAILED - {}", weather_client.name(), e),
    }

    match tides {
        Ok(days) if json => println!("{}", serde_json::to_string_pretty(&days)?),
        Ok(days) => println!(
            "{}: OK ({} days, {} events)",
            tide_client.name(),
            days.len(),
            days.iter().map(|d| d.tides.len()).sum::<usize>()
        ),
        Err(e) => println!("{}: FAILED - {}", tide_client.name(), e),
    }

    Ok(())
}
