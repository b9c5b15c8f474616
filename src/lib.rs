pub mod analytics;
pub mod commands;
pub mod db;
pub mod settings;
mod utils;

use anyhow::Context;
use clap::Parser;

use analytics::{AdminGate, AnalyticsReporter};
use commands::{Cli, Command};
use settings::AppConfig;

pub use analytics::SessionContext;
pub use db::{Database, NewVisit, VisitEvent};

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db.clone() {
        config.db_path = db_path;
    }

    // RUST_LOG still wins over the configured level
    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();

    log::info!("visitlog starting up...");

    if let Command::SaveConfig { path } = &cli.command {
        println!("{}", commands::save_config(&config, path)?);
        return Ok(());
    }

    // Opening blocks until the schema is ready, so it happens before async work starts
    let database = commands::open_database(&config)?;
    let reporter = AnalyticsReporter::new(database.clone());

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        match cli.command {
            Command::SaveConfig { .. } => {}
            Command::Init => {
                println!("{}", commands::init(&database).await?);
            }
            Command::Record { page, session } => {
                let token = commands::record(&reporter, &page, session).await?;
                println!("{token}");
            }
            Command::Report {
                from,
                to,
                json,
                password,
            } => {
                let gate = AdminGate::new(config.admin_password.clone());
                let report = commands::report(&reporter, &gate, &password, from, to).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", commands::TextReport(&report));
                }
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}
