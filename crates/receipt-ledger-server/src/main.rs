use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use receipt_ledger_server::{build_writer, configure, ServerSettings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file. Defaults to ./receipt-ledger.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Backfill raw date and total columns on a legacy ledger, then exit.
    Migrate,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = ServerSettings::load(args.config.as_deref()).context("failed to load settings")?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::Migrate => migrate(settings).await,
    }
}

async fn serve(settings: ServerSettings) -> anyhow::Result<()> {
    let writer = web::Data::new(build_writer(&settings).context("failed to open ledger store")?);
    let max_body_bytes = settings.server.max_body_bytes;
    let (host, port) = (settings.server.host.clone(), settings.server.port);

    tracing::info!("Server will listen on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(writer.clone())
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .configure(configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("failed to bind {}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}

async fn migrate(settings: ServerSettings) -> anyhow::Result<()> {
    let writer = build_writer(&settings).context("failed to open ledger store")?;
    let report = writer.migrate().await.context("raw-field backfill failed")?;

    println!(
        "header upgraded: {}, rows scanned: {}, rows backfilled: {}",
        report.header_upgraded, report.rows_scanned, report.rows_backfilled
    );
    Ok(())
}
