use std::process::ExitCode;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use chrono::NaiveDate;
use clap::Parser;
use sqlx::MySqlPool;

mod api;
mod cli;
mod config;
mod db;
mod docs;
mod gateway;
mod model;
mod routes;
mod scheduler;
mod store;
mod sync;

use cli::{Cli, Commands};
use config::Config;
use db::init_db;
use model::sync_result::SyncStatus;
use store::MySqlEmployeeDirectory;

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM attendance sync"
}

#[actix_web::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    let pool = init_db(&config.database_url, config.run_migrations).await?;
    let employees = MySqlEmployeeDirectory::new(pool.clone(), config.identity_cache_ttl);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            serve(config, pool, employees).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sync { date, device } => Ok(sync_once(&config, &pool, employees, date, device).await),
    }
}

async fn serve(config: Config, pool: MySqlPool, employees: MySqlEmployeeDirectory) -> std::io::Result<()> {
    info!("Server starting...");

    if let Some(at) = config.sync_daily_at {
        actix_web::rt::spawn(scheduler::run_daily(
            at,
            pool.clone(),
            employees.clone(),
            config.clone(),
        ));
    }

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(employees.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}

/// One-shot run for cron or manual use.
async fn sync_once(
    config: &Config,
    pool: &MySqlPool,
    employees: MySqlEmployeeDirectory,
    date: Option<NaiveDate>,
    device: Option<u64>,
) -> ExitCode {
    let result = store::orchestrator(pool, employees, config)
        .run_sync(date, device)
        .await;

    println!("Syncing attendance for: {}", result.target_date);
    for error in &result.errors {
        eprintln!("{error}");
    }
    for id in &result.unmatched_ids {
        eprintln!("No employee matches terminal id {id}");
    }
    println!(
        "Processed {} records for {}",
        result.processed_count, result.target_date
    );

    match result.status() {
        SyncStatus::Failed => ExitCode::FAILURE,
        SyncStatus::Success | SyncStatus::Partial => ExitCode::SUCCESS,
    }
}
