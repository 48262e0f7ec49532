// crates/server/src/main.rs
//! `proslide` binary: HTTP server plus import / export / watch commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use proslide_core::dashboard::format_parts;
use proslide_core::table::TableFormat;
use proslide_core::{read_table, ImportOptions, ImportPolicy, Schema, WorkingSet};
use proslide_db::open_store;
use proslide_server::config::{Cli, Command, ExportArgs, ImportArgs, ServeArgs, WatchArgs};
use proslide_server::routes::export::ExportFormat;
use proslide_server::{create_app_with_static, init_metrics, spawn_poller, AppState, RemoteProjects};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,proslide=info,proslide_server=info,proslide_db=info,proslide_core=info".into()),
        )
        .init();

    match Cli::parse().into_command() {
        Command::Serve(args) => serve(args).await,
        Command::Import(args) => import(args).await,
        Command::Export(args) => export(args).await,
        Command::Watch(args) => watch(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    init_metrics();

    let store = open_store(&args.store.store_config())
        .await
        .context("opening project store")?;
    let state = AppState::new(store, args.store.storage.to_string());

    let static_dir = args.resolve_static_dir();
    if static_dir.is_none() {
        info!("No client build found, serving API only");
    }
    let app = create_app_with_static(state, static_dir);

    let addr = args.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("ProSlide server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn import(args: ImportArgs) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let format = TableFormat::from_filename(&args.file.to_string_lossy())?;
    let table = read_table(&bytes, format)?;

    let store = open_store(&args.store.store_config()).await?;
    let mut working_set = WorkingSet::new();
    if args.policy == ImportPolicy::Merge {
        working_set.sync(store.as_ref()).await?;
    }

    let report = working_set.import_table(
        &table,
        ImportOptions {
            policy: args.policy,
            unknown_columns: args.unknown,
        },
    )?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.dry_run {
        info!(rows = report.rows_imported, "Dry run, nothing saved");
        return Ok(());
    }

    let kpis = working_set.save(store.as_ref()).await?;
    println!(
        "Saved {} projects ({} completed, {} in progress, {} parts produced)",
        kpis.total,
        kpis.completed,
        kpis.in_progress,
        format_parts(kpis.parts_produced)
    );
    Ok(())
}

async fn export(args: ExportArgs) -> Result<()> {
    let store = open_store(&args.store.store_config()).await?;
    let rows = store.load_all().await?;

    let format = ExportFormat::from_path(&args.output);
    let bytes = format.render(&Schema::standard(), &rows)?;
    tokio::fs::write(&args.output, bytes)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Exported {} projects to {}", rows.len(), args.output.display());
    Ok(())
}

async fn watch(args: WatchArgs) -> Result<()> {
    let remote = Arc::new(RemoteProjects::new(&args.server)?);
    info!(server = %args.server, every = ?args.interval(), "Watching dashboard");

    let poller = spawn_poller(remote, args.interval());
    let mut snapshots = poller.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_signal() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    let k = snapshot.kpis;
                    println!(
                        "total={} completed={} in_progress={} not_started={} parts_produced={}",
                        k.total,
                        k.completed,
                        k.in_progress,
                        snapshot.distribution.not_started,
                        format_parts(k.parts_produced)
                    );
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
