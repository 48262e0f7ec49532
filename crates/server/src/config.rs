// crates/server/src/config.rs
//! Command line and environment configuration for the `proslide` binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use proslide_core::{ImportPolicy, UnknownColumnPolicy};
use proslide_db::{StorageBackend, StoreConfig};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_SECS: u64 = 5;

/// Client build looked for when `STATIC_DIR` is not set.
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

#[derive(Debug, Parser)]
#[command(name = "proslide", version, about = "ProSlide production tracker")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Running without a subcommand starts the server.
    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve(ServeArgs),
    /// Import a spreadsheet into the project store.
    Import(ImportArgs),
    /// Export the project store to .xlsx or .csv.
    Export(ExportArgs),
    /// Poll a running server and print dashboard KPIs as they change.
    Watch(WatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Storage backend: file or sqlite.
    #[arg(long, env = "PROSLIDE_STORAGE", default_value = "file")]
    pub storage: StorageBackend,

    /// JSON data file used by the file backend.
    #[arg(long, env = "PROSLIDE_DATA_FILE", default_value = "erp_data.json")]
    pub data_file: PathBuf,

    /// SQLite database used by the sqlite backend. Defaults to the user cache dir.
    #[arg(long, env = "PROSLIDE_DB")]
    pub db: Option<PathBuf>,
}

impl StoreArgs {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.storage,
            data_file: self.data_file.clone(),
            db_path: self.db.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Built client to serve. Falls back to ./client/dist when it exists.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Priority: `--static-dir` / `STATIC_DIR`, then `./client/dist` if present,
    /// then API-only.
    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        self.static_dir.clone().or_else(|| {
            let dist = PathBuf::from(DEFAULT_STATIC_DIR);
            dist.join("index.html").exists().then_some(dist)
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// .xlsx / .xls / .ods / .csv file to import.
    pub file: PathBuf,

    /// replace: imported rows become the collection. merge: appended to it.
    #[arg(long, default_value = "replace")]
    pub policy: ImportPolicy,

    /// skip: drop unrecognized columns. extend: keep them as extra fields.
    #[arg(long, default_value = "skip")]
    pub unknown: UnknownColumnPolicy,

    /// Print the report without saving.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Output file; the extension (.xlsx or .csv) picks the format.
    #[arg(short, long, default_value = "ProSlide_Data.xlsx")]
    pub output: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Base URL of a running ProSlide server.
    #[arg(long, env = "PROSLIDE_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Seconds between polls.
    #[arg(long, default_value_t = DEFAULT_POLL_SECS)]
    pub interval_secs: u64,
}

impl WatchArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}
