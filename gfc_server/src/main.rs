//! This crate implements an HTTP server for the Göteborg Film Festival schedule.
//!
//! It serves the schedule page, the snapshot it is built from and the iCalendar export of a
//! selection at `/export.ics?selected=<comma separated event ids>`.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use gfc_core::snapshot::Snapshot;

mod route;

#[derive(Debug, Parser)]
#[command(version)]
struct Arguments {
    /// the address to listen on
    #[arg(long, env = "GFC_BIND", default_value = "0.0.0.0:8008")]
    bind: SocketAddr,
    /// the directory containing resources.json and events.json
    #[arg(long, env = "GFC_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// the directory containing the built frontend
    #[arg(long, env = "GFC_STATIC_DIR", default_value = "gfc_server/frontend/dist")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Arguments::parse();
    let snapshot = Arc::new(Snapshot::load(&args.data_dir)?);
    let app = route::router(snapshot, &args.data_dir, &args.static_dir);
    log::info!("listening on http://{}", args.bind);
    axum::Server::bind(&args.bind)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
