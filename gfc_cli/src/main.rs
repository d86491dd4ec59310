use std::{fs::write, path::PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gfc_core::{export, festival_client, snapshot::Snapshot, url_state::parse_ids};

#[derive(Debug, Parser)]
#[command(version)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the festival programme into resources.json and events.json
    Fetch {
        #[command(flatten)]
        args: FetchArgs,
    },
    /// Write the selected screenings to an iCalendar file
    Export {
        #[command(flatten)]
        args: ExportArgs,
    },
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// the base URL of the festival API
    #[arg(long, env = "GFC_API_BASE", default_value = festival_client::API_BASE)]
    pub api_base: String,
    /// the directory to write the snapshot to
    #[arg(long, env = "GFC_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// the comma separated event ids
    #[arg(long)]
    pub selected: String,
    /// the directory containing the snapshot
    #[arg(long, env = "GFC_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
    /// the file to write
    #[arg(long, short, default_value = export::FILE_NAME)]
    pub output: PathBuf,
}

async fn run_fetch(args: FetchArgs) -> Result<()> {
    let snapshot = festival_client::get(&args.api_base).await?;
    snapshot.save(&args.data_dir)?;
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let snapshot = Snapshot::load(&args.data_dir)?;
    let ical_calendar = export::export(&parse_ids(Some(&args.selected)), &snapshot)?;
    write(&args.output, ical_calendar)?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Arguments::parse();
    match args.command {
        Command::Fetch { args } => run_fetch(args).await?,
        Command::Export { args } => run_export(args)?,
    };
    Ok(())
}
