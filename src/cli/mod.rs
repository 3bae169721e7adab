pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "academic-progress")]
#[command(about = "Academic progress API - serve, migrate and query student course progress")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP service")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create the progress table in Postgres")]
    Migrate,

    #[command(about = "Submit one progress record read from stdin")]
    Submit(commands::progress::RemoteArgs),

    #[command(about = "Show the authenticated student's progress grouped by level")]
    Show(commands::progress::RemoteArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Submit(args) => commands::progress::submit(args, output_format).await,
        Commands::Show(args) => commands::progress::show(args, output_format).await,
    }
}
