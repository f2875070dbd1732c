//! # Clinician Toolkit CLI (`ctk`)
//!
//! ## Usage
//!
//! ```bash
//! ctk --config ./config/ctk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ctk init` | Create the SQLite database and run schema migrations |
//! | `ctk serve` | Start the HTTP API server |
//! | `ctk seed` | Load development diagnoses into an empty table |
//! | `ctk intake --csv FILE --id N --output FILE` | Write an intake report draft |
//! | `ctk anonymize FILE` | Print the anonymized diagnostic section of a report |
//!
//! Without `--config`, built-in defaults and environment overrides are used.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ctk_api::{anonymizer, config, db, diagnoses, intake, logging, migrate, server};

/// Clinician Toolkit: diagnosis catalogue, report anonymization and
/// summarization, and intake report drafting.
#[derive(Parser)]
#[command(name = "ctk", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// This command is idempotent.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Load development diagnoses into an empty diagnoses table.
    Seed,

    /// Write the report draft for one REDCap intake survey.
    Intake {
        /// REDCap CSV export.
        #[arg(long)]
        csv: PathBuf,

        /// Value of `redcap_survey_identifier` to convert.
        #[arg(long)]
        id: i64,

        /// Where to write the .docx report.
        #[arg(long)]
        output: PathBuf,
    },

    /// Print the anonymized diagnostic section of a .docx report.
    Anonymize {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    logging::init_logging(&cfg);

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Seed => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            let count = diagnoses::seed_diagnoses(&pool, &cfg.app.diagnoses_file).await?;
            println!("Seeded {} diagnosis trees.", count);
        }
        Commands::Intake { csv, id, output } => {
            let data = std::fs::read(&csv)
                .with_context(|| format!("Failed to read intake file: {}", csv.display()))?;
            let document = intake::intake_report(&data, id)?;
            std::fs::write(&output, document.to_bytes()?)
                .with_context(|| format!("Failed to write report: {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Commands::Anonymize { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read report: {}", file.display()))?;
            println!("{}", anonymizer::anonymize_report(&data)?);
        }
    }

    Ok(())
}
