//! quizkit CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizkit", version, about = "Multi-format quiz and assessment engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted quiz attempt
    Run {
        /// Quiz JSON file, or a question bank directory
        #[arg(long)]
        quiz: PathBuf,

        /// JSON file mapping question ids to answer values
        #[arg(long)]
        answers: PathBuf,

        /// Shuffle the question order before starting
        #[arg(long)]
        shuffle: bool,

        /// Seed for --shuffle, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for the attempt report
        #[arg(long, default_value = "./quizkit-reports")]
        output: PathBuf,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz JSON files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Print a saved attempt report
    Report {
        /// Attempt report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: table, markdown
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Split a quiz file into a paged question bank
    Bank {
        /// Quiz JSON file
        #[arg(long)]
        quiz: PathBuf,

        /// Bank directory to create
        #[arg(long)]
        output: PathBuf,

        /// Questions per page file
        #[arg(long, default_value = "10")]
        page_size: usize,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizkit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            quiz,
            answers,
            shuffle,
            seed,
            output,
            format,
            config,
        } => commands::run::execute(quiz, answers, shuffle, seed, output, format, config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Report { report, format } => commands::report::execute(report, format),
        Commands::Bank {
            quiz,
            output,
            page_size,
        } => commands::bank::execute(quiz, output, page_size),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
