use clap::{Parser, Subcommand};
use mediator_core::MediatorConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check_action, kb, run, sanitize, summarize};

#[derive(Parser, Debug)]
#[command(
    name = "mediator",
    version,
    about = "Sanitize untrusted context and vet agent tool calls against a fixed policy"
)]
struct Cli {
    /// Path to a YAML configuration file (defaults apply when omitted)
    #[arg(long, global = true, env = "MEDIATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a test suite through the full pipeline and write the log and report.
    Run(run::RunArgs),

    /// Summarize an existing JSON Lines audit log.
    Summarize {
        /// Path to the .jsonl log
        log: PathBuf,

        /// Also write the report to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Evaluate one proposed action against the policy and print the decision.
    CheckAction {
        /// Tool name, e.g. send_email, db_query, http_get
        tool: String,

        /// Argument as key=value (repeatable)
        #[arg(long = "arg", value_parser = check_action::parse_arg)]
        args: Vec<(String, String)>,
    },

    /// Sanitize text and print the result.
    Sanitize {
        /// Text to sanitize (reads stdin when neither TEXT nor --file is given)
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Knowledge base management
    Kb {
        #[command(subcommand)]
        cmd: kb::KbCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout carries the JSON output only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = MediatorConfig::load(cli.config.as_deref())?;

    match cli.cmd {
        Command::Run(args) => run::run(&config, args).await?,

        Command::Summarize { log, out } => summarize::run(&log, out.as_deref())?,

        Command::CheckAction { tool, args } => check_action::run(&config, &tool, args)?,

        Command::Sanitize { text, file } => sanitize::run(text, file.as_deref())?,

        Command::Kb { cmd } => kb::execute(&config, cmd)?,
    }

    Ok(())
}
