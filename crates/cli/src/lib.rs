pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use layerquote_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

use crate::commands::SelectionArgs;

#[derive(Debug, Parser)]
#[command(
    name = "layerquote",
    about = "Layered integration quote and timeline calculator",
    long_about = "Price a source -> middleware -> destination integration against a pricing \
                  specification and project its delivery timeline.",
    after_help = "Examples:\n  layerquote quote --source ServiceNow --tier medium \
                  --addon 'Enhanced SLA (24x7)'\n  layerquote export --source Tanium --tier high \
                  --output quote.json\n  layerquote quote --place high=BMC --place \
                  medium=ServiceNow\n  layerquote spec validate pricing.json\n  \
                  layerquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute a quote and print the cost breakdown and timeline")]
    Quote {
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Compute a quote and write the downloadable JSON document")]
    Export {
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, help = "Destination file (defaults to export.file_name)")]
        output: Option<PathBuf>,
    },
    #[command(subcommand, about = "Inspect and validate pricing specifications")]
    Spec(SpecCommand),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate configuration, specification, and a sample quote")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
enum SpecCommand {
    #[command(about = "Parse a specification file and report problems")]
    Validate {
        #[arg(help = "Specification file (defaults to spec.path, then the builtin document)")]
        path: Option<PathBuf>,
    },
    #[command(about = "Print the builtin specification document")]
    Default,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init_logging(&logging);

    let result = match cli.command {
        Command::Quote { selection, json } => commands::quote::run(&selection, json),
        Command::Export { selection, output } => {
            commands::export::run(&selection, output.as_deref())
        }
        Command::Spec(SpecCommand::Validate { path }) => commands::spec::validate(path.as_deref()),
        Command::Spec(SpecCommand::Default) => commands::spec::print_default(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so command output on stdout stays parseable.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!(event_name = "cli.logging.reinit", "tracing subscriber already installed");
    }
}
