//! ktjson CLI - field-selective transforms for game-data JSON
//!
//! Entry point for the `ktjson` binary: translation, Unicode normalization,
//! deprecated-field cleanup and the team/action file-layout operations.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;
mod progress;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    dotenv::dotenv().ok();

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e, cli.use_color()),
    };
    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    // Held until exit so the file writer flushes
    let _guard = match init_logging(&cli, &config, use_color) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    match run(cli, config, use_color).await {
        Ok(()) => {}
        Err(e) => exit_with(&e, use_color),
    }
}

fn exit_with(e: &error::Error, use_color: bool) -> ! {
    eprintln!("{}", error::format_error(e, use_color));
    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }
    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet);
    if !config.output.progress {
        output.disable_progress();
    }

    tracing::info!(
        run_id = logging::current_run_id().unwrap_or("-"),
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Translate(args) => handlers::handle_translate(args, &config, &mut output).await,
        Commands::Unicode(args) => handlers::handle_unicode(args, &config, &mut output),
        Commands::Clean(args) => handlers::handle_clean(args, &config, &mut output),
        Commands::SplitTeams(args) => handlers::handle_split_teams(args, &mut output),
        Commands::JoinTeams(args) => handlers::handle_join_teams(args, &mut output),
        Commands::MergeActions(args) => handlers::handle_merge_actions(args, &mut output),
        Commands::Rules(args) => handlers::handle_rules(args, &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system: verbosity, then the config file, then the
/// environment
fn init_logging(cli: &Cli, config: &Config, use_color: bool) -> Result<Option<WorkerGuard>> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);
    logging_config.merge_with_file(&config.logging, verbosity);
    logging_config.merge_with_env();
    logging_config.ansi = use_color;

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
