//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use ktjson_core::{ProviderKind, TranslationMode};
use std::path::PathBuf;

/// ktjson - field-selective transforms for game-data JSON
///
/// Translates, normalizes and cleans the JSON data files of a tabletop game,
/// touching only the fields the rule set selects.
#[derive(Parser, Debug)]
#[command(
    name = "ktjson",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "KTJSON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate documents from the source language into LANG
    Translate(TranslateArgs),

    /// Detect or fix ambiguous Unicode characters
    Unicode(UnicodeArgs),

    /// Remove deprecated fields from team files
    Clean(CleanArgs),

    /// Split <LANG>/teams.json into one file per team
    SplitTeams(LanguageArgs),

    /// Join <LANG>/teams/*.json into <LANG>/teams.json
    JoinTeams(LanguageArgs),

    /// Merge universal and mission actions into <LANG>/actions.json
    MergeActions(LanguageArgs),

    /// Inspect and validate classification rule sets
    Rules(RulesArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the translate command
#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Target language code (es, fr, de, it, pt, ...)
    #[arg(value_name = "LANG")]
    pub language: String,

    /// Documents to translate, relative to the source directory
    /// (default: the configured document set plus every team file)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Translation backend
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// API key for the provider (can also be set via DEEPL_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// One request per string, or newline-joined batches
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Directory holding the source-language documents
    /// (default: <target-root>/<source_language>)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Directory holding one subdirectory per language
    #[arg(long, default_value = ".")]
    pub target_root: PathBuf,

    /// Rules file, or builtin:<name>
    #[arg(long)]
    pub rules: Option<String>,

    /// On Ctrl-C, write the partial result to <file>.partial
    #[arg(long)]
    pub checkpoint_on_interrupt: bool,

    /// Run every stage but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the unicode command
#[derive(Parser, Debug)]
pub struct UnicodeArgs {
    #[command(subcommand)]
    pub action: UnicodeAction,
}

#[derive(Subcommand, Debug)]
pub enum UnicodeAction {
    /// Report non-ASCII characters with counts and sample locations
    Check(UnicodeFileArgs),

    /// Replace the fixed character table in string values (writes FILE.backup first)
    Fix(UnicodeFileArgs),
}

#[derive(Parser, Debug)]
pub struct UnicodeFileArgs {
    /// JSON document to inspect or fix
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the clean command
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Team files to clean (default: every *.json in --dir)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Directory of team files
    #[arg(long, default_value = "en/teams")]
    pub dir: PathBuf,

    /// Rules file, or builtin:<name>
    #[arg(long)]
    pub rules: Option<String>,

    /// Report what would be removed without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for commands working on one language directory
#[derive(Parser, Debug)]
pub struct LanguageArgs {
    /// Language code, i.e. the directory name under --root
    #[arg(value_name = "LANG")]
    pub language: String,

    /// Directory holding one subdirectory per language
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// Arguments for the rules command
#[derive(Parser, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Print a rule set (default: the configured one)
    Show(RulesFileArgs),

    /// Validate a rules file against the rules schema
    Validate(RulesFileArgs),

    /// Decide whether one field is translated and/or pruned
    Classify(RulesClassifyArgs),
}

#[derive(Parser, Debug)]
pub struct RulesFileArgs {
    /// Rules file, or builtin:<name>
    #[arg(value_name = "FILE")]
    pub file: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RulesClassifyArgs {
    /// Document path relative to the language directory (e.g. teams/KT1.json)
    #[arg(value_name = "DOC")]
    pub document: String,

    /// Ancestor object keys joined with '.' (empty for the root)
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Field name
    #[arg(value_name = "FIELD")]
    pub field: String,

    /// Rules file, or builtin:<name>
    #[arg(long)]
    pub rules: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration (API keys redacted)
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write (default: .ktjson.yaml)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Write to the user config directory instead
    #[arg(long, conflicts_with = "path")]
    pub user: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Google web endpoint, no key
    Google,
    /// DeepL API, needs a key
    Deepl,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One request per string
    Precise,
    /// Newline-joined batches under the provider's size budget
    Batch,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<ProviderArg> for ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Google => ProviderKind::Google,
            ProviderArg::Deepl => ProviderKind::Deepl,
        }
    }
}

impl From<ModeArg> for TranslationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Precise => TranslationMode::Precise,
            ModeArg::Batch => TranslationMode::Batch,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
