// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, GlossaryMode, TranslationProvider};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod checkpoint;
mod errors;
mod extractor;
mod file_utils;
mod game_profile;
mod glossary;
mod providers;
mod reassembler;
mod translation;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    CliTool,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::CliTool => TranslationProvider::CliTool,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate mod localisation files using AI providers (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Generate shell completions for modloc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Mod directory to process (must contain the game's localisation folder)
    #[arg(value_name = "MOD_DIR")]
    mod_dir: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Game profile to use (stellaris, ck3, hoi4, eu4)
    #[arg(short, long)]
    game: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code, repeatable (e.g., '-t zh-CN -t pl')
    #[arg(short, long)]
    target_language: Vec<String>,

    /// Short mod description injected into every prompt
    #[arg(long)]
    mod_context: Option<String>,

    /// Path to a glossary JSON file
    #[arg(long)]
    glossary: Option<String>,

    /// Disable fuzzy glossary matching
    #[arg(long)]
    strict: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// modloc - Game Mod Localisation Translator
///
/// Translates Paradox-style mod localisation files into other languages
/// using AI providers (Ollama, OpenAI-compatible APIs, Anthropic, CLI tools).
#[derive(Parser, Debug)]
#[command(name = "modloc")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered game mod localisation tool")]
#[command(long_about = "modloc parses a mod's localisation files, translates the quoted values with an AI provider and writes target-language twins of every file, preserving keys, comments and formatting.

EXAMPLES:
    modloc ./my_mod                              # Translate using default config
    modloc -f ./my_mod                           # Force overwrite existing files
    modloc -p openai -m gpt-4o ./my_mod          # Use specific provider and model
    modloc -s en -t zh-CN -t pl ./my_mod         # Translate into Chinese and Polish
    modloc -g eu4 --glossary terms.json ./my_mod # EU4 profile with a glossary
    modloc --log-level debug ./my_mod            # Debug logging
    modloc completions bash > modloc.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3)
    openai    - OpenAI-compatible chat completions API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    cli-tool  - External CLI binary driven over stdin/stdout

RESUMPTION:
    Completed batches are checkpointed in SQLite. Re-running an interrupted
    job skips every batch whose source texts are unchanged.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Mod directory to process
    #[arg(value_name = "MOD_DIR")]
    mod_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Game profile to use (stellaris, ck3, hoi4, eu4)
    #[arg(short, long)]
    game: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code, repeatable (e.g., '-t zh-CN -t pl')
    #[arg(short, long)]
    target_language: Vec<String>,

    /// Short mod description injected into every prompt
    #[arg(long)]
    mod_context: Option<String>,

    /// Path to a glossary JSON file
    #[arg(long)]
    glossary: Option<String>,

    /// Disable fuzzy glossary matching
    #[arg(long)]
    strict: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "modloc", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let mod_dir = cli
                .mod_dir
                .ok_or_else(|| anyhow!("MOD_DIR is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                mod_dir,
                force_overwrite: cli.force_overwrite,
                game: cli.game,
                provider: cli.provider,
                model: cli.model,
                source_language: cli.source_language,
                target_language: cli.target_language,
                mod_context: cli.mod_context,
                glossary: cli.glossary,
                strict: cli.strict,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    apply_cli_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    if !options.mod_dir.is_dir() {
        return Err(anyhow!("Mod directory does not exist: {:?}", options.mod_dir));
    }

    let controller = Controller::with_config(config)?;
    controller
        .run(options.mod_dir.clone(), options.force_overwrite)
        .await?;

    Ok(())
}

/// Override loaded config values with CLI options where provided
fn apply_cli_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(game) = &options.game {
        config.game = game.clone();
    }

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        // Find the provider config and update the model
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if !options.target_language.is_empty() {
        config.target_languages = options.target_language.clone();
    }

    if let Some(mod_context) = &options.mod_context {
        config.mod_context = mod_context.clone();
    }

    if let Some(glossary) = &options.glossary {
        config.glossary.path = Some(glossary.clone());
    }

    if options.strict {
        config.glossary.mode = GlossaryMode::Strict;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
