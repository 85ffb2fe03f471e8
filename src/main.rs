#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use cuesmith::app_config::{self, Config, TranslateMode, TranslationProvider};
use cuesmith::app_controller::Controller;
use cuesmith::formats::{Layout, OutputFormat};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum CliTranslateMode {
    Fast,
    Precise,
    Deep,
}

impl From<CliTranslateMode> for TranslateMode {
    fn from(cli_mode: CliTranslateMode) -> Self {
        match cli_mode {
            CliTranslateMode::Fast => TranslateMode::Fast,
            CliTranslateMode::Precise => TranslateMode::Precise,
            CliTranslateMode::Deep => TranslateMode::Deep,
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for cuesmith
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// cuesmith - word timings in, bilingual subtitles out
#[derive(Parser, Debug)]
#[command(name = "cuesmith")]
#[command(version)]
#[command(about = "Segment word-level transcriptions into subtitle cues and translate them with an LLM")]
#[command(long_about = "cuesmith regroups word-level ASR timings (.srt or .json) into readable cues and
translates them in batches through an OpenAI-compatible endpoint.

EXAMPLES:
    cuesmith talk.srt                          # Segment and translate using conf.json
    cuesmith -f talk.json                      # Force overwrite existing outputs
    cuesmith -p openai -m gpt-4o talk.srt      # Use specific provider and model
    cuesmith -s en -t fr --mode deep talk.srt  # Deep mode, English to French
    cuesmith --no-translate talk.json          # Only regroup into cues
    cuesmith --format srt --format ass talk.srt
    cuesmith --log-level debug /recordings/    # Process a whole directory
    cuesmith completions bash > cuesmith.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't
    exist, a default one is created.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .srt/.json file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'ja', or 'auto')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'fr', 'zh-hans')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation mode
    #[arg(long, value_enum)]
    mode: Option<CliTranslateMode>,

    /// Line layout: original-on-top, translated-on-top, original-only, translated-only
    #[arg(long)]
    layout: Option<Layout>,

    /// Output format, repeatable: srt, txt, lrc, ass, json
    #[arg(long = "format")]
    formats: Vec<OutputFormat>,

    /// Directory for output files (defaults to next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only segment, skip translation
    #[arg(long)]
    no_translate: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", env = "CUESMITH_CONFIG")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
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
    // level is refined once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "cuesmith", &mut std::io::stdout());
        return Ok(());
    }

    run(cli).await
}

/// Apply command line overrides on top of the loaded config
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(mode) = &options.mode {
        config.translation.mode = mode.clone().into();
    }
    if let Some(layout) = options.layout {
        config.output.layout = layout;
    }
    if !options.formats.is_empty() {
        config.output.formats = options.formats.clone();
    }
    if options.no_translate {
        config.translation.need_translate = false;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    // first Ctrl-C stops after the batch in flight; untranslated cues keep their original text
    let cancel = controller.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current batch");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    if input_path.is_file() {
        controller.run(input_path, options.output_dir.clone(), options.force_overwrite).await?;
    } else if input_path.is_dir() {
        if options.output_dir.is_some() {
            warn!("--output-dir is ignored in folder mode, outputs are written next to each input");
        }
        controller.run_folder(input_path, options.force_overwrite).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
