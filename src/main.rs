//! Command line entry point for the chained translator.

use std::ffi::OsStr;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;
use std::sync::Arc;

use chained_translator::TranslatorServices;
use chained_translator::command::merge_translations;
use chained_translator::config::ConfigManager;
use chained_translator::fs::{
    Filesystem,
    LocalFilesystem,
};
use clap::{
    Parser,
    Subcommand,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{
    InitError,
    RollingFileAppender,
    Rotation,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{
    EnvFilter,
    Layer,
};

/// Custom translations that override the defaults of an application.
#[derive(Debug, Parser)]
#[command(name = "chained-translator", version, about)]
struct Cli {
    /// Application root holding the lang directories and the config file.
    #[arg(long, value_name = "PATH", default_value = ".", global = true)]
    app_root: PathBuf,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge the custom translations into the default translation files.
    Merge {
        /// Locale to merge, e.g. `en`.
        locale: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_file = match cli.log_file.as_deref().map(log_file_writer).transpose() {
        Ok(log_file) => log_file,
        Err(error) => {
            init_tracing(None);
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = init_tracing(log_file);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::load(&cli.app_root)?;

    let files: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let services = TranslatorServices::register(
        config_manager.app_root(),
        config_manager.get_settings(),
        files,
    )?;

    match &cli.command {
        Command::Merge { locale } => Ok(merge_translations(&services.manager, locale)?),
    }
}

#[derive(Debug, thiserror::Error)]
enum LogFileError {
    #[error("Log file path {} does not name a file", .0.display())]
    NotAFile(PathBuf),

    #[error("Failed to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: InitError,
    },
}

/// Open `path` for appending, creating its directory if needed.
fn log_file_writer(path: &Path) -> Result<RollingFileAppender, LogFileError> {
    let Some(file_name) = path.file_name().and_then(OsStr::to_str) else {
        return Err(LogFileError::NotAFile(path.to_path_buf()));
    };
    let directory =
        path.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|source| LogFileError::Open { path: path.to_path_buf(), source })
}

/// Log to stderr, and to `log_file` when given.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(log_file: Option<RollingFileAppender>) -> Option<WorkerGuard> {
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let (file, guard) = match log_file {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(stderr).with(file).init();
    guard
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
