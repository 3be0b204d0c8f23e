use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use triggerfish::{ServerSettings, TriggerfishLanguageServer, config::LogLevel};

#[derive(Parser, Debug)]
#[command(name = "triggerfish", version, about = "@-completion language server backed by universal-ctags")]
struct Args {
    /// Overrides `TRIGGERFISH_LOG_LEVEL` (default: info).
    #[arg(long, value_enum, ignore_case = true)]
    log_level: Option<CliLogLevel>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Shorthand for `--log-level debug`, including tower-lsp traffic.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliLogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<CliLogLevel> for LogLevel {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Warning => LogLevel::Warning,
            CliLogLevel::Error => LogLevel::Error,
        }
    }
}

/// Environment overrides first, then explicit CLI flags on top.
fn startup_settings(args: &Args) -> ServerSettings {
    let mut settings = ServerSettings::from_env();
    if let Some(level) = args.log_level {
        settings.logging.level = level.into();
    }
    if args.verbose {
        settings.logging.level = LogLevel::Debug;
    }
    if let Some(file) = &args.log_file {
        settings.logging.file = file.clone();
    }
    settings
}

fn log_directory(log_path: &Path) -> PathBuf {
    let dir = log_path.parent().filter(|dir| !dir.as_os_str().is_empty()).map(Path::to_path_buf);
    match dir {
        Some(dir) if std::fs::create_dir_all(&dir).is_ok() => dir,
        _ => std::env::temp_dir(),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let settings = startup_settings(&args);

    let level = settings.logging.level.as_directive();
    let tower_level = if args.verbose { "debug" } else { "warn" };
    let stderr_filter = EnvFilter::new(format!("triggerfish={level},tower_lsp={tower_level}"));
    let file_filter = EnvFilter::new(format!("triggerfish={level},tower_lsp={tower_level}"));

    let log_path = settings.logging.file.clone();
    let file_appender = tracing_appender::rolling::never(
        log_directory(&log_path),
        log_path.file_name().unwrap_or(OsStr::new("triggerfish.log")),
    );

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).with_target(false).with_filter(file_filter);

    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();

    info!("Starting triggerfish server v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| TriggerfishLanguageServer::new(client, settings));

    Server::new(stdin, stdout, socket).serve(service).await;

    info!("triggerfish server stopped");
}
