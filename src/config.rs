use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "omr-grade-server")]
#[command(about = "Grades scanned multiple-choice answer sheets against an answer key")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OMR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OMR_PORT", default_value = "8000")]
    pub port: u16,

    /// Maximum size of each uploaded sheet in bytes (default: 20MB)
    #[arg(long, env = "OMR_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    /// Directory where normalized binary canvases are written for inspection
    #[arg(long, env = "OMR_DEBUG_DIR")]
    pub debug_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub debug_dir: Option<PathBuf>,
}

impl Config {
    /// Request body limit: two sheets plus room for multipart framing
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_mul(2).saturating_add(64 * 1024)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            debug_dir: args.debug_dir,
        }
    }
}
