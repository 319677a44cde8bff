//! CLI argument parsing for reqdiag.

use clap::Parser;
use reqdiag_config::CliOverrides;
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(name = "reqdiag")]
#[command(about = "Offline diagnosis of upstream 'Improperly formed request' rejections")]
#[command(version)]
pub struct Cli {
    /// Log file to scan
    #[arg(default_value = "logs/docker.log")]
    pub log: PathBuf,

    /// Sample records shown per issue (default: 5)
    #[arg(long, value_name = "N")]
    pub max_samples: Option<usize>,

    /// Write every extracted request body to DIR as req_line_<N>.json
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<String>,

    /// History length above which W_HISTORY_TOO_LONG is reported (default: 100)
    #[arg(long, value_name = "N")]
    pub max_history: Option<usize>,

    /// Serialized size above which W_PAYLOAD_LARGE is reported (default: 400000)
    #[arg(long, value_name = "BYTES")]
    pub large_bytes: Option<usize>,

    /// Serialized size above which W_PAYLOAD_HUGE is reported (default: 800000)
    #[arg(long, value_name = "BYTES")]
    pub huge_bytes: Option<usize>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            max_history_messages: self.max_history,
            large_payload_bytes: self.large_bytes,
            huge_payload_bytes: self.huge_bytes,
            max_samples: self.max_samples,
            dump_dir: self.dump_dir.clone(),
        }
    }
}
