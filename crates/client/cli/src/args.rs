//! Command-line arguments and environment overrides.
use std::env;
use std::path::PathBuf;

use battle_core::{EvaluatorKind, ValidationLevel};
use clap::Parser;

/// Run a scripted battle to completion and print the outcome.
#[derive(Debug, Parser)]
#[command(name = "battle-sim", version)]
pub struct Args {
    /// Scenario file (RON)
    pub scenario: PathBuf,

    /// Battle configuration (TOML); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured tick limit
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Override the execution-time validation level
    #[arg(long, value_parser = parse_level)]
    pub level: Option<ValidationLevel>,

    /// Use this evaluator for every agent, ignoring the scenario's choices
    #[arg(long, value_parser = parse_evaluator)]
    pub evaluator: Option<EvaluatorKind>,

    /// Override the scenario seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print one line per agent turn
    #[arg(short, long)]
    pub verbose: bool,

    /// Decisions per agent included in the closing summary
    #[arg(long, default_value_t = 20)]
    pub summary: usize,
}

fn parse_level(value: &str) -> Result<ValidationLevel, String> {
    value
        .parse()
        .map_err(|_| format!("unknown validation level '{value}' (basic, standard, strict, paranoid)"))
}

fn parse_evaluator(value: &str) -> Result<EvaluatorKind, String> {
    value
        .parse()
        .map_err(|_| format!("unknown evaluator '{value}' (default, aggressive)"))
}

/// Settings read from the process environment.
///
/// Environment variables:
/// - `BATTLE_LOG_DIR` - Also write logs to `<dir>/<session>/battle.log`
/// - `BATTLE_SESSION_ID` - Session directory name (default: `session_<unix-seconds>`)
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    pub log_dir: Option<PathBuf>,
    pub session_id: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_dir: env::var_os("BATTLE_LOG_DIR").map(PathBuf::from),
            session_id: env::var("BATTLE_SESSION_ID").ok(),
        }
    }
}
