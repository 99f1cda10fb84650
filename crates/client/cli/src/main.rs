//! Command-line battle runner.
mod args;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, ScenarioLoader};
use battle_core::{ActionStatus, BattleConfig};
use battle_runtime::{Simulation, TickReport};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use args::{Args, EnvConfig};

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    setup_logging(&EnvConfig::from_env())?;

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => BattleConfig::default(),
    };
    if let Some(max_ticks) = args.max_ticks {
        config.max_ticks = max_ticks;
    }
    if let Some(level) = args.level {
        config.execution.validation_level = level;
    }

    let mut scenario = ScenarioLoader::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(kind) = args.evaluator {
        for spec in &mut scenario.agents {
            spec.evaluator = kind;
        }
    }

    let mut simulation = Simulation::from_scenario(&scenario, config)
        .with_context(|| format!("Failed to set up '{}'", scenario.name))?;

    println!(
        "{}: {} agent(s), seed {}, level {}",
        scenario.name,
        simulation.battlefield().len(),
        simulation.battlefield().seed,
        simulation.config().execution.validation_level
    );

    let verbose = args.verbose;
    let outcome = simulation.run_with(|report| {
        if verbose {
            print_tick(report);
        }
    });

    println!();
    println!("{outcome}");
    let stats = outcome.stats;
    println!(
        "  success {}  partial {}  failed {}  blocked {}  cancelled {}",
        stats.success, stats.partial, stats.failed, stats.blocked, stats.cancelled
    );
    println!(
        "  avg validation {:?}  avg execution {:?}",
        stats.average_validation_time(),
        stats.average_execution_time()
    );

    println!();
    for agent in simulation.battlefield().agents() {
        let history = simulation.decision_history(agent.id)?;
        let state = if agent.alive {
            format!("{:.0}/{:.0} hp", agent.health.current, agent.health.maximum)
        } else {
            "down".to_string()
        };
        println!(
            "{} [{}] {} ({})",
            agent.id,
            agent.team.map_or_else(|| "neutral".to_string(), |t| t.to_string()),
            state,
            simulation.evaluator_name(agent.id)?
        );
        println!("    {}", history.summary(args.summary));
    }

    Ok(())
}

fn print_tick(report: &TickReport) {
    for entry in &report.entries {
        let mut line = format!(
            "[{:>4}] {} {} -> {}",
            report.tick, entry.agent, entry.decision.action, entry.result.status
        );
        if entry.decision.fallback {
            line.push_str(" (fallback)");
        }
        if entry.result.status != ActionStatus::Success
            && let Some(reason) = entry.result.reason()
        {
            line.push_str(&format!(": {reason}"));
        }
        println!("{line}");
    }
    for defeated in &report.defeated {
        println!("[{:>4}] {} defeated", report.tick, defeated);
    }
}

/// Logs to stderr, and additionally to a session file when `BATTLE_LOG_DIR` is set.
fn setup_logging(env: &EnvConfig) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    // Create env filter
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let mut session_log = None;
    let file_layer = match &env.log_dir {
        Some(log_dir) => {
            let session_id = env.session_id.clone().unwrap_or_else(|| {
                let timestamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                format!("session_{}", timestamp)
            });
            let session_log_dir = log_dir.join(&session_id);
            std::fs::create_dir_all(&session_log_dir).with_context(|| {
                format!("Failed to create log directory {}", session_log_dir.display())
            })?;

            let file_appender = tracing_appender::rolling::never(&session_log_dir, "battle.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            // Leak the guard to keep file writer alive
            std::mem::forget(guard);

            session_log = Some(session_log_dir);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = session_log {
        tracing::info!("Log file: {}/battle.log", dir.display());
    }
    Ok(())
}
