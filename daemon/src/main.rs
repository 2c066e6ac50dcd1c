//! Agora command line: inspect a governance configuration offline.

use agora_governance::{clock, GovernanceConfig, SessionRule, SessionWindow};
use agora_types::Timestamp;
use agora_utils::{format_duration, init_logging, LogFormat};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "agora", about = "Time-windowed weighted governance tools")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "AGORA_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log output: "human" or "json".
    #[arg(long, default_value = "human", env = "AGORA_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Parse and validate a configuration file.
    #[command(name = "check-config")]
    CheckConfig {
        /// Path to the TOML configuration file.
        #[arg(long, env = "AGORA_CONFIG")]
        config: PathBuf,
    },
    /// Print the upcoming session windows of a configuration.
    Schedule {
        #[arg(long, env = "AGORA_CONFIG")]
        config: PathBuf,

        /// Reference time in unix seconds (defaults to now).
        #[arg(long)]
        at: Option<u64>,

        /// Number of sessions to print.
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// One row of `agora schedule` output.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct ScheduledSession {
    index: usize,
    #[serde(flatten)]
    window: SessionWindow,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level)?;

    match cli.command {
        Command::CheckConfig { config } => {
            let config = load_config(&config)?;
            print!("{}", describe(&config));
        }
        Command::Schedule {
            config,
            at,
            count,
            json,
        } => {
            let config = load_config(&config)?;
            let reference = at.map(Timestamp::new).unwrap_or_else(Timestamp::now);
            let sessions = upcoming_sessions(&config.session_rule, reference, count);
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                for s in &sessions {
                    println!(
                        "#{:<3} campaign {}  vote {}  grace {}  closed {}",
                        s.index,
                        s.window.campaign_at.as_secs(),
                        s.window.vote_at.as_secs(),
                        s.window.grace_at.as_secs(),
                        s.window.closed_at.as_secs(),
                    );
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<GovernanceConfig> {
    let config = GovernanceConfig::from_toml_file(path)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

fn describe(config: &GovernanceConfig) -> String {
    let rule = &config.session_rule;
    let mut out = String::new();
    out.push_str(&format!("engine        {}\n", config.address));
    out.push_str(&format!("asset         {}\n", config.asset));
    out.push_str(&format!(
        "periods       campaign {}, voting {}, grace {} (cycle {}, offset {}s)\n",
        format_duration(rule.campaign_period),
        format_duration(rule.voting_period),
        format_duration(rule.grace_period),
        format_duration(rule.session_period()),
        rule.period_offset,
    ));
    out.push_str(&format!(
        "proposals     {} per session, {} for operators\n",
        rule.max_proposals, rule.max_proposals_operator
    ));
    out.push_str(&format!(
        "thresholds    propose {}, execute {}\n",
        rule.new_proposal_threshold, rule.execute_resolution_threshold
    ));
    out.push_str(&format!(
        "requirements  default {}% / {}%, {} override(s)\n",
        config.default_requirement.majority,
        config.default_requirement.quorum,
        config.requirements.len()
    ));
    out.push_str(&format!(
        "roles         {} operator(s), {} configurator(s)\n",
        config.operators.len(),
        config.configurators.len()
    ));
    out
}

/// The next `count` back-to-back sessions an engine with `rule` would
/// schedule from `reference` on.
fn upcoming_sessions(
    rule: &SessionRule,
    reference: Timestamp,
    count: usize,
) -> Vec<ScheduledSession> {
    let mut sessions = Vec::with_capacity(count);
    let mut reference = reference;
    for index in 1..=count {
        let window = clock::next_window(rule, reference);
        reference = window.closed_at.minus(1);
        sessions.push(ScheduledSession { index, window });
    }
    sessions
}
