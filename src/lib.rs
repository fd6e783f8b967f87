pub mod db;
pub mod emotion;
pub mod flow;
pub mod fusion;
pub mod models;
pub mod segmentation;
pub mod settings;
mod utils;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub use db::Database;
pub use emotion::{Distribution, EmotionLabel, Observation};
pub use flow::{FlowAnalysis, FlowAnalyzer, FlowStore, FlowStoreError, RefreshOutcome};
pub use fusion::{FusionConfig, FusionResult};
pub use models::{EmotionFlow, FlowMetrics, FlowPattern, Segment};
pub use segmentation::SegmentationConfig;
pub use settings::AnalysisSettings;

/// Environment variable pointing at an optional JSON settings file.
pub const SETTINGS_ENV: &str = "REMINISCE_FLOW_SETTINGS";

const USAGE: &str = "usage: reminisce-flow <db-path> <conversation-id> [--force]";

struct CliArgs {
    db_path: PathBuf,
    conversation_id: String,
    force: bool,
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut force = false;

    for arg in args {
        match arg.as_str() {
            "--force" => force = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(db_path), Some(conversation_id), None) =
        (positional.next(), positional.next(), positional.next())
    else {
        bail!(USAGE);
    };

    Ok(CliArgs {
        db_path: PathBuf::from(db_path),
        conversation_id,
        force,
    })
}

fn load_settings() -> Result<AnalysisSettings> {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) => AnalysisSettings::load(&PathBuf::from(path)),
        None => Ok(AnalysisSettings::default()),
    }
}

/// Analyze one stored conversation and print its emotion flow as JSON.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let analyzer = FlowAnalyzer::from_settings(&load_settings()?);
    let database = Database::new(args.db_path)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let flow = runtime.block_on(async {
        if args.force {
            analyzer.recompute(&database, &args.conversation_id).await
        } else {
            analyzer
                .refresh(&database, &args.conversation_id)
                .await
                .map(|outcome| outcome.flow().clone())
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&flow)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn force_flag_may_appear_anywhere() {
        let parsed = parse_args(args(&["--force", "flows.db", "conv-1"])).unwrap();
        assert!(parsed.force);
        assert_eq!(parsed.db_path, PathBuf::from("flows.db"));
        assert_eq!(parsed.conversation_id, "conv-1");

        let parsed = parse_args(args(&["flows.db", "conv-1"])).unwrap();
        assert!(!parsed.force);
    }

    #[test]
    fn wrong_arity_and_unknown_flags_are_rejected() {
        assert!(parse_args(args(&["flows.db"])).is_err());
        assert!(parse_args(args(&["a", "b", "c"])).is_err());
        assert!(parse_args(args(&["a", "b", "--verbose"])).is_err());
    }
}
