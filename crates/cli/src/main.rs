//! Learnpulse CLI - developer tool for the telemetry pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use learnpulse_analysis::{
    classify, extract, ContentDescription, LoadEstimator, DISPLAY_RECOMMENDATION_CAP,
};
use learnpulse_channel::{
    ChannelConfig, HttpRecordStore, JsonStateStore, StateKey, TelemetryChannel,
};
use learnpulse_core::{Activity, Actor, CurriculumStage};
use learnpulse_tracker::{Tracker, TrackerConfig, COURSE_ACTIVITY_TYPE};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "learnpulse")]
#[command(about = "Learner cognitive-telemetry tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a content file and report load estimates
    Analyze {
        /// Path to a content description (JSON) or plain text file
        file: String,
        /// Curriculum stage: foundation, developing, proficient, advanced
        #[arg(long, default_value = "foundation")]
        stage: String,
    },
    /// Classify one response latency into a fluency zone
    Classify {
        /// Latency in milliseconds
        latency_ms: i64,
    },
    /// Replay a recorded session log against a record store
    Replay {
        /// Path to a session log (JSON)
        file: String,
        /// Record store statements endpoint
        #[arg(long)]
        endpoint: String,
        /// Bearer token for the endpoint
        #[arg(long)]
        token: Option<String>,
    },
}

/// A recorded learner session, as exported by the host application.
#[derive(Debug, Deserialize)]
struct SessionLog {
    learner: String,
    course_id: String,
    course_name: String,
    unit: String,
    #[serde(default = "default_stage")]
    stage: String,
    actions: Vec<LoggedAction>,
}

fn default_stage() -> String {
    "foundation".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LoggedAction {
    BlockStart {
        block_id: String,
        name: String,
        block_type: String,
    },
    Answer(learnpulse_tracker::AnswerParams),
    Completion(learnpulse_tracker::CompletionParams),
    Interaction(learnpulse_tracker::InteractionParams),
    Media(learnpulse_tracker::MediaParams),
    Progress {
        percent: f64,
    },
    Break(learnpulse_tracker::BreakParams),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { file, stage } => analyze(&file, &stage),
        Commands::Classify { latency_ms } => {
            println!("{}", classify(latency_ms));
            Ok(())
        }
        Commands::Replay {
            file,
            endpoint,
            token,
        } => replay(&file, &endpoint, token).await,
    }
}

fn analyze(file: &str, stage: &str) -> Result<()> {
    let stage = parse_stage(stage)
        .with_context(|| format!("unknown curriculum stage: {stage}"))?;
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {file}"))?;

    // A JSON file is a structured content description; anything else is
    // treated as plain text with no blocks.
    let content: ContentDescription = serde_json::from_str(&raw).unwrap_or(ContentDescription {
        text: Some(raw),
        blocks: Vec::new(),
    });

    let metrics = extract(&content);
    let result = LoadEstimator::new().estimate(&metrics, stage);

    println!("Words:        {}", metrics.word_count);
    println!("Blocks:       {}", metrics.block_count);
    println!("Interactions: {}", metrics.interaction_count);
    println!("Est. minutes: {:.1}", metrics.estimated_duration_min);
    println!();
    println!(
        "Load: intrinsic {} / extraneous {} / germane {} -> total {} (ratio {:.2}, {:?})",
        result.intrinsic, result.extraneous, result.germane, result.total, result.ratio,
        result.level
    );
    for rec in result.recommendations.iter().take(DISPLAY_RECOMMENDATION_CAP) {
        println!("  [{:?}] {}", rec.priority, rec.message);
        if let Some(action) = &rec.action {
            println!("         -> {action}");
        }
    }
    Ok(())
}

async fn replay(file: &str, endpoint: &str, token: Option<String>) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {file}"))?;
    let log: SessionLog = serde_json::from_str(&raw).context("invalid session log")?;
    let stage = parse_stage(&log.stage)
        .with_context(|| format!("unknown curriculum stage: {}", log.stage))?;

    let mut store = HttpRecordStore::new(endpoint);
    if let Some(token) = token {
        store = store.with_auth_token(token);
    }
    let state_store = JsonStateStore::new(".learnpulse").await?;
    let channel = Arc::new(TelemetryChannel::new(
        Arc::new(store),
        Arc::new(state_store),
        ChannelConfig::default(),
    ));

    let tracker = Tracker::new(
        Actor::account(&log.learner),
        Activity::new(&log.course_id, &log.course_name, COURSE_ACTIVITY_TYPE),
        StateKey::new(&log.learner, &log.unit),
        stage,
        channel.clone(),
        TrackerConfig::default(),
    );

    tracker.session_start().await;
    for action in log.actions {
        match action {
            LoggedAction::BlockStart {
                block_id,
                name,
                block_type,
            } => tracker.block_start(&block_id, &name, &block_type).await,
            LoggedAction::Answer(params) => tracker.assessment_answer(params).await,
            LoggedAction::Completion(params) => tracker.block_completion(params).await,
            LoggedAction::Interaction(params) => tracker.interaction(params).await,
            LoggedAction::Media(params) => tracker.media_playback(params).await,
            LoggedAction::Progress { percent } => tracker.progress(percent).await,
            LoggedAction::Break(params) => tracker.break_suggestion(params).await,
        }
    }
    tracker.session_end().await;
    channel.shutdown().await;

    let stats = channel.stats().await;
    println!(
        "Delivered {} statement(s), dropped {} (retry budget), {} (overflow)",
        stats.delivered, stats.dropped_exhausted, stats.dropped_overflow
    );
    Ok(())
}

fn parse_stage(s: &str) -> Option<CurriculumStage> {
    match s.to_ascii_lowercase().as_str() {
        "foundation" => Some(CurriculumStage::Foundation),
        "developing" => Some(CurriculumStage::Developing),
        "proficient" => Some(CurriculumStage::Proficient),
        "advanced" => Some(CurriculumStage::Advanced),
        _ => None,
    }
}
