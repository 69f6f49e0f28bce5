//! The tracker orchestrator - the single call surface for learner actions.

use crate::params::{
    AnswerParams, BreakParams, CompletionParams, InteractionParams, MediaEvent, MediaParams,
};
use learnpulse_analysis::{classify_with, extract, ContentDescription, FluencyThresholds, LoadEstimator};
use learnpulse_channel::{StateKey, TelemetryChannel};
use learnpulse_core::{
    Activity, Actor, BuildError, CognitiveLoadResult, CurriculumStage, FluencyZone,
    RegistrationId, SessionId, SessionState, Statement, StatementBuilder, StatementContext,
    StatementResult, Time, Verb,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Activity type for course-level statements.
pub const COURSE_ACTIVITY_TYPE: &str = "http://adlnet.gov/expapi/activities/course";

/// Activity type for assessment interactions.
pub const ASSESSMENT_ACTIVITY_TYPE: &str = "http://adlnet.gov/expapi/activities/cmi.interaction";

/// Activity type for media playback.
pub const MEDIA_ACTIVITY_TYPE: &str = "https://w3id.org/xapi/video/activity-type/video";

/// Synthetic activity carrying cognitive-load snapshots.
pub const COGNITIVE_LOAD_ACTIVITY_ID: &str = "https://learnpulse.dev/activity/cognitive-load";

const EXT_INTERACTION_TYPE: &str = "https://learnpulse.dev/ext/interaction-type";
const EXT_ATTEMPT: &str = "https://learnpulse.dev/ext/attempt";
const EXT_FLUENCY_ZONE: &str = "https://learnpulse.dev/ext/fluency-zone";
const EXT_PROGRESS_PERCENT: &str = "https://learnpulse.dev/ext/progress-percent";
const EXT_MEDIA_TIME: &str = "https://learnpulse.dev/ext/media/current-time";
const EXT_MEDIA_DURATION: &str = "https://learnpulse.dev/ext/media/duration";
const EXT_FATIGUE_LEVEL: &str = "https://learnpulse.dev/ext/break/fatigue-level";
const EXT_BREAK_MINUTES: &str = "https://learnpulse.dev/ext/break/suggested-minutes";

/// Timer intervals for the per-session background tasks.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// How often the latest load estimate is snapshotted into the stream
    pub snapshot_interval: Duration,

    /// How often resume state is autosaved
    pub autosave_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: Duration::from_secs(15),
            autosave_interval: Duration::from_secs(30),
        }
    }
}

/// Orchestrates the telemetry pipeline for one learner session.
///
/// Every method maps one learner action to one statement (one per call
/// unless noted) and queues it on the channel. All methods are
/// fire-and-forget: they return once the statement is queued, except
/// [`session_end`](Tracker::session_end), which awaits the immediate flush so
/// a closing tab does not lose the final event. Telemetry failure never
/// surfaces as an error; the worst case is a logged, silently missed event.
pub struct Tracker {
    actor: Actor,
    course: Activity,
    unit_key: StateKey,
    stage: CurriculumStage,
    registration: Option<RegistrationId>,
    channel: Arc<TelemetryChannel>,
    estimator: LoadEstimator,
    thresholds: FluencyThresholds,
    config: TrackerConfig,
    started_at: Mutex<Option<Time>>,
    state: Arc<Mutex<SessionState>>,
    load_tx: watch::Sender<Option<CognitiveLoadResult>>,
    zone_tx: watch::Sender<Option<FluencyZone>>,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Tracker {
    /// Create a tracker for one learner working through one course unit.
    pub fn new(
        actor: Actor,
        course: Activity,
        unit_key: StateKey,
        stage: CurriculumStage,
        channel: Arc<TelemetryChannel>,
        config: TrackerConfig,
    ) -> Self {
        let (load_tx, _) = watch::channel(None);
        let (zone_tx, _) = watch::channel(None);
        Self {
            actor,
            course,
            unit_key,
            stage,
            registration: None,
            channel,
            estimator: LoadEstimator::new(),
            thresholds: FluencyThresholds::default(),
            config,
            started_at: Mutex::new(None),
            state: Arc::new(Mutex::new(SessionState::new())),
            load_tx,
            zone_tx,
            tasks: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Attach an enrollment registration carried on every statement context.
    pub fn with_registration(mut self, registration: RegistrationId) -> Self {
        self.registration = Some(registration);
        self
    }

    /// Use a custom load estimator.
    pub fn with_estimator(mut self, estimator: LoadEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Use custom fluency thresholds.
    pub fn with_thresholds(mut self, thresholds: FluencyThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// The session id shared with the channel.
    pub fn session_id(&self) -> SessionId {
        self.channel.session_id()
    }

    /// Read-only view of the latest cognitive-load result.
    pub fn subscribe_load(&self) -> watch::Receiver<Option<CognitiveLoadResult>> {
        self.load_tx.subscribe()
    }

    /// Read-only view of the latest fluency zone.
    pub fn subscribe_zone(&self) -> watch::Receiver<Option<FluencyZone>> {
        self.zone_tx.subscribe()
    }

    /// Enter the session: resume saved state if any, emit `initialized`, and
    /// start the snapshot and autosave timers.
    pub async fn session_start(&self) {
        if let Some(saved) = self.channel.load_state(&self.unit_key).await {
            debug!("Resuming {} at position {}", self.unit_key, saved.position);
            *self.state.lock().await = saved;
        }
        *self.started_at.lock().await = Some(chrono::Utc::now());

        self.emit(self.builder(Verb::Initialized, self.course.clone()))
            .await;

        let snapshot = tokio::spawn(run_snapshot_task(
            self.channel.clone(),
            self.actor.clone(),
            self.registration,
            self.load_tx.subscribe(),
            self.config.snapshot_interval,
        ));
        let autosave = tokio::spawn(run_autosave_task(
            self.channel.clone(),
            self.unit_key.clone(),
            self.state.clone(),
            self.config.autosave_interval,
        ));
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(snapshot);
            tasks.push(autosave);
        }
    }

    /// Leave the session: emit `terminated` with the elapsed duration, save
    /// state, flush immediately, then cancel the timers. Flush-then-stop:
    /// the final statement gets its delivery attempt before teardown.
    pub async fn session_end(&self) {
        let elapsed_ms = match *self.started_at.lock().await {
            Some(started) => (chrono::Utc::now() - started).num_milliseconds().max(0) as u64,
            None => {
                warn!("session_end without session_start");
                0
            }
        };

        self.emit(
            self.builder(Verb::Terminated, self.course.clone())
                .with_result(StatementResult {
                    duration_ms: Some(elapsed_ms),
                    ..Default::default()
                }),
        )
        .await;

        let state = self.state.lock().await.clone();
        self.channel.save_state(&self.unit_key, &state).await;
        self.channel.flush_now().await;

        self.cancel_timers();
    }

    /// A content block was opened.
    pub async fn block_start(&self, block_id: &str, name: &str, block_type: &str) {
        self.emit(self.builder(Verb::Attempted, Activity::new(block_id, name, block_type)))
            .await;
    }

    /// An assessment question was answered. Classifies the response latency
    /// into a fluency zone and carries it as context.
    pub async fn assessment_answer(&self, params: AnswerParams) {
        // Saturate rather than wrap so huge durations stay in Struggle.
        let latency = i64::try_from(params.duration_ms).unwrap_or(i64::MAX);
        let zone = classify_with(latency, &self.thresholds);
        self.zone_tx.send_replace(Some(zone));

        let mut builder = self
            .builder(
                Verb::Answered,
                Activity::new(&params.block_id, &params.block_name, ASSESSMENT_ACTIVITY_TYPE),
            )
            .with_result(StatementResult {
                score: params.score,
                success: Some(params.correct),
                response: Some(params.response.clone()),
                duration_ms: Some(params.duration_ms),
                ..Default::default()
            })
            .result_extension(EXT_INTERACTION_TYPE, params.interaction_type.as_str())
            .context_extension(EXT_FLUENCY_ZONE, zone.as_str());
        if let Some(attempt) = params.attempt {
            builder = builder.result_extension(EXT_ATTEMPT, attempt);
        }
        self.emit(builder).await;
    }

    /// A content block was completed.
    pub async fn block_completion(&self, params: CompletionParams) {
        self.state.lock().await.complete(&params.block_id);
        self.emit(
            self.builder(
                Verb::Completed,
                Activity::new(&params.block_id, &params.block_name, "block"),
            )
            .with_result(StatementResult {
                score: params.score,
                success: params.success,
                completion: Some(true),
                ..Default::default()
            }),
        )
        .await;
    }

    /// A free-form interaction happened.
    pub async fn interaction(&self, params: InteractionParams) {
        self.emit(
            self.builder(
                Verb::Interacted,
                Activity::new(&params.target_id, &params.target_name, "interaction"),
            )
            .result_extension(EXT_INTERACTION_TYPE, params.interaction_type.as_str()),
        )
        .await;
    }

    /// A media element was played, paused, or finished.
    pub async fn media_playback(&self, params: MediaParams) {
        let verb = match params.event {
            MediaEvent::Played => Verb::Played,
            MediaEvent::Paused => Verb::Paused,
            MediaEvent::Completed => Verb::Completed,
        };
        let mut result = StatementResult::default();
        if params.event == MediaEvent::Completed {
            result.completion = Some(true);
        }
        result.extensions.insert(EXT_MEDIA_TIME, params.current_time_s);
        if let Some(duration) = params.duration_s {
            result.extensions.insert(EXT_MEDIA_DURATION, duration);
        }
        self.emit(
            self.builder(
                verb,
                Activity::new(&params.media_id, &params.media_name, MEDIA_ACTIVITY_TYPE),
            )
            .with_result(result),
        )
        .await;
    }

    /// Overall progress changed. Percent is clamped into [0, 100].
    pub async fn progress(&self, percent: f64) {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.emit(
            self.builder(Verb::Progressed, self.course.clone())
                .result_extension(EXT_PROGRESS_PERCENT, percent),
        )
        .await;
    }

    /// Bridge a cognitive-load result into the event stream as an
    /// `experienced` statement, and publish it to subscribers.
    pub async fn cognitive_load_snapshot(&self, result: &CognitiveLoadResult) {
        self.load_tx.send_replace(Some(result.clone()));
        match snapshot_statement(
            &self.actor,
            self.channel.session_id(),
            self.registration,
            result,
        ) {
            Ok(statement) => self.channel.send(statement).await,
            Err(e) => warn!("Dropping malformed load snapshot: {}", e),
        }
    }

    /// A break was suggested; emit `suspended` if accepted, `skipped` if not.
    pub async fn break_suggestion(&self, params: BreakParams) {
        let verb = if params.accepted {
            Verb::Suspended
        } else {
            Verb::Skipped
        };
        self.emit(
            self.builder(verb, self.course.clone())
                .result_extension(EXT_FATIGUE_LEVEL, params.fatigue_level)
                .result_extension(EXT_BREAK_MINUTES, params.suggested_minutes),
        )
        .await;
    }

    /// Analyze content and publish the load estimate to subscribers. The
    /// snapshot timer picks the latest estimate up on its next tick.
    pub async fn analyze_content(&self, content: &ContentDescription) -> CognitiveLoadResult {
        let metrics = extract(content);
        let result = self.estimator.estimate(&metrics, self.stage);
        self.load_tx.send_replace(Some(result.clone()));
        result
    }

    /// The learner navigated to a sub-unit; state is saved through the
    /// channel so re-entry resumes there.
    pub async fn visit(&self, position: usize) {
        let state = {
            let mut state = self.state.lock().await;
            state.visit(position);
            state.clone()
        };
        self.channel.save_state(&self.unit_key, &state).await;
    }

    fn builder(&self, verb: Verb, activity: Activity) -> StatementBuilder {
        StatementBuilder::new()
            .actor(self.actor.clone())
            .verb(verb)
            .activity(activity)
            .with_context(StatementContext {
                session: Some(self.channel.session_id()),
                registration: self.registration,
                ..Default::default()
            })
    }

    async fn emit(&self, builder: StatementBuilder) {
        match builder.build() {
            Ok(statement) => self.channel.send(statement).await,
            Err(e) => warn!("Dropping malformed statement: {}", e),
        }
    }

    fn cancel_timers(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        // Abnormal teardown still cancels the timers.
        self.cancel_timers();
    }
}

fn snapshot_statement(
    actor: &Actor,
    session: SessionId,
    registration: Option<RegistrationId>,
    result: &CognitiveLoadResult,
) -> Result<Statement, BuildError> {
    StatementBuilder::new()
        .actor(actor.clone())
        .verb(Verb::Experienced)
        .activity(Activity::new(
            COGNITIVE_LOAD_ACTIVITY_ID,
            "Cognitive load",
            COGNITIVE_LOAD_ACTIVITY_ID,
        ))
        .with_result(StatementResult {
            extensions: result.to_extensions(),
            ..Default::default()
        })
        .with_context(StatementContext {
            session: Some(session),
            registration,
            ..Default::default()
        })
        .build()
}

async fn run_snapshot_task(
    channel: Arc<TelemetryChannel>,
    actor: Actor,
    registration: Option<RegistrationId>,
    mut load_rx: watch::Receiver<Option<CognitiveLoadResult>>,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    // The first tick fires immediately; skip it so snapshots start one
    // period into the session.
    interval.tick().await;
    loop {
        interval.tick().await;
        let latest = load_rx.borrow_and_update().clone();
        if let Some(result) = latest {
            match snapshot_statement(&actor, channel.session_id(), registration, &result) {
                Ok(statement) => channel.send(statement).await,
                Err(e) => warn!("Dropping malformed load snapshot: {}", e),
            }
        }
    }
}

async fn run_autosave_task(
    channel: Arc<TelemetryChannel>,
    key: StateKey,
    state: Arc<Mutex<SessionState>>,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await;
    loop {
        interval.tick().await;
        let snapshot = state.lock().await.clone();
        channel.save_state(&key, &snapshot).await;
    }
}
