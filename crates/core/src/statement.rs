//! Statement model - atoms of the learning-event stream.
//!
//! A [`Statement`] is one immutable, append-only learning-event record:
//! actor, verb, activity, plus optional result and context. Statements are
//! never mutated or retracted after construction; a correction is a new
//! statement.

use crate::extensions::Extensions;
use crate::id::{RegistrationId, SessionId, StatementId};
use crate::Time;
use serde::{Deserialize, Serialize};

/// Who performed the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// Anonymized mailbox-style identifier, e.g. `mailto:learner-1a2b@anon.example`
    Mbox(String),
    /// Opaque user id issued by the host platform
    Account(String),
}

impl Actor {
    /// Anonymized mailbox actor.
    pub fn mbox(address: impl Into<String>) -> Self {
        Self::Mbox(address.into())
    }

    /// Platform-account actor.
    pub fn account(id: impl Into<String>) -> Self {
        Self::Account(id.into())
    }
}

/// Controlled verb vocabulary.
///
/// Serializes as its short token; the full IRI form is available via
/// [`Verb::iri`] for sinks that require it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Verb {
    Initialized,
    Attempted,
    Answered,
    Completed,
    Progressed,
    Experienced,
    Suspended,
    Terminated,
    Skipped,
    Interacted,
    Played,
    Paused,
}

impl Verb {
    /// Stable IRI form of the verb.
    pub fn iri(&self) -> &'static str {
        match self {
            Verb::Initialized => "http://adlnet.gov/expapi/verbs/initialized",
            Verb::Attempted => "http://adlnet.gov/expapi/verbs/attempted",
            Verb::Answered => "http://adlnet.gov/expapi/verbs/answered",
            Verb::Completed => "http://adlnet.gov/expapi/verbs/completed",
            Verb::Progressed => "http://adlnet.gov/expapi/verbs/progressed",
            Verb::Experienced => "http://adlnet.gov/expapi/verbs/experienced",
            Verb::Suspended => "http://adlnet.gov/expapi/verbs/suspended",
            Verb::Terminated => "http://adlnet.gov/expapi/verbs/terminated",
            Verb::Skipped => "http://id.tincanapi.com/verb/skipped",
            Verb::Interacted => "http://adlnet.gov/expapi/verbs/interacted",
            Verb::Played => "https://w3id.org/xapi/video/verbs/played",
            Verb::Paused => "https://w3id.org/xapi/video/verbs/paused",
        }
    }

    /// Human-readable display form.
    pub fn display(&self) -> &'static str {
        match self {
            Verb::Initialized => "initialized",
            Verb::Attempted => "attempted",
            Verb::Answered => "answered",
            Verb::Completed => "completed",
            Verb::Progressed => "progressed",
            Verb::Experienced => "experienced",
            Verb::Suspended => "suspended",
            Verb::Terminated => "terminated",
            Verb::Skipped => "skipped",
            Verb::Interacted => "interacted",
            Verb::Played => "played",
            Verb::Paused => "paused",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

/// What the action was performed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity identifier (IRI or platform-scoped id)
    pub id: String,

    /// Display name
    pub name: String,

    /// Activity type URI, e.g. `http://adlnet.gov/expapi/activities/lesson`
    pub activity_type: String,
}

impl Activity {
    /// Create a new activity reference.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        activity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            activity_type: activity_type.into(),
        }
    }
}

/// Outcome of the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatementResult {
    /// Scaled score in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Whether the activity was completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,

    /// Whether the outcome counts as success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// Learner response, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Namespaced result annotations
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// Circumstances the action happened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatementContext {
    /// Session the statement belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,

    /// Enrollment registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationId>,

    /// Namespaced context annotations
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// One immutable learning-event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Unique identifier
    pub id: StatementId,

    /// When the statement was constructed
    pub timestamp: Time,

    /// Who performed the action
    pub actor: Actor,

    /// What action was taken
    pub verb: Verb,

    /// What it was taken on
    pub activity: Activity,

    /// Outcome, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<StatementResult>,

    /// Circumstances, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<StatementContext>,
}
