//! Fluent, fail-fast construction of statements.

use crate::extensions::Extensions;
use crate::id::StatementId;
use crate::statement::{
    Activity, Actor, Statement, StatementContext, StatementResult, Verb,
};

/// Error raised by [`StatementBuilder::build`] when a required field was
/// never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// No actor was set
    #[error("statement is missing an actor")]
    MissingActor,

    /// No verb was set
    #[error("statement is missing a verb")]
    MissingVerb,

    /// No activity was set
    #[error("statement is missing an activity")]
    MissingActivity,
}

/// Fluent builder for one [`Statement`].
///
/// `actor`, `verb`, and `activity` are required; [`build`](Self::build) fails
/// synchronously if any of them is absent, before anything reaches the wire.
/// The builder is single-use: `build` consumes it.
///
/// Optional setters are last-write-wins per field, except extension maps,
/// which are merged (union of keys) across repeated `result`/`context` calls.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    actor: Option<Actor>,
    verb: Option<Verb>,
    activity: Option<Activity>,
    result: Option<StatementResult>,
    context: Option<StatementContext>,
}

impl StatementBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the actor.
    pub fn actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the verb.
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = Some(verb);
        self
    }

    /// Set the activity.
    pub fn activity(mut self, activity: Activity) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Set or extend the result. Scalar fields that are `Some` in `result`
    /// overwrite earlier values; extensions are merged.
    pub fn with_result(mut self, result: StatementResult) -> Self {
        self.result = Some(match self.result.take() {
            None => result,
            Some(mut prev) => {
                if result.score.is_some() {
                    prev.score = result.score;
                }
                if result.completion.is_some() {
                    prev.completion = result.completion;
                }
                if result.success.is_some() {
                    prev.success = result.success;
                }
                if result.response.is_some() {
                    prev.response = result.response;
                }
                if result.duration_ms.is_some() {
                    prev.duration_ms = result.duration_ms;
                }
                prev.extensions.merge(result.extensions);
                prev
            }
        });
        self
    }

    /// Set or extend the context. Scalar fields that are `Some` in `context`
    /// overwrite earlier values; extensions are merged.
    pub fn with_context(mut self, context: StatementContext) -> Self {
        self.context = Some(match self.context.take() {
            None => context,
            Some(mut prev) => {
                if context.session.is_some() {
                    prev.session = context.session;
                }
                if context.registration.is_some() {
                    prev.registration = context.registration;
                }
                prev.extensions.merge(context.extensions);
                prev
            }
        });
        self
    }

    /// Shorthand for adding one result extension.
    pub fn result_extension(
        self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.with_result(StatementResult {
            extensions: Extensions::new().with(key, value),
            ..Default::default()
        })
    }

    /// Shorthand for adding one context extension.
    pub fn context_extension(
        self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.with_context(StatementContext {
            extensions: Extensions::new().with(key, value),
            ..Default::default()
        })
    }

    /// Consume the builder and produce the statement.
    pub fn build(self) -> Result<Statement, BuildError> {
        let actor = self.actor.ok_or(BuildError::MissingActor)?;
        let verb = self.verb.ok_or(BuildError::MissingVerb)?;
        let activity = self.activity.ok_or(BuildError::MissingActivity)?;

        Ok(Statement {
            id: StatementId::new(),
            timestamp: chrono::Utc::now(),
            actor,
            verb,
            activity,
            result: self.result,
            context: self.context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lesson() -> Activity {
        Activity::new(
            "https://lms.example/lesson/1",
            "Intro lesson",
            "http://adlnet.gov/expapi/activities/lesson",
        )
    }

    #[test]
    fn build_with_required_fields() {
        let stmt = StatementBuilder::new()
            .actor(Actor::account("u-42"))
            .verb(Verb::Answered)
            .activity(lesson())
            .build()
            .unwrap();

        assert_eq!(stmt.actor, Actor::account("u-42"));
        assert_eq!(stmt.verb, Verb::Answered);
        assert_eq!(stmt.activity.name, "Intro lesson");
        assert!(stmt.result.is_none());
    }

    #[test]
    fn build_fails_on_missing_actor() {
        let err = StatementBuilder::new()
            .verb(Verb::Completed)
            .activity(lesson())
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingActor);
    }

    #[test]
    fn build_fails_on_missing_verb() {
        let err = StatementBuilder::new()
            .actor(Actor::mbox("mailto:a@anon.example"))
            .activity(lesson())
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingVerb);
    }

    #[test]
    fn build_fails_on_missing_activity() {
        let err = StatementBuilder::new()
            .actor(Actor::mbox("mailto:a@anon.example"))
            .verb(Verb::Completed)
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingActivity);
    }

    #[test]
    fn repeated_result_calls_merge_extensions() {
        let stmt = StatementBuilder::new()
            .actor(Actor::account("u-1"))
            .verb(Verb::Interacted)
            .activity(lesson())
            .result_extension("https://learnpulse.dev/ext/kind", "click")
            .result_extension("https://learnpulse.dev/ext/target", "button-3")
            .build()
            .unwrap();

        let result = stmt.result.unwrap();
        assert_eq!(result.extensions.len(), 2);
        assert_eq!(
            result.extensions.get("https://learnpulse.dev/ext/kind"),
            Some(&json!("click"))
        );
    }

    #[test]
    fn repeated_result_calls_last_write_wins_on_scalars() {
        let stmt = StatementBuilder::new()
            .actor(Actor::account("u-1"))
            .verb(Verb::Completed)
            .activity(lesson())
            .with_result(StatementResult {
                score: Some(0.5),
                completion: Some(true),
                ..Default::default()
            })
            .with_result(StatementResult {
                score: Some(0.9),
                ..Default::default()
            })
            .build()
            .unwrap();

        let result = stmt.result.unwrap();
        assert_eq!(result.score, Some(0.9));
        assert_eq!(result.completion, Some(true));
    }
}
