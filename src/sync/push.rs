//! Publish the local schema.
//!
//! ```text
//! Checking ──> AwaitingConfirmation ──yes──> Pushing ──> Success | Failed
//!    │                 └──no/cancel──> NoAction
//!    └──> NoAction | Failed
//! ```

use super::SyncContext;
use super::analyzer::{Analysis, SyncStatus, analyze};
use crate::error::{CliError, Result};
use crate::util::{Confirmation, Prompt};
use std::path::PathBuf;
use tracing::{debug, info};

/// What a successful push changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pushed {
    pub project_id: String,
    pub previous_version: u64,
    pub new_version: u64,
    pub file_path: PathBuf,
}

#[derive(Debug)]
pub enum PushState {
    Checking,
    AwaitingConfirmation { message: String },
    NoAction { reason: String },
    Pushing,
    Success(Pushed),
    Failed(CliError),
}

impl PushState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::NoAction { .. } | Self::Success(_) | Self::Failed(_))
    }
}

/// How a push run ended, when it did not fail.
#[derive(Debug)]
pub enum PushOutcome {
    Pushed(Pushed),
    NoAction {
        reason: String,
        analysis: Option<Analysis>,
    },
}

pub struct PushOrchestrator<'a> {
    ctx: SyncContext<'a>,
    state: PushState,
    analysis: Option<Analysis>,
}

impl<'a> PushOrchestrator<'a> {
    #[must_use]
    pub const fn new(ctx: SyncContext<'a>) -> Self {
        Self {
            ctx,
            state: PushState::Checking,
            analysis: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PushState {
        &self.state
    }

    #[must_use]
    pub const fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Run automatic transitions until the flow needs an answer or ends.
    pub fn advance(&mut self) -> &PushState {
        loop {
            let next = match self.state {
                PushState::Checking => self.check(),
                PushState::Pushing => self.push(),
                _ => break,
            };
            debug!(state = ?next, "Push transition");
            self.state = next;
        }
        &self.state
    }

    /// Resolve a pending confirmation and continue.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Validation` if no confirmation is pending.
    pub fn answer(&mut self, answer: Confirmation) -> Result<&PushState> {
        if !matches!(self.state, PushState::AwaitingConfirmation { .. }) {
            return Err(CliError::validation(
                "confirmation",
                "no push confirmation is pending",
            ));
        }
        self.state = if answer.is_yes() {
            PushState::Pushing
        } else {
            info!(?answer, "Push declined");
            PushState::NoAction {
                reason: "push cancelled".to_string(),
            }
        };
        Ok(self.advance())
    }

    /// Drive the flow to the end, asking `prompt` when confirmation is due.
    ///
    /// # Errors
    ///
    /// Returns the error that moved the flow to `Failed`, or a prompt error.
    pub fn run(mut self, prompt: &mut dyn Prompt) -> Result<PushOutcome> {
        while let PushState::AwaitingConfirmation { message } = self.advance() {
            let message = message.clone();
            let answer = prompt.confirm(&message)?;
            self.answer(answer)?;
        }
        match self.state {
            PushState::Success(pushed) => Ok(PushOutcome::Pushed(pushed)),
            PushState::NoAction { reason } => Ok(PushOutcome::NoAction {
                reason,
                analysis: self.analysis,
            }),
            PushState::Failed(err) => Err(err),
            other => Err(CliError::Config(format!(
                "push stopped in a non-terminal state: {other:?}"
            ))),
        }
    }

    fn check(&mut self) -> PushState {
        let analysis = match analyze(&self.ctx) {
            Ok(analysis) => analysis,
            Err(err) => return PushState::Failed(err),
        };
        let next = decide(&analysis);
        self.analysis = Some(analysis);
        next
    }

    fn push(&self) -> PushState {
        match self.execute() {
            Ok(pushed) => {
                info!(
                    project_id = %pushed.project_id,
                    from = pushed.previous_version,
                    to = pushed.new_version,
                    "Pushed schema"
                );
                PushState::Success(pushed)
            }
            Err(err) => PushState::Failed(err),
        }
    }

    fn execute(&self) -> Result<Pushed> {
        // Re-read so edits made while the prompt was open are what gets sent.
        let local = self
            .ctx
            .local
            .read(self.ctx.dir)?
            .ok_or(CliError::NoSchema)?;
        let analysis = self.analysis.as_ref().ok_or(CliError::NoSchema)?;
        let previous_version = analysis.remote_version().unwrap_or(0);

        if analysis.project_id.as_deref() != Some(local.project_id.as_str()) {
            return Err(CliError::validation(
                "project_id",
                format!(
                    "changed to {} while waiting for confirmation; run 'basic status' again",
                    local.project_id
                ),
            ));
        }
        if local.schema.version <= previous_version {
            return Err(CliError::validation(
                "version",
                format!(
                    "changed to {} while waiting for confirmation, not above remote version {previous_version}; run 'basic status' again",
                    local.schema.version
                ),
            ));
        }

        self.ctx
            .remote
            .push_schema(&local.project_id, &local.schema)?;
        Ok(Pushed {
            project_id: local.project_id,
            previous_version,
            new_version: local.schema.version,
            file_path: local.file_path,
        })
    }
}

fn decide(analysis: &Analysis) -> PushState {
    let no_action = |reason: String| PushState::NoAction { reason };
    let remote = analysis.remote_version().unwrap_or(0);
    match analysis.status {
        SyncStatus::Ahead if analysis.requires_version_bump => {
            no_action("schema is at version 0: bump version to 1 before pushing".to_string())
        }
        SyncStatus::Ahead => PushState::AwaitingConfirmation {
            message: format!(
                "Push schema version {} to project {}? (remote is at version {remote})",
                analysis.local_version().unwrap_or(0),
                analysis.project_id.as_deref().unwrap_or_default(),
            ),
        },
        SyncStatus::Behind => no_action(format!(
            "local schema is behind remote version {remote}: run 'basic pull' first"
        )),
        SyncStatus::Conflict => no_action(format!(
            "local schema conflicts with remote version {remote}: bump version or run 'basic pull'"
        )),
        SyncStatus::Invalid => no_action("schema is invalid".to_string()),
        SyncStatus::Current => no_action("schema is already up to date".to_string()),
        SyncStatus::NoSchema => no_action("no schema found: run 'basic init'".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ValidationOutcome;
    use crate::model::ValidationIssue;
    use crate::sync::testing::{FakeGateway, MemoryStore, schema};
    use crate::util::ScriptedPrompt;
    use std::path::Path;

    fn ctx<'a>(local: &'a MemoryStore, remote: &'a FakeGateway) -> SyncContext<'a> {
        crate::logging::init_test_logging();
        SyncContext::new(local, remote, Path::new("/work"))
    }

    #[test]
    fn ahead_waits_for_confirmation_then_pushes() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));

        let state = flow.advance();
        assert!(matches!(state, PushState::AwaitingConfirmation { .. }));
        assert_eq!(remote.called("push"), 0);

        let state = flow.answer(Confirmation::Yes).unwrap();
        let PushState::Success(pushed) = state else {
            panic!("expected success, got {state:?}");
        };
        assert_eq!(pushed.previous_version, 2);
        assert_eq!(pushed.new_version, 3);
        assert_eq!(pushed.file_path, Path::new("/work/basic.config.ts"));
        assert_eq!(remote.remote_version(), Some(3));
        // Analysis read once, push re-read once.
        assert_eq!(local.reads.get(), 2);
    }

    #[test]
    fn declining_is_no_action() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut prompt = ScriptedPrompt::new([Confirmation::No]);
        let outcome = PushOrchestrator::new(ctx(&local, &remote))
            .run(&mut prompt)
            .unwrap();
        assert!(matches!(outcome, PushOutcome::NoAction { .. }));
        assert_eq!(prompt.asked.len(), 1);
        assert!(prompt.asked[0].contains("version 3"));
        assert_eq!(remote.called("push"), 0);
    }

    #[test]
    fn cancel_is_no_action() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut prompt = ScriptedPrompt::new([Confirmation::Cancel]);
        let outcome = PushOrchestrator::new(ctx(&local, &remote))
            .run(&mut prompt)
            .unwrap();
        assert!(matches!(outcome, PushOutcome::NoAction { .. }));
        assert_eq!(remote.called("push"), 0);
    }

    #[test]
    fn behind_never_pushes_or_asks() {
        let local = MemoryStore::with(schema("p1", 1));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut prompt = ScriptedPrompt::new([Confirmation::Yes]);
        let outcome = PushOrchestrator::new(ctx(&local, &remote))
            .run(&mut prompt)
            .unwrap();
        let PushOutcome::NoAction { reason, analysis } = outcome else {
            panic!("behind must not push");
        };
        assert!(reason.contains("basic pull"));
        assert_eq!(analysis.map(|a| a.status), Some(SyncStatus::Behind));
        assert!(prompt.asked.is_empty());
        assert_eq!(remote.called("push"), 0);
    }

    #[test]
    fn conflict_refuses_with_hint() {
        let local = MemoryStore::with(schema("p1", 2));
        let remote = FakeGateway {
            same_content: false,
            ..FakeGateway::with(schema("p1", 2))
        };
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        let PushState::NoAction { reason } = flow.advance() else {
            panic!("conflict must not push");
        };
        assert!(reason.contains("bump version"));
        assert_eq!(remote.called("push"), 0);
    }

    #[test]
    fn version_zero_refuses_without_asking() {
        let local = MemoryStore::with(schema("p1", 0));
        let remote = FakeGateway::default();
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        let PushState::NoAction { reason } = flow.advance() else {
            panic!("version 0 must not push");
        };
        assert!(reason.contains("bump version to 1"));
        assert!(flow.analysis().is_some_and(|a| a.requires_version_bump));
    }

    #[test]
    fn invalid_refuses_and_keeps_errors() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway {
            validation: ValidationOutcome::invalid(vec![ValidationIssue {
                message: "bad".to_string(),
                path: String::new(),
            }]),
            ..FakeGateway::with(schema("p1", 2))
        };
        let outcome = PushOrchestrator::new(ctx(&local, &remote))
            .run(&mut ScriptedPrompt::default())
            .unwrap();
        let PushOutcome::NoAction { analysis, .. } = outcome else {
            panic!("invalid must not push");
        };
        let analysis = analysis.unwrap();
        assert_eq!(analysis.status, SyncStatus::Invalid);
        assert_eq!(analysis.errors.len(), 1);
    }

    #[test]
    fn remote_rejection_fails() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway {
            fail_push: true,
            ..FakeGateway::with(schema("p1", 2))
        };
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        flow.advance();
        let state = flow.answer(Confirmation::Yes).unwrap();
        assert!(matches!(state, PushState::Failed(CliError::Remote { status: 400, .. })));
        assert!(state.is_terminal());
    }

    #[test]
    fn failed_validation_ends_in_failed() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway {
            fail_validate: true,
            ..FakeGateway::with(schema("p1", 2))
        };
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        assert!(matches!(
            flow.advance(),
            PushState::Failed(CliError::Transport { .. })
        ));
        assert_eq!(remote.called("push"), 0);
    }

    #[test]
    fn failed_compare_ends_in_failed() {
        let local = MemoryStore::with(schema("p1", 2));
        let remote = FakeGateway {
            fail_compare: true,
            ..FakeGateway::with(schema("p1", 2))
        };
        let err = PushOrchestrator::new(ctx(&local, &remote))
            .run(&mut ScriptedPrompt::new([Confirmation::Yes]))
            .unwrap_err();
        assert!(matches!(err, CliError::Remote { status: 502, .. }));
        assert_eq!(remote.called("push"), 0);
    }

    #[test]
    fn edits_during_prompt_are_checked_again() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        flow.advance();
        *local.schema.borrow_mut() = Some(schema("p1", 2));

        let state = flow.answer(Confirmation::Yes).unwrap();
        assert!(matches!(
            state,
            PushState::Failed(CliError::Validation { ref field, .. }) if field == "version"
        ));
        assert_eq!(remote.called("push"), 0);

        let local = MemoryStore::with(schema("p1", 3));
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        flow.advance();
        *local.schema.borrow_mut() = Some(schema("p9", 3));

        let state = flow.answer(Confirmation::Yes).unwrap();
        assert!(matches!(
            state,
            PushState::Failed(CliError::Validation { ref field, .. }) if field == "project_id"
        ));
        assert_eq!(remote.called("push"), 0);
        assert_eq!(remote.remote_version(), Some(2));
    }

    #[test]
    fn answer_without_pending_confirmation_is_rejected() {
        let local = MemoryStore::with(schema("p1", 1));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut flow = PushOrchestrator::new(ctx(&local, &remote));
        flow.advance();
        assert!(flow.answer(Confirmation::Yes).is_err());
    }
}
