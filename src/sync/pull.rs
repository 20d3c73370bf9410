//! Replace the local schema with the remote one.
//!
//! Same shape as the push flow: `Checking`, then either `NoAction` or
//! `AwaitingConfirmation`, then `Pulling` and a terminal state. Only a
//! behind or conflicting schema is ever overwritten.

use super::SyncContext;
use super::analyzer::{Analysis, SyncStatus, analyze};
use crate::error::{CliError, Result};
use crate::util::{Confirmation, Prompt};
use std::path::PathBuf;
use tracing::{debug, info};

/// What a successful pull changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pulled {
    pub project_id: String,
    pub previous_version: u64,
    pub new_version: u64,
    pub file_path: PathBuf,
}

#[derive(Debug)]
pub enum PullState {
    Checking,
    AwaitingConfirmation { message: String },
    NoAction { reason: String },
    Pulling,
    Success(Pulled),
    Failed(CliError),
}

impl PullState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::NoAction { .. } | Self::Success(_) | Self::Failed(_))
    }
}

#[derive(Debug)]
pub enum PullOutcome {
    Pulled(Pulled),
    NoAction {
        reason: String,
        analysis: Option<Analysis>,
    },
}

pub struct PullOrchestrator<'a> {
    ctx: SyncContext<'a>,
    state: PullState,
    analysis: Option<Analysis>,
}

impl<'a> PullOrchestrator<'a> {
    #[must_use]
    pub const fn new(ctx: SyncContext<'a>) -> Self {
        Self {
            ctx,
            state: PullState::Checking,
            analysis: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PullState {
        &self.state
    }

    #[must_use]
    pub const fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Run automatic transitions until the flow needs an answer or ends.
    pub fn advance(&mut self) -> &PullState {
        loop {
            let next = match self.state {
                PullState::Checking => self.check(),
                PullState::Pulling => self.pull(),
                _ => break,
            };
            debug!(state = ?next, "Pull transition");
            self.state = next;
        }
        &self.state
    }

    /// Resolve a pending confirmation and continue.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Validation` if no confirmation is pending.
    pub fn answer(&mut self, answer: Confirmation) -> Result<&PullState> {
        if !matches!(self.state, PullState::AwaitingConfirmation { .. }) {
            return Err(CliError::validation(
                "confirmation",
                "no pull confirmation is pending",
            ));
        }
        self.state = if answer.is_yes() {
            PullState::Pulling
        } else {
            info!(?answer, "Pull declined");
            PullState::NoAction {
                reason: "pull cancelled, local schema left unchanged".to_string(),
            }
        };
        Ok(self.advance())
    }

    /// Drive the flow to the end, asking `prompt` when confirmation is due.
    ///
    /// # Errors
    ///
    /// Returns the error that moved the flow to `Failed`, or a prompt error.
    pub fn run(mut self, prompt: &mut dyn Prompt) -> Result<PullOutcome> {
        while let PullState::AwaitingConfirmation { message } = self.advance() {
            let message = message.clone();
            let answer = prompt.confirm(&message)?;
            self.answer(answer)?;
        }
        match self.state {
            PullState::Success(pulled) => Ok(PullOutcome::Pulled(pulled)),
            PullState::NoAction { reason } => Ok(PullOutcome::NoAction {
                reason,
                analysis: self.analysis,
            }),
            PullState::Failed(err) => Err(err),
            other => Err(CliError::Config(format!(
                "pull stopped in a non-terminal state: {other:?}"
            ))),
        }
    }

    fn check(&mut self) -> PullState {
        let analysis = match analyze(&self.ctx) {
            Ok(analysis) => analysis,
            Err(err) => return PullState::Failed(err),
        };
        let next = decide(&analysis);
        self.analysis = Some(analysis);
        next
    }

    fn pull(&self) -> PullState {
        match self.execute() {
            Ok(pulled) => {
                info!(
                    project_id = %pulled.project_id,
                    from = pulled.previous_version,
                    to = pulled.new_version,
                    file = %pulled.file_path.display(),
                    "Pulled schema"
                );
                PullState::Success(pulled)
            }
            Err(err) => PullState::Failed(err),
        }
    }

    fn execute(&self) -> Result<Pulled> {
        let analysis = self.analysis.as_ref().ok_or(CliError::NoSchema)?;
        let project_id = analysis.project_id.clone().ok_or(CliError::NoSchema)?;

        // Fetch again; the copy seen during analysis may be stale by now.
        let remote = self
            .ctx
            .remote
            .fetch_schema(&project_id)?
            .ok_or_else(|| CliError::RemoteSchemaMissing {
                project_id: project_id.clone(),
            })?;
        let file_path = self.ctx.local.write(&remote, self.ctx.dir)?;

        Ok(Pulled {
            project_id,
            previous_version: analysis.local_version().unwrap_or(0),
            new_version: remote.version,
            file_path,
        })
    }
}

fn decide(analysis: &Analysis) -> PullState {
    let no_action = |reason: &str| PullState::NoAction {
        reason: reason.to_string(),
    };
    let file = analysis
        .local
        .as_ref()
        .map_or_else(String::new, |local| local.file_path.display().to_string());
    match analysis.status {
        SyncStatus::Behind => PullState::AwaitingConfirmation {
            message: format!(
                "Pull schema version {} from remote? This overrides the schema in {file}.",
                analysis.remote_version().unwrap_or(0)
            ),
        },
        SyncStatus::Conflict => PullState::AwaitingConfirmation {
            message: format!(
                "Local schema differs from remote at version {}. Pull and override the schema in {file}?",
                analysis.remote_version().unwrap_or(0)
            ),
        },
        SyncStatus::Ahead => {
            no_action("local schema is ahead of remote: did you mean to push?")
        }
        SyncStatus::Invalid => {
            no_action("local schema has errors: fix them, then run 'basic push'")
        }
        SyncStatus::Current => no_action("schema is up to date"),
        SyncStatus::NoSchema => no_action("no schema found: run 'basic init'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{FakeGateway, MemoryStore, schema};
    use crate::util::ScriptedPrompt;
    use std::path::Path;

    fn ctx<'a>(local: &'a MemoryStore, remote: &'a FakeGateway) -> SyncContext<'a> {
        crate::logging::init_test_logging();
        SyncContext::new(local, remote, Path::new("/work"))
    }

    #[test]
    fn behind_asks_and_overwrites_on_yes() {
        let local = MemoryStore::with(schema("p1", 1));
        let remote = FakeGateway::with(schema("p1", 4));
        let mut prompt = ScriptedPrompt::new([Confirmation::Yes]);

        let outcome = PullOrchestrator::new(ctx(&local, &remote))
            .run(&mut prompt)
            .unwrap();
        let PullOutcome::Pulled(pulled) = outcome else {
            panic!("expected a pull");
        };
        assert_eq!(pulled.previous_version, 1);
        assert_eq!(pulled.new_version, 4);
        assert_eq!(local.version(), Some(4));
        assert!(prompt.asked[0].contains("overrides"));
        assert_eq!(remote.called("fetch"), 2);
    }

    #[test]
    fn declining_leaves_file_untouched() {
        let local = MemoryStore::with(schema("p1", 1));
        let remote = FakeGateway::with(schema("p1", 4));
        let mut prompt = ScriptedPrompt::new([Confirmation::No]);

        let outcome = PullOrchestrator::new(ctx(&local, &remote))
            .run(&mut prompt)
            .unwrap();
        assert!(matches!(outcome, PullOutcome::NoAction { .. }));
        assert_eq!(local.writes.get(), 0);
        assert_eq!(local.version(), Some(1));
    }

    #[test]
    fn conflict_requires_confirmation() {
        let local = MemoryStore::with(schema("p1", 2));
        let remote = FakeGateway {
            same_content: false,
            ..FakeGateway::with(schema("p1", 2))
        };
        let mut flow = PullOrchestrator::new(ctx(&local, &remote));
        let PullState::AwaitingConfirmation { message } = flow.advance() else {
            panic!("conflict must ask first");
        };
        assert!(message.contains("override"));
        assert_eq!(local.writes.get(), 0);

        let state = flow.answer(Confirmation::Yes).unwrap();
        assert!(matches!(state, PullState::Success(_)));
        assert_eq!(local.writes.get(), 1);
    }

    #[test]
    fn ahead_suggests_push() {
        let local = MemoryStore::with(schema("p1", 3));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut flow = PullOrchestrator::new(ctx(&local, &remote));
        let PullState::NoAction { reason } = flow.advance() else {
            panic!("ahead must not pull");
        };
        assert!(reason.contains("did you mean to push?"));
        assert_eq!(local.writes.get(), 0);
    }

    #[test]
    fn invalid_reason_has_no_direction() {
        let local = MemoryStore::with(schema("p1", 0));
        let remote = FakeGateway {
            validation: crate::api::ValidationOutcome::invalid(Vec::new()),
            ..FakeGateway::default()
        };
        let mut flow = PullOrchestrator::new(ctx(&local, &remote));
        let PullState::NoAction { reason } = flow.advance() else {
            panic!("invalid must not pull");
        };
        assert!(reason.contains("has errors"));
        assert!(!reason.contains("ahead"));
        assert_eq!(local.writes.get(), 0);
    }

    #[test]
    fn current_is_no_action() {
        let local = MemoryStore::with(schema("p1", 2));
        let remote = FakeGateway::with(schema("p1", 2));
        let mut flow = PullOrchestrator::new(ctx(&local, &remote));
        assert!(matches!(flow.advance(), PullState::NoAction { reason } if reason == "schema is up to date"));
    }

    #[test]
    fn remote_vanishing_before_pull_fails() {
        let local = MemoryStore::with(schema("p1", 1));
        let remote = FakeGateway::with(schema("p1", 4));
        let mut flow = PullOrchestrator::new(ctx(&local, &remote));
        flow.advance();
        *remote.remote.borrow_mut() = None;

        let state = flow.answer(Confirmation::Yes).unwrap();
        assert!(matches!(
            state,
            PullState::Failed(CliError::RemoteSchemaMissing { .. })
        ));
        assert_eq!(local.version(), Some(1));
    }

    #[test]
    fn failed_compare_ends_in_failed() {
        let local = MemoryStore::with(schema("p1", 2));
        let remote = FakeGateway {
            fail_compare: true,
            ..FakeGateway::with(schema("p1", 2))
        };
        let mut flow = PullOrchestrator::new(ctx(&local, &remote));
        assert!(matches!(
            flow.advance(),
            PullState::Failed(CliError::Remote { status: 502, .. })
        ));
        assert_eq!(local.writes.get(), 0);
    }

    #[test]
    fn failed_validation_ends_in_failed() {
        let local = MemoryStore::with(schema("p1", 0));
        let remote = FakeGateway {
            fail_validate: true,
            ..FakeGateway::default()
        };
        let err = PullOrchestrator::new(ctx(&local, &remote))
            .run(&mut ScriptedPrompt::new([Confirmation::Yes]))
            .unwrap_err();
        assert!(matches!(err, CliError::Transport { .. }));
        assert_eq!(local.writes.get(), 0);
    }

    #[test]
    fn failed_write_is_not_success() {
        let local = MemoryStore {
            fail_write: true,
            ..MemoryStore::with(schema("p1", 1))
        };
        let remote = FakeGateway::with(schema("p1", 4));
        let err = PullOrchestrator::new(ctx(&local, &remote))
            .run(&mut ScriptedPrompt::new([Confirmation::Yes]))
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn same_analysis_as_status_and_push() {
        // p1: local v2, remote v2, compare says the content differs.
        let local = MemoryStore::with(schema("p1", 2));
        let remote = FakeGateway {
            same_content: false,
            ..FakeGateway::with(schema("p1", 2))
        };
        let status = analyze(&ctx(&local, &remote)).unwrap().status;

        let mut push = crate::sync::PushOrchestrator::new(ctx(&local, &remote));
        push.advance();
        let mut pull = PullOrchestrator::new(ctx(&local, &remote));
        pull.advance();

        assert_eq!(status, SyncStatus::Conflict);
        assert_eq!(push.analysis().map(|a| a.status), Some(status));
        assert_eq!(pull.analysis().map(|a| a.status), Some(status));
    }
}
