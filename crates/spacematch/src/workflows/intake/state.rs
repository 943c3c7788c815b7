use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::draft::{ApplicationDraft, SectionUpdate};
use super::store::{DraftStore, DraftStoreError};
use super::validation::{validate_draft, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error(transparent)]
    Store(#[from] DraftStoreError),
    #[error("failed to encode draft: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored draft is unreadable: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug)]
pub enum SubmissionError<E> {
    Validation(ValidationErrors),
    Backend(E),
}

impl<E: fmt::Display> fmt::Display for SubmissionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::Validation(errors) => fmt::Display::fmt(errors, f),
            SubmissionError::Backend(err) => write!(f, "submission failed: {err}"),
        }
    }
}

impl<E> std::error::Error for SubmissionError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::Validation(errors) => Some(errors),
            SubmissionError::Backend(err) => Some(err),
        }
    }
}

/// In-memory draft plus its durable mirror.
///
/// The revision counter increases on every mutation; `dirty` tracks whether the
/// mirror is behind the in-memory copy.
pub struct IntakeState<S> {
    draft: ApplicationDraft,
    store: Arc<S>,
    revision: u64,
    dirty: bool,
}

impl<S: DraftStore> IntakeState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            draft: ApplicationDraft::default(),
            store,
            revision: 0,
            dirty: false,
        }
    }

    /// Creates the state and loads any durable copy.
    pub fn restored(store: Arc<S>) -> Self {
        let mut state = Self::new(store);
        state.restore();
        state
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn update_section(&mut self, update: SectionUpdate) {
        debug!(step = update.step().number(), "draft section updated");
        update.apply(&mut self.draft);
        self.revision += 1;
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.draft = ApplicationDraft::default();
        self.revision += 1;
        self.dirty = false;
        if let Err(err) = self.store.remove() {
            warn!(error = %err, "failed to remove stored draft");
        }
    }

    pub fn try_persist(&mut self) -> Result<(), DraftError> {
        let snapshot = serde_json::to_string(&self.draft).map_err(DraftError::Encode)?;
        self.store.save(&snapshot)?;
        self.dirty = false;
        Ok(())
    }

    /// Writes the snapshot; failures are logged and the draft stays dirty.
    pub fn persist(&mut self) {
        if let Err(err) = self.try_persist() {
            warn!(error = %err, revision = self.revision, "failed to persist draft");
        }
    }

    /// Returns whether a write was attempted.
    pub fn persist_if_dirty(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.persist();
        true
    }

    /// Replaces the draft with the durable copy. Returns `Ok(false)` when none exists.
    pub fn try_restore(&mut self) -> Result<bool, DraftError> {
        let Some(raw) = self.store.load()? else {
            return Ok(false);
        };
        let draft: ApplicationDraft = serde_json::from_str(&raw).map_err(DraftError::Decode)?;
        self.draft = draft;
        self.revision += 1;
        self.dirty = false;
        Ok(true)
    }

    pub fn restore(&mut self) {
        match self.try_restore() {
            Ok(true) => debug!(revision = self.revision, "restored stored draft"),
            Ok(false) => {}
            Err(err) => warn!(error = %err, "failed to restore stored draft"),
        }
    }

    /// Validates every step and hands the draft to `submitter`.
    ///
    /// The draft is cleared only when the submitter succeeds.
    pub fn submit<T, E, F>(&mut self, submitter: F) -> Result<T, SubmissionError<E>>
    where
        E: fmt::Display,
        F: FnOnce(&ApplicationDraft) -> Result<T, E>,
    {
        validate_draft(&self.draft).map_err(SubmissionError::Validation)?;
        match submitter(&self.draft) {
            Ok(value) => {
                info!(revision = self.revision, "draft submitted");
                self.clear();
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "draft submission failed; keeping draft");
                Err(SubmissionError::Backend(err))
            }
        }
    }
}

impl<S> fmt::Debug for IntakeState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeState")
            .field("draft", &self.draft)
            .field("revision", &self.revision)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::domain::SpaceId;
    use crate::workflows::intake::draft::{
        AboutBusinessUpdate, BasicInfoUpdate, CollaborationProfileUpdate, Secret,
        SpaceSelectionUpdate,
    };
    use crate::workflows::intake::store::MemoryDraftStore;
    use crate::workflows::intake::WizardStep;

    fn state() -> (Arc<MemoryDraftStore>, IntakeState<MemoryDraftStore>) {
        let store = Arc::new(MemoryDraftStore::new());
        (store.clone(), IntakeState::new(store))
    }

    fn fill_complete(state: &mut IntakeState<MemoryDraftStore>) {
        state.update_section(SectionUpdate::BasicInfo(BasicInfoUpdate {
            company_name: Some("Northwind".to_string()),
            name: Some("Ada Park".to_string()),
            role: Some("CEO".to_string()),
            email: Some("ada@northwind.io".to_string()),
            password: Some(Secret::new("correct-horse")),
            team_size: Some("6-20".to_string()),
            company_stage: Some("growth".to_string()),
            ..Default::default()
        }));
        state.update_section(SectionUpdate::AboutBusiness(AboutBusinessUpdate {
            description: Some("d".repeat(520)),
            industry: Some("Technology & Software".to_string()),
            founded_date: Some("2021-03-01".to_string()),
            funding_status: Some("seed".to_string()),
            current_location: Some("Munich".to_string()),
            tech_stack: Some(vec!["Rust".to_string()]),
            ..Default::default()
        }));
        state.update_section(SectionUpdate::CollaborationProfile(
            CollaborationProfileUpdate {
                looking_for: Some("l".repeat(120)),
                can_offer: Some("c".repeat(120)),
                ideal_neighbors: Some("n".repeat(120)),
                collaboration_interests: Some(vec!["skill-sharing".to_string()]),
            },
        ));
        state.update_section(SectionUpdate::SpaceSelection(SpaceSelectionUpdate {
            selected_spaces: Some(vec![SpaceId::new("loft-2")]),
            terms_accepted: Some(true),
            ..Default::default()
        }));
    }

    #[test]
    fn updates_bump_revision_and_mark_dirty() {
        let (_, mut state) = state();
        assert!(!state.is_dirty());

        state.update_section(SectionUpdate::BasicInfo(BasicInfoUpdate {
            company_name: Some("Northwind".to_string()),
            ..Default::default()
        }));

        assert_eq!(state.revision(), 1);
        assert!(state.is_dirty());
        assert!(state.persist_if_dirty());
        assert!(!state.persist_if_dirty());
    }

    #[test]
    fn persist_then_restore_drops_password() {
        let (store, mut state) = state();
        state.update_section(SectionUpdate::BasicInfo(BasicInfoUpdate {
            company_name: Some("Northwind".to_string()),
            password: Some(Secret::new("correct-horse")),
            ..Default::default()
        }));
        state.persist();

        let restored = IntakeState::restored(store);

        assert_eq!(restored.draft().basic_info.company_name, "Northwind");
        assert!(restored.draft().basic_info.password.is_empty());
        assert!(!restored.is_dirty());
    }

    #[test]
    fn restore_without_copy_keeps_defaults() {
        let (_, mut state) = state();
        assert!(!state.try_restore().expect("empty store loads"));
        assert!(state.draft().is_empty());
    }

    #[test]
    fn corrupt_copy_leaves_draft_untouched() {
        let store = Arc::new(MemoryDraftStore::with_contents("{not json"));
        let mut state = IntakeState::new(store);
        state.update_section(SectionUpdate::BasicInfo(BasicInfoUpdate {
            role: Some("CTO".to_string()),
            ..Default::default()
        }));

        let err = state.try_restore().expect_err("corrupt copy");
        assert!(matches!(err, DraftError::Decode(_)));
        state.restore();
        assert_eq!(state.draft().basic_info.role, "CTO");
    }

    #[test]
    fn failed_persist_keeps_draft_dirty() {
        let (store, mut state) = state();
        state.update_section(SectionUpdate::BasicInfo(BasicInfoUpdate {
            role: Some("CTO".to_string()),
            ..Default::default()
        }));
        store.set_failing(true);

        state.persist();
        assert!(state.is_dirty());

        store.set_failing(false);
        state.persist();
        assert!(!state.is_dirty());
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn clear_removes_durable_copy() {
        let (store, mut state) = state();
        state.update_section(SectionUpdate::BasicInfo(BasicInfoUpdate {
            role: Some("CTO".to_string()),
            ..Default::default()
        }));
        state.persist();

        state.clear();

        assert!(state.draft().is_empty());
        assert!(store.contents().is_none());
        assert!(!state.is_dirty());
    }

    #[test]
    fn submit_rejects_incomplete_draft() {
        let (_, mut state) = state();
        let result: Result<(), SubmissionError<String>> = state.submit(|_| Ok(()));

        match result {
            Err(SubmissionError::Validation(errors)) => {
                assert_eq!(errors.step, WizardStep::BasicInfo)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn failed_submission_keeps_draft() {
        let (store, mut state) = state();
        fill_complete(&mut state);
        state.persist();

        let result: Result<(), _> = state.submit(|_| Err("backend offline".to_string()));

        assert!(matches!(result, Err(SubmissionError::Backend(_))));
        assert_eq!(state.draft().basic_info.company_name, "Northwind");
        assert!(store.contents().is_some());
    }

    #[test]
    fn successful_submission_clears_draft() {
        let (store, mut state) = state();
        fill_complete(&mut state);
        state.persist();

        let company = state
            .submit(|draft| Ok::<_, String>(draft.basic_info.company_name.clone()))
            .expect("submission succeeds");

        assert_eq!(company, "Northwind");
        assert!(state.draft().is_empty());
        assert!(store.contents().is_none());
    }
}
