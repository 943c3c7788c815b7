use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::super::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ProviderId, Space, SpaceId,
    SpaceProviderProfile,
};
use super::super::intake::ApplicationDraft;
use super::super::matching::{MatchConfig, MatchEngine, MatchScore};
use super::domain::{ApplicationRecord, ApplicationStatus, ApplicationSubmission, ReviewAction};
use super::repository::{
    ApplicationQuery, ApplicationRepository, BoardColumn, DirectoryError, ProfileDirectory,
    RepositoryError, ReviewBoard, SortField, SortOrder,
};
use super::review::ReviewError;
use super::summary::ApplicationSummary;

/// Service composing the record store, the profile directory and the match engine.
pub struct ApplicationService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    engine: Arc<MatchEngine>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, D> ApplicationService<R, D>
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, config: MatchConfig) -> Self {
        Self {
            repository,
            directory,
            engine: Arc::new(MatchEngine::new(config)),
        }
    }

    /// Scores and stores a new pending application.
    ///
    /// With interested spaces the best-scoring space wins; without, the provider alone
    /// is scored.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let provider = self
            .directory
            .provider(&submission.provider_id)?
            .ok_or_else(|| {
                ApplicationServiceError::UnknownProvider(submission.provider_id.clone())
            })?;

        let mut spaces = Vec::with_capacity(submission.interested_spaces.len());
        for space_id in &submission.interested_spaces {
            let space = self.lookup_space(space_id)?;
            ensure_offered(&provider, &space)?;
            spaces.push(space);
        }

        let score = best_score(&self.engine, &submission, &provider, &spaces);
        let record = ApplicationRecord::pending(
            next_application_id(),
            submission,
            Some(score),
            Utc::now(),
        );
        let stored = self.repository.insert(record)?;

        info!(
            application_id = %stored.id,
            provider_id = %stored.provider_id,
            score = ?stored.computed_score(),
            "application submitted"
        );
        Ok(stored)
    }

    /// Submits one application per provider owning a selected space.
    pub fn submit_draft(
        &self,
        applicant_id: ApplicantId,
        draft: &ApplicationDraft,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let selection = &draft.space_selection;
        if selection.selected_spaces.is_empty() {
            return Err(ApplicationServiceError::NoSpacesSelected);
        }

        let mut by_provider: BTreeMap<ProviderId, Vec<SpaceId>> = BTreeMap::new();
        for space_id in &selection.selected_spaces {
            let space = self.lookup_space(space_id)?;
            let spaces = by_provider.entry(space.provider_id).or_default();
            if !spaces.contains(space_id) {
                spaces.push(space_id.clone());
            }
        }

        let applicant = draft.applicant_profile(applicant_id);
        let notes = Some(selection.additional_notes.trim().to_string()).filter(|n| !n.is_empty());

        by_provider
            .into_iter()
            .map(|(provider_id, interested_spaces)| {
                self.submit(ApplicationSubmission {
                    applicant: applicant.clone(),
                    provider_id,
                    interested_spaces,
                    notes: notes.clone(),
                })
            })
            .collect()
    }

    pub fn review(
        &self,
        id: &ApplicationId,
        action: ReviewAction,
        note: Option<String>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.get(id)?;
        let from = record.status;
        let to = record.review(action, note, Utc::now())?;
        self.repository.update(record.clone())?;

        info!(
            application_id = %id,
            from = from.label(),
            to = to.label(),
            "application reviewed"
        );
        Ok(record)
    }

    pub fn override_score(
        &self,
        id: &ApplicationId,
        score: u16,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.get(id)?;
        record.override_score(score, Utc::now())?;
        self.repository.update(record.clone())?;

        info!(application_id = %id, score, "match score overridden");
        Ok(record)
    }

    pub fn clear_override(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.get(id)?;
        record.clear_override(Utc::now());
        self.repository.update(record.clone())?;

        info!(application_id = %id, "match score override cleared");
        Ok(record)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        Ok(self.repository.query(query)?)
    }

    /// Matching board: every status column, best effective score first.
    pub fn board(
        &self,
        provider_id: Option<&ProviderId>,
    ) -> Result<ReviewBoard, ApplicationServiceError> {
        let query = ApplicationQuery {
            provider_id: provider_id.cloned(),
            sort_by: SortField::MatchScore,
            order: SortOrder::Desc,
            ..ApplicationQuery::default()
        };
        let records = self.repository.query(&query)?;

        let columns = ApplicationStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                applications: records
                    .iter()
                    .filter(|record| record.status == status)
                    .map(ApplicationRecord::status_view)
                    .collect(),
            })
            .collect();

        Ok(ReviewBoard {
            provider_id: provider_id.cloned(),
            columns,
        })
    }

    /// Analytics over every application, or one provider's, by effective score.
    pub fn summary(
        &self,
        provider_id: Option<&ProviderId>,
    ) -> Result<ApplicationSummary, ApplicationServiceError> {
        let query = ApplicationQuery {
            provider_id: provider_id.cloned(),
            ..ApplicationQuery::default()
        };
        let records = self.repository.query(&query)?;
        Ok(ApplicationSummary::from_records(provider_id.cloned(), &records))
    }

    /// Scores a known applicant against a provider without storing anything.
    pub fn preview(
        &self,
        applicant_id: &ApplicantId,
        provider_id: &ProviderId,
        space_id: Option<&SpaceId>,
    ) -> Result<MatchScore, ApplicationServiceError> {
        let applicant = self
            .directory
            .applicant(applicant_id)?
            .ok_or_else(|| ApplicationServiceError::UnknownApplicant(applicant_id.clone()))?;
        let provider = self
            .directory
            .provider(provider_id)?
            .ok_or_else(|| ApplicationServiceError::UnknownProvider(provider_id.clone()))?;
        let space = space_id.map(|id| self.lookup_space(id)).transpose()?;

        self.score_profiles(&applicant, &provider, space.as_ref())
    }

    /// Scores caller-supplied profiles; a space must belong to the provider.
    pub fn score_profiles(
        &self,
        applicant: &ApplicantProfile,
        provider: &SpaceProviderProfile,
        space: Option<&Space>,
    ) -> Result<MatchScore, ApplicationServiceError> {
        if let Some(space) = space {
            ensure_offered(provider, space)?;
        }
        Ok(self.engine.score(applicant, provider, space))
    }

    fn lookup_space(&self, id: &SpaceId) -> Result<Space, ApplicationServiceError> {
        self.directory
            .space(id)?
            .ok_or_else(|| ApplicationServiceError::UnknownSpace(id.clone()))
    }
}

fn ensure_offered(
    provider: &SpaceProviderProfile,
    space: &Space,
) -> Result<(), ApplicationServiceError> {
    if space.provider_id == provider.id {
        return Ok(());
    }
    Err(ApplicationServiceError::SpaceNotOffered {
        space_id: space.id.clone(),
        provider_id: provider.id.clone(),
    })
}

/// Highest total across the spaces; the earliest space wins ties.
fn best_score(
    engine: &MatchEngine,
    submission: &ApplicationSubmission,
    provider: &SpaceProviderProfile,
    spaces: &[Space],
) -> MatchScore {
    let mut best: Option<MatchScore> = None;
    for space in spaces {
        let score = engine.score(&submission.applicant, provider, Some(space));
        if best.as_ref().map_or(true, |current| score.total > current.total) {
            best = Some(score);
        }
    }
    best.unwrap_or_else(|| engine.score(&submission.applicant, provider, None))
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error("unknown applicant '{0}'")]
    UnknownApplicant(ApplicantId),
    #[error("unknown provider '{0}'")]
    UnknownProvider(ProviderId),
    #[error("unknown space '{0}'")]
    UnknownSpace(SpaceId),
    #[error("space '{space_id}' is not offered by provider '{provider_id}'")]
    SpaceNotOffered {
        space_id: SpaceId,
        provider_id: ProviderId,
    },
    #[error("no spaces selected")]
    NoSpacesSelected,
}
