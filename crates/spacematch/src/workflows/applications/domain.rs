use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicantProfile, ApplicationId, ProviderId, SpaceId};
use super::super::matching::MatchScore;

/// Review lifecycle of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected
        )
    }

    /// Resolves the status an administrator action leads to.
    pub fn apply(self, action: ReviewAction) -> Result<ApplicationStatus, TransitionError> {
        use ApplicationStatus::*;

        if self.is_terminal() {
            return Err(TransitionError::Terminal { status: self });
        }
        match (self, action) {
            (Pending, ReviewAction::MarkReviewed) => Ok(Reviewed),
            (Reviewed, ReviewAction::Shortlist) => Ok(Shortlisted),
            (Shortlisted, ReviewAction::Accept) => Ok(Accepted),
            (_, ReviewAction::Reject) => Ok(Rejected),
            (from, action) => Err(TransitionError::NotAllowed { from, action }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    MarkReviewed,
    Shortlist,
    Accept,
    Reject,
}

impl ReviewAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::MarkReviewed => "mark_reviewed",
            ReviewAction::Shortlist => "shortlist",
            ReviewAction::Accept => "accept",
            ReviewAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application is already {} and cannot change", .status.label())]
    Terminal { status: ApplicationStatus },
    #[error("cannot {} an application that is {}", .action.label(), .from.label())]
    NotAllowed {
        from: ApplicationStatus,
        action: ReviewAction,
    },
}

/// One administrator decision, kept in order on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub at: DateTime<Utc>,
    pub action: ReviewAction,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Application as handed over by the intake flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub applicant: ApplicantProfile,
    pub provider_id: ProviderId,
    #[serde(default)]
    pub interested_spaces: Vec<SpaceId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Stored application with its computed match and review history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub applicant: ApplicantProfile,
    pub provider_id: ProviderId,
    pub status: ApplicationStatus,
    pub match_score: Option<MatchScore>,
    pub score_override: Option<u8>,
    pub interested_spaces: Vec<SpaceId>,
    pub notes: Option<String>,
    pub review_log: Vec<ReviewEntry>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// New pending record; the submission time doubles as creation time.
    pub fn pending(
        id: ApplicationId,
        submission: ApplicationSubmission,
        match_score: Option<MatchScore>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            applicant: submission.applicant,
            provider_id: submission.provider_id,
            status: ApplicationStatus::Pending,
            match_score,
            score_override: None,
            interested_spaces: submission.interested_spaces,
            notes: submission.notes,
            review_log: Vec::new(),
            created_at: now,
            submitted_at: now,
            reviewed_at: None,
            updated_at: now,
        }
    }

    pub fn company_name(&self) -> &str {
        &self.applicant.company_name
    }

    pub fn computed_score(&self) -> Option<u8> {
        self.match_score.as_ref().map(|score| score.total)
    }

    /// Override when set, otherwise the computed total.
    pub fn effective_score(&self) -> Option<u8> {
        self.score_override.or_else(|| self.computed_score())
    }
}
