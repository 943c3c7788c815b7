use chrono::{DateTime, Utc};

use super::domain::{ApplicationRecord, ApplicationStatus, ReviewAction, ReviewEntry, TransitionError};

pub const MAX_SCORE: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(u16),
}

impl ApplicationRecord {
    /// Applies an administrator action. The computed match is left untouched.
    pub fn review(
        &mut self,
        action: ReviewAction,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ApplicationStatus, ReviewError> {
        let from = self.status;
        let to = from.apply(action)?;

        if from == ApplicationStatus::Pending && self.reviewed_at.is_none() {
            self.reviewed_at = Some(now);
        }
        self.status = to;
        self.updated_at = now;
        self.review_log.push(ReviewEntry {
            at: now,
            action,
            from,
            to,
            note: note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
        });
        Ok(to)
    }

    /// Replaces the displayed score; status is unaffected.
    pub fn override_score(&mut self, score: u16, now: DateTime<Utc>) -> Result<(), ReviewError> {
        if score > MAX_SCORE {
            return Err(ReviewError::ScoreOutOfRange(score));
        }
        self.score_override = Some(score as u8);
        self.updated_at = now;
        Ok(())
    }

    pub fn clear_override(&mut self, now: DateTime<Utc>) {
        if self.score_override.take().is_some() {
            self.updated_at = now;
        }
    }
}
