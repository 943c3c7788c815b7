use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::applications::{
    application_router, ApplicationQuery, ApplicationRecord, ApplicationRepository,
    ApplicationService, ApplicationStatus, ApplicationSubmission, DirectoryError,
    ProfileDirectory, RepositoryError,
};
use crate::workflows::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, FundingStatus, ProviderId, Space, SpaceId,
    SpaceProviderProfile, SpaceType, TeamSize, TeamSizeRange,
};
use crate::workflows::matching::{MatchConfig, MatchScore, ScoreBreakdown};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn pixida() -> SpaceProviderProfile {
    SpaceProviderProfile {
        id: ProviderId::new("pixida"),
        company_name: "Pixida".to_string(),
        industry_focus: set(&["Technology & Software"]),
        offers: set(&["skill-sharing", "technical-partnerships"]),
        looking_for: set(&["joint-development"]),
        ideal_team_size: Some(TeamSizeRange::new(10, 20).expect("valid range")),
        ..SpaceProviderProfile::default()
    }
}

pub(super) fn greenhub() -> SpaceProviderProfile {
    SpaceProviderProfile {
        id: ProviderId::new("greenhub"),
        company_name: "Greenhub".to_string(),
        industry_focus: set(&["Energy & Sustainability"]),
        offers: set(&["mentorship-exchange"]),
        ..SpaceProviderProfile::default()
    }
}

pub(super) fn space(id: &str, provider: &str, capacity: u32) -> Space {
    Space {
        id: SpaceId::new(id),
        provider_id: ProviderId::new(provider),
        name: id.to_string(),
        space_type: SpaceType::Office,
        size_sqm: Some(60.0),
        capacity: Some(capacity),
        monthly_price: Some(1_800.0),
        amenities: BTreeSet::new(),
        available_from: None,
        images: Vec::new(),
        location: Some("Munich".to_string()),
    }
}

pub(super) fn applicant() -> ApplicantProfile {
    ApplicantProfile {
        id: ApplicantId::new("applicant-1"),
        company_name: "Northwind Robotics".to_string(),
        industry: Some("Technology".to_string()),
        team_size: Some(TeamSize::new(12).expect("positive")),
        funding_status: Some(FundingStatus::Seed),
        tech_stack: set(&["Rust", "Robotics"]),
        collaboration_interests: set(&["skill-sharing", "joint-development"]),
        ..ApplicantProfile::default()
    }
}

pub(super) fn submission(provider: &str, spaces: &[&str]) -> ApplicationSubmission {
    ApplicationSubmission {
        applicant: applicant(),
        provider_id: ProviderId::new(provider),
        interested_spaces: spaces.iter().map(|id| SpaceId::new(*id)).collect(),
        notes: None,
    }
}

pub(super) fn directory() -> MemoryDirectory {
    let directory = MemoryDirectory::default();
    directory.add_applicant(applicant());
    directory.add_provider(pixida());
    directory.add_provider(greenhub());
    // loft-2 is too small for a team of 12, studio-1 fits
    directory.add_space(space("loft-2", "pixida", 6));
    directory.add_space(space("studio-1", "pixida", 16));
    directory.add_space(space("greenhouse", "greenhub", 12));
    directory
}

pub(super) fn build_service() -> (
    ApplicationService<MemoryRepository, MemoryDirectory>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ApplicationService::new(
        repository.clone(),
        Arc::new(directory()),
        MatchConfig::default(),
    );
    (service, repository)
}

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Stored record with a fixed creation time `minutes` after the base time.
pub(super) fn stored_record(
    id: &str,
    company: &str,
    status: ApplicationStatus,
    score: Option<u8>,
    minutes: i64,
) -> ApplicationRecord {
    let mut submission = submission("pixida", &[]);
    submission.applicant.company_name = company.to_string();
    let match_score = score.map(|total| MatchScore {
        total,
        breakdown: ScoreBreakdown {
            industry: total.min(25),
            size: total.saturating_sub(25).min(25),
            collaboration: total.saturating_sub(50).min(25),
            innovation: total.saturating_sub(75).min(25),
        },
        reasons: Vec::new(),
    });
    let mut record = ApplicationRecord::pending(
        ApplicationId::new(id),
        submission,
        match_score,
        base_time() + Duration::minutes(minutes),
    );
    record.status = status;
    record
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seeded(records: Vec<ApplicationRecord>) -> Self {
        let repository = Self::default();
        for record in records {
            repository.insert(record).expect("unique ids");
        }
        repository
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn query(&self, query: &ApplicationQuery) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(query.apply(guard.values().cloned()))
    }
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn query(&self, _query: &ApplicationQuery) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn query(&self, _query: &ApplicationQuery) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    applicants: Mutex<HashMap<ApplicantId, ApplicantProfile>>,
    providers: Mutex<HashMap<ProviderId, SpaceProviderProfile>>,
    spaces: Mutex<HashMap<SpaceId, Space>>,
}

impl MemoryDirectory {
    pub(super) fn add_applicant(&self, applicant: ApplicantProfile) {
        self.applicants
            .lock()
            .expect("directory mutex poisoned")
            .insert(applicant.id.clone(), applicant);
    }

    pub(super) fn add_provider(&self, provider: SpaceProviderProfile) {
        self.providers
            .lock()
            .expect("directory mutex poisoned")
            .insert(provider.id.clone(), provider);
    }

    pub(super) fn add_space(&self, space: Space) {
        self.spaces
            .lock()
            .expect("directory mutex poisoned")
            .insert(space.id.clone(), space);
    }
}

impl ProfileDirectory for MemoryDirectory {
    fn applicant(&self, id: &ApplicantId) -> Result<Option<ApplicantProfile>, DirectoryError> {
        let guard = self.applicants.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn provider(&self, id: &ProviderId) -> Result<Option<SpaceProviderProfile>, DirectoryError> {
        let guard = self.providers.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn space(&self, id: &SpaceId) -> Result<Option<Space>, DirectoryError> {
        let guard = self.spaces.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn application_router_with_service(
    service: ApplicationService<MemoryRepository, MemoryDirectory>,
) -> axum::Router {
    application_router(Arc::new(service))
}
