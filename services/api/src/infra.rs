use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use spacematch::error::AppError;
use spacematch::workflows::applications::{
    ApplicationQuery, ApplicationRecord, ApplicationRepository, DirectoryError, ProfileDirectory,
    RepositoryError,
};
use spacematch::workflows::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ProviderId, Space, SpaceId, SpaceProviderProfile,
    SpaceType, TeamSizeRange,
};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        match guard.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
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

/// Profiles and spaces normally served by the hosted backend.
#[derive(Default)]
pub(crate) struct InMemoryProfileDirectory {
    applicants: Mutex<HashMap<ApplicantId, ApplicantProfile>>,
    providers: Mutex<HashMap<ProviderId, SpaceProviderProfile>>,
    spaces: Mutex<HashMap<SpaceId, Space>>,
}

impl InMemoryProfileDirectory {
    /// Two providers with three spaces between them.
    pub(crate) fn seeded() -> Self {
        let directory = Self::default();
        for provider in demo_providers() {
            directory.add_provider(provider);
        }
        for space in demo_spaces() {
            directory.add_space(space);
        }
        directory
    }

    pub(crate) fn add_applicant(&self, applicant: ApplicantProfile) {
        self.applicants
            .lock()
            .expect("directory mutex poisoned")
            .insert(applicant.id.clone(), applicant);
    }

    pub(crate) fn add_provider(&self, provider: SpaceProviderProfile) {
        self.providers
            .lock()
            .expect("directory mutex poisoned")
            .insert(provider.id.clone(), provider);
    }

    pub(crate) fn add_space(&self, space: Space) {
        self.spaces
            .lock()
            .expect("directory mutex poisoned")
            .insert(space.id.clone(), space);
    }

    pub(crate) fn spaces(&self) -> Vec<Space> {
        let guard = self.spaces.lock().expect("directory mutex poisoned");
        let mut spaces: Vec<Space> = guard.values().cloned().collect();
        spaces.sort_by(|a, b| a.id.cmp(&b.id));
        spaces
    }
}

impl ProfileDirectory for InMemoryProfileDirectory {
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

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn demo_providers() -> Vec<SpaceProviderProfile> {
    vec![
        SpaceProviderProfile {
            id: ProviderId::new("pixida"),
            company_name: "Pixida".to_string(),
            tagline: Some("Engineering studio for connected mobility".to_string()),
            founded_year: Some(2008),
            industry_focus: tags(&["Technology & Software"]),
            looking_for: tags(&["joint-development", "skill-sharing"]),
            offers: tags(&["technical-partnerships", "mentorship-exchange"]),
            values: tags(&["openness", "craft"]),
            ideal_team_size: TeamSizeRange::new(5, 25).ok(),
            ..SpaceProviderProfile::default()
        },
        SpaceProviderProfile {
            id: ProviderId::new("greenhub"),
            company_name: "Greenhub Collective".to_string(),
            tagline: Some("Shared labs for climate hardware".to_string()),
            founded_year: Some(2016),
            industry_focus: tags(&["Energy & Sustainability", "Manufacturing & Hardware"]),
            looking_for: tags(&["resource-sharing"]),
            offers: tags(&["resource-sharing", "networking-events"]),
            ideal_team_size: TeamSizeRange::new(2, 12).ok(),
            ..SpaceProviderProfile::default()
        },
    ]
}

fn demo_space(id: &str, provider: &str, name: &str, space_type: SpaceType, capacity: u32) -> Space {
    Space {
        id: SpaceId::new(id),
        provider_id: ProviderId::new(provider),
        name: name.to_string(),
        space_type,
        size_sqm: Some(f64::from(capacity) * 6.5),
        capacity: Some(capacity),
        monthly_price: Some(f64::from(capacity) * 320.0),
        amenities: tags(&["wifi", "kitchen"]),
        available_from: None,
        images: Vec::new(),
        location: Some("Munich".to_string()),
    }
}

fn demo_spaces() -> Vec<Space> {
    vec![
        demo_space("pixida-loft", "pixida", "Loft Office", SpaceType::Office, 8),
        demo_space("pixida-floor", "pixida", "Second Floor", SpaceType::Coworking, 24),
        demo_space("greenhub-lab", "greenhub", "Prototype Lab", SpaceType::Workshop, 10),
    ]
}

/// Reads and decodes a JSON document from disk.
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
