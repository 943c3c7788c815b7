//! The four-section application draft and its partial updates.
//!
//! Fields marked `#[serde(skip)]` are never written to the durable mirror and always
//! deserialize to their empty default, whatever the stored copy contains.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicantId, ApplicantProfile, SpaceId, TeamSize};

/// String that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(<redacted>)")
        }
    }
}

/// Image picked in the wizard, held in memory until upload.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInfo {
    pub company_name: String,
    pub name: String,
    pub role: String,
    pub email: String,
    #[serde(skip)]
    pub password: Secret,
    pub website: String,
    pub linkedin_profile: String,
    /// Wizard option such as `"6-20"`.
    pub team_size: String,
    pub company_stage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutBusiness {
    pub description: String,
    pub industry: String,
    pub founded_date: String,
    pub funding_status: String,
    pub current_location: String,
    pub tech_stack: Vec<String>,
    #[serde(skip)]
    pub company_images: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborationProfile {
    pub looking_for: String,
    pub can_offer: String,
    pub ideal_neighbors: String,
    pub collaboration_interests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSelection {
    pub selected_spaces: Vec<SpaceId>,
    pub priorities: BTreeMap<SpaceId, u8>,
    pub additional_notes: String,
    pub terms_accepted: bool,
}

/// Working copy of an application across the four wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDraft {
    pub basic_info: BasicInfo,
    pub about_business: AboutBusiness,
    pub collaboration_profile: CollaborationProfile,
    pub space_selection: SpaceSelection,
}

impl ApplicationDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Maps the draft onto the stored applicant record. Unparseable options become `None`.
    pub fn applicant_profile(&self, id: ApplicantId) -> ApplicantProfile {
        let basic = &self.basic_info;
        let about = &self.about_business;
        let collaboration = &self.collaboration_profile;

        ApplicantProfile {
            id,
            company_name: basic.company_name.trim().to_string(),
            industry: non_empty(&about.industry),
            team_size: TeamSize::from_option(&basic.team_size),
            company_stage: basic.company_stage.parse().ok(),
            founded_date: NaiveDate::parse_from_str(about.founded_date.trim(), "%Y-%m-%d").ok(),
            funding_status: about.funding_status.parse().ok(),
            description: about.description.trim().to_string(),
            looking_for: collaboration.looking_for.trim().to_string(),
            can_offer: collaboration.can_offer.trim().to_string(),
            ideal_neighbors: collaboration.ideal_neighbors.trim().to_string(),
            tech_stack: trimmed_set(&about.tech_stack),
            collaboration_interests: trimmed_set(&collaboration.collaboration_interests),
            website: non_empty(&basic.website),
            linkedin: non_empty(&basic.linkedin_profile),
            images: Vec::new(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn trimmed_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BasicInfoUpdate {
    pub company_name: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub password: Option<Secret>,
    pub website: Option<String>,
    pub linkedin_profile: Option<String>,
    pub team_size: Option<String>,
    pub company_stage: Option<String>,
}

impl BasicInfoUpdate {
    fn apply(self, section: &mut BasicInfo) {
        merge(&mut section.company_name, self.company_name);
        merge(&mut section.name, self.name);
        merge(&mut section.role, self.role);
        merge(&mut section.email, self.email);
        merge(&mut section.password, self.password);
        merge(&mut section.website, self.website);
        merge(&mut section.linkedin_profile, self.linkedin_profile);
        merge(&mut section.team_size, self.team_size);
        merge(&mut section.company_stage, self.company_stage);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AboutBusinessUpdate {
    pub description: Option<String>,
    pub industry: Option<String>,
    pub founded_date: Option<String>,
    pub funding_status: Option<String>,
    pub current_location: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub company_images: Option<Vec<UploadedFile>>,
}

impl AboutBusinessUpdate {
    fn apply(self, section: &mut AboutBusiness) {
        merge(&mut section.description, self.description);
        merge(&mut section.industry, self.industry);
        merge(&mut section.founded_date, self.founded_date);
        merge(&mut section.funding_status, self.funding_status);
        merge(&mut section.current_location, self.current_location);
        merge(&mut section.tech_stack, self.tech_stack);
        merge(&mut section.company_images, self.company_images);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollaborationProfileUpdate {
    pub looking_for: Option<String>,
    pub can_offer: Option<String>,
    pub ideal_neighbors: Option<String>,
    pub collaboration_interests: Option<Vec<String>>,
}

impl CollaborationProfileUpdate {
    fn apply(self, section: &mut CollaborationProfile) {
        merge(&mut section.looking_for, self.looking_for);
        merge(&mut section.can_offer, self.can_offer);
        merge(&mut section.ideal_neighbors, self.ideal_neighbors);
        merge(
            &mut section.collaboration_interests,
            self.collaboration_interests,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpaceSelectionUpdate {
    pub selected_spaces: Option<Vec<SpaceId>>,
    pub priorities: Option<BTreeMap<SpaceId, u8>>,
    pub additional_notes: Option<String>,
    pub terms_accepted: Option<bool>,
}

impl SpaceSelectionUpdate {
    fn apply(self, section: &mut SpaceSelection) {
        merge(&mut section.selected_spaces, self.selected_spaces);
        merge(&mut section.priorities, self.priorities);
        merge(&mut section.additional_notes, self.additional_notes);
        merge(&mut section.terms_accepted, self.terms_accepted);
    }
}

/// Partial data for one section; `None` fields leave the current value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "section", content = "data", rename_all = "snake_case")]
pub enum SectionUpdate {
    BasicInfo(BasicInfoUpdate),
    AboutBusiness(AboutBusinessUpdate),
    CollaborationProfile(CollaborationProfileUpdate),
    SpaceSelection(SpaceSelectionUpdate),
}

impl SectionUpdate {
    pub fn step(&self) -> WizardStep {
        match self {
            SectionUpdate::BasicInfo(_) => WizardStep::BasicInfo,
            SectionUpdate::AboutBusiness(_) => WizardStep::AboutBusiness,
            SectionUpdate::CollaborationProfile(_) => WizardStep::CollaborationProfile,
            SectionUpdate::SpaceSelection(_) => WizardStep::SpaceSelection,
        }
    }

    pub(crate) fn apply(self, draft: &mut ApplicationDraft) {
        match self {
            SectionUpdate::BasicInfo(update) => update.apply(&mut draft.basic_info),
            SectionUpdate::AboutBusiness(update) => update.apply(&mut draft.about_business),
            SectionUpdate::CollaborationProfile(update) => {
                update.apply(&mut draft.collaboration_profile)
            }
            SectionUpdate::SpaceSelection(update) => update.apply(&mut draft.space_selection),
        }
    }
}

/// Wizard steps in order. Progression is gated by the calling pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    BasicInfo,
    AboutBusiness,
    CollaborationProfile,
    SpaceSelection,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::BasicInfo,
        WizardStep::AboutBusiness,
        WizardStep::CollaborationProfile,
        WizardStep::SpaceSelection,
    ];

    pub const fn number(self) -> u8 {
        match self {
            WizardStep::BasicInfo => 1,
            WizardStep::AboutBusiness => 2,
            WizardStep::CollaborationProfile => 3,
            WizardStep::SpaceSelection => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Info",
            WizardStep::AboutBusiness => "About Business",
            WizardStep::CollaborationProfile => "Collaboration",
            WizardStep::SpaceSelection => "Space Selection",
        }
    }
}
