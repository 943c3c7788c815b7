use std::fmt;

use serde::Serialize;

use super::super::domain::{CompanyStage, FundingStatus, TeamSize};
use super::draft::{
    AboutBusiness, ApplicationDraft, BasicInfo, CollaborationProfile, SpaceSelection, WizardStep,
};

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MIN_DESCRIPTION_CHARS: usize = 500;
pub const MIN_NARRATIVE_CHARS: usize = 100;
pub const MAX_COMPANY_IMAGES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field errors collected for one wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub step: WizardStep,
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|error| error.field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} step is incomplete", self.step.title())?;
        for error in &self.errors {
            write!(f, "; {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, "is required");
            false
        } else {
            true
        }
    }

    fn min_chars(&mut self, field: &'static str, value: &str, min: usize) {
        if value.trim().chars().count() < min {
            self.fail(field, format!("must be at least {min} characters"));
        }
    }

    fn optional_url(&mut self, field: &'static str, value: &str) {
        let value = value.trim();
        if !value.is_empty() && !looks_like_url(value) {
            self.fail(field, "must be an http(s) URL");
        }
    }

    fn finish(self, step: WizardStep) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                step,
                errors: self.errors,
            })
        }
    }
}

pub fn validate_basic_info(section: &BasicInfo) -> Result<(), ValidationErrors> {
    let mut check = Checker::new();
    check.required("company_name", &section.company_name);
    check.required("name", &section.name);
    check.required("role", &section.role);
    if check.required("email", &section.email) && !looks_like_email(section.email.trim()) {
        check.fail("email", "must be a valid email address");
    }
    if section.password.expose().chars().count() < MIN_PASSWORD_CHARS {
        check.fail(
            "password",
            format!("must be at least {MIN_PASSWORD_CHARS} characters"),
        );
    }
    check.optional_url("website", &section.website);
    check.optional_url("linkedin_profile", &section.linkedin_profile);
    if check.required("team_size", &section.team_size)
        && TeamSize::from_option(&section.team_size).is_none()
    {
        check.fail("team_size", "is not a recognised team size");
    }
    if check.required("company_stage", &section.company_stage)
        && section.company_stage.parse::<CompanyStage>().is_err()
    {
        check.fail("company_stage", "is not a recognised stage");
    }
    check.finish(WizardStep::BasicInfo)
}

pub fn validate_about_business(section: &AboutBusiness) -> Result<(), ValidationErrors> {
    let mut check = Checker::new();
    check.min_chars("description", &section.description, MIN_DESCRIPTION_CHARS);
    check.required("industry", &section.industry);
    check.required("founded_date", &section.founded_date);
    if check.required("funding_status", &section.funding_status)
        && section.funding_status.parse::<FundingStatus>().is_err()
    {
        check.fail("funding_status", "is not a recognised funding status");
    }
    check.required("current_location", &section.current_location);
    if section
        .tech_stack
        .iter()
        .all(|entry| entry.trim().is_empty())
    {
        check.fail("tech_stack", "select at least one technology");
    }
    if section.company_images.len() > MAX_COMPANY_IMAGES {
        check.fail(
            "company_images",
            format!("at most {MAX_COMPANY_IMAGES} images can be uploaded"),
        );
    }
    check.finish(WizardStep::AboutBusiness)
}

pub fn validate_collaboration_profile(
    section: &CollaborationProfile,
) -> Result<(), ValidationErrors> {
    let mut check = Checker::new();
    check.min_chars("looking_for", &section.looking_for, MIN_NARRATIVE_CHARS);
    check.min_chars("can_offer", &section.can_offer, MIN_NARRATIVE_CHARS);
    check.min_chars("ideal_neighbors", &section.ideal_neighbors, MIN_NARRATIVE_CHARS);
    if section.collaboration_interests.is_empty() {
        check.fail(
            "collaboration_interests",
            "select at least one collaboration interest",
        );
    }
    check.finish(WizardStep::CollaborationProfile)
}

pub fn validate_space_selection(section: &SpaceSelection) -> Result<(), ValidationErrors> {
    let mut check = Checker::new();
    if section.selected_spaces.is_empty() {
        check.fail("selected_spaces", "select at least one space");
    }
    if !section.terms_accepted {
        check.fail("terms_accepted", "terms must be accepted");
    }
    check.finish(WizardStep::SpaceSelection)
}

pub fn validate_step(draft: &ApplicationDraft, step: WizardStep) -> Result<(), ValidationErrors> {
    match step {
        WizardStep::BasicInfo => validate_basic_info(&draft.basic_info),
        WizardStep::AboutBusiness => validate_about_business(&draft.about_business),
        WizardStep::CollaborationProfile => {
            validate_collaboration_profile(&draft.collaboration_profile)
        }
        WizardStep::SpaceSelection => validate_space_selection(&draft.space_selection),
    }
}

/// Validates the steps in order and reports the first incomplete one.
pub fn validate_draft(draft: &ApplicationDraft) -> Result<(), ValidationErrors> {
    WizardStep::ALL
        .into_iter()
        .try_for_each(|step| validate_step(draft, step))
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

fn looks_like_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
