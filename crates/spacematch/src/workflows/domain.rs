//! Marketplace records shared by intake, matching, and review.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Applicant identity, bound one-to-one to an account profile.
    ApplicantId
);
string_id!(ProviderId);
string_id!(SpaceId);
string_id!(
    /// Identifier wrapper for submitted applications.
    ApplicationId
);

/// Maturity of an applicant company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStage {
    Idea,
    Mvp,
    Growth,
    Scale,
}

impl CompanyStage {
    pub const fn label(self) -> &'static str {
        match self {
            CompanyStage::Idea => "idea",
            CompanyStage::Mvp => "mvp",
            CompanyStage::Growth => "growth",
            CompanyStage::Scale => "scale",
        }
    }
}

impl FromStr for CompanyStage {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idea" => Ok(CompanyStage::Idea),
            "mvp" => Ok(CompanyStage::Mvp),
            "growth" => Ok(CompanyStage::Growth),
            "scale" => Ok(CompanyStage::Scale),
            _ => Err(UnknownOption::new("company stage", raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingStatus {
    #[serde(rename = "bootstrapped")]
    Bootstrapped,
    #[serde(rename = "pre-seed")]
    PreSeed,
    #[serde(rename = "seed")]
    Seed,
    #[serde(rename = "series-a")]
    SeriesA,
    #[serde(rename = "series-b")]
    SeriesB,
    #[serde(rename = "series-c+")]
    SeriesCPlus,
}

impl FundingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FundingStatus::Bootstrapped => "bootstrapped",
            FundingStatus::PreSeed => "pre-seed",
            FundingStatus::Seed => "seed",
            FundingStatus::SeriesA => "series-a",
            FundingStatus::SeriesB => "series-b",
            FundingStatus::SeriesCPlus => "series-c+",
        }
    }

    /// Whether the company has raised outside capital.
    pub const fn is_external(self) -> bool {
        !matches!(self, FundingStatus::Bootstrapped)
    }
}

impl FromStr for FundingStatus {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bootstrapped" => Ok(FundingStatus::Bootstrapped),
            "pre-seed" | "preseed" => Ok(FundingStatus::PreSeed),
            "seed" => Ok(FundingStatus::Seed),
            "series-a" => Ok(FundingStatus::SeriesA),
            "series-b" => Ok(FundingStatus::SeriesB),
            "series-c+" | "series-c" => Ok(FundingStatus::SeriesCPlus),
            _ => Err(UnknownOption::new("funding status", raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownOption {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TeamSizeError {
    #[error("team size must be a positive integer")]
    Zero,
    #[error("team size range is inverted ({min} > {max})")]
    InvertedRange { min: u32, max: u32 },
}

/// Head count of a company. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TeamSize(u32);

impl TeamSize {
    pub fn new(value: u32) -> Result<Self, TeamSizeError> {
        if value == 0 {
            Err(TeamSizeError::Zero)
        } else {
            Ok(Self(value))
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Reads a wizard option (`"1-5"`, `"6-20"`, `"50+"`) or a plain number.
    ///
    /// Ranges resolve to their midpoint rounded up, open-ended options to their floor.
    pub fn from_option(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(floor) = raw.strip_suffix('+') {
            return floor.trim().parse().ok().and_then(|v| Self::new(v).ok());
        }
        if let Some((low, high)) = raw.split_once('-') {
            let low: u32 = low.trim().parse().ok()?;
            let high: u32 = high.trim().parse().ok()?;
            if low > high {
                return None;
            }
            return Self::new(low.checked_add(high)?.div_ceil(2)).ok();
        }
        raw.parse().ok().and_then(|v| Self::new(v).ok())
    }
}

impl TryFrom<u32> for TeamSize {
    type Error = TeamSizeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamSize> for u32 {
    fn from(value: TeamSize) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
struct RawTeamSizeRange {
    min: u32,
    max: u32,
}

/// Inclusive head-count range a provider or space is suited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamSizeRange {
    min: u32,
    max: u32,
}

impl TeamSizeRange {
    pub fn new(min: u32, max: u32) -> Result<Self, TeamSizeError> {
        if min > max {
            return Err(TeamSizeError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub const fn min(&self) -> u32 {
        self.min
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    /// People outside the range; zero when the size fits.
    pub fn distance(&self, size: TeamSize) -> u32 {
        let size = size.get();
        if size < self.min {
            self.min - size
        } else if size > self.max {
            size - self.max
        } else {
            0
        }
    }
}

impl<'de> Deserialize<'de> for TeamSizeRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawTeamSizeRange::deserialize(deserializer)?;
        Self::new(raw.min, raw.max).map_err(serde::de::Error::custom)
    }
}

/// A company seeking a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantProfile {
    pub id: ApplicantId,
    pub company_name: String,
    pub industry: Option<String>,
    pub team_size: Option<TeamSize>,
    pub company_stage: Option<CompanyStage>,
    pub founded_date: Option<NaiveDate>,
    pub funding_status: Option<FundingStatus>,
    pub description: String,
    pub looking_for: String,
    pub can_offer: String,
    pub ideal_neighbors: String,
    pub tech_stack: BTreeSet<String>,
    pub collaboration_interests: BTreeSet<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub images: Vec<String>,
}

/// A host organization owning zero or more spaces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceProviderProfile {
    pub id: ProviderId,
    pub company_name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub team_size: Option<TeamSize>,
    pub founded_year: Option<i32>,
    pub industry_focus: BTreeSet<String>,
    pub looking_for: BTreeSet<String>,
    pub offers: BTreeSet<String>,
    pub values: BTreeSet<String>,
    pub ideal_team_size: Option<TeamSizeRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    Office,
    Coworking,
    Workshop,
    MeetingRoom,
}

/// A physical offering, owned by exactly one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub provider_id: ProviderId,
    pub name: String,
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    #[serde(default)]
    pub size_sqm: Option<f64>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub monthly_price: Option<f64>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Space {
    /// Capacity band `[1, capacity]`, when the capacity is known.
    pub fn capacity_band(&self) -> Option<TeamSizeRange> {
        self.capacity
            .filter(|capacity| *capacity > 0)
            .and_then(|capacity| TeamSizeRange::new(1, capacity).ok())
    }
}
