//! Application wizard draft: section merges, redacted durable mirroring, debounced
//! autosave and the submit hand-off.

mod autosave;
mod draft;
mod state;
mod store;
mod validation;

pub use autosave::IntakeSession;
pub use draft::{
    AboutBusiness, AboutBusinessUpdate, ApplicationDraft, BasicInfo, BasicInfoUpdate,
    CollaborationProfile, CollaborationProfileUpdate, SectionUpdate, Secret, SpaceSelection,
    SpaceSelectionUpdate, UploadedFile, WizardStep,
};
pub use state::{DraftError, IntakeState, SubmissionError};
pub use store::{DraftStore, DraftStoreError, FileDraftStore, MemoryDraftStore};
pub use validation::{
    validate_about_business, validate_basic_info, validate_collaboration_profile, validate_draft,
    validate_space_selection, validate_step, FieldError, ValidationErrors, MAX_COMPANY_IMAGES,
    MIN_DESCRIPTION_CHARS, MIN_NARRATIVE_CHARS, MIN_PASSWORD_CHARS,
};
