use crate::infra::{read_json_file, InMemoryApplicationRepository, InMemoryProfileDirectory};
use clap::Args;
use spacematch::config::AppConfig;
use spacematch::error::AppError;
use spacematch::workflows::applications::{ApplicationRecord, ApplicationService, ReviewAction};
use spacematch::workflows::domain::{
    ApplicantId, ApplicantProfile, ProviderId, Space, SpaceId, SpaceProviderProfile,
};
use spacematch::workflows::intake::{
    validate_step, AboutBusinessUpdate, BasicInfoUpdate, CollaborationProfileUpdate, DraftStore,
    FileDraftStore, IntakeSession, IntakeState, SectionUpdate, Secret, SpaceSelectionUpdate,
};
use spacematch::workflows::matching::{MatchConfig, MatchEngine, MatchFactor, MatchScore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEMO_SESSION: &str = "demo";
const DEMO_PASSWORD: &str = "orbit-lantern-42";

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant profile JSON file
    #[arg(long)]
    pub(crate) applicant: PathBuf,
    /// Space provider profile JSON file
    #[arg(long)]
    pub(crate) provider: PathBuf,
    /// Optional space JSON file owned by the provider
    #[arg(long)]
    pub(crate) space: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for the mirrored wizard draft (defaults to APP_DRAFT_DIR)
    #[arg(long)]
    pub(crate) draft_dir: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let applicant: ApplicantProfile = read_json_file(&args.applicant)?;
    let provider: SpaceProviderProfile = read_json_file(&args.provider)?;
    let space: Option<Space> = args
        .space
        .as_deref()
        .map(read_json_file::<Space>)
        .transpose()?;

    let score = MatchEngine::new(config.matching).score(&applicant, &provider, space.as_ref());

    let target = match &space {
        Some(space) => format!("{} / {}", provider.company_name, space.name),
        None => provider.company_name.clone(),
    };
    println!("Match: {} -> {}", applicant.company_name, target);
    render_score(&score);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let draft_dir = args.draft_dir.unwrap_or(config.intake.draft_dir);
    demo_walkthrough(&draft_dir, config.intake.autosave_quiet, config.matching).await?;
    Ok(())
}

/// Wizard, submission and review round trip against in-memory adapters.
pub(crate) async fn demo_walkthrough(
    draft_dir: &Path,
    quiet: Duration,
    matching: MatchConfig,
) -> Result<Vec<ApplicationRecord>, AppError> {
    println!("Space marketplace demo");
    let directory = Arc::new(InMemoryProfileDirectory::seeded());
    println!("Available spaces:");
    for space in directory.spaces() {
        println!(
            "  - {} [{}] {} (capacity {})",
            space.id,
            space.provider_id,
            space.name,
            space.capacity.map_or_else(|| "n/a".to_string(), |c| c.to_string())
        );
    }

    let store = Arc::new(FileDraftStore::for_session(draft_dir, DEMO_SESSION));
    println!("- Draft mirror: {}", store.path().display());

    let state = IntakeState::restored(store.clone());
    if !state.draft().is_empty() {
        println!("- Resumed an unfinished draft from a previous run");
    }
    let session = IntakeSession::new(state);
    let autosave = session.spawn_autosave(quiet);

    println!("\nApplication wizard");
    for update in demo_updates() {
        let step = update.step();
        session.update_section(update);
        let outcome = match validate_step(&session.snapshot(), step) {
            Ok(()) => "complete".to_string(),
            Err(errors) => errors.to_string(),
        };
        println!("  Step {} {}: {}", step.number(), step.title(), outcome);
    }
    session.persist();

    let mirrored = match store.load() {
        Ok(contents) => contents,
        Err(err) => {
            println!("- Draft mirror unreadable: {err}");
            None
        }
    };
    let leaked = mirrored
        .as_deref()
        .map_or(false, |contents| contents.contains(DEMO_PASSWORD));
    println!(
        "- Mirrored draft written ({} bytes), password stored: {}",
        mirrored.as_deref().map_or(0, str::len),
        if leaked { "yes" } else { "no" }
    );

    let restored = IntakeState::restored(store.clone());
    println!(
        "- Restored copy keeps {} selected space(s); password must be re-entered: {}",
        restored.draft().space_selection.selected_spaces.len(),
        restored.draft().basic_info.password.is_empty()
    );

    let service = ApplicationService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        directory.clone(),
        matching,
    );
    let applicant_id = ApplicantId::new("applicant-demo");

    println!("\nSubmission");
    let records = match session.submit(|draft| service.submit_draft(applicant_id.clone(), draft)) {
        Ok(records) => records,
        Err(err) => {
            println!("  Submission rejected: {err}");
            drop(session);
            let _ = autosave.await;
            return Ok(Vec::new());
        }
    };
    for record in &records {
        let view = record.status_view();
        println!(
            "  - {} -> {} ({}) score {} [{}]",
            view.application_id,
            view.provider_id,
            view.status,
            view.score.map_or_else(|| "n/a".to_string(), |s| s.to_string()),
            view.grade.map_or("ungraded", |grade| grade.label())
        );
    }
    println!(
        "  Draft cleared after submit: {}",
        session.snapshot().is_empty()
    );

    if let Some(first) = records.first() {
        directory.add_applicant(first.applicant.clone());
        let preview = service.preview(
            &applicant_id,
            &ProviderId::new("greenhub"),
            Some(&SpaceId::new("greenhub-lab")),
        )?;
        println!("\nPreview against Greenhub / Prototype Lab");
        render_score(&preview);
    }

    println!("\nReview");
    let mut reviewed = Vec::with_capacity(records.len());
    for record in &records {
        service.review(&record.id, ReviewAction::MarkReviewed, None)?;
        let updated = if record.effective_score().unwrap_or(0) >= 60 {
            service.review(
                &record.id,
                ReviewAction::Shortlist,
                Some("Strong neighbour fit".to_string()),
            )?
        } else {
            service.override_score(&record.id, 65)?
        };
        println!(
            "  - {}: {} (score {}{})",
            updated.id,
            updated.status.label(),
            updated
                .effective_score()
                .map_or_else(|| "n/a".to_string(), |s| s.to_string()),
            if updated.score_override.is_some() {
                ", overridden"
            } else {
                ""
            }
        );
        reviewed.push(updated);
    }

    let board = service.board(None)?;
    println!("\nReview board ({} applications)", board.total());
    for column in &board.columns {
        let entries: Vec<String> = column
            .applications
            .iter()
            .map(|view| format!("{} ({})", view.company_name, view.provider_id))
            .collect();
        println!(
            "  {:<12} {}",
            column.status.label(),
            if entries.is_empty() {
                "-".to_string()
            } else {
                entries.join(", ")
            }
        );
    }

    let summary = service.summary(None)?;
    println!(
        "\nSummary: {} applications, average score {}, success rate {}%",
        summary.total, summary.average_score, summary.success_rate
    );

    drop(session);
    if let Err(err) = autosave.await {
        println!("  Autosave task ended abnormally: {err}");
    }

    Ok(reviewed)
}

fn render_score(score: &MatchScore) {
    println!("  Total {} / 100 ({})", score.total, score.grade().label());
    for factor in MatchFactor::ALL {
        let reason = score.reasons.iter().find(|reason| reason.factor == factor);
        let note = reason.map_or("", |reason| reason.note.as_str());
        println!(
            "    - {:<24} {:>2} / 25  {}",
            factor.label(),
            score.breakdown.get(factor),
            note
        );
    }
}

fn demo_updates() -> Vec<SectionUpdate> {
    let description = "Northwind Robotics builds autonomous inspection drones for wind farms \
        and bridges. Our platform fuses lidar, thermal imaging and computer vision models to \
        spot structural fatigue weeks before a human crew would. We ship hardware from a small \
        Munich workshop, run our perception stack in Rust on edge devices and sell inspection \
        reports to utilities across the DACH region. The team combines aerospace engineers, \
        machine learning researchers and two former site managers who know what operators need \
        on a cold morning in the North Sea. We are looking for a home where hardware and \
        software people sit next to each other.";

    vec![
        SectionUpdate::BasicInfo(BasicInfoUpdate {
            company_name: Some("Northwind Robotics".to_string()),
            name: Some("Ada Park".to_string()),
            role: Some("CEO".to_string()),
            email: Some("ada@northwind.io".to_string()),
            password: Some(Secret::new(DEMO_PASSWORD)),
            website: Some("https://northwind.io".to_string()),
            team_size: Some("6-20".to_string()),
            company_stage: Some("growth".to_string()),
            ..Default::default()
        }),
        SectionUpdate::AboutBusiness(AboutBusinessUpdate {
            description: Some(description.to_string()),
            industry: Some("Technology & Software".to_string()),
            founded_date: Some("2021-03-01".to_string()),
            funding_status: Some("seed".to_string()),
            current_location: Some("Munich".to_string()),
            tech_stack: Some(vec![
                "Rust".to_string(),
                "Computer Vision".to_string(),
                "Robotics".to_string(),
            ]),
            ..Default::default()
        }),
        SectionUpdate::CollaborationProfile(CollaborationProfileUpdate {
            looking_for: Some(
                "Neighbours who build physical products and are happy to share a workshop bench, \
                 test equipment and the occasional late-night debugging session."
                    .to_string(),
            ),
            can_offer: Some(
                "Hands-on help with embedded Rust, perception pipelines and field testing, plus \
                 introductions to utility operators across southern Germany."
                    .to_string(),
            ),
            ideal_neighbors: Some(
                "Early hardware startups, mobility engineering teams and anyone running sensors \
                 outdoors who wants a second pair of eyes on their data."
                    .to_string(),
            ),
            collaboration_interests: Some(vec![
                "skill-sharing".to_string(),
                "joint-development".to_string(),
            ]),
        }),
        SectionUpdate::SpaceSelection(SpaceSelectionUpdate {
            selected_spaces: Some(vec![
                SpaceId::new("pixida-floor"),
                SpaceId::new("pixida-loft"),
                SpaceId::new("greenhub-lab"),
            ]),
            additional_notes: Some("We need a loading bay for drone crates.".to_string()),
            terms_accepted: Some(true),
            ..Default::default()
        }),
    ]
}
