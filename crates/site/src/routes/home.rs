//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::{FeaturedProject, FieldErrors};

use crate::content::{self, Benefit, Service, Stat};
use crate::db::ProjectRepository;
use crate::filters;
use crate::forms::ContactForm;
use crate::middleware::{OptionalViewer, take_flash};
use crate::models::{Flash, Viewer};
use crate::state::AppState;
use crate::supabase::Credential;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub viewer: Viewer,
    pub flash: Option<Flash>,
    pub services: &'static [Service],
    pub hero_stats: &'static [Stat],
    pub campus_stats: &'static [Stat],
    pub campus_benefits: &'static [Benefit],
    pub why_choose_us: &'static [&'static str],
    pub contact_email: &'static str,
    pub projects: Vec<FeaturedProject>,
    pub form: ContactForm,
    pub errors: FieldErrors,
}

impl HomeTemplate {
    /// Landing page with the given projects and contact form state.
    #[must_use]
    pub fn new(
        viewer: Viewer,
        flash: Option<Flash>,
        projects: Vec<FeaturedProject>,
        form: ContactForm,
        errors: FieldErrors,
    ) -> Self {
        Self {
            viewer,
            flash,
            services: content::SERVICES,
            hero_stats: content::HERO_STATS,
            campus_stats: content::CAMPUS_STATS,
            campus_benefits: content::CAMPUS_BENEFITS,
            why_choose_us: content::WHY_CHOOSE_US,
            contact_email: content::CONTACT_EMAIL,
            projects,
            form,
            errors,
        }
    }
}

/// Featured projects in display order.
///
/// A failed fetch is logged and the section renders empty; the rest of the
/// page does not depend on it.
pub(crate) async fn featured_projects(state: &AppState) -> Vec<FeaturedProject> {
    ProjectRepository::new(state.supabase(), &Credential::Anonymous)
        .list_ordered()
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch featured projects: {e}");
            Vec::new()
        })
}

/// Display the landing page.
#[instrument(skip(state, viewer, session))]
pub async fn home(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    session: Session,
) -> impl IntoResponse {
    let flash = take_flash(&session).await;
    let projects = featured_projects(&state).await;

    HomeTemplate::new(
        viewer,
        flash,
        projects,
        ContactForm::default(),
        FieldErrors::new(),
    )
}
