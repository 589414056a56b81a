//! Admin dashboard.
//!
//! The dashboard is the only admin page that lists anything. Every admin
//! mutation redirects here, so both collections are re-fetched after each
//! change.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::{ContactMessage, FeaturedProject, FieldErrors, ProjectId};

use crate::db::{MessageRepository, ProjectRepository};
use crate::filters;
use crate::forms::{NewAdminForm, ProjectForm};
use crate::middleware::{AdminContext, RequireAdmin, take_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Query parameters for `/admin`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Open the add-project form.
    pub new: Option<String>,
    /// Open the edit form for this project.
    pub edit: Option<ProjectId>,
}

/// The open add/edit project form.
#[derive(Debug, Clone)]
pub struct ProjectEditor {
    /// Project being edited; `None` when adding.
    pub editing: Option<ProjectId>,
    pub form: ProjectForm,
    pub errors: FieldErrors,
}

impl ProjectEditor {
    #[must_use]
    pub fn adding(form: ProjectForm, errors: FieldErrors) -> Self {
        Self {
            editing: None,
            form,
            errors,
        }
    }

    #[must_use]
    pub const fn editing(id: ProjectId, form: ProjectForm, errors: FieldErrors) -> Self {
        Self {
            editing: Some(id),
            form,
            errors,
        }
    }

    #[must_use]
    pub const fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Project"
        } else {
            "Add New Project"
        }
    }

    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        if self.editing.is_some() {
            "Update Project"
        } else {
            "Add Project"
        }
    }

    /// Where the form posts to.
    #[must_use]
    pub fn action(&self) -> String {
        self.editing.map_or_else(
            || "/admin/projects".to_string(),
            |id| format!("/admin/projects/{id}"),
        )
    }
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub email: Option<String>,
    pub flashes: Vec<Flash>,
    pub projects: Vec<FeaturedProject>,
    pub messages: Vec<ContactMessage>,
    pub editor: Option<ProjectEditor>,
    pub admin_form: NewAdminForm,
    pub admin_errors: FieldErrors,
}

/// Everything a dashboard render can vary besides the fetched lists.
#[derive(Debug, Default)]
pub struct DashboardView {
    pub flash: Option<Flash>,
    pub editor: Option<ProjectEditor>,
    pub admin_form: NewAdminForm,
    pub admin_errors: FieldErrors,
}

impl DashboardView {
    #[must_use]
    pub fn with_flash(flash: Option<Flash>) -> Self {
        Self {
            flash,
            ..Self::default()
        }
    }
}

/// Fetch both collections and build the dashboard.
///
/// A failed fetch adds an error notification and leaves that list empty.
pub(crate) async fn render(
    state: &AppState,
    admin: &AdminContext,
    view: DashboardView,
) -> DashboardTemplate {
    let credential = admin.credential();
    let mut flashes: Vec<Flash> = view.flash.into_iter().collect();

    let projects = ProjectRepository::new(state.supabase(), &credential)
        .list_ordered()
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load projects");
            flashes.push(Flash::error("Failed to load projects"));
            Vec::new()
        });

    let messages = MessageRepository::new(state.supabase(), &credential)
        .list_recent()
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load messages");
            flashes.push(Flash::error("Failed to load messages"));
            Vec::new()
        });

    DashboardTemplate {
        email: admin.email().map(ToOwned::to_owned),
        flashes,
        projects,
        messages,
        editor: view.editor,
        admin_form: NewAdminForm {
            email: view.admin_form.email,
            password: String::new(),
        },
        admin_errors: view.admin_errors,
    }
}

/// Display the dashboard.
///
/// `?new=1` opens the add form; `?edit=<id>` opens the edit form prefilled
/// from the listed project.
#[instrument(skip_all, fields(user_id = %admin.user_id()))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let flash = take_flash(&session).await;
    let mut template = render(&state, &admin, DashboardView::with_flash(flash)).await;

    template.editor = match query.edit {
        Some(id) => template
            .projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| ProjectEditor::editing(id, ProjectForm::from_project(p), FieldErrors::new())),
        None if query.new.is_some() => Some(ProjectEditor::adding(
            ProjectForm::default(),
            FieldErrors::new(),
        )),
        None => None,
    };

    template
}
