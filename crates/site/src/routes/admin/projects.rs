//! Featured project management.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::{FieldErrors, ProjectId, Validate};

use super::dashboard::{DashboardView, ProjectEditor, render};
use super::{ConfirmDeleteTemplate, back_to_dashboard};
use crate::db::{ProjectRepository, RepositoryError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::forms::ProjectForm;
use crate::middleware::{AdminContext, RequireAdmin};
use crate::models::Flash;
use crate::state::AppState;

const SAVE_FAILED: &str = "Failed to save project";

/// Dashboard with the project form open, for a failed submit.
async fn reopen_editor(
    state: &AppState,
    admin: &AdminContext,
    status: StatusCode,
    editor: ProjectEditor,
    flash: Option<Flash>,
) -> Response {
    let view = DashboardView {
        flash,
        editor: Some(editor),
        ..DashboardView::default()
    };
    (status, render(state, admin, view).await).into_response()
}

/// Add a project.
///
/// POST /admin/projects
#[instrument(skip_all, fields(user_id = %admin.user_id()))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<ProjectForm>,
) -> Response {
    let project = match form.validate() {
        Ok(project) => project,
        Err(errors) => {
            let editor = ProjectEditor::adding(form, errors);
            return reopen_editor(&state, &admin, StatusCode::UNPROCESSABLE_ENTITY, editor, None)
                .await;
        }
    };

    let credential = admin.credential();
    match ProjectRepository::new(state.supabase(), &credential)
        .create(&project)
        .await
    {
        Ok(created) => {
            let project_id = created.id.to_string();
            add_breadcrumb(
                "admin",
                "Created project",
                Some(&[("project_id", project_id.as_str())]),
            );
            tracing::info!(project_id = %project_id, "Project created");
            back_to_dashboard(&session, Flash::success("Project added successfully")).await
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create project");
            let editor = ProjectEditor::adding(form, FieldErrors::new());
            reopen_editor(
                &state,
                &admin,
                StatusCode::BAD_GATEWAY,
                editor,
                Some(Flash::error(SAVE_FAILED)),
            )
            .await
        }
    }
}

/// Replace every field of a project.
///
/// POST /admin/projects/{id}
#[instrument(skip_all, fields(user_id = %admin.user_id(), project_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProjectId>,
    Form(form): Form<ProjectForm>,
) -> Response {
    let project = match form.validate() {
        Ok(project) => project,
        Err(errors) => {
            let editor = ProjectEditor::editing(id, form, errors);
            return reopen_editor(&state, &admin, StatusCode::UNPROCESSABLE_ENTITY, editor, None)
                .await;
        }
    };

    let credential = admin.credential();
    match ProjectRepository::new(state.supabase(), &credential)
        .update(id, &project)
        .await
    {
        Ok(_) => {
            let project_id = id.to_string();
            add_breadcrumb(
                "admin",
                "Updated project",
                Some(&[("project_id", project_id.as_str())]),
            );
            tracing::info!("Project updated");
            back_to_dashboard(&session, Flash::success("Project updated successfully")).await
        }
        Err(RepositoryError::NotFound) => {
            tracing::warn!("Project to update no longer exists");
            back_to_dashboard(&session, Flash::error(SAVE_FAILED)).await
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update project");
            let editor = ProjectEditor::editing(id, form, FieldErrors::new());
            reopen_editor(
                &state,
                &admin,
                StatusCode::BAD_GATEWAY,
                editor,
                Some(Flash::error(SAVE_FAILED)),
            )
            .await
        }
    }
}

/// Ask before deleting a project.
///
/// GET /admin/projects/{id}/delete
///
/// # Errors
///
/// Returns `AppError::NotFound` if the project does not exist, or
/// `AppError::Remote` if it could not be fetched.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProjectId>,
) -> Result<ConfirmDeleteTemplate> {
    let credential = admin.credential();
    let project = ProjectRepository::new(state.supabase(), &credential)
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project {id}")))?;

    Ok(ConfirmDeleteTemplate {
        email: admin.email().map(ToOwned::to_owned),
        title: "Delete Project",
        description: "Are you sure you want to delete this project? This action cannot be undone.",
        subject: project.title,
        action: format!("/admin/projects/{id}/delete"),
    })
}

/// Delete a project.
///
/// POST /admin/projects/{id}/delete
#[instrument(skip_all, fields(user_id = %admin.user_id(), project_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProjectId>,
) -> Response {
    let credential = admin.credential();
    let flash = match ProjectRepository::new(state.supabase(), &credential)
        .delete(id)
        .await
    {
        Ok(()) => {
            let project_id = id.to_string();
            add_breadcrumb(
                "admin",
                "Deleted project",
                Some(&[("project_id", project_id.as_str())]),
            );
            tracing::info!("Project deleted");
            Flash::success("Project deleted successfully")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete project");
            Flash::error("Failed to delete project")
        }
    };

    back_to_dashboard(&session, flash).await
}
