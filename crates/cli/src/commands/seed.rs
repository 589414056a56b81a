//! Seed the featured projects table with the default portfolio.
//!
//! The six showcase projects get display orders 1 through 6. Seeding is
//! skipped when the table already has rows, so running it twice is safe.

use aylia_site::content::showcase_projects;
use aylia_site::db::ProjectRepository;

use super::{CommandError, service_client};

/// Insert the showcase projects into an empty table.
///
/// Returns the number of projects inserted.
///
/// # Errors
///
/// Returns an error if the environment is incomplete or a request fails.
/// Rows inserted before a failure are kept.
pub async fn projects() -> Result<usize, CommandError> {
    let (client, credential) = service_client()?;
    let repo = ProjectRepository::new(&client, &credential);

    let existing = repo.list_ordered().await?;
    if !existing.is_empty() {
        tracing::info!(
            existing = existing.len(),
            "Featured projects already present, skipping seed"
        );
        return Ok(0);
    }

    let projects = showcase_projects();
    for project in &projects {
        let created = repo.create(project).await?;
        tracing::info!(project_id = %created.id, title = %created.title, "Seeded project");
    }

    tracing::info!(count = projects.len(), "Seeding complete");
    Ok(projects.len())
}
