//! Featured project repository.

use tracing::instrument;

use aylia_core::{FeaturedProject, NewProject, ProjectId};

use super::{RepositoryError, single_affected, tables};
use crate::supabase::{Credential, SortOrder, SupabaseClient};

/// Repository for `featured_projects`.
pub struct ProjectRepository<'a> {
    client: &'a SupabaseClient,
    credential: &'a Credential,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new repository acting as `credential`.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, credential: &'a Credential) -> Self {
        Self { client, credential }
    }

    /// All projects, ascending by `display_order`.
    ///
    /// Ties keep whatever order the service returns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_ordered(&self) -> Result<Vec<FeaturedProject>, RepositoryError> {
        let projects = self
            .client
            .from(tables::FEATURED_PROJECTS, self.credential)
            .select("*")
            .order("display_order", SortOrder::Ascending)
            .execute()
            .await?;
        Ok(projects)
    }

    /// Insert a project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the insert is rejected.
    #[instrument(skip(self, project), fields(title = %project.title))]
    pub async fn create(&self, project: &NewProject) -> Result<FeaturedProject, RepositoryError> {
        let rows = self
            .client
            .from(tables::FEATURED_PROJECTS, self.credential)
            .insert(project)
            .await?;
        single_affected(rows)
    }

    /// Replace every editable field of project `id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was updated.
    #[instrument(skip(self, project), fields(project_id = %id))]
    pub async fn update(
        &self,
        id: ProjectId,
        project: &NewProject,
    ) -> Result<FeaturedProject, RepositoryError> {
        let rows = self
            .client
            .from(tables::FEATURED_PROJECTS, self.credential)
            .eq("id", id)
            .update(project)
            .await?;
        single_affected(rows)
    }

    /// Look up one project by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the query fails.
    #[instrument(skip(self), fields(project_id = %id))]
    pub async fn find(&self, id: ProjectId) -> Result<Option<FeaturedProject>, RepositoryError> {
        let row = self
            .client
            .from(tables::FEATURED_PROJECTS, self.credential)
            .select("*")
            .eq("id", id)
            .maybe_single()
            .await?;
        Ok(row)
    }

    /// Delete project `id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    #[instrument(skip(self), fields(project_id = %id))]
    pub async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let rows: Vec<FeaturedProject> = self
            .client
            .from(tables::FEATURED_PROJECTS, self.credential)
            .eq("id", id)
            .delete()
            .await?;
        single_affected(rows).map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SupabaseConfig;

    const PROJECT_ID: &str = "5f0c6a8e-3b1d-4c47-9a3e-2b8f0d1c9e77";

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: server.uri(),
            anon_key: "anon-key".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap()
    }

    fn project_row(title: &str, order: i32) -> serde_json::Value {
        json!({
            "id": PROJECT_ID,
            "title": title,
            "description": "A project",
            "tags": ["React", "Go"],
            "status": "Deployed",
            "display_order": order
        })
    }

    #[tokio::test]
    async fn test_list_ordered_requests_display_order_ascending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/featured_projects"))
            .and(query_param("order", "display_order.asc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([project_row("One", 1), project_row("Two", 2)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::Anonymous;
        let projects = ProjectRepository::new(&client, &credential)
            .list_ordered()
            .await
            .unwrap();

        let orders: Vec<i32> = projects.iter().map(|p| p.display_order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_create_sends_parsed_tags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/featured_projects"))
            .and(body_json(json!({
                "title": "Demo",
                "description": "A project",
                "tags": ["React", "Go"],
                "status": "Deployed",
                "display_order": 5
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([project_row("Demo", 5)])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let created = ProjectRepository::new(&client, &credential)
            .create(&NewProject {
                title: "Demo".to_string(),
                description: "A project".to_string(),
                tags: aylia_core::parse_tags("React, Go"),
                status: "Deployed".to_string(),
                display_order: 5,
            })
            .await
            .unwrap();

        assert_eq!(created.tags, vec!["React", "Go"]);
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/featured_projects"))
            .and(query_param("id", format!("eq.{PROJECT_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let err = ProjectRepository::new(&client, &credential)
            .delete(PROJECT_ID.parse().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound));
    }
}
