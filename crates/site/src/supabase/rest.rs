//! Table query builder for `/rest/v1/{table}`.

use reqwest::{Method, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use super::types::{ApiErrorDetails, SortOrder};
use super::{Credential, SupabaseClient, SupabaseError};

/// What the service should send back after a write.
#[derive(Debug, Clone, Copy)]
enum Returning {
    /// The affected rows (needs select permission on them).
    Representation,
    /// Nothing.
    Minimal,
}

impl Returning {
    const fn prefer_header(self) -> &'static str {
        match self {
            Self::Representation => "return=representation",
            Self::Minimal => "return=minimal",
        }
    }
}

/// A query against one table.
///
/// Built with [`SupabaseClient::from`], refined with `select`/`eq`/`order`/`limit`
/// and finished with one terminal operation.
#[derive(Debug)]
#[must_use]
pub struct TableQuery<'a> {
    client: &'a SupabaseClient,
    credential: &'a Credential,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
}

impl<'a> TableQuery<'a> {
    pub(super) fn new(client: &'a SupabaseClient, credential: &'a Credential, table: &str) -> Self {
        Self {
            client,
            credential,
            table: table.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Columns to return (default `*`).
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        self.order = Some(format!("{column}.{}", order.as_str()));
        self
    }

    /// Return at most `count` rows.
    pub const fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Fetch all matching rows.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or rows don't decode as `T`.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let response = self.request(Method::GET)?.send().await?;
        read_rows(response).await
    }

    /// Fetch zero or one matching row.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::MultipleRows`] if more than one row matches.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, SupabaseError> {
        let mut rows = self.execute::<T>().await?;
        match rows.len() {
            0 | 1 => Ok(rows.pop()),
            n => Err(SupabaseError::MultipleRows(n)),
        }
    }

    /// Insert `body` (one object or an array) and return the stored rows.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or is rejected.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn insert<B, T>(self, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .write(Method::POST, Returning::Representation)?
            .json(body)
            .send()
            .await?;
        read_rows(response).await
    }

    /// Insert `body` without reading it back.
    ///
    /// Needed where row-level security allows the insert but not a select
    /// of the new row (anonymous contact submissions).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or is rejected.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn insert_minimal<B>(self, body: &B) -> Result<(), SupabaseError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response = self
            .write(Method::POST, Returning::Minimal)?
            .json(body)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// Patch matching rows with `body` and return them.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::UnfilteredMutation`] without calling the
    /// service if no filter was set.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn update<B, T>(self, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.require_filter("update")?;
        let response = self
            .write(Method::PATCH, Returning::Representation)?
            .json(body)
            .send()
            .await?;
        read_rows(response).await
    }

    /// Delete matching rows and return them.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::UnfilteredMutation`] without calling the
    /// service if no filter was set.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn delete<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        self.require_filter("delete")?;
        let response = self
            .write(Method::DELETE, Returning::Representation)?
            .send()
            .await?;
        read_rows(response).await
    }

    fn require_filter(&self, operation: &'static str) -> Result<(), SupabaseError> {
        if self.filters.is_empty() {
            return Err(SupabaseError::UnfilteredMutation {
                operation,
                table: self.table.clone(),
            });
        }
        Ok(())
    }

    fn build_url(&self) -> Result<Url, SupabaseError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.client.base_url(), self.table))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(select) = &self.select {
                pairs.append_pair("select", select);
            }
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
            if let Some(order) = &self.order {
                pairs.append_pair("order", order);
            }
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        // Drop the dangling `?` when nothing was appended.
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    fn request(&self, method: Method) -> Result<reqwest::RequestBuilder, SupabaseError> {
        let url = self.build_url()?;
        Ok(self
            .client
            .http()
            .request(method, url)
            .header("apikey", self.client.api_key(self.credential))
            .bearer_auth(self.client.bearer(self.credential)))
    }

    fn write(
        &self,
        method: Method,
        returning: Returning,
    ) -> Result<reqwest::RequestBuilder, SupabaseError> {
        Ok(self.request(method)?.header("Prefer", returning.prefer_header()))
    }
}

/// Turn a non-2xx response into a [`SupabaseError`].
async fn check_status(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());

    match serde_json::from_str::<ApiErrorDetails>(&body) {
        Ok(details) if details.message.is_some() || details.code.is_some() => {
            Err(SupabaseError::Api {
                status: status.as_u16(),
                details,
            })
        }
        _ => Err(SupabaseError::Unparsed {
            status: status.as_u16(),
            message: body,
        }),
    }
}

/// Decode a row array; an empty body counts as no rows.
async fn read_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, SupabaseError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&body).map_err(|e| SupabaseError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SupabaseConfig;

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: server.uri(),
            anon_key: "anon-key".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap()
    }

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Row {
        id: i32,
    }

    #[test]
    fn test_build_url_encodes_filters_and_order() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "http://localhost:54321".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap();
        let credential = Credential::Anonymous;

        let url = client
            .from("user_roles", &credential)
            .select("role")
            .eq("role", "admin")
            .order("created_at", SortOrder::Descending)
            .limit(5)
            .build_url()
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:54321/rest/v1/user_roles?select=role&role=eq.admin&order=created_at.desc&limit=5"
        );
    }

    #[test]
    fn test_build_url_without_query() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "http://localhost:54321".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap();
        let credential = Credential::Anonymous;
        let url = client.from("contact_messages", &credential).build_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:54321/rest/v1/contact_messages");
    }

    #[tokio::test]
    async fn test_execute_sends_credential_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/things"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-token"))
            .and(query_param("order", "id.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("user-token".to_string());
        let rows: Vec<Row> = client
            .from("things", &credential)
            .order("id", SortOrder::Ascending)
            .execute()
            .await
            .unwrap();

        assert_eq!(rows, vec![Row { id: 1 }, Row { id: 2 }]);
    }

    #[tokio::test]
    async fn test_maybe_single() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/many"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::Anonymous;

        let none: Option<Row> = client.from("empty", &credential).maybe_single().await.unwrap();
        assert!(none.is_none());

        let err = client
            .from("many", &credential)
            .maybe_single::<Row>()
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::MultipleRows(2)));
    }

    #[tokio::test]
    async fn test_insert_minimal_sends_prefer_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/things"))
            .and(header("prefer", "return=minimal"))
            .and(body_json(json!({"name": "x"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::Anonymous;
        client
            .from("things", &credential)
            .insert_minimal(&json!({"name": "x"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unfiltered_delete_is_refused_locally() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::Anonymous;
        let err = client
            .from("things", &credential)
            .delete::<Row>()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SupabaseError::UnfilteredMutation { operation: "delete", .. }
        ));
    }

    #[tokio::test]
    async fn test_api_error_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/things"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "permission denied for table things",
                "details": null,
                "hint": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::Anonymous;
        let err = client
            .from("things", &credential)
            .eq("id", 7)
            .update::<_, Row>(&json!({"name": "y"}))
            .await
            .unwrap_err();

        match err {
            SupabaseError::Api { status, details } => {
                assert_eq!(status, 403);
                assert_eq!(details.code.as_deref(), Some("42501"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
