//! Contact message repository.

use serde_json::json;
use tracing::instrument;

use aylia_core::{ContactMessage, MessageId, MessageStatus, NewContactMessage};

use super::{RepositoryError, single_affected, tables};
use crate::supabase::{Credential, SortOrder, SupabaseClient};

/// Repository for `contact_messages`.
pub struct MessageRepository<'a> {
    client: &'a SupabaseClient,
    credential: &'a Credential,
}

impl<'a> MessageRepository<'a> {
    /// Create a new repository acting as `credential`.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, credential: &'a Credential) -> Self {
        Self { client, credential }
    }

    /// All messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_recent(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let messages = self
            .client
            .from(tables::CONTACT_MESSAGES, self.credential)
            .select("*")
            .order("created_at", SortOrder::Descending)
            .execute()
            .await?;
        Ok(messages)
    }

    /// Store a new inquiry with status `new`.
    ///
    /// Anonymous visitors may insert but not read messages back, so nothing
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the insert is rejected.
    #[instrument(skip(self, message), fields(email = %message.email()))]
    pub async fn submit(&self, message: &NewContactMessage) -> Result<(), RepositoryError> {
        self.client
            .from(tables::CONTACT_MESSAGES, self.credential)
            .insert_minimal(message)
            .await?;
        Ok(())
    }

    /// Set message `id` to `read`.
    ///
    /// Marking an already-read message succeeds and leaves it `read`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was updated.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn mark_read(&self, id: MessageId) -> Result<ContactMessage, RepositoryError> {
        let rows = self
            .client
            .from(tables::CONTACT_MESSAGES, self.credential)
            .eq("id", id)
            .update(&json!({ "status": MessageStatus::Read }))
            .await?;
        single_affected(rows)
    }

    /// Look up one message by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the query fails.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn find(&self, id: MessageId) -> Result<Option<ContactMessage>, RepositoryError> {
        let row = self
            .client
            .from(tables::CONTACT_MESSAGES, self.credential)
            .select("*")
            .eq("id", id)
            .maybe_single()
            .await?;
        Ok(row)
    }

    /// Delete message `id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let rows: Vec<ContactMessage> = self
            .client
            .from(tables::CONTACT_MESSAGES, self.credential)
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
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SupabaseConfig;

    const MESSAGE_ID: &str = "9a7d3c2b-1e4f-4a6b-8c9d-0e1f2a3b4c5d";

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: server.uri(),
            anon_key: "anon-key".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap()
    }

    fn message_row(status: &str) -> serde_json::Value {
        json!({
            "id": MESSAGE_ID,
            "name": "Ada",
            "email": "ada@example.com",
            "phone": null,
            "message": "Hello",
            "status": status,
            "created_at": "2025-03-01T10:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn test_list_recent_orders_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/contact_messages"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([message_row("new")])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let messages = MessageRepository::new(&client, &credential)
            .list_recent()
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_inserts_with_status_new() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .and(header("authorization", "Bearer anon-key"))
            .and(body_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "message": "Hello",
                "status": "new"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::Anonymous;
        MessageRepository::new(&client, &credential)
            .submit(&NewContactMessage::new(
                "Ada".to_string(),
                "ada@example.com".to_string(),
                None,
                "Hello".to_string(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_read_twice_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/contact_messages"))
            .and(query_param("id", format!("eq.{MESSAGE_ID}")))
            .and(body_json(json!({"status": "read"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([message_row("read")])))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let repo = MessageRepository::new(&client, &credential);
        let id: MessageId = MESSAGE_ID.parse().unwrap();

        let first = repo.mark_read(id).await.unwrap();
        let second = repo.mark_read(id).await.unwrap();
        assert_eq!(first.status, MessageStatus::Read);
        assert_eq!(second.status, MessageStatus::Read);
    }
}
