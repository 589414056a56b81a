//! Integration tests for the AYLIA site.
//!
//! The router from [`aylia_site::app`] runs in-process and every call to
//! the data/auth service goes to a `wiremock` server, so the tests need no
//! network and no credentials.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aylia-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `public_pages` - Landing page, contact form, health checks, assets
//! - `auth_flow` - Sign-in, sign-up, sign-out and the admin gate
//! - `admin_console` - Project CRUD, message triage, admin provisioning

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aylia_site::config::{DEFAULT_REQUEST_TIMEOUT, SiteConfig, SupabaseConfig};
use aylia_site::state::AppState;

/// Account id used for the signed-in admin.
pub const ADMIN_ID: &str = "0b6f2c1e-8d4a-4f7e-9c2b-7a1d3e5f9b80";
/// Account id used for a signed-in user without the admin role.
pub const MEMBER_ID: &str = "7d3a9f21-4c6b-4e8d-a1f0-5b2c8e9d7a63";
/// Access token handed out by the mocked sign-in.
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Forwarded client address; rate limiters key on it.
const CLIENT_IP: &str = "203.0.113.10";

/// Session secret with enough length and entropy for the signing key.
const SESSION_SECRET: &str =
    "k7Qp2vXz9LmR4tYb8NcW1sHd6JfG3aUe0iOy5rTq8ZxVw2nBm4KjP7lCs9DgF1hAe3";

/// Site configuration pointing at `supabase_url`.
#[must_use]
pub fn test_config(supabase_url: &str) -> SiteConfig {
    SiteConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(SESSION_SECRET),
        supabase: SupabaseConfig {
            url: supabase_url.to_string(),
            anon_key: "test-anon-key".to_string(),
            service_role_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A captured response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The site wired to a mock data/auth service, with a one-cookie jar.
pub struct TestApp {
    pub server: MockServer,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Start a mock service and build the router against it.
    ///
    /// # Panics
    ///
    /// Panics if the router cannot be built.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = AppState::new(test_config(&server.uri())).expect("state builds");
        let router = aylia_site::app(state).expect("router builds");

        Self {
            server,
            router,
            cookie: None,
        }
    }

    /// GET `path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// POST an urlencoded `body` to `path`.
    pub async fn post_form(&mut self, path: &str, body: &str) -> TestResponse {
        self.send(Method::POST, path, Some(body.to_string())).await
    }

    /// POST an urlencoded `body` to `path` as a client connecting directly,
    /// with no proxy headers.
    pub async fn post_form_direct(&mut self, path: &str, body: &str) -> TestResponse {
        self.dispatch(Method::POST, path, Some(body.to_string()), false)
            .await
    }

    /// Send a request with the stored session cookie.
    pub async fn send(&mut self, method: Method, path: &str, body: Option<String>) -> TestResponse {
        self.dispatch(method, path, body, true).await
    }

    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    async fn dispatch(
        &mut self,
        method: Method,
        path: &str,
        body: Option<String>,
        behind_proxy: bool,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if behind_proxy {
            builder = builder.header("x-forwarded-for", CLIENT_IP);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Sign in through `/auth/sign-in` as `user_id`.
    ///
    /// Mounts the token grant and a role lookup that finds an admin row
    /// when `is_admin` is set.
    pub async fn sign_in_as(&mut self, user_id: &str, email: &str, is_admin: bool) -> TestResponse {
        self.sign_in_with(token_grant(user_id, email), user_id, email, is_admin)
            .await
    }

    /// Sign in through `/auth/sign-in`, answering with `grant`.
    pub async fn sign_in_with(
        &mut self,
        grant: Value,
        user_id: &str,
        email: &str,
        is_admin: bool,
    ) -> TestResponse {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant))
            .mount(&self.server)
            .await;

        let rows = if is_admin {
            json!([{ "user_id": user_id, "role": "admin" }])
        } else {
            json!([])
        };
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .and(query_param("user_id", format!("eq.{user_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;

        let body = format!("email={}&password=hunter22", email.replace('@', "%40"));
        self.post_form("/auth/sign-in", &body).await
    }

    /// Sign in as the admin account.
    pub async fn sign_in_admin(&mut self) -> TestResponse {
        self.sign_in_as(ADMIN_ID, "admin@aylia.dev", true).await
    }

    /// Answer project and message list queries with `projects` and `messages`.
    pub async fn mount_lists(&self, projects: Value, messages: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/featured_projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(projects))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(messages))
            .mount(&self.server)
            .await;
    }
}

/// Token grant that stays valid for the whole test.
#[must_use]
pub fn token_grant(user_id: &str, email: &str) -> Value {
    token_grant_expiring(user_id, email, ACCESS_TOKEN, 4_102_444_800)
}

/// Token grant for `access_token` that expires at the unix time `expires_at`.
#[must_use]
pub fn token_grant_expiring(user_id: &str, email: &str, access_token: &str, expires_at: i64) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": "test-refresh-token",
        "expires_in": 3600,
        "expires_at": expires_at,
        "token_type": "bearer",
        "user": { "id": user_id, "email": email, "user_metadata": {} }
    })
}

/// Whether `html` contains `text` after HTML escaping.
///
/// Apostrophes in rendered values come out as a numeric entity.
#[must_use]
pub fn contains_escaped(html: &str, text: &str) -> bool {
    ["&#39;", "&#x27;"]
        .iter()
        .any(|entity| html.contains(&text.replace('\'', entity)))
}

/// A `featured_projects` row.
#[must_use]
pub fn project_row(id: &str, title: &str, tags: &[&str], display_order: i32) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "tags": tags,
        "status": "Completed",
        "display_order": display_order,
        "created_at": "2025-01-10T09:00:00Z",
        "updated_at": "2025-01-10T09:00:00Z"
    })
}

/// A `contact_messages` row.
#[must_use]
pub fn message_row(id: &str, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": "visitor@example.com",
        "phone": null,
        "message": format!("Hello from {name}"),
        "status": status,
        "created_at": "2025-03-02T14:30:00Z"
    })
}
