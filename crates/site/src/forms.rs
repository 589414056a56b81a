//! Form payloads and their validation rules.
//!
//! Every form is checked locally before anything is sent to the remote
//! service. A failed check yields [`FieldErrors`] keyed by field name, which
//! the templates render next to each input.

use serde::Deserialize;

use aylia_core::contact::{EMAIL_MAX, MESSAGE_MAX, NAME_MAX, PHONE_MAX};
use aylia_core::validation::{self, FieldErrors, Validate};
use aylia_core::{Email, NewContactMessage, NewProject, parse_tags};

/// Minimum password length accepted by the auth forms.
pub const PASSWORD_MIN: usize = 6;

/// Minimum length of the sign-up full name.
pub const FULL_NAME_MIN: usize = 2;

const INVALID_EMAIL: &str = "Invalid email address";
const SHORT_PASSWORD: &str = "Password must be at least 6 characters";

// =============================================================================
// Contact
// =============================================================================

/// Landing page contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl Validate for ContactForm {
    type Output = NewContactMessage;

    fn validate(&self) -> Result<NewContactMessage, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        validation::require(&mut errors, "name", name, "Name is required");
        validation::max_len(
            &mut errors,
            "name",
            name,
            NAME_MAX,
            "Name must be less than 100 characters",
        );

        let email = self.email.trim();
        validation::max_len(
            &mut errors,
            "email",
            email,
            EMAIL_MAX,
            "Email must be less than 255 characters",
        );
        let email = validation::email(&mut errors, "email", email, INVALID_EMAIL);

        let phone = self.phone.trim();
        validation::max_len(
            &mut errors,
            "phone",
            phone,
            PHONE_MAX,
            "Phone must be less than 20 characters",
        );

        let message = self.message.trim();
        validation::require(&mut errors, "message", message, "Message is required");
        validation::max_len(
            &mut errors,
            "message",
            message,
            MESSAGE_MAX,
            "Message must be less than 1000 characters",
        );

        let phone = (!phone.is_empty()).then(|| phone.to_string());
        errors.finish(|| {
            NewContactMessage::new(
                name.to_string(),
                email.map(Email::into_inner).unwrap_or_default(),
                phone,
                message.to_string(),
            )
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Validated email and password.
#[derive(Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn credentials(errors: &mut FieldErrors, email: &str, password: &str) -> Option<Email> {
    let email = validation::email(errors, "email", email.trim(), INVALID_EMAIL);
    validation::min_len(errors, "password", password, PASSWORD_MIN, SHORT_PASSWORD);
    email
}

/// Sign-in tab of `/auth`.
#[derive(Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for SignInForm {
    type Output = Credentials;

    fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = credentials(&mut errors, &self.email, &self.password);
        match email {
            Some(email) if errors.is_empty() => Ok(Credentials {
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Sign-up tab of `/auth`.
#[derive(Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub full_name: String,
    pub credentials: Credentials,
}

impl Validate for SignUpForm {
    type Output = SignUp;

    fn validate(&self) -> Result<SignUp, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = self.full_name.trim();
        validation::min_len(
            &mut errors,
            "full_name",
            full_name,
            FULL_NAME_MIN,
            "Name must be at least 2 characters",
        );
        let email = credentials(&mut errors, &self.email, &self.password);
        validation::matches(
            &mut errors,
            "confirm_password",
            &self.confirm_password,
            &self.password,
            "Passwords don't match",
        );

        match email {
            Some(email) if errors.is_empty() => Ok(SignUp {
                full_name: full_name.to_string(),
                credentials: Credentials {
                    email,
                    password: self.password.clone(),
                },
            }),
            _ => Err(errors),
        }
    }
}

/// "Create New Admin" form on the dashboard.
#[derive(Clone, Default, Deserialize)]
pub struct NewAdminForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for NewAdminForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdminForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for NewAdminForm {
    type Output = Credentials;

    fn validate(&self) -> Result<Credentials, FieldErrors> {
        SignInForm {
            email: self.email.clone(),
            password: self.password.clone(),
        }
        .validate()
    }
}

// =============================================================================
// Projects
// =============================================================================

/// Add/edit project form on the dashboard.
///
/// `tags` is the comma-separated text the admin typed; `display_order` stays
/// a string so a bad value can be shown back unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub display_order: String,
}

impl ProjectForm {
    /// Prefill the form from a stored project.
    #[must_use]
    pub fn from_project(project: &aylia_core::FeaturedProject) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            tags: project.tags_input(),
            status: project.status.clone(),
            display_order: project.display_order.to_string(),
        }
    }
}

impl Validate for ProjectForm {
    type Output = NewProject;

    fn validate(&self) -> Result<NewProject, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        let description = self.description.trim();
        let status = self.status.trim();
        let tags = parse_tags(&self.tags);

        validation::require(&mut errors, "title", title, "Title is required");
        validation::require(
            &mut errors,
            "description",
            description,
            "Description is required",
        );
        if tags.is_empty() {
            errors.add("tags", "At least one tag is required");
        }
        validation::require(&mut errors, "status", status, "Status is required");

        let display_order = self.display_order.trim().parse::<i32>().ok();
        if display_order.is_none() {
            errors.add("display_order", "Display order must be a whole number");
        }

        errors.finish(|| NewProject {
            title: title.to_string(),
            description: description.to_string(),
            tags,
            status: status.to_string(),
            display_order: display_order.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contact(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_contact_valid_trims_and_drops_blank_phone() {
        let form = ContactForm {
            phone: "   ".to_string(),
            ..contact("  Ada  ", " ada@example.com ", " Hello ")
        };
        let message = form.validate().unwrap();
        assert_eq!(message.name(), "Ada");
        assert_eq!(message.email(), "ada@example.com");
        assert!(message.phone().is_none());
        assert_eq!(message.message(), "Hello");
    }

    #[test]
    fn test_contact_rejects_empty_name() {
        let errors = contact("   ", "ada@example.com", "Hi").validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_contact_rejects_bad_email() {
        let errors = contact("Ada", "not-an-email", "Hi").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address"));
    }

    #[test]
    fn test_contact_message_length_boundary() {
        let at_limit = "x".repeat(MESSAGE_MAX);
        assert!(contact("Ada", "ada@example.com", &at_limit).validate().is_ok());

        let over = "x".repeat(MESSAGE_MAX + 1);
        let errors = contact("Ada", "ada@example.com", &over).validate().unwrap_err();
        assert_eq!(
            errors.get("message"),
            Some("Message must be less than 1000 characters")
        );
    }

    #[test]
    fn test_contact_long_phone_rejected() {
        let form = ContactForm {
            phone: "1".repeat(PHONE_MAX + 1),
            ..contact("Ada", "ada@example.com", "Hi")
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("phone"));
    }

    #[test]
    fn test_contact_long_email_reports_length_first() {
        let email = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        let errors = contact("Ada", &email, "Hi").validate().unwrap_err();
        assert_eq!(
            errors.get("email"),
            Some("Email must be less than 255 characters")
        );
    }

    #[test]
    fn test_sign_in_short_password() {
        let form = SignInForm {
            email: "ada@example.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("password"), Some(SHORT_PASSWORD));
    }

    #[test]
    fn test_sign_up_confirm_mismatch() {
        let form = SignUpForm {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret124".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords don't match"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_sign_up_valid() {
        let form = SignUpForm {
            full_name: " Ada ".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        };
        let sign_up = form.validate().unwrap();
        assert_eq!(sign_up.full_name, "Ada");
        assert_eq!(sign_up.credentials.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = SignInForm {
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
        }
        .validate()
        .unwrap();
        assert!(!format!("{creds:?}").contains("secret123"));
    }

    #[test]
    fn test_project_tags_split_and_trimmed() {
        let form = ProjectForm {
            title: "Demo".to_string(),
            description: "A demo".to_string(),
            tags: "React, Go".to_string(),
            status: "Deployed".to_string(),
            display_order: "5".to_string(),
        };
        let project = form.validate().unwrap();
        assert_eq!(project.tags, vec!["React", "Go"]);
        assert_eq!(project.display_order, 5);
    }

    #[test]
    fn test_project_display_order_must_be_integer() {
        let form = ProjectForm {
            title: "Demo".to_string(),
            description: "A demo".to_string(),
            tags: "React".to_string(),
            status: "Deployed".to_string(),
            display_order: "first".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("display_order"));
    }
}
