//! Featured projects shown on the landing page.

use serde::{Deserialize, Deserializer, Serialize};

use super::ProjectId;

/// Read a nullable text-array column; `null` and a missing key both mean
/// no tags.
fn nullable_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A portfolio entry from `featured_projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedProject {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,
    pub status: String,
    pub display_order: i32,
}

impl FeaturedProject {
    /// Tags joined for the edit form's single text input.
    #[must_use]
    pub fn tags_input(&self) -> String {
        join_tags(&self.tags)
    }
}

/// Insert or update payload for a project.
///
/// Updates replace every field, so the same shape serves both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: String,
    pub display_order: i32,
}

/// Split a comma-separated tag list.
///
/// Each segment is trimmed and empty segments are dropped, so `"React, , Go,"`
/// yields `["React", "Go"]`.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Join tags back into the form's text representation.
#[must_use]
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_segments() {
        assert_eq!(parse_tags("React, Go"), vec!["React", "Go"]);
        assert_eq!(parse_tags("  Rust ,Axum  "), vec!["Rust", "Axum"]);
    }

    #[test]
    fn test_parse_tags_drops_empty_segments() {
        assert_eq!(parse_tags("React, , Go,"), vec!["React", "Go"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_join_tags() {
        let tags = vec!["React".to_owned(), "Node.js".to_owned()];
        assert_eq!(join_tags(&tags), "React, Node.js");
        assert_eq!(parse_tags(&join_tags(&tags)), tags);
    }

    #[test]
    fn test_deserialize_row_without_tags_key() {
        let row = serde_json::json!({
            "id": "0b6f2c1e-8d4a-4f7e-9c2b-7a1d3e5f9b80",
            "title": "Fitness Tracking App",
            "description": "Personal fitness tracker",
            "status": "Deployed",
            "display_order": 6
        });
        let project: FeaturedProject = serde_json::from_value(row).unwrap();
        assert!(project.tags.is_empty());
        assert_eq!(project.display_order, 6);
    }

    #[test]
    fn test_deserialize_row_with_null_tags() {
        let row = serde_json::json!({
            "id": "0b6f2c1e-8d4a-4f7e-9c2b-7a1d3e5f9b80",
            "title": "Campus Connect",
            "description": "Student portal",
            "tags": null,
            "status": "Completed",
            "display_order": 1
        });
        let project: FeaturedProject = serde_json::from_value(row).unwrap();
        assert!(project.tags.is_empty());
        assert_eq!(project.tags_input(), "");
    }
}
