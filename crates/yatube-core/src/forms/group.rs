use serde::{Deserialize, Serialize};

use super::{FormErrors, MSG_REQUIRED, required};
use crate::domain::{NewGroup, slugify};

const TITLE_MAX_CHARS: usize = 200;
const SLUG_MAX_CHARS: usize = 50;

/// Operator form for creating a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupForm {
    #[serde(default)]
    pub title: String,
    /// Derived from the title when left blank.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl GroupForm {
    pub fn validate(&self) -> Result<NewGroup, FormErrors> {
        let mut errors = FormErrors::new();

        let title = required(&mut errors, "title", &self.title);
        if title.chars().count() > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_CHARS} characters."),
            );
        }

        let slug = match self.slug.trim() {
            "" => slugify(&title),
            given => given.to_string(),
        };
        if slug.is_empty() {
            errors.add("slug", MSG_REQUIRED);
        } else if !is_valid_slug(&slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        } else if slug.chars().count() > SLUG_MAX_CHARS {
            errors.add(
                "slug",
                format!("Ensure this value has at most {SLUG_MAX_CHARS} characters."),
            );
        }

        let description = required(&mut errors, "description", &self.description);

        errors.into_result(NewGroup {
            title,
            slug,
            description,
        })
    }
}

fn is_valid_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
