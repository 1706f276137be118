use serde::{Deserialize, Serialize};

use super::{FormErrors, MSG_EMPTY_FILE, MSG_INVALID_CHOICE, UploadedFile, required};
use crate::domain::Group;

/// Post creation and edit form: `text`, `group`, `image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    /// Raw id of the selected group; empty means no group.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(skip)]
    pub image: Option<UploadedFile>,
}

/// A post form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<UploadedFile>,
}

impl PostForm {
    /// Validate against the groups that currently exist.
    pub fn validate(&self, groups: &[Group]) -> Result<CleanPost, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text);

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", MSG_INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match &self.image {
            Some(file) if file.is_absent() => None,
            Some(file) if file.data.is_empty() => {
                errors.add("image", MSG_EMPTY_FILE);
                None
            }
            other => other.clone(),
        };

        errors.into_result(CleanPost {
            text,
            group_id,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::MSG_REQUIRED;

    fn groups() -> Vec<Group> {
        vec![Group {
            id: 7,
            title: "Cats".into(),
            slug: "cats".into(),
            description: "All about cats".into(),
        }]
    }

    #[test]
    fn test_valid_post_with_group_and_image() {
        let form = PostForm {
            text: "  Hello image  ".into(),
            group: Some("7".into()),
            image: Some(UploadedFile {
                filename: Some("california.jpg".into()),
                content_type: Some("image/jpeg".into()),
                data: vec![0xFF, 0xD8, 0xFF],
            }),
        };

        let clean = form.validate(&groups()).unwrap();
        assert_eq!(clean.text, "Hello image");
        assert_eq!(clean.group_id, Some(7));
        assert!(clean.image.is_some());
    }

    #[test]
    fn test_blank_text_is_required() {
        let form = PostForm {
            text: "   ".into(),
            ..Default::default()
        };
        let errors = form.validate(&groups()).unwrap_err();
        assert_eq!(errors.field("text"), [MSG_REQUIRED.to_string()]);
    }

    #[test]
    fn test_empty_image_file_is_rejected() {
        let form = PostForm {
            text: "Hello image".into(),
            group: None,
            image: Some(UploadedFile {
                filename: Some("null_file".into()),
                content_type: None,
                data: Vec::new(),
            }),
        };
        let errors = form.validate(&groups()).unwrap_err();
        assert_eq!(errors.field("image"), [MSG_EMPTY_FILE.to_string()]);
        assert!(!errors.has("text"));
    }

    #[test]
    fn test_no_file_chosen_is_not_an_error() {
        let form = PostForm {
            text: "Plain".into(),
            group: Some(String::new()),
            image: Some(UploadedFile::default()),
        };
        let clean = form.validate(&groups()).unwrap();
        assert_eq!(clean.group_id, None);
        assert_eq!(clean.image, None);
    }

    #[test]
    fn test_unknown_group_is_invalid_choice() {
        for raw in ["99", "cats"] {
            let form = PostForm {
                text: "Hi".into(),
                group: Some(raw.into()),
                image: None,
            };
            let errors = form.validate(&groups()).unwrap_err();
            assert!(errors.has("group"));
        }
    }
}
