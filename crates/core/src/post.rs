//! Post data model and pre-submit validation
//!
//! Pure types for the `/posts` collection. Validation runs at the edit
//! boundary, before anything is handed to the transport.

use serde::{Deserialize, Serialize};

/// Minimum title length, counted in Unicode scalar values rather than UTF-16 units
pub const TITLE_MIN_CHARS: usize = 3;

/// Minimum body length, counted in Unicode scalar values rather than UTF-16 units
pub const BODY_MIN_CHARS: usize = 10;

/// A post as stored by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// A post that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Attach a server id, producing the full item sent on update
    pub fn with_id(self, id: u64) -> Post {
        Post {
            id,
            title: self.title,
            body: self.body,
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
        }
    }
}

/// Form field a validation error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Body,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Body => write!(f, "body"),
        }
    }
}

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All field errors found in one draft, at most one per field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", render_field_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Message for a given field, if that field failed
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_field(
    field: Field,
    label: &str,
    value: &str,
    min_chars: usize,
) -> Option<FieldError> {
    let chars = value.chars().count();
    let message = if chars == 0 {
        format!("{label} is required")
    } else if chars < min_chars {
        format!("{label} must be at least {min_chars} characters")
    } else {
        return None;
    };

    Some(FieldError { field, message })
}

/// Validate a draft before it is submitted
///
/// Returns every failing field so the form can show them inline together.
pub fn validate_draft(draft: &PostDraft) -> Result<(), ValidationErrors> {
    let errors: Vec<FieldError> = [
        check_field(Field::Title, "Title", &draft.title, TITLE_MIN_CHARS),
        check_field(Field::Body, "Body", &draft.body, BODY_MIN_CHARS),
    ]
    .into_iter()
    .flatten()
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

/// Merge optional field edits onto an existing post
///
/// Fields left as `None` keep the current value.
pub fn merge_edit(current: &Post, title: Option<String>, body: Option<String>) -> Post {
    Post {
        id: current.id,
        title: title.unwrap_or_else(|| current.title.clone()),
        body: body.unwrap_or_else(|| current.body.clone()),
    }
}
