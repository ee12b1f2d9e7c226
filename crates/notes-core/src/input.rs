//! Input schemas for creating and updating notes.
//!
//! Request bodies deserialize into these types and must pass [`Validate`]
//! before they reach the service. Fields the schemas do not name (an `id`,
//! a `user_id`, timestamps) are dropped during deserialization, so a caller
//! can never choose the owner of a note.

use serde::{Deserialize, Deserializer, Serialize};

/// Maximum length of the short text fields (title, college, ...).
pub const MAX_SHORT_TEXT: usize = 255;
/// Maximum length of a description.
pub const MAX_DESCRIPTION: usize = 2000;
/// Maximum length of a file reference.
pub const MAX_FILE_URL: usize = 1000;
/// Inclusive semester bounds.
pub const SEMESTER_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// All violations found in one input value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    /// The individual field violations.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }
}

/// Schema validation for request bodies.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Body of `POST /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub college: String,
    pub stream: String,
    pub branch: String,
    pub semester: i32,
    pub subject: String,
    pub file_url: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

impl Validate for NewNote {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Vec::new();
        check_len(&mut v, "title", &self.title, 1, MAX_SHORT_TEXT);
        if let Some(description) = &self.description {
            check_len(&mut v, "description", description, 0, MAX_DESCRIPTION);
        }
        check_len(&mut v, "college", &self.college, 1, MAX_SHORT_TEXT);
        check_len(&mut v, "stream", &self.stream, 1, MAX_SHORT_TEXT);
        check_len(&mut v, "branch", &self.branch, 1, MAX_SHORT_TEXT);
        check_semester(&mut v, self.semester);
        check_len(&mut v, "subject", &self.subject, 1, MAX_SHORT_TEXT);
        check_len(&mut v, "file_url", &self.file_url, 1, MAX_FILE_URL);
        finish(v)
    }
}

/// Body of `PUT /notes/{id}`: a partial update.
///
/// `None` means "leave unchanged". `description` is the only nullable
/// column, so it distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`, which clears it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl NoteChanges {
    /// True when the update names no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.college.is_none()
            && self.stream.is_none()
            && self.branch.is_none()
            && self.semester.is_none()
            && self.subject.is_none()
            && self.file_url.is_none()
            && self.is_public.is_none()
    }

    /// Names of the fields this update sets, in column order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.description.is_some() {
            names.push("description");
        }
        if self.college.is_some() {
            names.push("college");
        }
        if self.stream.is_some() {
            names.push("stream");
        }
        if self.branch.is_some() {
            names.push("branch");
        }
        if self.semester.is_some() {
            names.push("semester");
        }
        if self.subject.is_some() {
            names.push("subject");
        }
        if self.file_url.is_some() {
            names.push("file_url");
        }
        if self.is_public.is_some() {
            names.push("is_public");
        }
        names
    }
}

impl Validate for NoteChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Vec::new();
        if let Some(title) = &self.title {
            check_len(&mut v, "title", title, 1, MAX_SHORT_TEXT);
        }
        if let Some(Some(description)) = &self.description {
            check_len(&mut v, "description", description, 0, MAX_DESCRIPTION);
        }
        if let Some(college) = &self.college {
            check_len(&mut v, "college", college, 1, MAX_SHORT_TEXT);
        }
        if let Some(stream) = &self.stream {
            check_len(&mut v, "stream", stream, 1, MAX_SHORT_TEXT);
        }
        if let Some(branch) = &self.branch {
            check_len(&mut v, "branch", branch, 1, MAX_SHORT_TEXT);
        }
        if let Some(semester) = self.semester {
            check_semester(&mut v, semester);
        }
        if let Some(subject) = &self.subject {
            check_len(&mut v, "subject", subject, 1, MAX_SHORT_TEXT);
        }
        if let Some(file_url) = &self.file_url {
            check_len(&mut v, "file_url", file_url, 1, MAX_FILE_URL);
        }
        finish(v)
    }
}

/// Deserialize a present key as `Some(value_or_null)`; absent keys fall back
/// to `None` through `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_len(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        violations.push(FieldViolation {
            field,
            message: format!("must be at least {} character(s)", min),
        });
    } else if len > max {
        violations.push(FieldViolation {
            field,
            message: format!("must be at most {} characters", max),
        });
    }
}

fn check_semester(violations: &mut Vec<FieldViolation>, semester: i32) {
    if !SEMESTER_RANGE.contains(&semester) {
        violations.push(FieldViolation {
            field: "semester",
            message: format!(
                "must be between {} and {}",
                SEMESTER_RANGE.start(),
                SEMESTER_RANGE.end()
            ),
        });
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), ValidationErrors> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}
