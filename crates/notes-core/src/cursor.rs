//! Keyset pagination cursor.
//!
//! A cursor names the last note of a page as `<created_at>_<id>`, where the
//! timestamp is RFC 3339 in UTC with microsecond precision. Clients echo it
//! back unchanged; only the timestamp half bounds the next query.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

use crate::types::{Note, NoteId};

/// Position after which the next page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: NoteId,
}

impl Cursor {
    /// Cursor pointing just past `note`.
    #[must_use]
    pub fn after(note: &Note) -> Self {
        Self {
            created_at: note.created_at,
            id: note.id,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.id
        )
    }
}

/// Reasons a cursor string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("cursor has no '_' separator")]
    MissingSeparator,

    #[error("cursor timestamp is not RFC 3339: {0}")]
    InvalidTimestamp(String),

    #[error("cursor id is not a UUID: {0}")]
    InvalidId(String),
}

impl FromStr for Cursor {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (created_at, id) = s.split_once('_').ok_or(CursorError::MissingSeparator)?;

        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map_err(|e| CursorError::InvalidTimestamp(e.to_string()))?
            .with_timezone(&Utc);
        let id = id
            .parse::<NoteId>()
            .map_err(|e| CursorError::InvalidId(e.to_string()))?;

        Ok(Self { created_at, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_display_format() {
        let cursor = Cursor {
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            id: NoteId::from_uuid(Uuid::nil()),
        };
        assert_eq!(
            cursor.to_string(),
            "2024-05-01T12:30:00.000000Z_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_parse_what_was_displayed() {
        let cursor = Cursor {
            created_at: Utc::now(),
            id: NoteId::new(),
        };
        let parsed: Cursor = cursor.to_string().parse().unwrap();
        assert_eq!(parsed.id, cursor.id);
        // Display truncates to microseconds.
        assert_eq!(
            parsed.created_at.timestamp_micros(),
            cursor.created_at.timestamp_micros()
        );
    }

    #[test]
    fn test_parse_store_style_offset() {
        let parsed: Cursor = "2024-05-01T12:30:00.123456+00:00_00000000-0000-0000-0000-000000000001"
            .parse()
            .unwrap();
        assert_eq!(parsed.created_at.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            "no-separator".parse::<Cursor>(),
            Err(CursorError::MissingSeparator)
        );
        assert!(matches!(
            "yesterday_00000000-0000-0000-0000-000000000000".parse::<Cursor>(),
            Err(CursorError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            "2024-05-01T12:30:00Z_abc".parse::<Cursor>(),
            Err(CursorError::InvalidId(_))
        ));
    }
}
