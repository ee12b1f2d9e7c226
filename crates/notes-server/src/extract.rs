//! Request extractors: the authenticated caller, validated bodies and
//! validated query strings.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use notes_core::{FieldViolation, MAX_PAGE_SIZE, NoteId, UserId, Validate, ValidationErrors};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// The caller behind a verified `Authorization: Bearer <jwt>` header.
///
/// Handlers that take this extractor never run for unauthenticated
/// requests; the rejection is a 401 envelope.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    ApiError::Unauthorized("Missing Authorization header".into())
                } else {
                    ApiError::Unauthorized(
                        "Authorization header must be \"Bearer <token>\"".into(),
                    )
                }
            })?;

        let claims = state.verifier().verify(bearer.token()).await.map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            ApiError::from(e)
        })?;

        Ok(Self {
            user_id: claims.sub,
        })
    }
}

/// JSON body that has passed schema validation.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string that has passed schema validation.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query parameters of the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Subject filter; an empty value means no filter.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    /// Cursor; an empty value means the first page.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|s| !s.is_empty())
    }

    /// Requested page size, already checked by [`Validate`].
    pub fn limit(&self) -> u32 {
        self.limit
            .and_then(|l| u32::try_from(l).ok())
            .unwrap_or(notes_core::DEFAULT_PAGE_SIZE)
    }
}

impl Validate for ListQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self.limit {
            Some(limit) if !(1..=i64::from(MAX_PAGE_SIZE)).contains(&limit) => {
                Err(ValidationErrors(vec![FieldViolation {
                    field: "limit",
                    message: format!("must be between 1 and {}", MAX_PAGE_SIZE),
                }]))
            }
            _ => Ok(()),
        }
    }
}

/// Parse a note id taken from the path.
pub fn parse_note_id(raw: &str) -> ApiResult<NoteId> {
    raw.parse()
        .map_err(|_| ApiError::ValueError(format!("Invalid note id: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: &str) -> ListQuery {
        let uri: axum::http::Uri = format!("/notes?{}", raw).parse().unwrap();
        Query::<ListQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_list_query_defaults() {
        let q = query("");
        assert!(q.validate().is_ok());
        assert_eq!(q.limit(), notes_core::DEFAULT_PAGE_SIZE);
        assert!(q.subject().is_none());
        assert!(q.cursor().is_none());
    }

    #[test]
    fn test_list_query_empty_strings_are_absent() {
        let q = query("subject=&cursor=");
        assert!(q.subject().is_none());
        assert!(q.cursor().is_none());
    }

    #[test]
    fn test_list_query_limit_bounds() {
        assert!(query("limit=1").validate().is_ok());
        assert!(query("limit=50").validate().is_ok());

        let err = query("limit=0").validate().unwrap_err();
        assert_eq!(err.violations()[0].field, "limit");
        assert!(query("limit=51").validate().is_err());
        assert!(query("limit=-3").validate().is_err());
    }

    #[test]
    fn test_parse_note_id() {
        let id = NoteId::new();
        assert_eq!(parse_note_id(&id.to_string()).unwrap(), id);

        let err = parse_note_id("not-a-uuid").unwrap_err();
        assert_eq!(err.code(), "VALUE_ERROR");
    }
}
