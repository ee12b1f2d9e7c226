//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::NoteRepository;

use crate::auth::TokenVerifier;
use crate::service::NoteService;

/// Application state shared across all handlers.
///
/// Built once at startup and cloned into every request; clones share the
/// repository handle and the verifier's key cache.
#[derive(Clone)]
pub struct AppState {
    /// Business rules over the notes repository.
    notes: NoteService,
    /// Bearer token verifier.
    verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Create new application state.
    pub fn new(repository: Arc<dyn NoteRepository>, verifier: TokenVerifier) -> Self {
        Self {
            notes: NoteService::new(repository),
            verifier: Arc::new(verifier),
        }
    }

    /// Get a reference to the notes service.
    pub fn notes(&self) -> &NoteService {
        &self.notes
    }

    /// Get a reference to the token verifier.
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}
