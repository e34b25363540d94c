//! Credential selection capability.
//!
//! The hosting platform decides how an API key gets picked; the generation
//! workflow only needs to ask "is a key selected?" and "please have the user
//! pick one". Modelling that as a trait keeps the ambient affordance out of
//! the core logic and lets tests substitute a recording fake.

use tauri::{AppHandle, Emitter};
use tracing::{info, warn};

use crate::config::Config;

/// Event emitted to the frontend when the stored key must be re-selected.
pub const CREDENTIAL_RESELECT_EVENT: &str = "credential-reselect";

pub trait CredentialProvider: Send + Sync {
    /// Whether a usable API key is currently selected.
    fn has_selected(&self) -> bool;

    /// Ask the user to (re)select a key. Fire-and-forget; the workflow does
    /// not wait for the selection to complete.
    fn prompt_selection(&self);
}

/// Production provider: the key lives in the config file, re-selection is
/// delegated to the frontend settings dialog via a Tauri event.
pub struct StoredKeyCredentials {
    app: AppHandle,
}

impl StoredKeyCredentials {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl CredentialProvider for StoredKeyCredentials {
    fn has_selected(&self) -> bool {
        !Config::load_or_default().gemini_api_key.trim().is_empty()
    }

    fn prompt_selection(&self) {
        info!("Requesting API key re-selection from the frontend");
        if let Err(e) = self.app.emit(CREDENTIAL_RESELECT_EVENT, ()) {
            warn!("Failed to emit credential re-selection event: {}", e);
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::CredentialProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test fake that records how often selection was prompted.
    #[derive(Default)]
    pub struct RecordingCredentials {
        pub selected: bool,
        prompts: AtomicUsize,
    }

    impl RecordingCredentials {
        pub fn with_key() -> Self {
            Self {
                selected: true,
                prompts: AtomicUsize::new(0),
            }
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
    }

    impl CredentialProvider for RecordingCredentials {
        fn has_selected(&self) -> bool {
            self.selected
        }

        fn prompt_selection(&self) {
            self.prompts.fetch_add(1, Ordering::SeqCst);
        }
    }
}
