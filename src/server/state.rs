use crate::fill::FormFiller;
use std::sync::Arc;

/// Shared application state accessible from all handlers.
///
/// Holds only immutable, `Arc`-shared collaborators: concurrent requests never
/// contend on anything here.
#[derive(Debug, Clone)]
pub struct AppState {
    pub filler: Arc<FormFiller>,
}

impl AppState {
    pub fn new(filler: FormFiller) -> Self {
        Self {
            filler: Arc::new(filler),
        }
    }
}
