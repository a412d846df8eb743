use crate::store::Sheet;
use std::{sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub sheet: Arc<Sheet>,
    pub refresh_interval: Duration,
}

impl AppState {
    pub fn new(sheet: Sheet, refresh_interval: Duration) -> Self {
        Self {
            sheet: Arc::new(sheet),
            refresh_interval,
        }
    }
}
