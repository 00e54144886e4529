//! Shared application state, registered once as `web::Data<AppState>`.

use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::mail::{self, Mailer, OutgoingEmail};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.config.token_ttl_minutes)
    }

    /// Fire-and-forget delivery through the configured mailer.
    pub fn send_email(&self, email: OutgoingEmail) {
        mail::dispatch(Arc::clone(&self.mailer), email);
    }
}
