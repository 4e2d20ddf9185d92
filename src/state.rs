use std::sync::Arc;

use crate::backend::{AuthProvider, DocumentStore};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::session::SessionGate;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub session: Arc<SessionGate>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let session = SessionGate::new(Arc::clone(&auth), Arc::clone(&store));
        Self {
            config,
            catalog: Arc::new(Catalog::standard()),
            store,
            auth,
            session,
        }
    }
}
