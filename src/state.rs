use std::sync::Arc;
use std::time::Instant;

use crate::db::Database;
use crate::services::transport::HttpTransport;
use crate::services::ProxyClient;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub proxy: ProxyClient,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Database, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            db,
            proxy: ProxyClient::new(transport),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
