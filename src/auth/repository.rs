use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::DjModel;
use crate::shared::AppError;

/// Trait for DJ lookup during credential verification
#[async_trait]
pub trait DjRepository: Send + Sync {
    async fn create_dj(&self, dj: &DjModel) -> Result<(), AppError>;
    async fn get_dj(&self, dj_id: &str) -> Result<Option<DjModel>, AppError>;
}

/// In-memory implementation of DjRepository for development and testing
pub struct InMemoryDjRepository {
    djs: Mutex<HashMap<String, DjModel>>,
}

impl Default for InMemoryDjRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDjRepository {
    pub fn new() -> Self {
        Self {
            djs: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl DjRepository for InMemoryDjRepository {
    #[instrument(skip(self, dj))]
    async fn create_dj(&self, dj: &DjModel) -> Result<(), AppError> {
        let mut djs = self.djs.lock().unwrap();
        if djs.contains_key(&dj.id) {
            warn!(dj_id = %dj.id, "DJ already exists in memory");
            return Err(AppError::Persistence("DJ already exists".to_string()));
        }
        djs.insert(dj.id.clone(), dj.clone());

        debug!(dj_id = %dj.id, name = %dj.name, "DJ created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_dj(&self, dj_id: &str) -> Result<Option<DjModel>, AppError> {
        let djs = self.djs.lock().unwrap();
        let dj = djs.get(dj_id).cloned();

        match &dj {
            Some(d) => debug!(dj_id = %dj_id, name = %d.name, "DJ found in memory"),
            None => debug!(dj_id = %dj_id, "DJ not found in memory"),
        }

        Ok(dj)
    }
}
