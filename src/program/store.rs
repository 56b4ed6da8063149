use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{ProgramModel, ProgramStatus};
use crate::shared::AppError;

/// External program store boundary
#[async_trait]
pub trait ProgramStore: Send + Sync {
    async fn create_program(&self, program: &ProgramModel) -> Result<(), AppError>;
    async fn get_program(&self, program_id: &str) -> Result<Option<ProgramModel>, AppError>;

    /// Lists programs, optionally filtered by status, ordered by start time
    async fn list_programs(
        &self,
        status: Option<ProgramStatus>,
    ) -> Result<Vec<ProgramModel>, AppError>;

    /// All programs currently live for one owner; the cascade source set
    async fn list_live_programs_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ProgramModel>, AppError>;

    /// Updates a program's status and returns the updated record
    async fn set_status(
        &self,
        program_id: &str,
        status: ProgramStatus,
    ) -> Result<ProgramModel, AppError>;
}

/// In-memory implementation of ProgramStore for development and testing
pub struct InMemoryProgramStore {
    programs: Mutex<HashMap<String, ProgramModel>>,
}

impl Default for InMemoryProgramStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProgramStore {
    pub fn new() -> Self {
        Self {
            programs: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ProgramStore for InMemoryProgramStore {
    #[instrument(skip(self, program))]
    async fn create_program(&self, program: &ProgramModel) -> Result<(), AppError> {
        let mut programs = self.programs.lock().unwrap();
        if programs.contains_key(&program.id) {
            warn!(program_id = %program.id, "Program already exists in memory");
            return Err(AppError::Persistence("Program already exists".to_string()));
        }
        programs.insert(program.id.clone(), program.clone());

        debug!(program_id = %program.id, title = %program.title, "Program created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_program(&self, program_id: &str) -> Result<Option<ProgramModel>, AppError> {
        let programs = self.programs.lock().unwrap();
        Ok(programs.get(program_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_programs(
        &self,
        status: Option<ProgramStatus>,
    ) -> Result<Vec<ProgramModel>, AppError> {
        let programs = self.programs.lock().unwrap();
        let mut matching: Vec<ProgramModel> = programs
            .values()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(matching)
    }

    #[instrument(skip(self))]
    async fn list_live_programs_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ProgramModel>, AppError> {
        let programs = self.programs.lock().unwrap();
        Ok(programs
            .values()
            .filter(|p| p.is_live() && p.owned_by(owner_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        program_id: &str,
        status: ProgramStatus,
    ) -> Result<ProgramModel, AppError> {
        let mut programs = self.programs.lock().unwrap();

        let program = programs
            .get_mut(program_id)
            .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

        program.status = status;
        let updated = program.clone();

        info!(
            program_id = %program_id,
            status = %status,
            "Program status updated in memory"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserIdentity;
    use chrono::Utc;

    fn test_program(id: &str, owner_id: &str, status: ProgramStatus) -> ProgramModel {
        ProgramModel {
            id: id.to_string(),
            owner: UserIdentity {
                id: owner_id.to_string(),
                name: format!("dj {}", owner_id),
                avatar: format!("{}.png", owner_id),
            },
            title: format!("show {}", id),
            description: None,
            status,
            starts_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_program() {
        let store = InMemoryProgramStore::new();
        let program = test_program("p1", "dj-1", ProgramStatus::Scheduled);

        store.create_program(&program).await.unwrap();

        let retrieved = store.get_program("p1").await.unwrap();
        assert_eq!(retrieved, Some(program));
    }

    #[tokio::test]
    async fn test_create_duplicate_program() {
        let store = InMemoryProgramStore::new();
        let program = test_program("p1", "dj-1", ProgramStatus::Scheduled);

        store.create_program(&program).await.unwrap();

        let result = store.create_program(&program).await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_list_programs_with_status_filter() {
        let store = InMemoryProgramStore::new();
        store
            .create_program(&test_program("p1", "dj-1", ProgramStatus::Scheduled))
            .await
            .unwrap();
        store
            .create_program(&test_program("p2", "dj-1", ProgramStatus::Live))
            .await
            .unwrap();

        let all = store.list_programs(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let live = store.list_programs(Some(ProgramStatus::Live)).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, "p2");
    }

    #[tokio::test]
    async fn test_list_live_programs_by_owner() {
        let store = InMemoryProgramStore::new();
        store
            .create_program(&test_program("p1", "dj-1", ProgramStatus::Live))
            .await
            .unwrap();
        store
            .create_program(&test_program("p2", "dj-1", ProgramStatus::Scheduled))
            .await
            .unwrap();
        store
            .create_program(&test_program("p3", "dj-2", ProgramStatus::Live))
            .await
            .unwrap();

        let live = store.list_live_programs_by_owner("dj-1").await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, "p1");
    }

    #[tokio::test]
    async fn test_set_status_updates_and_returns_program() {
        let store = InMemoryProgramStore::new();
        store
            .create_program(&test_program("p1", "dj-1", ProgramStatus::Scheduled))
            .await
            .unwrap();

        let updated = store.set_status("p1", ProgramStatus::Live).await.unwrap();
        assert_eq!(updated.status, ProgramStatus::Live);

        let fetched = store.get_program("p1").await.unwrap().unwrap();
        assert_eq!(fetched.status, ProgramStatus::Live);
    }

    #[tokio::test]
    async fn test_set_status_missing_program() {
        let store = InMemoryProgramStore::new();

        let result = store.set_status("nope", ProgramStatus::Live).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
