//! Learning module service.
//!
//! Starting a module first looks for an active module with a similar topic;
//! a match is reused and marked as recently used instead of creating a
//! duplicate. Progress bookkeeping lives in the database layer.

use database::validation::{validate_topic, MAX_TITLE_LENGTH};
use database::{learning, Database, LearningUnit, ModuleStatus, ModuleWithUnits, NewModule};
use serde::{Deserialize, Serialize};
use speech_core::text::truncate_at_word_boundary;
use tracing::info;

use crate::error::Result;
use crate::principal::Principal;
use crate::topic::find_similar;

/// Request to start (or resume) learning a topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartModule {
    pub topic: String,
    /// Defaults to the topic, truncated to a valid title.
    pub title: Option<String>,
    pub description: Option<String>,
    pub conversation_id: Option<String>,
    /// Initial units for a newly created module. Ignored when reusing.
    #[serde(default)]
    pub units: Vec<String>,
}

/// Request to create a module by hand, bypassing topic matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualModule {
    pub title: String,
    /// Defaults to the title.
    pub topic: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub units: Vec<String>,
}

/// Outcome of [`LearningService::start_module`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartedModule {
    #[serde(flatten)]
    pub module: ModuleWithUnits,
    /// True when an existing module was returned.
    pub reused: bool,
}

/// Learning operations scoped to a principal.
pub struct LearningService<'a> {
    db: &'a Database,
}

impl<'a> LearningService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Reuse a similar active module or create a new one.
    pub async fn start_module(
        &self,
        principal: &Principal,
        request: &StartModule,
    ) -> Result<StartedModule> {
        let topic = request.topic.trim();
        validate_topic(topic)?;

        let active = learning::list_active_modules(self.db.pool(), principal.user_id()).await?;
        if let Some(existing) = find_similar(topic, &active) {
            learning::touch_module(self.db.pool(), principal.user_id(), &existing.id).await?;
            let module =
                learning::get_module(self.db.pool(), principal.user_id(), &existing.id).await?;

            info!(
                module_id = %module.module.id,
                owner = %principal.user_id(),
                "Reusing learning module for similar topic"
            );
            return Ok(StartedModule {
                module,
                reused: true,
            });
        }

        let title = match request.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => truncate_at_word_boundary(topic, MAX_TITLE_LENGTH).to_string(),
        };
        let new_module = NewModule {
            title,
            topic: topic.to_string(),
            description: request.description.clone(),
            conversation_id: request.conversation_id.clone(),
            is_manual: false,
        };

        let module = learning::create_module_with_units(
            self.db.pool(),
            principal.user_id(),
            &new_module,
            &request.units,
        )
        .await?;

        info!(
            module_id = %module.module.id,
            owner = %principal.user_id(),
            units = module.units.len(),
            "Created learning module"
        );
        Ok(StartedModule {
            module,
            reused: false,
        })
    }

    /// Create a module unconditionally, marked as manual.
    pub async fn create_manual_module(
        &self,
        principal: &Principal,
        request: &ManualModule,
    ) -> Result<ModuleWithUnits> {
        let topic = request
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .unwrap_or(request.title.as_str());

        let new_module = NewModule {
            title: request.title.clone(),
            topic: topic.to_string(),
            description: request.description.clone(),
            conversation_id: None,
            is_manual: true,
        };

        let module = learning::create_module_with_units(
            self.db.pool(),
            principal.user_id(),
            &new_module,
            &request.units,
        )
        .await?;
        Ok(module)
    }

    pub async fn get_module(&self, principal: &Principal, id: &str) -> Result<ModuleWithUnits> {
        Ok(learning::get_module(self.db.pool(), principal.user_id(), id).await?)
    }

    pub async fn list_modules(
        &self,
        principal: &Principal,
        status: Option<ModuleStatus>,
    ) -> Result<Vec<database::LearningModule>> {
        Ok(learning::list_modules(self.db.pool(), principal.user_id(), status).await?)
    }

    pub async fn delete_module(&self, principal: &Principal, id: &str) -> Result<()> {
        learning::delete_module(self.db.pool(), principal.user_id(), id).await?;
        info!(module_id = %id, owner = %principal.user_id(), "Deleted learning module");
        Ok(())
    }

    /// Append units; a completed module falls back to active.
    pub async fn add_units(
        &self,
        principal: &Principal,
        module_id: &str,
        titles: &[String],
    ) -> Result<Vec<LearningUnit>> {
        Ok(learning::add_units(self.db.pool(), principal.user_id(), module_id, titles).await?)
    }

    /// Flip a unit and return its module with recomputed progress.
    pub async fn set_unit_completion(
        &self,
        principal: &Principal,
        unit_id: &str,
        completed: bool,
    ) -> Result<ModuleWithUnits> {
        let module =
            learning::set_unit_completion(self.db.pool(), principal.user_id(), unit_id, completed)
                .await?;

        if module.module.status == ModuleStatus::Completed {
            info!(module_id = %module.module.id, "Learning module completed");
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, StudioError};
    use std::time::Duration;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn start(topic: &str) -> StartModule {
        StartModule {
            topic: topic.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_similar_topic_reuses_module_and_bumps_recency() {
        let db = test_db().await;
        let service = LearningService::new(&db);
        let alice = Principal::new("alice");

        let first = service.start_module(&alice, &start("Aprende ComfyUI")).await.unwrap();
        assert!(!first.reused);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = service
            .start_module(&alice, &start("comfyui para principiantes"))
            .await
            .unwrap();

        assert!(second.reused);
        assert_eq!(second.module.module.id, first.module.module.id);
        assert!(second.module.module.updated_at > first.module.module.updated_at);
        assert_eq!(service.list_modules(&alice, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_topic_creates_module_with_units() {
        let db = test_db().await;
        let service = LearningService::new(&db);
        let alice = Principal::new("alice");

        service.start_module(&alice, &start("Aprende ComfyUI")).await.unwrap();
        let started = service
            .start_module(
                &alice,
                &StartModule {
                    topic: "Monetizar contenido con IA".to_string(),
                    units: vec!["Modelos de negocio".to_string(), "Precios".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!started.reused);
        assert_eq!(started.module.module.title, "Monetizar contenido con IA");
        assert_eq!(started.module.units.len(), 2);
        assert_eq!(started.module.units[0].order, 0);
        assert_eq!(started.module.units[1].order, 1);
    }

    #[tokio::test]
    async fn test_matching_is_scoped_to_principal_and_active_modules() {
        let db = test_db().await;
        let service = LearningService::new(&db);
        let alice = Principal::new("alice");
        let bob = Principal::new("bob");

        let alices = service.start_module(&alice, &start("Aprende ComfyUI")).await.unwrap();
        let bobs = service.start_module(&bob, &start("Aprende ComfyUI")).await.unwrap();
        assert!(!bobs.reused);
        assert_ne!(alices.module.module.id, bobs.module.module.id);

        // Complete alice's module; a completed module is no longer a candidate
        let unit = service
            .add_units(&alice, &alices.module.module.id, &["Instalación".to_string()])
            .await
            .unwrap();
        let completed = service
            .set_unit_completion(&alice, &unit[0].id, true)
            .await
            .unwrap();
        assert_eq!(completed.module.status, ModuleStatus::Completed);

        let again = service.start_module(&alice, &start("Aprende ComfyUI")).await.unwrap();
        assert!(!again.reused);
    }

    #[tokio::test]
    async fn test_progress_scenario() {
        let db = test_db().await;
        let service = LearningService::new(&db);
        let alice = Principal::new("alice");

        let module = service
            .create_manual_module(
                &alice,
                &ManualModule {
                    title: "Nodos básicos".to_string(),
                    units: vec!["Uno".to_string(), "Dos".to_string(), "Tres".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(module.module.is_manual);
        assert_eq!(module.module.topic, "Nodos básicos");

        let ids: Vec<String> = module.units.iter().map(|u| u.id.clone()).collect();
        let mut expected = [
            (33, ModuleStatus::Active),
            (67, ModuleStatus::Active),
            (100, ModuleStatus::Completed),
        ]
        .into_iter();
        for id in &ids {
            let updated = service.set_unit_completion(&alice, id, true).await.unwrap();
            let (progress, status) = expected.next().unwrap();
            assert_eq!(updated.module.progress, progress);
            assert_eq!(updated.module.status, status);
        }
    }

    #[tokio::test]
    async fn test_errors_are_typed() {
        let db = test_db().await;
        let service = LearningService::new(&db);
        let alice = Principal::new("alice");

        let err = service.start_module(&alice, &start("   ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = service
            .add_units(&alice, "missing", &["Uno".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::NotFound(_)));

        let module = service.start_module(&alice, &start("Rust async")).await.unwrap();
        let err = service
            .add_units(&alice, &module.module.module.id, &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // Other principals cannot touch the module
        let bob = Principal::new("bob");
        let err = service
            .delete_module(&bob, &module.module.module.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
