//! Learning module and unit operations.
//!
//! A module's `progress` and `status` are never written directly. They are
//! recomputed from the unit rows in the same transaction that changes a unit,
//! so two requests completing different units of one module cannot leave the
//! module with a count based on stale reads.

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{LearningModule, LearningUnit, ModuleStatus, ModuleWithUnits};
use crate::new_id;
use crate::validation::{validate_title, validate_topic, validate_unit_titles};

const MODULE_COLUMNS: &str = "id, owner_id, title, topic, description, status, progress, \
     conversation_id, is_manual, created_at, updated_at";

/// Fields for a new learning module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewModule {
    pub title: String,
    pub topic: String,
    pub description: Option<String>,
    pub conversation_id: Option<String>,
    pub is_manual: bool,
}

impl NewModule {
    /// A module titled after its topic.
    pub fn from_topic(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            title: topic.clone(),
            topic,
            ..Default::default()
        }
    }
}

/// Create a new module with no units.
pub async fn create_module(
    pool: &SqlitePool,
    owner_id: &str,
    module: &NewModule,
) -> Result<LearningModule> {
    let mut conn = pool.acquire().await?;
    let id = insert_module(&mut conn, owner_id, module).await?;
    fetch_module(&mut conn, owner_id, &id).await
}

/// Create a module and its initial units in one transaction.
pub async fn create_module_with_units<S: AsRef<str>>(
    pool: &SqlitePool,
    owner_id: &str,
    module: &NewModule,
    unit_titles: &[S],
) -> Result<ModuleWithUnits> {
    if !unit_titles.is_empty() {
        validate_unit_titles(unit_titles)?;
    }

    let mut tx = pool.begin().await?;
    let id = insert_module(&mut tx, owner_id, module).await?;
    if !unit_titles.is_empty() {
        insert_units(&mut tx, &id, unit_titles).await?;
        recompute_progress(&mut tx, &id).await?;
    }
    tx.commit().await?;

    tracing::debug!(module_id = %id, units = unit_titles.len(), "Created learning module");
    get_module(pool, owner_id, &id).await
}

/// Get a module with its units, ordered by `order`.
pub async fn get_module(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<ModuleWithUnits> {
    let mut conn = pool.acquire().await?;
    let module = fetch_module(&mut conn, owner_id, id).await?;
    let units = fetch_units(&mut conn, id).await?;
    Ok(ModuleWithUnits { module, units })
}

/// List an owner's modules, most recently used first.
pub async fn list_modules(
    pool: &SqlitePool,
    owner_id: &str,
    status: Option<ModuleStatus>,
) -> Result<Vec<LearningModule>> {
    let sql = format!(
        r#"
        SELECT {MODULE_COLUMNS}
        FROM learning_modules
        WHERE owner_id = ? AND (? IS NULL OR status = ?)
        ORDER BY updated_at DESC, created_at DESC
        "#
    );
    let status = status.map(|s| s.as_str());

    let modules = sqlx::query_as::<_, LearningModule>(&sql)
        .bind(owner_id)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?;

    Ok(modules)
}

/// List an owner's active modules, most recently used first.
pub async fn list_active_modules(pool: &SqlitePool, owner_id: &str) -> Result<Vec<LearningModule>> {
    list_modules(pool, owner_id, Some(ModuleStatus::Active)).await
}

/// Mark a module as recently used by bumping `updated_at`.
pub async fn touch_module(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<LearningModule> {
    let mut conn = pool.acquire().await?;
    touch(&mut conn, owner_id, id).await?;
    fetch_module(&mut conn, owner_id, id).await
}

/// Delete a module. Units go with it through the cascade.
pub async fn delete_module(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM learning_modules
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("LearningModule", id));
    }

    Ok(())
}

/// Append units to a module.
///
/// Orders continue from the module's current maximum (0 for the first unit).
/// Fails with `InvalidInput` for an empty list and `NotFound` when the module
/// does not exist or belongs to someone else.
pub async fn add_units<S: AsRef<str>>(
    pool: &SqlitePool,
    owner_id: &str,
    module_id: &str,
    titles: &[S],
) -> Result<Vec<LearningUnit>> {
    validate_unit_titles(titles)?;

    let mut tx = pool.begin().await?;
    // Writing first takes the write lock before the max(order) read.
    touch(&mut tx, owner_id, module_id).await?;
    let ids = insert_units(&mut tx, module_id, titles).await?;
    recompute_progress(&mut tx, module_id).await?;
    tx.commit().await?;

    let units = fetch_units_by_ids(pool, module_id, &ids).await?;
    tracing::debug!(module_id = %module_id, added = units.len(), "Added learning units");
    Ok(units)
}

/// Set a unit's completion flag and recompute its module's progress.
///
/// Returns the module with its refreshed units.
pub async fn set_unit_completion(
    pool: &SqlitePool,
    owner_id: &str,
    unit_id: &str,
    completed: bool,
) -> Result<ModuleWithUnits> {
    let mut tx = pool.begin().await?;

    let module_id = sqlx::query_scalar::<_, String>(
        r#"
        UPDATE learning_units
        SET completed = ?
        WHERE id = ?
          AND module_id IN (SELECT id FROM learning_modules WHERE owner_id = ?)
        RETURNING module_id
        "#,
    )
    .bind(completed)
    .bind(unit_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::not_found("LearningUnit", unit_id))?;

    recompute_progress(&mut tx, &module_id).await?;
    tx.commit().await?;

    get_module(pool, owner_id, &module_id).await
}

/// List a module's units in order.
pub async fn list_units(pool: &SqlitePool, module_id: &str) -> Result<Vec<LearningUnit>> {
    let mut conn = pool.acquire().await?;
    fetch_units(&mut conn, module_id).await
}

async fn insert_module(
    conn: &mut SqliteConnection,
    owner_id: &str,
    module: &NewModule,
) -> Result<String> {
    validate_title(&module.title)?;
    validate_topic(&module.topic)?;

    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO learning_modules (id, owner_id, title, topic, description, conversation_id, is_manual)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(module.title.trim())
    .bind(module.topic.trim())
    .bind(&module.description)
    .bind(&module.conversation_id)
    .bind(module.is_manual)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

async fn insert_units<S: AsRef<str>>(
    conn: &mut SqliteConnection,
    module_id: &str,
    titles: &[S],
) -> Result<Vec<String>> {
    let next_order = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(MAX("order"), -1) + 1
        FROM learning_units
        WHERE module_id = ?
        "#,
    )
    .bind(module_id)
    .fetch_one(&mut *conn)
    .await?;

    let mut ids = Vec::with_capacity(titles.len());
    for (offset, title) in titles.iter().enumerate() {
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO learning_units (id, module_id, title, "order")
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(module_id)
        .bind(title.as_ref().trim())
        .bind(next_order + offset as i64)
        .execute(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

/// Recompute progress and status from the current unit rows.
///
/// A single UPDATE reads the unit counts and writes the module, so the values
/// always reflect the state visible to the enclosing transaction.
async fn recompute_progress(conn: &mut SqliteConnection, module_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE learning_modules
        SET progress = p.progress,
            status = CASE WHEN p.progress = 100 THEN 'COMPLETED' ELSE 'ACTIVE' END,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        FROM (
            SELECT CASE
                WHEN COUNT(*) = 0 THEN 0
                ELSE CAST(ROUND(100.0 * SUM(completed) / COUNT(*)) AS INTEGER)
            END AS progress
            FROM learning_units
            WHERE module_id = ?
        ) AS p
        WHERE learning_modules.id = ?
        "#,
    )
    .bind(module_id)
    .bind(module_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn touch(conn: &mut SqliteConnection, owner_id: &str, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE learning_modules
        SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("LearningModule", id));
    }

    Ok(())
}

async fn fetch_module(
    conn: &mut SqliteConnection,
    owner_id: &str,
    id: &str,
) -> Result<LearningModule> {
    let sql = format!(
        r#"
        SELECT {MODULE_COLUMNS}
        FROM learning_modules
        WHERE id = ? AND owner_id = ?
        "#
    );

    sqlx::query_as::<_, LearningModule>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("LearningModule", id))
}

async fn fetch_units(conn: &mut SqliteConnection, module_id: &str) -> Result<Vec<LearningUnit>> {
    let units = sqlx::query_as::<_, LearningUnit>(
        r#"
        SELECT id, module_id, title, "order", completed, created_at
        FROM learning_units
        WHERE module_id = ?
        ORDER BY "order"
        "#,
    )
    .bind(module_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(units)
}

async fn fetch_units_by_ids(
    pool: &SqlitePool,
    module_id: &str,
    ids: &[String],
) -> Result<Vec<LearningUnit>> {
    let units = list_units(pool, module_id).await?;
    Ok(units
        .into_iter()
        .filter(|unit| ids.contains(&unit.id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use crate::Database;

    #[tokio::test]
    async fn test_progress_rounds_half_up() {
        let db = test_db().await;
        let pool = db.pool();
        let module = create_module(pool, "u1", &NewModule::from_topic("Nodos"))
            .await
            .unwrap();
        let titles: Vec<String> = (1..=8).map(|n| format!("Unidad {}", n)).collect();
        let units = add_units(pool, "u1", &module.id, &titles).await.unwrap();

        // 1 of 8 is 12.5%
        let state = set_unit_completion(pool, "u1", &units[0].id, true)
            .await
            .unwrap();
        assert_eq!(state.module.progress, 13);
        assert_eq!(state.module.status, ModuleStatus::Active);

        // 2 of 3 is 66.7%
        let other = create_module(pool, "u1", &NewModule::from_topic("Flujos"))
            .await
            .unwrap();
        let units = add_units(pool, "u1", &other.id, &["a", "b", "c"]).await.unwrap();
        set_unit_completion(pool, "u1", &units[0].id, true).await.unwrap();
        let state = set_unit_completion(pool, "u1", &units[1].id, true)
            .await
            .unwrap();
        assert_eq!(state.module.progress, 67);
    }

    #[tokio::test]
    async fn test_add_units_assigns_increasing_order() {
        let db = test_db().await;
        let pool = db.pool();
        let module = create_module(pool, "u1", &NewModule::from_topic("ComfyUI"))
            .await
            .unwrap();

        let first = add_units(pool, "u1", &module.id, &["Instalar", "Nodos"])
            .await
            .unwrap();
        assert_eq!(
            first.iter().map(|u| u.order).collect::<Vec<_>>(),
            vec![0, 1]
        );

        let second = add_units(pool, "u1", &module.id, &["Flujos"]).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].order, 2);

        let all = list_units(pool, &module.id).await.unwrap();
        let titles: Vec<_> = all.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["Instalar", "Nodos", "Flujos"]);
    }

    #[tokio::test]
    async fn test_add_units_errors() {
        let db = test_db().await;
        let pool = db.pool();
        let module = create_module(pool, "u1", &NewModule::from_topic("ComfyUI"))
            .await
            .unwrap();

        let empty: [&str; 0] = [];
        let result = add_units(pool, "u1", &module.id, &empty).await;
        assert!(matches!(result, Err(DatabaseError::InvalidInput(_))));

        let result = add_units(pool, "u1", "missing-module", &["Intro"]).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let result = add_units(pool, "intruder", &module.id, &["Intro"]).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_completion_drives_progress_and_status() {
        let db = test_db().await;
        let pool = db.pool();
        let module = create_module_with_units(
            pool,
            "u1",
            &NewModule::from_topic("Stable Diffusion"),
            &["Uno", "Dos", "Tres"],
        )
        .await
        .unwrap();
        let ids: Vec<String> = module.units.iter().map(|u| u.id.clone()).collect();

        let state = set_unit_completion(pool, "u1", &ids[0], true).await.unwrap();
        assert_eq!(state.module.progress, 33);
        assert_eq!(state.module.status, ModuleStatus::Active);

        let state = set_unit_completion(pool, "u1", &ids[1], true).await.unwrap();
        assert_eq!(state.module.progress, 67);
        assert_eq!(state.module.status, ModuleStatus::Active);

        let state = set_unit_completion(pool, "u1", &ids[2], true).await.unwrap();
        assert_eq!(state.module.progress, 100);
        assert_eq!(state.module.status, ModuleStatus::Completed);

        // Un-completing drops back to active
        let state = set_unit_completion(pool, "u1", &ids[2], false).await.unwrap();
        assert_eq!(state.module.progress, 67);
        assert_eq!(state.module.status, ModuleStatus::Active);
    }

    #[tokio::test]
    async fn test_adding_unit_to_completed_module_reactivates_it() {
        let db = test_db().await;
        let pool = db.pool();
        let module =
            create_module_with_units(pool, "u1", &NewModule::from_topic("Prompts"), &["Uno"])
                .await
                .unwrap();

        let state = set_unit_completion(pool, "u1", &module.units[0].id, true)
            .await
            .unwrap();
        assert_eq!(state.module.status, ModuleStatus::Completed);

        add_units(pool, "u1", &module.module.id, &["Dos"]).await.unwrap();
        let state = get_module(pool, "u1", &module.module.id).await.unwrap();
        assert_eq!(state.module.progress, 50);
        assert_eq!(state.module.status, ModuleStatus::Active);
    }

    #[tokio::test]
    async fn test_set_unit_completion_not_found() {
        let db = test_db().await;
        let pool = db.pool();
        let module =
            create_module_with_units(pool, "u1", &NewModule::from_topic("Prompts"), &["Uno"])
                .await
                .unwrap();

        let result = set_unit_completion(pool, "u1", "missing", true).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let result = set_unit_completion(pool, "intruder", &module.units[0].id, true).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_modules_filters_by_status_and_owner() {
        let db = test_db().await;
        let pool = db.pool();
        let done = create_module_with_units(pool, "u1", &NewModule::from_topic("Done"), &["x"])
            .await
            .unwrap();
        set_unit_completion(pool, "u1", &done.units[0].id, true)
            .await
            .unwrap();
        create_module(pool, "u1", &NewModule::from_topic("Open"))
            .await
            .unwrap();
        create_module(pool, "u2", &NewModule::from_topic("Other"))
            .await
            .unwrap();

        let all = list_modules(pool, "u1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = list_active_modules(pool, "u1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Open");

        let completed = list_modules(pool, "u1", Some(ModuleStatus::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "Done");
    }

    #[tokio::test]
    async fn test_touch_module_bumps_updated_at() {
        let db = test_db().await;
        let pool = db.pool();
        let module = create_module(pool, "u1", &NewModule::from_topic("Topic"))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let touched = touch_module(pool, "u1", &module.id).await.unwrap();
        assert!(touched.updated_at > module.updated_at);
    }

    #[tokio::test]
    async fn test_delete_module_cascades_units() {
        let db = test_db().await;
        let pool = db.pool();
        let module =
            create_module_with_units(pool, "u1", &NewModule::from_topic("Gone"), &["a", "b"])
                .await
                .unwrap();

        delete_module(pool, "u1", &module.module.id).await.unwrap();
        let units = list_units(pool, &module.module.id).await.unwrap();
        assert!(units.is_empty());

        let result = delete_module(pool, "u1", &module.module.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    // File-backed so that several pooled connections really run concurrently.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_completions_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("race.db").display());
        let db = Database::connect_with_pool_size(&url, 8).await.unwrap();
        db.migrate().await.unwrap();

        let titles: Vec<String> = (0..8).map(|i| format!("Unidad {}", i)).collect();
        let module = create_module_with_units(
            db.pool(),
            "u1",
            &NewModule::from_topic("Concurrencia"),
            &titles,
        )
        .await
        .unwrap();

        let mut handles = Vec::new();
        for unit in &module.units {
            let pool = db.pool().clone();
            let unit_id = unit.id.clone();
            handles.push(tokio::spawn(async move {
                set_unit_completion(&pool, "u1", &unit_id, true).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let state = get_module(db.pool(), "u1", &module.module.id).await.unwrap();
        assert!(state.units.iter().all(|u| u.completed));
        assert_eq!(state.module.progress, 100);
        assert_eq!(state.module.status, ModuleStatus::Completed);
    }
}
