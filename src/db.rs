use crate::config::Config;
use crate::error::StoreError;
use crate::model::{Bird, CreateBird};
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use serde_json::{Map, Value as JsonValue};
use tokio::sync::Mutex;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_create_birds.sql", include_str!("migrations/001_create_birds.sql"))];

pub struct Database {
    _db: LibsqlDatabase,
    conn: Connection,
    tx_lock: Mutex<()>,
}

impl Database {
    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Config) -> Result<Self> {
        let db = Builder::new_local(cfg.get_database_uri()).build().await?;
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database {
            _db: db,
            conn,
            tx_lock: Mutex::new(()),
        })
    }

    pub async fn list_birds(&self) -> Result<Vec<Bird>, StoreError> {
        let query = "SELECT id, name, species, image FROM birds";

        let mut rows = self.conn.query(query, ()).await?;
        let mut birds = Vec::new();

        while let Some(row) = rows.next().await? {
            birds.push(self.row_to_bird(&row)?);
        }

        Ok(birds)
    }

    pub async fn get_bird(&self, id: i32) -> Result<Option<Bird>, StoreError> {
        let query = "SELECT id, name, species, image FROM birds WHERE id = ?";

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_bird(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn create_bird(&self, input: CreateBird) -> Result<Bird, StoreError> {
        let _guard = self.tx_lock.lock().await;

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        let result = self.create_bird_internal(input).await;

        match result {
            Ok(bird) => {
                self.conn.execute("COMMIT", ()).await?;
                Ok(bird)
            }
            Err(e) => {
                let _ = self.conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    async fn create_bird_internal(&self, input: CreateBird) -> Result<Bird, StoreError> {
        let query = r#"
            INSERT INTO birds (name, species, image)
            VALUES (?, ?, ?)
            RETURNING id, name, species, image
        "#;

        let params: Vec<libsql::Value> = vec![
            to_column_value(&input.name)?,
            to_column_value(&input.species)?,
            to_column_value(&input.image)?,
        ];

        let mut rows = self.conn.query(query, params).await?;

        if let Some(row) = rows.next().await? {
            self.row_to_bird(&row)
        } else {
            Err(StoreError::Internal("insert returned no row".to_string()))
        }
    }

    pub async fn update_bird(&self, id: i32, patch: &Map<String, JsonValue>) -> Result<Bird, StoreError> {
        let _guard = self.tx_lock.lock().await;

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        let result = self.update_bird_internal(id, patch).await;

        match result {
            Ok(bird) => {
                self.conn.execute("COMMIT", ()).await?;
                Ok(bird)
            }
            Err(e) => {
                let _ = self.conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    async fn update_bird_internal(&self, id: i32, patch: &Map<String, JsonValue>) -> Result<Bird, StoreError> {
        if self.get_bird(id).await?.is_none() {
            return Err(StoreError::NotFound(id));
        }

        let mut updates = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        // Every key naming a birds column is applied, id included; keys that
        // name no column are dropped without error.
        for (field, value) in patch {
            match field.as_str() {
                "id" => updates.push("id = ?"),
                "name" => updates.push("name = ?"),
                "species" => updates.push("species = ?"),
                "image" => updates.push("image = ?"),
                _ => continue,
            }
            params.push(to_column_value(value)?);
        }

        if updates.is_empty() {
            return self.get_bird(id).await?.ok_or(StoreError::NotFound(id));
        }

        // A patch may renumber the record, so the re-read targets whatever id
        // the row holds after the update.
        let target_id = patch.get("id").and_then(JsonValue::as_i64).map(|n| n as i32).unwrap_or(id);

        params.push(id.into());
        let query = format!("UPDATE birds SET {} WHERE id = ?", updates.join(", "));

        self.conn.execute(&query, params).await?;

        self.get_bird(target_id).await?.ok_or(StoreError::NotFound(target_id))
    }

    pub async fn delete_bird(&self, id: i32) -> Result<(), StoreError> {
        let _guard = self.tx_lock.lock().await;

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        let result = async {
            let affected = self
                .conn
                .execute("DELETE FROM birds WHERE id = ?", libsql::params![id])
                .await?;
            if affected == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        }
        .await;

        match result {
            Ok(_) => {
                self.conn.execute("COMMIT", ()).await?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    fn row_to_bird(&self, row: &libsql::Row) -> Result<Bird, StoreError> {
        Ok(Bird {
            id: row.get(0)?,
            name: row.get(1)?,
            species: row.get(2)?,
            image: row.get(3)?,
        })
    }
}

/// Maps a JSON scalar onto a sqlite value. Arrays and objects have no column
/// representation and are rejected as constraint violations.
fn to_column_value(value: &JsonValue) -> Result<libsql::Value, StoreError> {
    match value {
        JsonValue::Null => Ok(libsql::Value::Null),
        JsonValue::Bool(b) => Ok(libsql::Value::Integer(if *b { 1 } else { 0 })),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(libsql::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(libsql::Value::Real(f))
            } else {
                Err(StoreError::Constraint(format!("cannot bind number {} to a column", n)))
            }
        }
        JsonValue::String(s) => Ok(libsql::Value::Text(s.clone())),
        JsonValue::Array(_) => Err(StoreError::Constraint("cannot bind a JSON array to a column".to_string())),
        JsonValue::Object(_) => Err(StoreError::Constraint("cannot bind a JSON object to a column".to_string())),
    }
}
