//! SQLite Place Store
//!
//! Implements PlaceStore using SQLite for storage.
//! Blocking database work is moved off the async runtime with `spawn_blocking`.

use crate::domain::entities::{NewPlace, Place, PlaceDraft, PlaceFilter, PlaceId};
use crate::domain::errors::StoreError;
use crate::domain::ports::PlaceStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::sync::Arc;

const PLACE_COLUMNS: &str =
    "id, latitude, longitude, description, country, city, locality, created_at, updated_at";

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(Box::new(e))
    }
}

/// SQLite-backed place store.
///
/// A single connection guarded by a mutex; every write runs in its own
/// transaction, which serializes concurrent updates to the same row.
#[derive(Clone)]
pub struct SqlitePlaceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlaceStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(db_path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> anyhow::Result<Self> {
        Self::initialise_schema(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialise_schema(conn: &mut Connection) -> rusqlite::Result<()> {
        let tx = conn.transaction()?;
        tx.execute(
            "CREATE TABLE IF NOT EXISTS places (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude REAL,
                longitude REAL,
                description TEXT NOT NULL,
                country TEXT,
                city TEXT,
                locality TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        tx.commit()
    }

    /// Run a closure against the connection on the blocking thread pool.
    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            op(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
        .map_err(StoreError::from)
    }

    /// Convert a SQLite row to a Place entity.
    fn row_to_place(row: &Row) -> rusqlite::Result<Place> {
        Ok(Place {
            id: row.get(0)?,
            latitude: row.get(1)?,
            longitude: row.get(2)?,
            description: row.get(3)?,
            country: row.get(4)?,
            city: row.get(5)?,
            locality: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn insert(conn: &mut Connection, place: &NewPlace) -> rusqlite::Result<Option<PlaceId>> {
        let now = Utc::now();
        let tx = conn.transaction()?;
        let written = tx.execute(
            "INSERT INTO places
                (latitude, longitude, description, country, city, locality, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                place.latitude,
                place.longitude,
                place.description,
                place.country,
                place.city,
                place.locality,
                now,
            ],
        )?;
        if written == 0 {
            return Ok(None);
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
    }

    fn update(conn: &mut Connection, id: PlaceId, changes: &PlaceDraft) -> rusqlite::Result<u64> {
        let mut assignments = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        let mut set = |column: &str, value: Box<dyn ToSql>| {
            assignments.push(format!("{} = ?", column));
            values.push(value);
        };
        if let Some(v) = changes.latitude {
            set("latitude", Box::new(v));
        }
        if let Some(v) = changes.longitude {
            set("longitude", Box::new(v));
        }
        if let Some(v) = &changes.description {
            set("description", Box::new(v.clone()));
        }
        // A resolved locality replaces all three columns, NULLs included
        if changes.enriched {
            set("country", Box::new(changes.country.clone()));
            set("city", Box::new(changes.city.clone()));
            set("locality", Box::new(changes.locality.clone()));
        }
        set("updated_at", Box::new(Utc::now()));
        values.push(Box::new(id));

        let sql = format!(
            "UPDATE places SET {} WHERE id = ?",
            assignments.join(", ")
        );

        let tx = conn.transaction()?;
        let matched = tx.execute(&sql, params_from_iter(values.iter()))?;
        tx.commit()?;
        Ok(matched as u64)
    }

    fn select(conn: &mut Connection, filter: &PlaceFilter) -> rusqlite::Result<Vec<Place>> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(v) = filter.latitude {
            conditions.push("latitude = ?");
            values.push(Value::Real(v));
        }
        if let Some(v) = filter.longitude {
            conditions.push("longitude = ?");
            values.push(Value::Real(v));
        }
        if let Some(v) = &filter.description {
            conditions.push("description = ?");
            values.push(Value::Text(v.clone()));
        }

        let mut sql = format!("SELECT {} FROM places", PLACE_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit as i64));
        }

        let mut stmt = conn.prepare(&sql)?;
        let places = stmt
            .query_map(params_from_iter(values), Self::row_to_place)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(places)
    }
}

#[async_trait]
impl PlaceStore for SqlitePlaceStore {
    async fn find_all(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError> {
        let filter = filter.clone();
        self.run(move |conn| Self::select(conn, &filter)).await
    }

    async fn find_by_id(&self, id: PlaceId) -> Result<Option<Place>, StoreError> {
        self.run(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM places WHERE id = ?1", PLACE_COLUMNS),
                [id],
                Self::row_to_place,
            )
            .optional()
        })
        .await
    }

    async fn create_and_commit(&self, place: &NewPlace) -> Result<Option<PlaceId>, StoreError> {
        let place = place.clone();
        self.run(move |conn| Self::insert(conn, &place)).await
    }

    async fn update_and_commit(
        &self,
        id: PlaceId,
        changes: &PlaceDraft,
    ) -> Result<u64, StoreError> {
        let changes = changes.clone();
        self.run(move |conn| Self::update(conn, id, &changes)).await
    }

    async fn delete_and_commit(&self, id: PlaceId) -> Result<u64, StoreError> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let matched = tx.execute("DELETE FROM places WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(matched as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_place(description: &str) -> NewPlace {
        NewPlace {
            latitude: Some(12.3456),
            longitude: Some(23.4567),
            description: description.to_string(),
            country: Some("AA".to_string()),
            city: Some("City".to_string()),
            locality: Some("Location".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();

        let id = store
            .create_and_commit(&new_place("Test place"))
            .await
            .unwrap()
            .unwrap();
        let place = store.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(place.id, id);
        assert_eq!(place.latitude, Some(12.3456));
        assert_eq!(place.longitude, Some(23.4567));
        assert_eq!(place.description, "Test place");
        assert_eq!(place.country.as_deref(), Some("AA"));
        assert_eq!(place.city.as_deref(), Some("City"));
        assert_eq!(place.locality.as_deref(), Some("Location"));
        assert_eq!(place.created_at, place.updated_at);
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();

        let first = store.create_and_commit(&new_place("One")).await.unwrap();
        let second = store.create_and_commit(&new_place("Two")).await.unwrap();

        assert!(second.unwrap() > first.unwrap());
    }

    #[tokio::test]
    async fn test_create_without_enrichment_stores_nulls() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let place = NewPlace {
            latitude: None,
            longitude: None,
            description: "Bare".to_string(),
            country: None,
            city: None,
            locality: None,
        };

        let id = store.create_and_commit(&place).await.unwrap().unwrap();
        let stored = store.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(stored.latitude, None);
        assert_eq!(stored.country, None);
    }

    #[tokio::test]
    async fn test_update_only_present_fields() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let id = store
            .create_and_commit(&new_place("Before"))
            .await
            .unwrap()
            .unwrap();
        let before = store.find_by_id(id).await.unwrap().unwrap();

        let changes = PlaceDraft {
            description: Some("After".to_string()),
            ..Default::default()
        };
        let matched = store.update_and_commit(id, &changes).await.unwrap();
        let after = store.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(matched, 1);
        assert_eq!(after.description, "After");
        assert_eq!(after.country, before.country);
        assert_eq!(after.city, before.city);
        assert_eq!(after.latitude, before.latitude);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_ignores_unenriched_locality_fields() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let id = store
            .create_and_commit(&new_place("Before"))
            .await
            .unwrap()
            .unwrap();

        let changes = PlaceDraft {
            country: Some("BB".to_string()),
            ..Default::default()
        };
        store.update_and_commit(id, &changes).await.unwrap();
        let after = store.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(after.country.as_deref(), Some("AA"));
        assert_eq!(after.locality.as_deref(), Some("Location"));
    }

    #[tokio::test]
    async fn test_update_enriched_clears_missing_locality_fields() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let id = store
            .create_and_commit(&NewPlace {
                country: Some("BR".to_string()),
                city: Some("Rio".to_string()),
                locality: Some("Copacabana".to_string()),
                ..new_place("Beach")
            })
            .await
            .unwrap()
            .unwrap();

        let changes = PlaceDraft {
            latitude: Some(1.0),
            longitude: Some(2.0),
            country: Some("AA".to_string()),
            city: None,
            locality: None,
            enriched: true,
            ..Default::default()
        };
        assert_eq!(store.update_and_commit(id, &changes).await.unwrap(), 1);
        let after = store.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(after.latitude, Some(1.0));
        assert_eq!(after.country.as_deref(), Some("AA"));
        assert_eq!(after.city, None);
        assert_eq!(after.locality, None);
        assert_eq!(after.description, "Beach");
    }

    #[tokio::test]
    async fn test_timestamps_share_one_text_format() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let id = store
            .create_and_commit(&new_place("Stamped"))
            .await
            .unwrap()
            .unwrap();
        let changes = PlaceDraft {
            description: Some("Restamped".to_string()),
            ..Default::default()
        };
        store.update_and_commit(id, &changes).await.unwrap();

        let (created, updated): (String, String) = store
            .run(move |conn| {
                conn.query_row(
                    "SELECT created_at, updated_at FROM places WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .unwrap();

        // Both written by chrono's ToSql as "%F %T%.f%:z"
        assert_eq!(created.as_bytes()[10], b' ');
        assert_eq!(updated.as_bytes()[10], b' ');
        assert!(created.ends_with("+00:00"));
        assert!(updated.ends_with("+00:00"));
    }

    #[tokio::test]
    async fn test_update_missing_returns_zero() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let changes = PlaceDraft {
            city: Some("City".to_string()),
            enriched: true,
            ..Default::default()
        };
        assert_eq!(store.update_and_commit(7, &changes).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        let id = store
            .create_and_commit(&new_place("Doomed"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(store.delete_and_commit(id).await.unwrap(), 1);
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert_eq!(store.delete_and_commit(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_all_with_filter() {
        let store = SqlitePlaceStore::open_in_memory().unwrap();
        store.create_and_commit(&new_place("Alpha")).await.unwrap();
        store.create_and_commit(&new_place("Beta")).await.unwrap();
        store.create_and_commit(&new_place("Alpha")).await.unwrap();

        let all = store.find_all(&PlaceFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let filter = PlaceFilter {
            latitude: Some(12.3456),
            longitude: Some(23.4567),
            description: Some("Alpha".to_string()),
            limit: Some(100),
        };
        let alphas = store.find_all(&filter).await.unwrap();
        assert_eq!(alphas.len(), 2);

        let limited = PlaceFilter {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(store.find_all(&limited).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_file_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.db");
        let path = path.to_str().unwrap();

        let id = {
            let store = SqlitePlaceStore::open(path).unwrap();
            store
                .create_and_commit(&new_place("Durable"))
                .await
                .unwrap()
                .unwrap()
        };

        let reopened = SqlitePlaceStore::open(path).unwrap();
        let place = reopened.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(place.description, "Durable");
    }
}
