use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use super::types::{City, Country, StateRecord};
use super::{Database, Page, PageRequest, ValidationError};

const STATE_SELECT: &str = "SELECT s.id, s.name, s.country_id, c.name
     FROM states s JOIN countries c ON c.id = s.country_id";

const CITY_SELECT: &str = "SELECT ci.id, ci.name, ci.state_id, s.name, c.name
     FROM cities ci
     JOIN states s ON s.id = ci.state_id
     JOIN countries c ON c.id = s.country_id";

fn require_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name is required").into());
    }
    Ok(name.to_string())
}

fn country_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Country> {
    Ok(Country {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn state_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StateRecord> {
    Ok(StateRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        country_name: row.get(3)?,
    })
}

fn city_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<City> {
    Ok(City {
        id: row.get(0)?,
        name: row.get(1)?,
        state: row.get(2)?,
        state_name: row.get(3)?,
        country_name: row.get(4)?,
    })
}

fn fetch_country(db: &Connection, id: i64) -> rusqlite::Result<Option<Country>> {
    db.query_row(
        "SELECT id, name FROM countries WHERE id = ?1",
        params![id],
        country_row,
    )
    .optional()
}

fn fetch_state(db: &Connection, id: i64) -> rusqlite::Result<Option<StateRecord>> {
    db.query_row(
        &format!("{STATE_SELECT} WHERE s.id = ?1"),
        params![id],
        state_row,
    )
    .optional()
}

fn fetch_city(db: &Connection, id: i64) -> rusqlite::Result<Option<City>> {
    db.query_row(
        &format!("{CITY_SELECT} WHERE ci.id = ?1"),
        params![id],
        city_row,
    )
    .optional()
}

fn count(db: &Connection, table: &str) -> rusqlite::Result<i64> {
    db.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
}

fn missing(kind: &str, id: i64) -> anyhow::Error {
    anyhow::anyhow!("{kind} {id} disappeared after write")
}

impl Database {
    // --- Countries ---

    pub async fn create_country(&self, name: &str) -> Result<Country> {
        let name = require_name(name)?;
        let db = self.db.lock().await;
        db.execute("INSERT INTO countries (name) VALUES (?1)", params![name])?;
        let id = db.last_insert_rowid();
        fetch_country(&db, id)?.ok_or_else(|| missing("country", id))
    }

    pub async fn get_country(&self, id: i64) -> Result<Option<Country>> {
        let db = self.db.lock().await;
        Ok(fetch_country(&db, id)?)
    }

    pub async fn list_countries(&self, page: &PageRequest) -> Result<Page<Country>> {
        let db = self.db.lock().await;
        let total = count(&db, "countries")?;
        let mut stmt =
            db.prepare("SELECT id, name FROM countries ORDER BY id LIMIT ?1 OFFSET ?2")?;
        let rows = stmt.query_map(params![page.limit(), page.offset()], country_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(Page::new(results, total, page))
    }

    pub async fn update_country(&self, id: i64, name: Option<&str>) -> Result<Option<Country>> {
        let name = name.map(require_name).transpose()?;
        let db = self.db.lock().await;
        if let Some(name) = name {
            db.execute(
                "UPDATE countries SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
        }
        Ok(fetch_country(&db, id)?)
    }

    pub async fn delete_country(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM countries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- States ---

    pub async fn create_state(&self, name: &str, country: i64) -> Result<StateRecord> {
        let name = require_name(name)?;
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO states (name, country_id) VALUES (?1, ?2)",
            params![name, country],
        )?;
        let id = db.last_insert_rowid();
        fetch_state(&db, id)?.ok_or_else(|| missing("state", id))
    }

    pub async fn get_state(&self, id: i64) -> Result<Option<StateRecord>> {
        let db = self.db.lock().await;
        Ok(fetch_state(&db, id)?)
    }

    pub async fn list_states(&self, page: &PageRequest) -> Result<Page<StateRecord>> {
        let db = self.db.lock().await;
        let total = count(&db, "states")?;
        let mut stmt = db.prepare(&format!(
            "{STATE_SELECT} ORDER BY s.id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![page.limit(), page.offset()], state_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(Page::new(results, total, page))
    }

    pub async fn update_state(
        &self,
        id: i64,
        name: Option<&str>,
        country: Option<i64>,
    ) -> Result<Option<StateRecord>> {
        let name = name.map(require_name).transpose()?;
        let db = self.db.lock().await;
        if let Some(name) = name {
            db.execute("UPDATE states SET name = ?1 WHERE id = ?2", params![name, id])?;
        }
        if let Some(country) = country {
            db.execute(
                "UPDATE states SET country_id = ?1 WHERE id = ?2",
                params![country, id],
            )?;
        }
        Ok(fetch_state(&db, id)?)
    }

    pub async fn delete_state(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM states WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Cities ---

    pub async fn create_city(&self, name: &str, state: i64) -> Result<City> {
        let name = require_name(name)?;
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO cities (name, state_id) VALUES (?1, ?2)",
            params![name, state],
        )?;
        let id = db.last_insert_rowid();
        fetch_city(&db, id)?.ok_or_else(|| missing("city", id))
    }

    pub async fn get_city(&self, id: i64) -> Result<Option<City>> {
        let db = self.db.lock().await;
        Ok(fetch_city(&db, id)?)
    }

    pub async fn list_cities(&self, page: &PageRequest) -> Result<Page<City>> {
        let db = self.db.lock().await;
        let total = count(&db, "cities")?;
        let mut stmt = db.prepare(&format!(
            "{CITY_SELECT} ORDER BY ci.id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![page.limit(), page.offset()], city_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(Page::new(results, total, page))
    }

    pub async fn update_city(
        &self,
        id: i64,
        name: Option<&str>,
        state: Option<i64>,
    ) -> Result<Option<City>> {
        let name = name.map(require_name).transpose()?;
        let db = self.db.lock().await;
        if let Some(name) = name {
            db.execute("UPDATE cities SET name = ?1 WHERE id = ?2", params![name, id])?;
        }
        if let Some(state) = state {
            db.execute(
                "UPDATE cities SET state_id = ?1 WHERE id = ?2",
                params![state, id],
            )?;
        }
        Ok(fetch_city(&db, id)?)
    }

    pub async fn delete_city(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM cities WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::store::{PageRequest, ValidationError, test_database};

    #[tokio::test]
    async fn country_crud_roundtrip() {
        let (db, _dir) = test_database().await;
        let country = db.create_country("  India ").await.unwrap();
        assert_eq!(country.name, "India");

        let renamed = db
            .update_country(country.id, Some("Bharat"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Bharat");

        assert!(db.delete_country(country.id).await.unwrap());
        assert!(db.get_country(country.id).await.unwrap().is_none());
        assert!(!db.delete_country(country.id).await.unwrap());
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_error() {
        let (db, _dir) = test_database().await;
        let err = db.create_country("   ").await.unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[tokio::test]
    async fn update_missing_country_returns_none() {
        let (db, _dir) = test_database().await;
        assert!(db.update_country(77, Some("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn city_carries_state_and_country_names() {
        let (db, _dir) = test_database().await;
        let country = db.create_country("India").await.unwrap();
        let state = db.create_state("Kerala", country.id).await.unwrap();
        assert_eq!(state.country_name, "India");

        let city = db.create_city("Kochi", state.id).await.unwrap();
        assert_eq!(city.state, state.id);
        assert_eq!(city.state_name, "Kerala");
        assert_eq!(city.country_name, "India");
    }

    #[tokio::test]
    async fn deleting_country_cascades_to_states_and_cities() {
        let (db, _dir) = test_database().await;
        let country = db.create_country("India").await.unwrap();
        let state = db.create_state("Kerala", country.id).await.unwrap();
        let city = db.create_city("Kochi", state.id).await.unwrap();

        assert!(db.delete_country(country.id).await.unwrap());
        assert!(db.get_state(state.id).await.unwrap().is_none());
        assert!(db.get_city(city.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn move_state_to_other_country() {
        let (db, _dir) = test_database().await;
        let a = db.create_country("A").await.unwrap();
        let b = db.create_country("B").await.unwrap();
        let state = db.create_state("S", a.id).await.unwrap();

        let moved = db
            .update_state(state.id, None, Some(b.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.country, b.id);
        assert_eq!(moved.country_name, "B");
        assert_eq!(moved.name, "S");
    }

    #[tokio::test]
    async fn list_is_paginated() {
        let (db, _dir) = test_database().await;
        for i in 0..12 {
            db.create_country(&format!("Country {i}")).await.unwrap();
        }
        let first = db.list_countries(&PageRequest::new(1, 5)).await.unwrap();
        assert_eq!(first.count, 12);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.results.len(), 5);
        assert_eq!(first.results[0].name, "Country 0");

        let last = db.list_countries(&PageRequest::new(3, 5)).await.unwrap();
        assert_eq!(last.results.len(), 2);

        let past_end = db.list_countries(&PageRequest::new(9, 5)).await.unwrap();
        assert!(past_end.results.is_empty());
        assert_eq!(past_end.count, 12);
    }
}
