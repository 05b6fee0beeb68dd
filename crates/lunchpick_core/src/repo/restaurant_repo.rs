//! Restaurant repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `restaurants` table.
//! - Record selections with a compare-and-swap on `last_selected_at`.
//! - Delete a restaurant together with its ratings in one transaction.
//!
//! # Invariants
//! - Write paths call `Restaurant::validate()` before SQL mutations.
//! - Listing order is `name COLLATE NOCASE ASC, id ASC`.

use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const RESTAURANT_SELECT_SQL: &str = "SELECT
    id,
    name,
    created_at,
    last_selected_at,
    is_active,
    note
FROM restaurants";

/// Repository interface for restaurant persistence.
pub trait RestaurantRepository {
    /// Inserts one restaurant and returns its stable id.
    fn create_restaurant(&self, restaurant: &Restaurant) -> RepoResult<RestaurantId>;
    /// Loads one restaurant by id.
    fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>>;
    /// Lists every restaurant, active or not, ordered by name.
    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>>;
    /// Replaces the note. `None` clears it.
    fn update_note(&self, id: RestaurantId, note: Option<&str>) -> RepoResult<()>;
    /// Sets the active flag.
    fn set_active(&self, id: RestaurantId, is_active: bool) -> RepoResult<()>;
    /// Sets `last_selected_at = selected_at` only if the stored value still
    /// equals `expected`.
    ///
    /// Returns `Ok(false)` when another writer changed the row first.
    fn mark_selected(
        &self,
        id: RestaurantId,
        expected: Option<i64>,
        selected_at: i64,
    ) -> RepoResult<bool>;
    /// Clears `last_selected_at` unconditionally.
    fn clear_last_selected(&self, id: RestaurantId) -> RepoResult<()>;
    /// Counts ratings owned by the restaurant.
    fn rating_count(&self, id: RestaurantId) -> RepoResult<u64>;
    /// Deletes ratings first, then the restaurant, atomically.
    ///
    /// Returns the number of ratings removed.
    fn delete_restaurant(&self, id: RestaurantId) -> RepoResult<u64>;
}

/// SQLite-backed restaurant repository.
pub struct SqliteRestaurantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRestaurantRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["restaurants", "ratings"])?;
        Ok(Self { conn })
    }
}

impl RestaurantRepository for SqliteRestaurantRepository<'_> {
    fn create_restaurant(&self, restaurant: &Restaurant) -> RepoResult<RestaurantId> {
        restaurant.validate()?;

        self.conn.execute(
            "INSERT INTO restaurants (
                id,
                name,
                created_at,
                last_selected_at,
                is_active,
                note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                restaurant.id.to_string(),
                restaurant.name.as_str(),
                restaurant.created_at,
                restaurant.last_selected_at,
                restaurant.is_active,
                restaurant.note.as_deref(),
            ],
        )?;

        Ok(restaurant.id)
    }

    fn get_restaurant(&self, id: RestaurantId) -> RepoResult<Option<Restaurant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESTAURANT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_restaurant_row(row)?));
        }
        Ok(None)
    }

    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESTAURANT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut restaurants = Vec::new();
        while let Some(row) = rows.next()? {
            restaurants.push(parse_restaurant_row(row)?);
        }
        Ok(restaurants)
    }

    fn update_note(&self, id: RestaurantId, note: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE restaurants SET note = ?2 WHERE id = ?1;",
            params![id.to_string(), note],
        )?;
        ensure_changed(changed, id)
    }

    fn set_active(&self, id: RestaurantId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE restaurants SET is_active = ?2 WHERE id = ?1;",
            params![id.to_string(), is_active],
        )?;
        ensure_changed(changed, id)
    }

    fn mark_selected(
        &self,
        id: RestaurantId,
        expected: Option<i64>,
        selected_at: i64,
    ) -> RepoResult<bool> {
        // `IS` compares NULL to NULL as equal, which plain `=` does not.
        let changed = self.conn.execute(
            "UPDATE restaurants
             SET last_selected_at = ?3
             WHERE id = ?1
               AND last_selected_at IS ?2;",
            params![id.to_string(), expected, selected_at],
        )?;
        if changed == 1 {
            return Ok(true);
        }
        if restaurant_exists(self.conn, id)? {
            Ok(false)
        } else {
            Err(RepoError::RestaurantNotFound(id))
        }
    }

    fn clear_last_selected(&self, id: RestaurantId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE restaurants SET last_selected_at = NULL WHERE id = ?1;",
            [id.to_string()],
        )?;
        ensure_changed(changed, id)
    }

    fn rating_count(&self, id: RestaurantId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ratings WHERE restaurant_id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn delete_restaurant(&self, id: RestaurantId) -> RepoResult<u64> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM restaurants WHERE id = ?1;",
                [id_text.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(RepoError::RestaurantNotFound(id));
        }

        let removed_ratings = tx.execute(
            "DELETE FROM ratings WHERE restaurant_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM restaurants WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;

        Ok(removed_ratings as u64)
    }
}

fn ensure_changed(changed: usize, id: RestaurantId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::RestaurantNotFound(id));
    }
    Ok(())
}

fn restaurant_exists(conn: &Connection, id: RestaurantId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_restaurant_row(row: &Row<'_>) -> RepoResult<Restaurant> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "restaurants.id")?;

    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in restaurants.is_active"
            )));
        }
    };

    let restaurant = Restaurant {
        id,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        last_selected_at: row.get("last_selected_at")?,
        is_active,
        note: row.get("note")?,
    };
    restaurant
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("{err} (restaurant {id})")))?;
    Ok(restaurant)
}
