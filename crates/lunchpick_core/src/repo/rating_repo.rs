//! Rating repository contract and SQLite implementation.
//!
//! # Invariants
//! - Ratings are insert-only through this repository.
//! - Listing order is `created_at ASC, id ASC`.

use crate::model::rating::{Rating, RatingId};
use crate::model::restaurant::RestaurantId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for rating persistence.
pub trait RatingRepository {
    /// Inserts one rating. Fails with `RestaurantNotFound` when the owning
    /// restaurant does not exist.
    fn create_rating(&self, rating: &Rating) -> RepoResult<RatingId>;
    /// Lists all ratings for one restaurant, across every cycle.
    fn list_ratings(&self, restaurant_id: RestaurantId) -> RepoResult<Vec<Rating>>;
    /// Counts ratings by `user_email` with `created_at > since`.
    fn count_ratings_since(
        &self,
        restaurant_id: RestaurantId,
        user_email: &str,
        since: i64,
    ) -> RepoResult<u64>;
}

/// SQLite-backed rating repository.
pub struct SqliteRatingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRatingRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["restaurants", "ratings"])?;
        Ok(Self { conn })
    }
}

impl RatingRepository for SqliteRatingRepository<'_> {
    fn create_rating(&self, rating: &Rating) -> RepoResult<RatingId> {
        let owner_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = ?1);",
            [rating.restaurant_id.to_string()],
            |row| row.get(0),
        )?;
        if owner_exists == 0 {
            return Err(RepoError::RestaurantNotFound(rating.restaurant_id));
        }

        self.conn.execute(
            "INSERT INTO ratings (
                id,
                restaurant_id,
                user_email,
                rating,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                rating.id.to_string(),
                rating.restaurant_id.to_string(),
                rating.user_email.as_str(),
                rating.score,
                rating.created_at,
            ],
        )?;
        Ok(rating.id)
    }

    fn list_ratings(&self, restaurant_id: RestaurantId) -> RepoResult<Vec<Rating>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, restaurant_id, user_email, rating, created_at
             FROM ratings
             WHERE restaurant_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([restaurant_id.to_string()])?;
        let mut ratings = Vec::new();
        while let Some(row) = rows.next()? {
            ratings.push(parse_rating_row(row)?);
        }
        Ok(ratings)
    }

    fn count_ratings_since(
        &self,
        restaurant_id: RestaurantId,
        user_email: &str,
        since: i64,
    ) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM ratings
             WHERE restaurant_id = ?1
               AND user_email = ?2
               AND created_at > ?3;",
            params![restaurant_id.to_string(), user_email, since],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn parse_rating_row(row: &Row<'_>) -> RepoResult<Rating> {
    let id_text: String = row.get("id")?;
    let restaurant_text: String = row.get("restaurant_id")?;
    Ok(Rating {
        id: parse_uuid(&id_text, "ratings.id")?,
        restaurant_id: parse_uuid(&restaurant_text, "ratings.restaurant_id")?,
        user_email: row.get("user_email")?,
        score: row.get("rating")?,
        created_at: row.get("created_at")?,
    })
}
