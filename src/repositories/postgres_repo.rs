use bb8_postgres::bb8::{Pool, PooledConnection};
use bb8_postgres::tokio_postgres::{NoTls, Row};
use bb8_postgres::PostgresConnectionManager;
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::DataSourceError;
use crate::helpers::geo::BoundingBox;
use crate::helpers::ratings::average_star_rating;
use crate::models::restaurant::{parse_hours, Location, Restaurant, FIELD_UNAVAILABLE};

pub const RETRY_LIMIT: usize = 5;

/// Radius in miles used for the nearby-rating field of assembled records.
pub const NEARBY_RADIUS_MILES: f64 = 3.0;

pub const TOP_REVIEWS_LIMIT: i64 = 5;

/// Query layer over the single wide `mississauga` reviews table. Rows are
/// keyed by restaurant name but not unique (one row per review), so the
/// per-name lookups reduce with DISTINCT / MAX / COUNT. Every statement is
/// parameterized; user input never gets spliced into SQL text.
pub struct PostgresConnectionRepo {
    postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresConnectionRepo {
    pub fn new(postgres_connection: Pool<PostgresConnectionManager<NoTls>>) -> Self {
        Self {
            postgres_connection,
        }
    }

    async fn get_postgres_connection(
        &self,
    ) -> Result<PooledConnection<PostgresConnectionManager<NoTls>>, DataSourceError> {
        for _ in 0..RETRY_LIMIT {
            match self.postgres_connection.get().await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    warn!("Failed to retrieve postgres connection due to: {}, retrying in 3s", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                    continue;
                }
            }
        }

        Err(DataSourceError::PoolExhausted)
    }

    /// Distinct restaurant names containing the given fragment,
    /// case-insensitive. An empty fragment matches every restaurant.
    pub async fn search_restaurants_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<String>, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT name FROM mississauga WHERE name ILIKE $1",
                &[&name_pattern(name)],
            )
            .await?;

        collect_names(rows)
    }

    /// Distinct restaurant names rated at or above the given star count.
    pub async fn restaurants_by_minimum_stars(
        &self,
        stars: f64,
    ) -> Result<Vec<String>, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT name FROM mississauga WHERE stars >= $1",
                &[&stars],
            )
            .await?;

        collect_names(rows)
    }

    /// Both search predicates in a single round trip.
    pub async fn search_restaurants_by_name_and_minimum_stars(
        &self,
        name: &str,
        stars: f64,
    ) -> Result<Vec<String>, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT name FROM mississauga WHERE name ILIKE $1 AND stars >= $2",
                &[&name_pattern(name), &stars],
            )
            .await?;

        collect_names(rows)
    }

    pub async fn restaurant_address(&self, name: &str) -> Result<String, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT address FROM mississauga WHERE name ILIKE $1",
                &[&name],
            )
            .await?;

        match rows.first() {
            Some(row) => Ok(row.try_get(0)?),
            None => Err(DataSourceError::NoRows),
        }
    }

    /// Representative star rating for a restaurant, collapsing the duplicate
    /// per-review rows with MAX(DISTINCT).
    pub async fn star_rating(&self, name: &str) -> Result<f64, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT MAX(DISTINCT stars) FROM mississauga WHERE name ILIKE $1",
                &[&name],
            )
            .await?;

        match rows.first() {
            Some(row) => row
                .try_get::<_, Option<f64>>(0)?
                .ok_or(DataSourceError::NoRows),
            None => Err(DataSourceError::NoRows),
        }
    }

    pub async fn number_of_reviews(&self, name: &str) -> Result<i64, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT COUNT(name) FROM mississauga WHERE name ILIKE $1",
                &[&name],
            )
            .await?;

        match rows.first() {
            Some(row) => Ok(row.try_get(0)?),
            None => Err(DataSourceError::NoRows),
        }
    }

    /// Review texts for a restaurant ordered by descending usefulness score,
    /// capped at the top five.
    pub async fn top_reviews(&self, name: &str) -> Result<Vec<String>, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT text FROM mississauga WHERE name ILIKE $1 ORDER BY useful DESC LIMIT $2",
                &[&name, &TOP_REVIEWS_LIMIT],
            )
            .await?;

        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row.try_get(0)?);
        }
        Ok(reviews)
    }

    /// The stored hours column for a restaurant, still in its serialized
    /// textual form.
    pub async fn restaurant_hours_raw(&self, name: &str) -> Result<String, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT hours FROM mississauga WHERE name ILIKE $1 LIMIT 1",
                &[&name],
            )
            .await?;

        match rows.first() {
            Some(row) => row
                .try_get::<_, Option<String>>(0)?
                .ok_or(DataSourceError::NoRows),
            None => Err(DataSourceError::NoRows),
        }
    }

    pub async fn location(&self, name: &str) -> Result<Location, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT longitude, latitude FROM mississauga WHERE name ILIKE $1",
                &[&name],
            )
            .await?;

        match rows.first() {
            Some(row) => Ok(Location {
                longitude: row.try_get(0)?,
                latitude: row.try_get(1)?,
            }),
            None => Err(DataSourceError::NoRows),
        }
    }

    /// Distinct star values of every review row falling inside the bounding
    /// box around the named restaurant. Returned as raw single-element rows
    /// in the shape `average_star_rating` consumes.
    pub async fn stars_by_location(
        &self,
        name: &str,
        radius_miles: f64,
    ) -> Result<Value, DataSourceError> {
        let center = self.location(name).await?;
        self.stars_within(BoundingBox::around(center, radius_miles))
            .await
    }

    async fn stars_within(&self, bb: BoundingBox) -> Result<Value, DataSourceError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT stars FROM mississauga \
                 WHERE longitude BETWEEN $1 AND $2 AND latitude BETWEEN $3 AND $4",
                &[&bb.west, &bb.east, &bb.south, &bb.north],
            )
            .await?;

        let mut star_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let stars: f64 = row.try_get(0)?;
            star_rows.push(json!([stars]));
        }
        Ok(Value::Array(star_rows))
    }

    /// Distinct names of restaurants located inside the bounding box around
    /// the named restaurant.
    pub async fn restaurants_nearby(
        &self,
        name: &str,
        radius_miles: f64,
    ) -> Result<Vec<String>, DataSourceError> {
        let center = self.location(name).await?;
        let bb = BoundingBox::around(center, radius_miles);

        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT name FROM mississauga \
                 WHERE longitude BETWEEN $1 AND $2 AND latitude BETWEEN $3 AND $4",
                &[&bb.west, &bb.east, &bb.south, &bb.north],
            )
            .await?;

        collect_names(rows)
    }

    /// Record hydration: expands each matched name into a full display
    /// record via the per-name lookups above, sequentially. A failed lookup
    /// degrades its field to the unavailable default instead of failing the
    /// whole record.
    pub async fn generate_restaurant_records(&self, names: &[String]) -> Vec<Restaurant> {
        let mut restaurants = Vec::with_capacity(names.len());

        for name in names {
            restaurants.push(self.hydrate_restaurant(name).await);
        }

        restaurants
    }

    async fn hydrate_restaurant(&self, name: &str) -> Restaurant {
        let address = match self.restaurant_address(name).await {
            Ok(address) => address,
            Err(e) => {
                warn!("Failed to retrieve address for {} due to: {}", name, e);
                FIELD_UNAVAILABLE.to_string()
            }
        };

        let stars = match self.star_rating(name).await {
            Ok(stars) => Some(stars),
            Err(e) => {
                warn!("Failed to retrieve star rating for {} due to: {}", name, e);
                None
            }
        };

        let number_of_reviews = match self.number_of_reviews(name).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to retrieve review count for {} due to: {}", name, e);
                0
            }
        };

        let top_reviews = match self.top_reviews(name).await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!("Failed to retrieve top reviews for {} due to: {}", name, e);
                Vec::new()
            }
        };

        let hours = match self.restaurant_hours_raw(name).await {
            Ok(raw) => parse_hours(name, &raw),
            Err(e) => {
                warn!("Failed to retrieve hours for {} due to: {}", name, e);
                None
            }
        };

        let coordinates = match self.location(name).await {
            Ok(location) => location,
            Err(e) => {
                warn!("Failed to retrieve location for {} due to: {}", name, e);
                Location::default()
            }
        };

        let average_nearby_rating = match self.stars_by_location(name, NEARBY_RADIUS_MILES).await {
            Ok(star_rows) => match average_star_rating(&star_rows) {
                Ok(average) => average,
                Err(e) => {
                    warn!("Failed to average nearby ratings for {} due to: {}", name, e);
                    0.0
                }
            },
            Err(e) => {
                warn!("Failed to retrieve nearby ratings for {} due to: {}", name, e);
                0.0
            }
        };

        Restaurant {
            name: name.to_string(),
            address,
            coordinates,
            stars,
            number_of_reviews,
            top_reviews,
            hours,
            average_nearby_rating,
        }
    }
}

/// ILIKE pattern for a substring search. Empty input becomes the bare
/// wildcard so it matches every name.
fn name_pattern(name: &str) -> String {
    if name.is_empty() {
        "%".to_string()
    } else {
        format!("%{}%", name)
    }
}

fn collect_names(rows: Vec<Row>) -> Result<Vec<String>, DataSourceError> {
    let mut names = Vec::with_capacity(rows.len());
    for row in rows {
        names.push(row.try_get(0)?);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::name_pattern;

    #[test]
    fn test_empty_name_matches_everything() {
        assert_eq!(name_pattern(""), "%");
    }

    #[test]
    fn test_fragment_wrapped_in_wildcards() {
        assert_eq!(name_pattern("pizza"), "%pizza%");
        assert_eq!(name_pattern("Popular Pizza"), "%Popular Pizza%");
    }
}
