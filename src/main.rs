use anyhow::Context;
use bb8_postgres::bb8::Pool;
use bb8_postgres::tokio_postgres::NoTls;
use bb8_postgres::PostgresConnectionManager;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;

use crate::config::Config;
use crate::repositories::postgres_repo::{PostgresConnectionRepo, NEARBY_RADIUS_MILES};

pub mod config;
pub mod errors;
pub mod helpers;
pub mod models;
pub mod repositories;

/// Matched names are truncated to one results page before hydration.
pub const RESULTS_PAGE_SIZE: usize = 15;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let manager = PostgresConnectionManager::new_from_stringlike(
        config.postgres_connection_string(),
        NoTls,
    )
    .context("Invalid postgres connection configuration")?;
    let pool = Pool::builder()
        .max_size(config.max_pool_size)
        .build(manager)
        .await
        .context("Failed to connect to postgres at startup")?;

    let postgres_repo = PostgresConnectionRepo::new(pool);

    let names = postgres_repo
        .search_restaurants_by_name_and_minimum_stars(&config.query, config.minimum_stars)
        .await
        .context("Restaurant search failed")?;
    info!(
        "Matched {} restaurants for query '{}' with at least {} stars",
        names.len(),
        config.query,
        config.minimum_stars
    );

    let page = &names[..names.len().min(RESULTS_PAGE_SIZE)];
    let restaurants = postgres_repo.generate_restaurant_records(page).await;

    for restaurant in &restaurants {
        info!(
            "{} | {} | {} stars | {} reviews | avg nearby {} | today: {}",
            restaurant.name,
            restaurant.address,
            restaurant.stars_display(),
            restaurant.number_of_reviews,
            restaurant.average_nearby_rating,
            restaurant.hours_today(),
        );
    }

    if let Some(first) = page.first() {
        let nearby = postgres_repo
            .restaurants_nearby(first, NEARBY_RADIUS_MILES)
            .await
            .context("Nearby search failed")?;
        info!("{} restaurants within {} miles of {}", nearby.len(), NEARBY_RADIUS_MILES, first);
    }

    Ok(())
}
