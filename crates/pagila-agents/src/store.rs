//! Rental data access for domain query tools
//!
//! The `RentalStore` trait is the data-access context supplied by the caller
//! for each request. Tools hold a shared handle to it and never touch any
//! storage backend directly, so the backing implementation can be swapped
//! without changing the agents.

use anyhow::Error;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pagila_common::{Film, Rental};

/// Read operations over the rental dataset
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// List films with skip/limit pagination
    async fn list_films(&self, skip: usize, limit: usize) -> Result<Vec<Film>, Error>;

    /// Look up a single film by id
    async fn film_by_id(&self, film_id: i32) -> Result<Option<Film>, Error>;

    /// Search films whose title contains the query (case-insensitive)
    async fn search_films_by_title(&self, query: &str) -> Result<Vec<Film>, Error>;

    /// List films available for streaming
    async fn streaming_films(&self, skip: usize, limit: usize) -> Result<Vec<Film>, Error>;

    /// Rental history for one customer
    async fn customer_rentals(&self, customer_id: i32) -> Result<Vec<Rental>, Error>;

    /// All rentals that have not been returned yet
    async fn active_rentals(&self) -> Result<Vec<Rental>, Error>;

    /// Look up a single rental by id
    async fn rental_by_id(&self, rental_id: i32) -> Result<Option<Rental>, Error>;
}

/// In-memory rental store seeded with a small Pagila-style catalog
///
/// Used by the demo binary and by tests. Reads only, so no interior
/// mutability is needed.
pub struct InMemoryRentalStore {
    films: Vec<Film>,
    rentals: Vec<Rental>,
}

impl InMemoryRentalStore {
    /// Create an empty store
    pub fn new(films: Vec<Film>, rentals: Vec<Rental>) -> Self {
        Self { films, rentals }
    }

    /// Create a store seeded with sample films and rentals
    pub fn with_sample_data() -> Self {
        let ts = Utc.with_ymd_and_hms(2023, 12, 1, 10, 30, 0).unwrap();
        let films = vec![
            Film {
                film_id: 1,
                title: "ACADEMY DINOSAUR".to_string(),
                description: Some(
                    "An Epic Drama of a Feminist And a Mad Scientist who must Battle a Teacher in The Canadian Rockies"
                        .to_string(),
                ),
                release_year: Some(2006),
                rental_duration: 6,
                rental_rate: 0.99,
                length: Some(86),
                rating: Some("PG".to_string()),
                streaming_available: true,
                last_update: ts,
            },
            Film {
                film_id: 2,
                title: "ALIEN CENTER".to_string(),
                description: Some(
                    "A Brilliant Drama of a Cat And a Mad Scientist who must Battle a Feminist in A MySQL Convention"
                        .to_string(),
                ),
                release_year: Some(2006),
                rental_duration: 5,
                rental_rate: 2.99,
                length: Some(46),
                rating: Some("NC-17".to_string()),
                streaming_available: false,
                last_update: ts,
            },
            Film {
                film_id: 3,
                title: "AIRPLANE SIERRA".to_string(),
                description: Some(
                    "A Touching Saga of a Hunter And a Butler who must Discover a Butler in A Jet Boat"
                        .to_string(),
                ),
                release_year: Some(2006),
                rental_duration: 6,
                rental_rate: 4.99,
                length: Some(62),
                rating: Some("PG-13".to_string()),
                streaming_available: true,
                last_update: ts,
            },
            Film {
                film_id: 4,
                title: "BEACH HEARTBREAKERS".to_string(),
                description: Some(
                    "A Fateful Display of a Womanizer And a Mad Scientist who must Outgun a A Shark in Soviet Georgia"
                        .to_string(),
                ),
                release_year: Some(2006),
                rental_duration: 6,
                rental_rate: 2.99,
                length: Some(122),
                rating: Some("G".to_string()),
                streaming_available: false,
                last_update: ts,
            },
            Film {
                film_id: 5,
                title: "BULWORTH COMMANDMENTS".to_string(),
                description: Some(
                    "A Amazing Display of a Mad Cow And a Pioneer who must Redeem a Sumo Wrestler in The Outback"
                        .to_string(),
                ),
                release_year: Some(2006),
                rental_duration: 4,
                rental_rate: 0.99,
                length: Some(61),
                rating: Some("R".to_string()),
                streaming_available: true,
                last_update: ts,
            },
        ];

        let rentals = vec![
            Rental {
                rental_id: 1,
                rental_date: Utc.with_ymd_and_hms(2024, 1, 5, 18, 0, 0).unwrap(),
                inventory_id: 100,
                customer_id: 1,
                return_date: Some(Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap()),
                staff_id: 1,
            },
            Rental {
                rental_id: 2,
                rental_date: Utc.with_ymd_and_hms(2024, 1, 10, 15, 30, 0).unwrap(),
                inventory_id: 101,
                customer_id: 1,
                return_date: None,
                staff_id: 2,
            },
            Rental {
                rental_id: 3,
                rental_date: Utc.with_ymd_and_hms(2024, 1, 11, 9, 45, 0).unwrap(),
                inventory_id: 102,
                customer_id: 2,
                return_date: None,
                staff_id: 1,
            },
        ];

        Self::new(films, rentals)
    }
}

#[async_trait]
impl RentalStore for InMemoryRentalStore {
    async fn list_films(&self, skip: usize, limit: usize) -> Result<Vec<Film>, Error> {
        Ok(self.films.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn film_by_id(&self, film_id: i32) -> Result<Option<Film>, Error> {
        Ok(self.films.iter().find(|f| f.film_id == film_id).cloned())
    }

    async fn search_films_by_title(&self, query: &str) -> Result<Vec<Film>, Error> {
        let needle = query.to_lowercase();
        Ok(self
            .films
            .iter()
            .filter(|f| f.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn streaming_films(&self, skip: usize, limit: usize) -> Result<Vec<Film>, Error> {
        Ok(self
            .films
            .iter()
            .filter(|f| f.streaming_available)
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn customer_rentals(&self, customer_id: i32) -> Result<Vec<Rental>, Error> {
        Ok(self
            .rentals
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn active_rentals(&self) -> Result<Vec<Rental>, Error> {
        Ok(self
            .rentals
            .iter()
            .filter(|r| r.is_active())
            .cloned()
            .collect())
    }

    async fn rental_by_id(&self, rental_id: i32) -> Result<Option<Rental>, Error> {
        Ok(self
            .rentals
            .iter()
            .find(|r| r.rental_id == rental_id)
            .cloned())
    }
}
