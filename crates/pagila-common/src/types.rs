//! Domain record types for the Pagila rental dataset
//!
//! These are the read-model records returned by the rental store and fed to
//! the model as domain query function results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A film record from the rental catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Film {
    /// Unique identifier for the film
    pub film_id: i32,
    /// Film title
    pub title: String,
    /// Film description/plot summary
    pub description: Option<String>,
    /// Year the film was released
    pub release_year: Option<i32>,
    /// Default rental duration in days
    pub rental_duration: i32,
    /// Rental cost per rental period
    pub rental_rate: f64,
    /// Film duration in minutes
    pub length: Option<i32>,
    /// MPAA film rating (G, PG, PG-13, R, NC-17)
    pub rating: Option<String>,
    /// Whether the film can be streamed
    pub streaming_available: bool,
    /// Timestamp of last update
    pub last_update: DateTime<Utc>,
}

/// A rental record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rental {
    /// Unique identifier for the rental
    pub rental_id: i32,
    /// Timestamp when the rental was created
    pub rental_date: DateTime<Utc>,
    /// ID of the rented inventory item
    pub inventory_id: i32,
    /// ID of the customer who made the rental
    pub customer_id: i32,
    /// Timestamp when the rental was returned (None if still active)
    pub return_date: Option<DateTime<Utc>>,
    /// ID of the staff member who handled the rental
    pub staff_id: i32,
}

impl Rental {
    /// A rental is active until it has been returned
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Structured film summary produced by the summary service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmSummary {
    pub title: String,
    pub rating: String,
    pub recommended: bool,
}
