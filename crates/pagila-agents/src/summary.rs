//! Structured film summaries
//!
//! Asks the model for a strict-JSON summary of one film and validates the
//! reply. The model is advisory here; when its output cannot be parsed or is
//! missing fields, the summary is rebuilt from the catalog record and the
//! store's recommendation rule.

use crate::store::RentalStore;
use anyhow::Error;
use genai::chat::{ContentPart, MessageContent};
use pagila_common::{Film, FilmSummary, PagilaError};
use pagila_llm::{AiService, ChatMessage};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

/// Matches the outermost JSON object when the model wraps it in prose
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid literal pattern"));

const SUMMARY_SYSTEM_PROMPT: &str = "You are an API that returns film summaries in strict JSON format. \
You must return a valid JSON object matching this exact schema:\n\
{\n\
    \"title\": \"string (required) - The film's title\",\n\
    \"rating\": \"string (required) - Film rating: G, PG, PG-13, R, or NC-17\",\n\
    \"recommended\": \"boolean (required) - true if rating is R/NC-17 AND rental_rate < 3.00\"\n\
}\n\n\
Rules:\n\
- title: Extract or use the film's title\n\
- rating: Use the film's actual rating (G, PG, PG-13, R, NC-17)\n\
- recommended: Set to true if rating is mature (R or NC-17) AND rental_rate < 3.00, false otherwise\n\
- Return ONLY valid JSON with no additional text or explanations";

/// Maximum rental rate for a mature film to still be recommended
const RECOMMENDED_RATE_CEILING: f64 = 3.00;

/// Generates structured summaries for catalog films
pub struct SummaryService {
    provider: Arc<dyn AiService>,
    store: Arc<dyn RentalStore>,
}

impl SummaryService {
    pub fn new(provider: Arc<dyn AiService>, store: Arc<dyn RentalStore>) -> Self {
        Self { provider, store }
    }

    /// Summarize one film. Unknown or non-positive ids are errors; a
    /// malformed model reply is not, it degrades to catalog data.
    pub async fn summarize_film(&self, film_id: i32) -> Result<FilmSummary, Error> {
        if film_id <= 0 {
            return Err(PagilaError::Tool("Film ID must be positive".to_string()).into());
        }

        let film = self
            .store
            .film_by_id(film_id)
            .await?
            .ok_or_else(|| PagilaError::Store(format!("Film with ID {} not found", film_id)))?;

        info!(film_id, title = %film.title, "summarizing film");

        let messages = vec![
            ChatMessage::System {
                content: SUMMARY_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage::User {
                content: summary_prompt(&film),
            },
        ];

        let content = self.provider.generate_response(&messages, &[]).await?;
        let text = match content {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        };

        let summary = parse_summary(&text, &film);
        debug!(film_id, recommended = summary.recommended, "summary ready");
        Ok(summary)
    }
}

fn summary_prompt(film: &Film) -> String {
    format!(
        "Analyze the following film and provide a summary in JSON format:\n\n\
        Title: {}\n\
        Description: {}\n\
        Rating: {}\n\
        Rental Rate: ${:.2}\n\
        Length: {} minutes\n\
        Release Year: {}\n\n\
        Return JSON with keys:\n\
        - title: Film title\n\
        - rating: Film rating (G, PG, PG-13, R, NC-17)\n\
        - recommended: true if rating is more mature than PG-13 AND rental_rate < 3.00, false otherwise",
        film.title,
        film.description.as_deref().unwrap_or("No description available"),
        film.rating.as_deref().unwrap_or("Not Rated"),
        film.rental_rate,
        film.length.unwrap_or(0),
        film.release_year.unwrap_or(0),
    )
}

/// Mature and cheap is the store's recommendation rule
fn recommendation(film: &Film) -> bool {
    matches!(film.rating.as_deref(), Some("R") | Some("NC-17"))
        && film.rental_rate < RECOMMENDED_RATE_CEILING
}

/// Parse the model reply, extracting an embedded JSON object when the reply
/// carries surrounding prose, and fill any missing field from the catalog
/// record.
fn parse_summary(text: &str, film: &Film) -> FilmSummary {
    let trimmed = text.trim();

    let value: Option<Value> = serde_json::from_str(trimmed).ok().or_else(|| {
        JSON_BLOCK
            .find(trimmed)
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
    });

    match value {
        Some(value) => FilmSummary {
            title: value
                .get("title")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| film.title.clone()),
            rating: value
                .get("rating")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| film.rating.clone().unwrap_or_else(|| "Not Rated".to_string())),
            recommended: value
                .get("recommended")
                .and_then(|v| v.as_bool())
                .unwrap_or_else(|| recommendation(film)),
        },
        None => {
            warn!(film_id = film.film_id, "model reply was not JSON, using catalog data");
            FilmSummary {
                title: film.title.clone(),
                rating: film.rating.clone().unwrap_or_else(|| "Not Rated".to_string()),
                recommended: recommendation(film),
            }
        }
    }
}
