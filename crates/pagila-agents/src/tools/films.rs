//! Film query tools
//!
//! Read operations over the film catalog, exposed to the model as callable
//! functions. Results are JSON records; lookup misses come back as messages
//! the model can relay instead of hard errors.

use crate::store::RentalStore;
use anyhow::Error;
use async_trait::async_trait;
use pagila_common::PagilaError;
use pagila_llm::AiTool;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

fn page_params(params: &Value) -> Result<(usize, usize), Error> {
    let skip = params.get("skip").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    let limit = params
        .get("limit")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_LIMIT as u64) as usize;
    if limit == 0 || limit > MAX_LIMIT {
        return Err(
            PagilaError::Tool(format!("Limit parameter must be between 1 and {}", MAX_LIMIT))
                .into(),
        );
    }
    Ok((skip, limit))
}

/// Lists films from the catalog with pagination
pub struct ListFilmsTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for ListFilmsTool {
    fn name(&self) -> &str {
        "list_films"
    }

    fn description(&self) -> &str {
        "List films with pagination"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skip": {
                    "type": "integer",
                    "description": "Number of records to skip"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of records to return (1-100)"
                }
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, Error> {
        let (skip, limit) = page_params(&params)?;
        debug!("list_films skip={} limit={}", skip, limit);
        let films = self.store.list_films(skip, limit).await?;
        let count = films.len();
        Ok(json!({
            "films": films,
            "count": count,
            "skip": skip,
            "limit": limit
        }))
    }
}

/// Fetches one film by its id
pub struct GetFilmByIdTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for GetFilmByIdTool {
    fn name(&self) -> &str {
        "get_film_by_id"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific film by ID"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "film_id": {
                    "type": "integer",
                    "description": "ID of the film to retrieve"
                }
            },
            "required": ["film_id"]
        })
    }

    fn validate_params(&self, params: &Value) -> Result<(), Error> {
        match params.get("film_id").and_then(|v| v.as_i64()) {
            Some(id) if id > 0 => Ok(()),
            Some(_) => Err(PagilaError::Tool("Film ID must be positive".to_string()).into()),
            None => {
                Err(PagilaError::Tool("Missing or invalid 'film_id' parameter".to_string()).into())
            }
        }
    }

    async fn execute(&self, params: Value) -> Result<Value, Error> {
        self.validate_params(&params)?;
        let film_id = params["film_id"].as_i64().unwrap_or_default() as i32;
        debug!("get_film_by_id film_id={}", film_id);
        match self.store.film_by_id(film_id).await? {
            Some(film) => Ok(serde_json::to_value(film)?),
            None => Ok(json!({ "message": format!("Film with ID {} not found", film_id) })),
        }
    }
}

/// Searches films by title substring
pub struct SearchFilmsByTitleTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for SearchFilmsByTitleTool {
    fn name(&self) -> &str {
        "search_films_by_title"
    }

    fn description(&self) -> &str {
        "Search for films by title or keyword and return detailed information"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title or keyword to search for"
                }
            },
            "required": ["title"]
        })
    }

    fn validate_params(&self, params: &Value) -> Result<(), Error> {
        match params.get("title").and_then(|v| v.as_str()) {
            Some(title) if !title.trim().is_empty() => Ok(()),
            _ => Err(PagilaError::Tool("Missing or empty 'title' parameter".to_string()).into()),
        }
    }

    async fn execute(&self, params: Value) -> Result<Value, Error> {
        self.validate_params(&params)?;
        let title = params["title"].as_str().unwrap_or_default();
        debug!("search_films_by_title title={}", title);
        let films = self.store.search_films_by_title(title).await?;
        if films.is_empty() {
            Ok(json!({
                "message": format!("No films matching '{}' were found", title),
                "films": []
            }))
        } else {
            let count = films.len();
            Ok(json!({ "films": films, "count": count }))
        }
    }
}

/// Lists films available for streaming
pub struct GetStreamingFilmsTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for GetStreamingFilmsTool {
    fn name(&self) -> &str {
        "get_streaming_films"
    }

    fn description(&self) -> &str {
        "Get list of films available for streaming"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skip": {
                    "type": "integer",
                    "description": "Number of records to skip"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of records to return (1-100)"
                }
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, Error> {
        let (skip, limit) = page_params(&params)?;
        debug!("get_streaming_films skip={} limit={}", skip, limit);
        let films = self.store.streaming_films(skip, limit).await?;
        let count = films.len();
        Ok(json!({ "films": films, "count": count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRentalStore;

    fn store() -> Arc<dyn RentalStore> {
        Arc::new(InMemoryRentalStore::with_sample_data())
    }

    #[tokio::test]
    async fn test_get_film_by_id() {
        let tool = GetFilmByIdTool { store: store() };
        let result = tool.execute(json!({"film_id": 2})).await.unwrap();
        assert_eq!(result["title"].as_str().unwrap(), "ALIEN CENTER");
        assert_eq!(result["rental_rate"].as_f64().unwrap(), 2.99);
    }

    #[tokio::test]
    async fn test_get_film_by_id_missing() {
        let tool = GetFilmByIdTool { store: store() };
        let result = tool.execute(json!({"film_id": 999})).await.unwrap();
        assert!(result["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_get_film_by_id_rejects_bad_params() {
        let tool = GetFilmByIdTool { store: store() };

        let err = tool.execute(json!({"film_id": 0})).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PagilaError>(),
            Some(PagilaError::Tool(_))
        ));
        assert!(tool.execute(json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_search_by_title() {
        let tool = SearchFilmsByTitleTool { store: store() };
        let result = tool.execute(json!({"title": "Alien"})).await.unwrap();
        assert_eq!(result["count"].as_u64().unwrap(), 1);

        let empty = tool.execute(json!({"title": "zzz"})).await.unwrap();
        assert!(empty["message"].as_str().unwrap().contains("No films"));
    }

    #[tokio::test]
    async fn test_list_films_limit_bounds() {
        let tool = ListFilmsTool { store: store() };

        let err = tool.execute(json!({"limit": 0})).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PagilaError>(),
            Some(PagilaError::Tool(_))
        ));
        assert!(tool.execute(json!({"limit": 101})).await.is_err());

        let result = tool.execute(json!({})).await.unwrap();
        assert_eq!(result["count"].as_u64().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_streaming_films() {
        let tool = GetStreamingFilmsTool { store: store() };
        let result = tool.execute(json!({})).await.unwrap();
        assert_eq!(result["count"].as_u64().unwrap(), 3);
    }
}
