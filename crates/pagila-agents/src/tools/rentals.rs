//! Rental query tools
//!
//! Read operations over rental records, exposed to the model as callable
//! functions.

use crate::store::RentalStore;
use anyhow::Error;
use async_trait::async_trait;
use pagila_common::PagilaError;
use pagila_llm::AiTool;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Rental history lookup for one customer
pub struct GetCustomerRentalsTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for GetCustomerRentalsTool {
    fn name(&self) -> &str {
        "get_customer_rentals"
    }

    fn description(&self) -> &str {
        "Look up a customer's rental history by customer ID"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": {
                    "type": "integer",
                    "description": "ID of the customer"
                }
            },
            "required": ["customer_id"]
        })
    }

    fn validate_params(&self, params: &Value) -> Result<(), Error> {
        match params.get("customer_id").and_then(|v| v.as_i64()) {
            Some(id) if id > 0 => Ok(()),
            Some(_) => Err(PagilaError::Tool("Customer ID must be positive".to_string()).into()),
            None => Err(
                PagilaError::Tool("Missing or invalid 'customer_id' parameter".to_string()).into(),
            ),
        }
    }

    async fn execute(&self, params: Value) -> Result<Value, Error> {
        self.validate_params(&params)?;
        let customer_id = params["customer_id"].as_i64().unwrap_or_default() as i32;
        debug!("get_customer_rentals customer_id={}", customer_id);
        let rentals = self.store.customer_rentals(customer_id).await?;
        if rentals.is_empty() {
            Ok(json!({
                "message": format!("No rentals found for customer {}", customer_id),
                "rentals": []
            }))
        } else {
            let count = rentals.len();
            Ok(json!({ "rentals": rentals, "count": count }))
        }
    }
}

/// Lists all rentals that have not been returned
pub struct GetActiveRentalsTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for GetActiveRentalsTool {
    fn name(&self) -> &str {
        "get_active_rentals"
    }

    fn description(&self) -> &str {
        "Get all rentals that are currently active (not yet returned)"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value) -> Result<Value, Error> {
        debug!("get_active_rentals");
        let rentals = self.store.active_rentals().await?;
        let count = rentals.len();
        Ok(json!({ "rentals": rentals, "count": count }))
    }
}

/// Fetches one rental by its id
pub struct GetRentalByIdTool {
    pub store: Arc<dyn RentalStore>,
}

#[async_trait]
impl AiTool for GetRentalByIdTool {
    fn name(&self) -> &str {
        "get_rental_by_id"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific rental by ID"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "rental_id": {
                    "type": "integer",
                    "description": "ID of the rental to retrieve"
                }
            },
            "required": ["rental_id"]
        })
    }

    fn validate_params(&self, params: &Value) -> Result<(), Error> {
        match params.get("rental_id").and_then(|v| v.as_i64()) {
            Some(id) if id > 0 => Ok(()),
            Some(_) => Err(PagilaError::Tool("Rental ID must be positive".to_string()).into()),
            None => {
                Err(PagilaError::Tool("Missing or invalid 'rental_id' parameter".to_string())
                    .into())
            }
        }
    }

    async fn execute(&self, params: Value) -> Result<Value, Error> {
        self.validate_params(&params)?;
        let rental_id = params["rental_id"].as_i64().unwrap_or_default() as i32;
        debug!("get_rental_by_id rental_id={}", rental_id);
        match self.store.rental_by_id(rental_id).await? {
            Some(rental) => Ok(serde_json::to_value(rental)?),
            None => Ok(json!({ "message": format!("Rental with ID {} not found", rental_id) })),
        }
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
    async fn test_customer_rentals() {
        let tool = GetCustomerRentalsTool { store: store() };
        let result = tool.execute(json!({"customer_id": 1})).await.unwrap();
        assert_eq!(result["count"].as_u64().unwrap(), 2);

        let none = tool.execute(json!({"customer_id": 42})).await.unwrap();
        assert!(none["message"].as_str().unwrap().contains("No rentals"));
    }

    #[tokio::test]
    async fn test_active_rentals() {
        let tool = GetActiveRentalsTool { store: store() };
        let result = tool.execute(json!({})).await.unwrap();
        assert_eq!(result["count"].as_u64().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rental_by_id() {
        let tool = GetRentalByIdTool { store: store() };
        let result = tool.execute(json!({"rental_id": 1})).await.unwrap();
        assert_eq!(result["rental_id"].as_i64().unwrap(), 1);

        let err = tool.execute(json!({"rental_id": -1})).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PagilaError>(),
            Some(PagilaError::Tool(_))
        ));
    }
}
