//! Agent definitions for the Pagila assistant
//!
//! Two personas exist: the front-desk "SearchAgent" bound to the rental
//! query tools, and the general-knowledge "LLMAgent" with no tools. Fresh
//! definitions are built for every question so tools are re-bound to the
//! request's data-access context.

use crate::store::RentalStore;
use crate::tools::{
    GetActiveRentalsTool, GetCustomerRentalsTool, GetFilmByIdTool, GetRentalByIdTool,
    GetStreamingFilmsTool, ListFilmsTool, SearchFilmsByTitleTool,
};
use pagila_llm::AiTool;
use std::sync::Arc;

/// Name of the domain-bound front-desk agent
pub const FRONT_DESK_AGENT: &str = "SearchAgent";

/// Name of the general-knowledge agent
pub const GENERAL_AGENT: &str = "LLMAgent";

/// Agent name reported when orchestration fails and the fixed apology is returned
pub const SYSTEM_FALLBACK_AGENT: &str = "SystemFallback";

/// One configured persona: identity, instructions and bound tools
pub struct AgentDefinition {
    /// Unique, stable name used for transcript attribution
    pub name: String,
    /// Capability summary used for routing decisions
    pub description: String,
    /// Persona and task policy text sent as the system prompt
    pub instructions: String,
    /// Domain query functions this agent may invoke
    pub tools: Vec<Box<dyn AiTool>>,
}

impl AgentDefinition {
    /// Find a bound tool by name
    pub fn tool(&self, name: &str) -> Option<&dyn AiTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|b| b.as_ref())
    }
}

/// Factory for the two Pagila assistant personas
pub struct AgentBuilder;

impl AgentBuilder {
    /// Create the front-desk agent with the rental query tools bound to the
    /// given store. `transfer_tool` is the name of the handoff function the
    /// agent should call for out-of-domain questions.
    pub fn front_desk(store: Arc<dyn RentalStore>, transfer_tool: &str) -> AgentDefinition {
        let tools: Vec<Box<dyn AiTool>> = vec![
            Box::new(ListFilmsTool {
                store: store.clone(),
            }),
            Box::new(GetFilmByIdTool {
                store: store.clone(),
            }),
            Box::new(SearchFilmsByTitleTool {
                store: store.clone(),
            }),
            Box::new(GetStreamingFilmsTool {
                store: store.clone(),
            }),
            Box::new(GetCustomerRentalsTool {
                store: store.clone(),
            }),
            Box::new(GetActiveRentalsTool {
                store: store.clone(),
            }),
            Box::new(GetRentalByIdTool { store }),
        ];

        let instructions = format!(
            "You are a helpful and knowledgeable assistant for a film rental store, equipped with access to film and rental databases.\
            \nYour primary goal is to assist customers with any questions related to DVDs, movies, film rentals, and streaming availability.\
            \n\nYour capabilities include:\
            \n- Retrieving all films using `list_films`\
            \n- Retrieving a specific film by ID using `get_film_by_id`\
            \n- Searching for films by title or keyword using `search_films_by_title`\
            \n- Identifying films available for streaming using `get_streaming_films`\
            \n- Looking up customer rental history using `get_customer_rentals`\
            \n- Retrieving all active rentals using `get_active_rentals`\
            \n- Retrieving a specific rental by ID using `get_rental_by_id`\
            \n\nWhen users ask about anything related to films, movies, DVDs, or rentals:\
            \n1. Determine the user's intent and select the most appropriate function to call.\
            \n2. Always use the relevant function(s) to retrieve factual data. Do not hallucinate or make up values.\
            \n3. Respond with clear, friendly, and helpful messages, as if you are a store clerk assisting a curious customer.\
            \n4. Include useful details such as rental rates, streaming availability, and suggestions for similar films if no exact match is found.\
            \n\nIf the user's question is not related to film rentals or movie information, call `{transfer_tool}` instead of answering.\
            \n\nTone: friendly, professional, accurate, concise.\
            \nFocus: your only job is to return film rental information. Leave all other topics to {general}.\
            \nAlways ground your answers in real data from the available database functions.",
            transfer_tool = transfer_tool,
            general = GENERAL_AGENT,
        );

        AgentDefinition {
            name: FRONT_DESK_AGENT.to_string(),
            description:
                "A specialized agent for film rental store queries about films, rentals, and customer information."
                    .to_string(),
            instructions,
            tools,
        }
    }

    /// Create the general-knowledge agent. No tools are bound and the agent
    /// never hands off further.
    pub fn general() -> AgentDefinition {
        AgentDefinition {
            name: GENERAL_AGENT.to_string(),
            description:
                "A general-purpose assistant that can answer a wide variety of questions on different topics."
                    .to_string(),
            instructions:
                "You are a helpful AI assistant.\
                \nYour role is to provide clear, accurate, and engaging answers to user questions across any topic, including general knowledge, explanations, problem-solving, technology, math, and creative tasks.\
                \n\nGuidelines:\
                \n- Always give helpful, factual, and easy-to-understand responses.\
                \n- If you don't know something, say so and offer possible next steps.\
                \n- Use examples when they make explanations clearer.\
                \n- Be professional, friendly, and concise.\
                \n- Politely refuse to provide harmful, unsafe, or disallowed content.\
                \n\nYour goal is to help the user get the best possible answer to their question."
                    .to_string(),
            tools: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRentalStore;

    #[test]
    fn test_front_desk_binds_all_query_tools() {
        let store = Arc::new(InMemoryRentalStore::with_sample_data());
        let agent = AgentBuilder::front_desk(store, "transfer_to_llmagent");

        assert_eq!(agent.name, FRONT_DESK_AGENT);
        assert_eq!(agent.tools.len(), 7);
        for name in [
            "list_films",
            "get_film_by_id",
            "search_films_by_title",
            "get_streaming_films",
            "get_customer_rentals",
            "get_active_rentals",
            "get_rental_by_id",
        ] {
            assert!(agent.tool(name).is_some(), "missing tool {}", name);
        }
        assert!(agent.instructions.contains("transfer_to_llmagent"));
    }

    #[test]
    fn test_general_agent_has_no_tools() {
        let agent = AgentBuilder::general();
        assert_eq!(agent.name, GENERAL_AGENT);
        assert!(agent.tools.is_empty());
    }
}
