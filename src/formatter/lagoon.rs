//! Lagoon facts output formatter.
//!
//! Emits one fact per breach as a compact JSON array, ready to be pushed to
//! the Lagoon API by an external step.

use serde::Serialize;

use crate::result::ResultList;

/// Source recorded on every fact.
pub const FACT_SOURCE: &str = "Shipshape";

/// A single Lagoon fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
    pub source: String,
    pub description: String,
    pub category: String,
}

/// Facts for every breach, in result order.
pub fn facts(results: &ResultList) -> Vec<Fact> {
    let mut facts = Vec::new();
    for result in &results.results {
        for breach in &result.breaches {
            let name = if breach.key().is_empty() {
                result.name.clone()
            } else {
                format!("{}|{}", result.name, breach.key())
            };
            facts.push(Fact {
                name,
                value: breach.to_string(),
                source: FACT_SOURCE.to_string(),
                description: String::new(),
                category: result.check_type.to_string(),
            });
        }
    }
    facts
}

/// Format results as a JSON array of facts.
pub fn format(results: &ResultList) -> String {
    serde_json::to_string(&facts(results)).unwrap_or_else(|_| "[]".to_string())
}
