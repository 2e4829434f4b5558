use salesdesk_core::{CustomerId, CustomerProfile, Purchase, SalesDataStore, SalesEngine};

use crate::commands::{block_on, erp_engine, to_data, CommandResult};

const COMMAND: &str = "recommend";

/// Builds an ad-hoc profile from command-line flags.
pub fn profile(industry: Option<String>, categories: Vec<String>) -> CustomerProfile {
    CustomerProfile {
        id: CustomerId("cli".to_string()),
        name: "command line".to_string(),
        contact_info: String::new(),
        industry,
        purchase_history: categories
            .into_iter()
            .map(|category| Purchase { category: Some(category) })
            .collect(),
    }
}

pub fn run(industry: Option<String>, categories: Vec<String>) -> CommandResult {
    match erp_engine(COMMAND) {
        Ok(engine) => execute(&engine, &profile(industry, categories)),
        Err(failure) => failure,
    }
}

pub fn execute<S>(engine: &SalesEngine<S>, profile: &CustomerProfile) -> CommandResult
where
    S: SalesDataStore + Clone,
{
    let recommendations = match block_on(COMMAND, engine.compose_recommendations(profile)) {
        Ok(recommendations) => recommendations,
        Err(failure) => return failure,
    };

    match to_data(COMMAND, &recommendations) {
        Ok(data) => CommandResult::success_with_data(
            COMMAND,
            format!("{} recommendation(s)", recommendations.len()),
            Some(data),
        ),
        Err(failure) => failure,
    }
}
