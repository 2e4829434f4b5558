use salesdesk_core::{SalesDataStore, SalesEngine};

use crate::commands::{block_on, erp_engine, to_data, CommandResult};

const COMMAND: &str = "match";

pub fn run(query: &str) -> CommandResult {
    match erp_engine(COMMAND) {
        Ok(engine) => execute(&engine, query),
        Err(failure) => failure,
    }
}

pub fn execute<S>(engine: &SalesEngine<S>, query: &str) -> CommandResult
where
    S: SalesDataStore + Clone,
{
    let outcome = match block_on(COMMAND, engine.match_catalog_item(query)) {
        Ok(outcome) => outcome,
        Err(failure) => return failure,
    };

    match outcome {
        Ok(item) => match to_data(COMMAND, &item) {
            Ok(data) => CommandResult::success_with_data(
                COMMAND,
                format!("matched catalog item {}", item.model_no),
                Some(data),
            ),
            Err(failure) => failure,
        },
        Err(error) => CommandResult::engine_failure(COMMAND, &error),
    }
}
