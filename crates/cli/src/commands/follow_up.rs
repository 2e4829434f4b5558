use salesdesk_core::{CustomerId, SalesDataStore, SalesEngine};

use crate::commands::{block_on, erp_engine, to_data, CommandResult, EXIT_NOT_FOUND};

const COMMAND: &str = "follow-up";

pub fn run(customer_id: &str) -> CommandResult {
    if customer_id.trim().is_empty() {
        return CommandResult::failure(
            COMMAND,
            "invalid_input",
            "customer id must not be empty",
            EXIT_NOT_FOUND,
        );
    }
    match erp_engine(COMMAND) {
        Ok(engine) => execute(&engine, customer_id),
        Err(failure) => failure,
    }
}

pub fn execute<S>(engine: &SalesEngine<S>, customer_id: &str) -> CommandResult
where
    S: SalesDataStore + Clone,
{
    let customer_id = CustomerId(customer_id.trim().to_string());
    let outcome = match block_on(COMMAND, engine.plan_follow_up(&customer_id)) {
        Ok(outcome) => outcome,
        Err(failure) => return failure,
    };

    let plan = match outcome {
        Ok(plan) => plan,
        Err(error) => return CommandResult::engine_failure(COMMAND, &error),
    };

    match to_data(COMMAND, &plan) {
        Ok(data) => CommandResult::success_with_data(
            COMMAND,
            format!("{}: {}", plan.recommended_method, plan.timing_guidance),
            Some(data),
        ),
        Err(failure) => failure,
    }
}
