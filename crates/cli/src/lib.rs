pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "salesdesk",
    about = "Salesdesk operator CLI",
    long_about = "Inspect configuration, check ERP readiness, and run catalog matching, \
                  recommendations and follow-up planning against the configured ERP.",
    after_help = "Examples:\n  salesdesk doctor --json\n  salesdesk match PKM60\n  \
                  salesdesk recommend --industry agriculture --category PUMPS\n  \
                  salesdesk follow-up CT000123"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM client setup, and ERP connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Resolve a model name or number to a catalog item")]
    Match {
        #[arg(help = "Model name, number, or description fragment")]
        query: String,
    },
    #[command(about = "Compose product recommendations for an ad-hoc customer profile")]
    Recommend {
        #[arg(long, help = "Customer industry, e.g. agriculture")]
        industry: Option<String>,
        #[arg(long = "category", help = "Previously purchased category (repeatable)")]
        categories: Vec<String>,
    },
    #[command(name = "follow-up", about = "Plan the next follow-up for a CRM contact")]
    FollowUp {
        #[arg(help = "CRM contact number")]
        customer_id: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Match { query } => commands::match_item::run(&query),
        Command::Recommend { industry, categories } => {
            commands::recommend::run(industry, categories)
        }
        Command::FollowUp { customer_id } => commands::follow_up::run(&customer_id),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
