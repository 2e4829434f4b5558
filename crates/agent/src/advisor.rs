//! Generative sales assistance: objection handling advice and proposal drafts.
//!
//! The model only writes prose. Nothing it returns feeds back into recommendations or
//! follow-up planning.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::llm::{LlmClient, LlmError};
use crate::prompts::{ObjectionPrompt, ProductLine, PromptTemplates, ProposalPrompt};

pub const NOTHING_TO_ANALYZE: &str = "No objections provided for analysis";
pub const ANALYSIS_SUMMARY: &str = "Analysis of objections and counter-strategies provided";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] tera::Error),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectionBrief {
    pub customer_id: String,
    #[serde(default)]
    pub interaction_type: String,
    #[serde(default)]
    pub objections: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ObjectionAnalysis {
    NothingToAnalyze { message: String },
    Analysis { analysis: String, summary: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub customer_name: String,
    #[serde(default)]
    pub customer_requirements: String,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub products: Vec<ProposedProduct>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalSection {
    /// `None` for text that precedes the first heading.
    pub heading: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub title: String,
    pub sections: Vec<ProposalSection>,
}

pub struct SalesAdvisor {
    llm: Arc<dyn LlmClient>,
    prompts: PromptTemplates,
}

impl SalesAdvisor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Result<Self, AdvisorError> {
        Ok(Self { llm, prompts: PromptTemplates::new()? })
    }

    pub async fn analyze_objections(
        &self,
        brief: &ObjectionBrief,
    ) -> Result<ObjectionAnalysis, AdvisorError> {
        let objections: Vec<String> = brief
            .objections
            .iter()
            .map(|objection| objection.trim().to_string())
            .filter(|objection| !objection.is_empty())
            .collect();
        if objections.is_empty() {
            return Ok(ObjectionAnalysis::NothingToAnalyze {
                message: NOTHING_TO_ANALYZE.to_string(),
            });
        }

        let prompt = self.prompts.objections(&ObjectionPrompt {
            customer_id: &brief.customer_id,
            interaction_type: &brief.interaction_type,
            objections: &objections,
            notes: &brief.notes,
        })?;
        let analysis = self.llm.complete(&prompt).await?;

        info!(
            event_name = "agent.objections.analyzed",
            customer_id = %brief.customer_id,
            objection_count = objections.len(),
            "objection analysis generated"
        );
        Ok(ObjectionAnalysis::Analysis { analysis, summary: ANALYSIS_SUMMARY.to_string() })
    }

    pub async fn draft_proposal(&self, request: &ProposalRequest) -> Result<Proposal, AdvisorError> {
        let budget_range = request
            .budget_range
            .as_deref()
            .map(str::trim)
            .filter(|budget| !budget.is_empty())
            .unwrap_or("Not specified");
        let products = request.products.iter().map(product_line).collect();

        let prompt = self.prompts.proposal(&ProposalPrompt {
            customer_name: &request.customer_name,
            budget_range,
            requirements: &request.customer_requirements,
            pain_points: &request.pain_points,
            products,
        })?;
        let content = self.llm.complete(&prompt).await?;
        let sections = split_sections(&content);

        info!(
            event_name = "agent.proposal.drafted",
            customer_name = %request.customer_name,
            section_count = sections.len(),
            "proposal draft generated"
        );
        Ok(Proposal { title: format!("Sales Proposal for {}", request.customer_name), sections })
    }
}

fn product_line(product: &ProposedProduct) -> ProductLine {
    ProductLine {
        name: product.name.clone(),
        description: product
            .description
            .clone()
            .filter(|description| !description.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
        price: product.price.map(|price| price.to_string()).unwrap_or_else(|| "N/A".to_string()),
    }
}

/// Splits markdown-ish model output on top-level `# ` headings.
pub fn split_sections(content: &str) -> Vec<ProposalSection> {
    let mut sections = Vec::new();

    for (index, chunk) in content.split("\n# ").enumerate() {
        if chunk.trim().is_empty() {
            continue;
        }

        let headed = index > 0 || chunk.trim_start().starts_with("# ");
        if !headed {
            sections.push(ProposalSection { heading: None, body: chunk.trim().to_string() });
            continue;
        }

        let (heading, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
        sections.push(ProposalSection {
            heading: Some(heading.trim().trim_start_matches('#').trim().to_string()),
            body: body.trim().to_string(),
        });
    }

    sections
}
