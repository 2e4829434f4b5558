use serde::Serialize;
use tera::{Context, Tera};

pub const OBJECTIONS: &str = "objections.txt";
pub const PROPOSAL: &str = "proposal.txt";

const OBJECTIONS_TEMPLATE: &str = "\
Analyze the following sales objections and provide effective counter-strategies:
Customer: {{ customer_id }}
Interaction Type: {{ interaction_type }}
Objections: {{ objections | join(sep=\", \") }}
Notes: {{ notes }}

Please provide:
1. Analysis of each objection
2. Recommended counter-strategies
3. Suggested follow-up approach
4. Key phrases to use in response
";

const PROPOSAL_TEMPLATE: &str = "\
Create a professional sales proposal document for:
Customer: {{ customer_name }}
Budget Range: {{ budget_range }}

Customer Requirements:
{{ requirements }}

Pain Points to Address:
{% if pain_points | length > 0 %}{% for point in pain_points %}- {{ point }}
{% endfor %}{% else %}No specific pain points mentioned
{% endif %}
Recommended Products/Solutions:
{% for product in products %}- {{ product.name }}: {{ product.description }}, Price: ${{ product.price }}
{% endfor %}
Create a complete, professional sales proposal document that includes:
1. Executive Summary
2. Customer Needs Assessment
3. Proposed Solution with detailed product specifications
4. Implementation Plan
5. Pricing and ROI Analysis
6. Next Steps

Format this as a professional document with clear sections, using `# ` for each section heading.
";

#[derive(Clone, Debug)]
pub struct PromptTemplates {
    tera: Tera,
}

/// A product line exactly as it should read in the prompt.
#[derive(Clone, Debug, Serialize)]
pub struct ProductLine {
    pub name: String,
    pub description: String,
    pub price: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ObjectionPrompt<'a> {
    pub customer_id: &'a str,
    pub interaction_type: &'a str,
    pub objections: &'a [String],
    pub notes: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProposalPrompt<'a> {
    pub customer_name: &'a str,
    pub budget_range: &'a str,
    pub requirements: &'a str,
    pub pain_points: &'a [String],
    pub products: Vec<ProductLine>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(OBJECTIONS, OBJECTIONS_TEMPLATE), (PROPOSAL, PROPOSAL_TEMPLATE)])?;
        Ok(Self { tera })
    }

    pub fn objections(&self, prompt: &ObjectionPrompt<'_>) -> Result<String, tera::Error> {
        self.tera.render(OBJECTIONS, &Context::from_serialize(prompt)?)
    }

    pub fn proposal(&self, prompt: &ProposalPrompt<'_>) -> Result<String, tera::Error> {
        self.tera.render(PROPOSAL, &Context::from_serialize(prompt)?)
    }
}
