//! JSON routes for the sales desk.
//!
//! | Method | Path                            | Purpose                                   |
//! |--------|---------------------------------|-------------------------------------------|
//! | GET    | `/`                             | welcome message                           |
//! | POST   | `/api/pump-details`             | resolve a model name to a catalog item    |
//! | POST   | `/api/recommend-products`       | up to three product recommendations       |
//! | GET    | `/api/optimal-follow-up`        | follow-up plan for a customer             |
//! | GET    | `/api/sales-interactions`       | raw CRM interaction log entries           |
//! | GET    | `/api/sales-invoices`           | raw sales invoices                        |
//! | GET    | `/api/invoice-items/{invoice_id}` | raw lines of one invoice                |
//! | POST   | `/api/analyze-objections`       | LLM objection handling advice             |
//! | POST   | `/api/generate-proposal`        | LLM proposal draft                        |

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use salesdesk_agent::{
    AdvisorError, ObjectionAnalysis, ObjectionBrief, Proposal, ProposalRequest, SalesAdvisor,
};
use salesdesk_core::{
    CatalogItem, CustomerId, CustomerProfile, FollowUpPlan, InterfaceError, Recommendation,
    SalesDataStore, SalesEngine,
};
use salesdesk_erp::{ErpError, ErpRecordSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const MAX_LIST_LIMIT: usize = 1000;

pub type DynStore = Arc<dyn SalesDataStore>;

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<SalesEngine<DynStore>>,
    pub records: Arc<dyn ErpRecordSource>,
    pub advisor: Arc<SalesAdvisor>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PumpDetailsRequest {
    pub model_name: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpQuery {
    pub customer_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionsQuery {
    pub customer_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

/// Handler failure rendered as `{error, detail, correlation_id}`.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn bad_request(message: impl Into<String>, correlation_id: &str) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id.to_string(),
        })
    }

    fn upstream(error: &ErpError, correlation_id: &str) -> Self {
        Self(InterfaceError::UpstreamUnavailable {
            message: error.to_string(),
            correlation_id: correlation_id.to_string(),
        })
    }

    fn advisor(error: AdvisorError, correlation_id: &str) -> Self {
        let message = error.to_string();
        let correlation_id = correlation_id.to_string();
        match error {
            AdvisorError::Llm(_) => Self(InterfaceError::UpstreamUnavailable { message, correlation_id }),
            AdvisorError::Prompt(_) => Self(InterfaceError::Internal { message, correlation_id }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self.0 {
            InterfaceError::NotFound { message, .. }
            | InterfaceError::BadRequest { message, .. }
            | InterfaceError::UpstreamUnavailable { message, .. }
            | InterfaceError::Internal { message, .. } => message.clone(),
        };
        let body = ErrorBody {
            error: self.0.user_message().to_string(),
            detail,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn list_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/api/pump-details", post(pump_details))
        .route("/api/recommend-products", post(recommend_products))
        .route("/api/optimal-follow-up", get(optimal_follow_up))
        .route("/api/sales-interactions", get(sales_interactions))
        .route("/api/sales-invoices", get(sales_invoices))
        .route("/api/invoice-items/{invoice_id}", get(invoice_items))
        .route("/api/analyze-objections", post(analyze_objections))
        .route("/api/generate-proposal", post(generate_proposal))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse { message: "Welcome to the Salesdesk API" })
}

pub async fn pump_details(
    State(state): State<ApiState>,
    Json(request): Json<PumpDetailsRequest>,
) -> Result<Json<CatalogItem>, ApiError> {
    let correlation_id = correlation_id();

    match state.engine.match_catalog_item(&request.model_name).await {
        Ok(item) => {
            info!(
                event_name = "api.pump_details.resolved",
                correlation_id = %correlation_id,
                model_no = %item.model_no,
                "catalog item resolved"
            );
            Ok(Json(item))
        }
        Err(error) => {
            warn!(
                event_name = "api.pump_details.failed",
                correlation_id = %correlation_id,
                error = %error,
                "catalog lookup failed"
            );
            Err(ApiError(error.into_interface(correlation_id)))
        }
    }
}

pub async fn recommend_products(
    State(state): State<ApiState>,
    Json(profile): Json<CustomerProfile>,
) -> Json<RecommendationsResponse> {
    let correlation_id = correlation_id();
    let recommendations = state.engine.compose_recommendations(&profile).await;

    info!(
        event_name = "api.recommend.composed",
        correlation_id = %correlation_id,
        customer_id = %profile.id,
        count = recommendations.len(),
        "recommendations composed"
    );
    Json(RecommendationsResponse { recommendations })
}

pub async fn optimal_follow_up(
    State(state): State<ApiState>,
    Query(query): Query<FollowUpQuery>,
) -> Result<Json<FollowUpPlan>, ApiError> {
    let correlation_id = correlation_id();
    let customer_id = query.customer_id.trim();
    if customer_id.is_empty() {
        return Err(ApiError::bad_request("customer_id must not be empty", &correlation_id));
    }

    match state.engine.plan_follow_up(&CustomerId(customer_id.to_string())).await {
        Ok(plan) => {
            info!(
                event_name = "api.follow_up.planned",
                correlation_id = %correlation_id,
                customer_id,
                timing = ?plan.timing,
                "follow-up plan returned"
            );
            Ok(Json(plan))
        }
        Err(error) => {
            warn!(
                event_name = "api.follow_up.failed",
                correlation_id = %correlation_id,
                customer_id,
                error = %error,
                "follow-up planning failed"
            );
            Err(ApiError(error.into_interface(correlation_id)))
        }
    }
}

pub async fn sales_interactions(
    State(state): State<ApiState>,
    Query(query): Query<InteractionsQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let correlation_id = correlation_id();
    let customer_id = query
        .customer_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(CustomerId);

    state
        .records
        .list_interactions(customer_id.as_ref(), list_limit(query.limit))
        .await
        .map(Json)
        .map_err(|error| proxy_failure("sales_interactions", &error, &correlation_id))
}

pub async fn sales_invoices(
    State(state): State<ApiState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let correlation_id = correlation_id();

    state
        .records
        .list_invoices(list_limit(query.limit))
        .await
        .map(Json)
        .map_err(|error| proxy_failure("sales_invoices", &error, &correlation_id))
}

pub async fn invoice_items(
    State(state): State<ApiState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let correlation_id = correlation_id();
    let invoice_id = invoice_id.trim();
    if invoice_id.is_empty() {
        return Err(ApiError::bad_request("invoice_id must not be empty", &correlation_id));
    }

    state
        .records
        .list_invoice_lines(invoice_id)
        .await
        .map(Json)
        .map_err(|error| proxy_failure("invoice_items", &error, &correlation_id))
}

fn proxy_failure(route: &'static str, error: &ErpError, correlation_id: &str) -> ApiError {
    warn!(
        event_name = "api.erp_proxy.failed",
        correlation_id,
        route,
        error = %error,
        "ERP pass-through read failed"
    );
    ApiError::upstream(error, correlation_id)
}

pub async fn analyze_objections(
    State(state): State<ApiState>,
    Json(brief): Json<ObjectionBrief>,
) -> Result<Json<ObjectionAnalysis>, ApiError> {
    let correlation_id = correlation_id();

    state.advisor.analyze_objections(&brief).await.map(Json).map_err(|error| {
        warn!(
            event_name = "api.objections.failed",
            correlation_id = %correlation_id,
            error = %error,
            "objection analysis failed"
        );
        ApiError::advisor(error, &correlation_id)
    })
}

pub async fn generate_proposal(
    State(state): State<ApiState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<Proposal>, ApiError> {
    let correlation_id = correlation_id();
    if request.customer_name.trim().is_empty() {
        return Err(ApiError::bad_request("customer_name must not be empty", &correlation_id));
    }

    state.advisor.draft_proposal(&request).await.map(Json).map_err(|error| {
        warn!(
            event_name = "api.proposal.failed",
            correlation_id = %correlation_id,
            error = %error,
            "proposal generation failed"
        );
        ApiError::advisor(error, &correlation_id)
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        Json,
    };
    use salesdesk_agent::{
        LlmClient, LlmError, ObjectionAnalysis, ObjectionBrief, ProposalRequest, SalesAdvisor,
    };
    use salesdesk_core::{
        CatalogItem, CustomerId, CustomerProfile, FollowUpPolicy, FollowUpTiming, InMemoryStore,
        InteractionRecord, InteractionTimestamp, ModelNo, Purchase, RecommendationRules,
        RecommendationSource, Reported, SalesEngine, StoreError,
    };
    use salesdesk_erp::{ErpError, ErpRecordSource};
    use serde_json::{json, Value};

    use super::{
        analyze_objections, generate_proposal, invoice_items, optimal_follow_up, pump_details,
        recommend_products, sales_interactions, ApiState, FollowUpQuery, InteractionsQuery,
        PumpDetailsRequest,
    };

    #[derive(Default)]
    pub(crate) struct StubRecords {
        pub calls: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ErpRecordSource for StubRecords {
        async fn list_interactions(
            &self,
            customer_id: Option<&CustomerId>,
            limit: usize,
        ) -> Result<Vec<Value>, ErpError> {
            if self.fail {
                return Err(ErpError::Decode {
                    entity_set: "CRM_Interaction_Log_Entries",
                    detail: "truncated body".to_string(),
                });
            }
            let customer = customer_id.map(|id| id.0.clone()).unwrap_or_else(|| "*".to_string());
            self.calls.lock().expect("lock").push(format!("interactions:{customer}:{limit}"));
            Ok(vec![json!({"Contact_No": customer, "Description": "Call"})])
        }

        async fn list_invoices(&self, limit: usize) -> Result<Vec<Value>, ErpError> {
            self.calls.lock().expect("lock").push(format!("invoices:{limit}"));
            Ok(Vec::new())
        }

        async fn list_invoice_lines(&self, invoice_id: &str) -> Result<Vec<Value>, ErpError> {
            self.calls.lock().expect("lock").push(format!("lines:{invoice_id}"));
            Ok(vec![json!({"Document_No": invoice_id, "No": "PKM60"})])
        }
    }

    pub(crate) struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok("# Executive Summary\nA solar pump fits.\n# Next Steps\nBook a site survey.".to_string())
        }
    }

    pub(crate) fn item(model_no: &str, description: &str) -> CatalogItem {
        CatalogItem {
            model_no: ModelNo::new(model_no).expect("model number"),
            description: description.to_string(),
            stock: Reported::Known(4),
            unit_price: Reported::Unknown,
        }
    }

    pub(crate) fn api_state(store: InMemoryStore, records: StubRecords) -> ApiState {
        let store: Arc<dyn salesdesk_core::SalesDataStore> = Arc::new(store);
        ApiState {
            engine: Arc::new(SalesEngine::new(
                store,
                RecommendationRules::default(),
                FollowUpPolicy::default(),
            )),
            records: Arc::new(records),
            advisor: Arc::new(SalesAdvisor::new(Arc::new(EchoLlm)).expect("advisor")),
        }
    }

    fn catalog_state() -> ApiState {
        api_state(
            InMemoryStore::new(vec![
                item("PKM60", "PKM60 PERIPHERAL PUMP"),
                item("ACC-01", "PUMP ACCESSORY KIT"),
            ]),
            StubRecords::default(),
        )
    }

    #[tokio::test]
    async fn pump_details_returns_matching_item() {
        let Json(found) = pump_details(
            State(catalog_state()),
            Json(PumpDetailsRequest { model_name: " PKM60 ".to_string() }),
        )
        .await
        .expect("item should resolve");

        assert_eq!(found.model_no.as_str(), "PKM60");
    }

    #[tokio::test]
    async fn pump_details_maps_engine_errors_to_statuses() {
        let missing = pump_details(
            State(catalog_state()),
            Json(PumpDetailsRequest { model_name: "XYZ-999".to_string() }),
        )
        .await
        .expect_err("unknown model must fail");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let blank = pump_details(
            State(catalog_state()),
            Json(PumpDetailsRequest { model_name: "   ".to_string() }),
        )
        .await
        .expect_err("blank model must fail");
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

        let store = InMemoryStore::default();
        store.fail_with(Some(StoreError::Unauthorized("401".to_string())));
        let upstream = pump_details(
            State(api_state(store, StubRecords::default())),
            Json(PumpDetailsRequest { model_name: "PKM60".to_string() }),
        )
        .await
        .expect_err("upstream failure must fail");
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert!(!upstream.0.correlation_id().is_empty());
    }

    #[tokio::test]
    async fn recommend_products_fills_three_slots() {
        let profile = CustomerProfile {
            id: CustomerId("CT-1".to_string()),
            name: "Kilimo Farms".to_string(),
            contact_info: "ops@kilimo.test".to_string(),
            industry: Some("Agriculture".to_string()),
            purchase_history: vec![Purchase { category: Some("PUMPS".to_string()) }],
        };

        let Json(response) = recommend_products(State(catalog_state()), Json(profile)).await;

        let ids: Vec<_> =
            response.recommendations.iter().map(|rec| rec.product_id.as_str()).collect();
        assert_eq!(ids, vec!["ACC-01", "IRRIGATION-01", "PKM60"]);
        assert_eq!(response.recommendations[0].source, RecommendationSource::CatalogAccessory);
    }

    #[tokio::test]
    async fn optimal_follow_up_validates_customer_and_plans() {
        let customer = CustomerId("CT-7".to_string());
        let store = InMemoryStore::default().with_interactions(
            customer.clone(),
            vec![InteractionRecord {
                customer_id: customer,
                timestamp: InteractionTimestamp::parse("not a date"),
                notes: String::new(),
                objections: Vec::new(),
            }],
        );
        let state = api_state(store, StubRecords::default());

        let Json(plan) = optimal_follow_up(
            State(state.clone()),
            Query(FollowUpQuery { customer_id: " CT-7 ".to_string() }),
        )
        .await
        .expect("plan");
        assert_eq!(plan.timing, FollowUpTiming::AtRisk);
        assert!(plan.data_quality.is_some());

        let error = optimal_follow_up(State(state), Query(FollowUpQuery { customer_id: String::new() }))
            .await
            .expect_err("blank customer must fail");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sales_interactions_defaults_limit_and_drops_blank_customer() {
        let records = Arc::new(StubRecords::default());
        let mut state = catalog_state();
        state.records = records.clone();

        let Json(rows) = sales_interactions(
            State(state.clone()),
            Query(InteractionsQuery { customer_id: Some(" ".to_string()), limit: None }),
        )
        .await
        .expect("rows");
        assert_eq!(rows.len(), 1);

        sales_interactions(
            State(state),
            Query(InteractionsQuery { customer_id: Some("CT-1".to_string()), limit: Some(0) }),
        )
        .await
        .expect("rows");

        let calls = records.calls.lock().expect("lock").clone();
        assert_eq!(calls, vec!["interactions:*:10", "interactions:CT-1:1"]);
    }

    #[tokio::test]
    async fn proxy_failures_are_bad_gateway() {
        let state = api_state(
            InMemoryStore::default(),
            StubRecords { fail: true, ..StubRecords::default() },
        );

        let error = sales_interactions(State(state), Query(InteractionsQuery::default()))
            .await
            .expect_err("decode failure must surface");

        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn invoice_items_passes_invoice_number_through() {
        let Json(lines) = invoice_items(State(catalog_state()), Path("SI-1001".to_string()))
            .await
            .expect("lines");

        assert_eq!(lines[0]["Document_No"], "SI-1001");
    }

    #[tokio::test]
    async fn analyze_objections_without_objections_returns_message() {
        let Json(result) = analyze_objections(
            State(catalog_state()),
            Json(ObjectionBrief {
                customer_id: "CT-1".to_string(),
                interaction_type: "call".to_string(),
                objections: Vec::new(),
                notes: String::new(),
            }),
        )
        .await
        .expect("analysis");

        assert!(matches!(result, ObjectionAnalysis::NothingToAnalyze { .. }));
    }

    #[tokio::test]
    async fn generate_proposal_returns_sections() {
        let request: ProposalRequest = serde_json::from_value(json!({
            "customer_name": "Acme Farms",
            "customer_requirements": "Irrigate 40 acres",
            "products": [{"name": "Solar Pump System", "price": 1200}]
        }))
        .expect("request");

        let Json(proposal) =
            generate_proposal(State(catalog_state()), Json(request)).await.expect("proposal");

        assert_eq!(proposal.title, "Sales Proposal for Acme Farms");
        assert_eq!(proposal.sections.len(), 2);
    }
}
