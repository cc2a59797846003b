//! REST API for the floor-plan designer.
//!
//! Exposes the session's intents (add, move, rotate, select, clear) and a
//! read-only view of the current state to a rendering frontend. Placement
//! rejections are regular 200 responses with `accepted = false`; only
//! malformed requests produce 4xx statuses.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use serde_json::Value;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::catalog::{default_catalog, find_template};
use crate::config::ApiConfig;
use crate::floor_plan::{AdjacencyLink, FloorPlan, FloorPlanId};
use crate::manager::{AddOutcome, MoveOutcome, RotateOutcome};
use crate::model::{Category, Door, FurnitureItem, FurnitureTemplate, Room};
use crate::session::{PlacedView, PlacementEvent, Session, SessionSnapshot};
use crate::types::{Point, Rect, Size, snap_to_half_unit};
use crate::validator::{PlacementReason, Verdict};

#[derive(Clone)]
struct ApiState {
    session: Arc<Session>,
    snap_to_grid: bool,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>floor-plan-designer API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "template_id": "sofa" }))]
pub struct AddFurnitureRequest {
    pub template_id: String,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "x": 4.5, "y": 2.0 }))]
pub struct MoveRequest {
    pub x: f64,
    pub y: f64,
}

/// Either a rotation delta in degrees or a vertical drag distance.
#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "delta": 90.0 }))]
pub struct RotateRequest {
    #[serde(default)]
    #[schema(nullable = true)]
    pub delta: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub drag: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "key": "sofa-1" }))]
pub struct SelectRequest {
    #[serde(default)]
    #[schema(nullable = true)]
    pub key: Option<String>,
}

/// A hypothetical placement. With `key`, the placed item is checked as if moved.
#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "template_id": "bed", "x": 2.0, "y": 1.0, "rotation": 90 }))]
pub struct ValidateRequest {
    pub template_id: String,
    #[serde(default)]
    #[schema(nullable = true)]
    pub key: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    #[schema(nullable = true)]
    pub rotation: Option<u16>,
}

/// Result of an add or move intent.
///
/// `item` is the item as it is now placed; it is absent when the add was
/// rejected or the move removed the item.
#[derive(Serialize, ToSchema)]
pub struct PlacementResponse {
    pub accepted: bool,
    pub reason_code: PlacementReason,
    pub reason: String,
    #[schema(nullable = true)]
    pub item: Option<FurnitureItem>,
    #[schema(nullable = true)]
    pub removed_key: Option<String>,
}

impl PlacementResponse {
    fn new(verdict: Verdict, item: Option<FurnitureItem>, removed_key: Option<String>) -> Self {
        Self {
            accepted: verdict.accepted,
            reason_code: verdict.reason,
            reason: verdict.message(),
            item,
            removed_key,
        }
    }

    fn from_add(outcome: AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added(item) => Self::new(Verdict::accepted(), Some(item), None),
            AddOutcome::Rejected { verdict, .. } => Self::new(verdict, None, None),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct VerdictResponse {
    pub accepted: bool,
    pub reason_code: PlacementReason,
    pub reason: String,
}

impl From<Verdict> for VerdictResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            accepted: verdict.accepted,
            reason_code: verdict.reason,
            reason: verdict.message(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RotationResponse {
    pub key: String,
    pub rotation: u16,
}

#[derive(Serialize, ToSchema)]
pub struct SelectionResponse {
    #[schema(nullable = true)]
    pub selected: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClearResponse {
    pub removed: usize,
}

#[derive(Serialize, ToSchema)]
pub struct FloorPlanResponse {
    pub plan_id: FloorPlanId,
    pub rooms: usize,
    pub doors: usize,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn unknown_template(id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Unknown template",
        format!("No furniture template with id '{}'", id),
    )
}

fn unknown_item(key: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Unknown item",
        format!("No placed furniture with key '{}'", key),
    )
}

fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(value)| value).map_err(json_deserialize_error)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handle_state,
        handle_catalog,
        handle_load_floor_plan,
        handle_add,
        handle_move,
        handle_rotate,
        handle_reset_rotation,
        handle_select,
        handle_clear,
        handle_validate,
        handle_events
    ),
    components(
        schemas(
            SessionSnapshot,
            PlacedView,
            PlacementEvent,
            Room,
            Door,
            Rect,
            Point,
            Size,
            AdjacencyLink,
            FloorPlanId,
            Category,
            FurnitureTemplate,
            FurnitureItem,
            PlacementReason,
            AddFurnitureRequest,
            MoveRequest,
            RotateRequest,
            SelectRequest,
            ValidateRequest,
            PlacementResponse,
            VerdictResponse,
            RotationResponse,
            SelectionResponse,
            ClearResponse,
            FloorPlanResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "state", description = "Floor plan, catalog and placed furniture"),
        (name = "placement", description = "Furniture placement intents")
    )
)]
struct ApiDoc;

/// Builds the router with all endpoints, CORS and request tracing.
pub fn router(session: Arc<Session>, snap_to_grid: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState {
        session,
        snap_to_grid,
    };

    Router::new()
        .route("/state", get(handle_state))
        .route("/catalog", get(handle_catalog))
        .route("/floor-plan", post(handle_load_floor_plan))
        .route("/furniture", post(handle_add).delete(handle_clear))
        .route("/furniture/{key}/move", post(handle_move))
        .route("/furniture/{key}/rotate", post(handle_rotate))
        .route("/furniture/{key}/rotation/reset", post(handle_reset_rotation))
        .route("/selection", put(handle_select))
        .route("/validate", post(handle_validate))
        .route("/events", get(handle_events))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until the server stops.
pub async fn start_api_server(
    config: ApiConfig,
    session: Arc<Session>,
    snap_to_grid: bool,
) -> std::io::Result<()> {
    let app = router(session, snap_to_grid);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        info!("Local access: http://localhost:{}", config.port());
    }
    info!("Documentation: http://localhost:{}/docs", config.port());

    axum::serve(listener, app).await
}

/// Handler for GET /state.
#[utoipa::path(
    get,
    path = "/state",
    responses((status = 200, description = "Current floor plan and placement", body = SessionSnapshot)),
    tag = "state"
)]
async fn handle_state(State(state): State<ApiState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// Handler for GET /catalog.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Built-in furniture templates", body = [FurnitureTemplate])),
    tag = "state"
)]
async fn handle_catalog() -> Json<&'static [FurnitureTemplate]> {
    Json(default_catalog())
}

/// Handler for POST /floor-plan.
///
/// Replaces the floor plan and removes all placed furniture. A document with
/// an unexpected shape loads as a plan without rooms.
#[utoipa::path(
    post,
    path = "/floor-plan",
    request_body(content = Value, description = "Floor-plan document"),
    responses(
        (status = 200, description = "Floor plan loaded", body = FloorPlanResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Body is not JSON", body = ErrorResponse)
    ),
    tag = "state"
)]
async fn handle_load_floor_plan(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let document = match parse_json(payload) {
        Ok(document) => document,
        Err(response) => return response,
    };

    let plan = FloorPlan::from_document(&document);
    let response = FloorPlanResponse {
        plan_id: plan.id(),
        rooms: plan.rooms().len(),
        doors: plan.doors().len(),
    };
    state.session.load_floor_plan(plan);
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /furniture.
#[utoipa::path(
    post,
    path = "/furniture",
    request_body = AddFurnitureRequest,
    responses(
        (status = 200, description = "Item placed or rejected", body = PlacementResponse),
        (status = NOT_FOUND, description = "Unknown template", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_add(
    State(state): State<ApiState>,
    payload: Result<Json<AddFurnitureRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let Some(template) = find_template(&request.template_id) else {
        return unknown_template(&request.template_id);
    };

    let outcome = state.session.add_furniture(template);
    Json(PlacementResponse::from_add(outcome)).into_response()
}

/// Handler for POST /furniture/{key}/move.
///
/// An invalid target removes the item; the response then carries the
/// rejection reason and `removed_key`.
#[utoipa::path(
    post,
    path = "/furniture/{key}/move",
    params(("key" = String, Path, description = "Key of the placed item")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Item moved or removed", body = PlacementResponse),
        (status = NOT_FOUND, description = "Unknown item", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_move(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut target = Point::new(request.x, request.y);
    if state.snap_to_grid {
        target = Point::new(snap_to_half_unit(target.x), snap_to_half_unit(target.y));
    }

    let response = match state.session.move_furniture(&key, target) {
        MoveOutcome::Moved(item) => PlacementResponse::new(Verdict::accepted(), Some(item), None),
        MoveOutcome::Removed { item, verdict, .. } => {
            PlacementResponse::new(verdict, None, Some(item.key))
        }
        MoveOutcome::UnknownKey => return unknown_item(&key),
    };
    Json(response).into_response()
}

/// Handler for POST /furniture/{key}/rotate.
#[utoipa::path(
    post,
    path = "/furniture/{key}/rotate",
    params(("key" = String, Path, description = "Key of the placed item")),
    request_body = RotateRequest,
    responses(
        (status = 200, description = "New rotation", body = RotationResponse),
        (status = NOT_FOUND, description = "Unknown item", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_rotate(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    payload: Result<Json<RotateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let outcome = match (request.delta, request.drag) {
        (Some(delta), None) => state.session.rotate_furniture(&key, delta),
        (None, Some(drag)) => state.session.rotate_furniture_by_drag(&key, drag),
        _ => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid input data",
                "Exactly one of 'delta' or 'drag' must be given",
            );
        }
    };
    rotation_response(&key, outcome)
}

/// Handler for POST /furniture/{key}/rotation/reset.
#[utoipa::path(
    post,
    path = "/furniture/{key}/rotation/reset",
    params(("key" = String, Path, description = "Key of the placed item")),
    responses(
        (status = 200, description = "Rotation reset to 0", body = RotationResponse),
        (status = NOT_FOUND, description = "Unknown item", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_reset_rotation(State(state): State<ApiState>, Path(key): Path<String>) -> Response {
    let outcome = state.session.reset_rotation(&key);
    rotation_response(&key, outcome)
}

fn rotation_response(key: &str, outcome: RotateOutcome) -> Response {
    match outcome {
        RotateOutcome::Rotated(item) => Json(RotationResponse {
            key: item.key,
            rotation: item.rotation,
        })
        .into_response(),
        RotateOutcome::UnknownKey => unknown_item(key),
    }
}

/// Handler for PUT /selection.
///
/// A key that is not placed clears the selection.
#[utoipa::path(
    put,
    path = "/selection",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Selection after the change", body = SelectionResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_select(
    State(state): State<ApiState>,
    payload: Result<Json<SelectRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let selected = state.session.select_furniture(request.key.as_deref());
    Json(SelectionResponse { selected }).into_response()
}

/// Handler for DELETE /furniture.
#[utoipa::path(
    delete,
    path = "/furniture",
    responses((status = 200, description = "All items removed", body = ClearResponse)),
    tag = "placement"
)]
async fn handle_clear(State(state): State<ApiState>) -> Json<ClearResponse> {
    let removed = state.session.clear_all();
    Json(ClearResponse { removed })
}

/// Handler for POST /validate. Never changes any state.
#[utoipa::path(
    post,
    path = "/validate",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Verdict for the candidate", body = VerdictResponse),
        (status = NOT_FOUND, description = "Unknown template", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_validate(
    State(state): State<ApiState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let Some(template) = find_template(&request.template_id) else {
        return unknown_template(&request.template_id);
    };

    let verdict = state.session.validate_candidate(
        template,
        request.key.as_deref(),
        Point::new(request.x, request.y),
        request.rotation,
    );
    Json(VerdictResponse::from(verdict)).into_response()
}

/// Handler for GET /events (SSE).
///
/// Sends the current state as a `snapshot` event, then every placement event
/// as it happens.
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (
            status = 200,
            description = "Streams placement events in real-time",
            content_type = "text/event-stream",
            body = String
        )
    ),
    tag = "state"
)]
async fn handle_events(
    State(state): State<ApiState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (snapshot, receiver) = state.session.subscribe_with_snapshot();
    let updates = BroadcastStream::new(receiver);

    let initial =
        stream::once(async move { Event::default().event("snapshot").json_data(snapshot) });
    let updates = updates.filter_map(|message| async move {
        match message {
            Ok(event) => Some(Event::default().json_data(event)),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "event subscriber lagged behind");
                None
            }
        }
    });

    Sse::new(initial.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(10))
            .text("keep-alive"),
    )
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
