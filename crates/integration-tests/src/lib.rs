//! Integration tests for Pantry Shifts.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pantry-shifts-integration-tests
//! ```
//!
//! No external services are needed. [`FakeBackend`] is an in-memory
//! scheduling backend served on a random local port; it records every request
//! so tests can assert on what the client or dashboard sent.
//! [`spawn_dashboard`] serves the dashboard router against it.
//!
//! # Test Categories
//!
//! - `api_client` - REST client against the fake backend
//! - `calendar_view` - Calendar controller with real HTTP round trips
//! - `dashboard_pages` - Rendered dashboard pages and form handling

#![allow(clippy::expect_used, clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use pantry_shifts_client::{ApiClient, ApiConfig};
use pantry_shifts_core::{
    LeadUser, Pantry, PantryId, Role, RoleId, RoleName, Shift, ShiftId, ShiftRole, ShiftRoleId,
    Signup, SignupId, User, UserId,
};
use pantry_shifts_dashboard::{AppState, DashboardConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Seeded role ids.
pub const ADMIN_ROLE: RoleId = RoleId::new(1);
pub const PANTRY_LEAD_ROLE: RoleId = RoleId::new(2);
pub const VOLUNTEER_ROLE: RoleId = RoleId::new(3);

/// A request as the fake backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    /// JSON body, when the request carried one.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Value of the `user_id` query parameter.
    pub fn user_id(&self) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .find_map(|pair| pair.strip_prefix("user_id="))
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
}

/// Everything the fake backend stores.
#[derive(Debug, Default)]
pub struct BackendData {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub pantries: Vec<Pantry>,
    pub shifts: Vec<Shift>,
    pub signups: Vec<Signup>,
    requests: Vec<RecordedRequest>,
    canned: HashMap<(Method, String), CannedResponse>,
    delays: HashMap<PantryId, Duration>,
    last_id: i32,
}

impl BackendData {
    fn seeded() -> Self {
        Self {
            roles: vec![
                Role {
                    id: ADMIN_ROLE,
                    name: RoleName::Admin,
                },
                Role {
                    id: PANTRY_LEAD_ROLE,
                    name: RoleName::PantryLead,
                },
                Role {
                    id: VOLUNTEER_ROLE,
                    name: RoleName::Volunteer,
                },
            ],
            last_id: 10,
            ..Self::default()
        }
    }

    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    fn shift_role_mut(&mut self, id: ShiftRoleId) -> Option<(&mut Shift, usize)> {
        self.shifts.iter_mut().find_map(|shift| {
            let index = shift.roles.iter().position(|role| role.id == id)?;
            Some((shift, index))
        })
    }

    /// Every shift role across all shifts.
    pub fn shift_roles(&self) -> Vec<ShiftRole> {
        self.shifts
            .iter()
            .flat_map(|shift| shift.roles.iter().cloned())
            .collect()
    }
}

type Backend = Arc<Mutex<BackendData>>;

fn lock(backend: &Backend) -> MutexGuard<'_, BackendData> {
    backend.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, message.to_owned()).into_response()
}

#[derive(Debug, Default, Deserialize)]
struct Identity {
    user_id: Option<String>,
}

impl Identity {
    fn resolve(&self) -> Result<UserId, Response> {
        let raw = self
            .user_id
            .as_deref()
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "user_id is required"))?;
        raw.parse()
            .map_err(|_| error(StatusCode::BAD_REQUEST, "Invalid user_id"))
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn me(State(backend): State<Backend>, Query(identity): Query<Identity>) -> Response {
    let id = match identity.resolve() {
        Ok(id) => id,
        Err(response) => return response,
    };
    let data = lock(&backend);
    data.user(id).map_or_else(
        || error(StatusCode::NOT_FOUND, "User not found"),
        |user| Json(json!({ "user": user })).into_response(),
    )
}

async fn list_roles(State(backend): State<Backend>) -> Json<Vec<Role>> {
    Json(lock(&backend).roles.clone())
}

async fn list_pantries(
    State(backend): State<Backend>,
    Query(identity): Query<Identity>,
) -> Response {
    let id = match identity.resolve() {
        Ok(id) => id,
        Err(response) => return response,
    };
    let data = lock(&backend);
    let Some(user) = data.user(id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    let admin = user.roles.iter().any(RoleName::is_admin);
    let pantries: Vec<Pantry> = data
        .pantries
        .iter()
        .filter(|pantry| {
            admin
                || pantry.lead_id == Some(id)
                || pantry.leads.iter().any(|lead| lead.id == id)
        })
        .cloned()
        .collect();
    Json(pantries).into_response()
}

async fn all_pantries(State(backend): State<Backend>) -> Json<Vec<Pantry>> {
    Json(lock(&backend).pantries.clone())
}

async fn get_pantry(State(backend): State<Backend>, Path(id): Path<PantryId>) -> Response {
    let data = lock(&backend);
    data.pantries
        .iter()
        .find(|pantry| pantry.id == id)
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Pantry not found"),
            |pantry| Json(pantry.clone()).into_response(),
        )
}

#[derive(Debug, Deserialize)]
struct PantryBody {
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    location_address: Option<String>,
}

async fn create_pantry(State(backend): State<Backend>, Json(body): Json<PantryBody>) -> Response {
    if body.name.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Pantry name is required");
    }
    let mut data = lock(&backend);
    if data.pantries.iter().any(|pantry| pantry.slug == body.slug) {
        return error(StatusCode::CONFLICT, "Slug already in use");
    }
    let pantry = Pantry {
        id: PantryId::new(data.next_id()),
        name: body.name,
        slug: body.slug,
        location_address: body.location_address,
        lead_id: None,
        leads: Vec::new(),
    };
    data.pantries.push(pantry.clone());
    (StatusCode::CREATED, Json(pantry)).into_response()
}

async fn update_pantry(
    State(backend): State<Backend>,
    Path(id): Path<PantryId>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&backend);
    let lead = match body.get("lead_id") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(value) => {
            let lead = value
                .as_i64()
                .and_then(|raw| i32::try_from(raw).ok())
                .map(UserId::new)
                .filter(|lead| data.user(*lead).is_some());
            match lead {
                Some(lead) => Some(Some(lead)),
                None => return error(StatusCode::BAD_REQUEST, "Invalid lead_id"),
            }
        }
    };

    let Some(pantry) = data.pantries.iter_mut().find(|pantry| pantry.id == id) else {
        return error(StatusCode::NOT_FOUND, "Pantry not found");
    };
    if let Some(name) = body.get("name").and_then(Value::as_str) {
        pantry.name = name.to_owned();
    }
    if let Some(slug) = body.get("slug").and_then(Value::as_str) {
        pantry.slug = slug.to_owned();
    }
    if let Some(address) = body.get("location_address").and_then(Value::as_str) {
        pantry.location_address = Some(address.to_owned());
    }
    if let Some(lead) = lead {
        pantry.lead_id = lead;
    }
    Json(pantry.clone()).into_response()
}

async fn delete_pantry(State(backend): State<Backend>, Path(id): Path<PantryId>) -> Response {
    let mut data = lock(&backend);
    let before = data.pantries.len();
    data.pantries.retain(|pantry| pantry.id != id);
    if data.pantries.len() == before {
        return error(StatusCode::NOT_FOUND, "Pantry not found");
    }
    data.shifts.retain(|shift| shift.pantry_id != id);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Deserialize)]
struct LeadBody {
    user_id: UserId,
}

async fn add_lead(
    State(backend): State<Backend>,
    Path(id): Path<PantryId>,
    Json(body): Json<LeadBody>,
) -> Response {
    let mut data = lock(&backend);
    let Some(user) = data.user(body.user_id).cloned() else {
        return error(StatusCode::BAD_REQUEST, "Invalid user_id");
    };
    let Some(pantry) = data.pantries.iter_mut().find(|pantry| pantry.id == id) else {
        return error(StatusCode::NOT_FOUND, "Pantry not found");
    };
    if !pantry.leads.iter().any(|lead| lead.id == user.id) {
        pantry.leads.push(LeadUser {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
        });
    }
    (StatusCode::CREATED, Json(json!({ "message": "Lead added" }))).into_response()
}

async fn remove_lead(
    State(backend): State<Backend>,
    Path((id, user_id)): Path<(PantryId, UserId)>,
) -> Response {
    let mut data = lock(&backend);
    let Some(pantry) = data.pantries.iter_mut().find(|pantry| pantry.id == id) else {
        return error(StatusCode::NOT_FOUND, "Pantry not found");
    };
    pantry.leads.retain(|lead| lead.id != user_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_shifts(State(backend): State<Backend>, Path(id): Path<PantryId>) -> Response {
    let delay = {
        let data = lock(&backend);
        if !data.pantries.iter().any(|pantry| pantry.id == id) {
            return error(StatusCode::NOT_FOUND, "Pantry not found");
        }
        data.delays.get(&id).copied()
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let data = lock(&backend);
    let shifts: Vec<Shift> = data
        .shifts
        .iter()
        .filter(|shift| shift.pantry_id == id)
        .cloned()
        .collect();
    Json(shifts).into_response()
}

#[derive(Debug, Deserialize)]
struct ShiftBody {
    role_name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    required_count: u32,
}

async fn create_shift(
    State(backend): State<Backend>,
    Path(id): Path<PantryId>,
    Json(body): Json<ShiftBody>,
) -> Response {
    if body.end_time <= body.start_time {
        return error(StatusCode::BAD_REQUEST, "end_time must be after start_time");
    }
    let mut data = lock(&backend);
    if !data.pantries.iter().any(|pantry| pantry.id == id) {
        return error(StatusCode::NOT_FOUND, "Pantry not found");
    }
    let shift = Shift {
        id: ShiftId::new(data.next_id()),
        pantry_id: id,
        role_name: body.role_name,
        start_time: body.start_time,
        end_time: body.end_time,
        required_count: body.required_count,
        filled_count: 0,
        status: "Open".to_string(),
        roles: Vec::new(),
    };
    // The legacy field names exercise the client's aliases.
    let created = json!({
        "shift_id": shift.id,
        "shift_name": shift.role_name,
        "required_count": shift.required_count,
        "filled_count": 0,
        "status": shift.status,
    });
    data.shifts.push(shift);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn get_shift(State(backend): State<Backend>, Path(id): Path<ShiftId>) -> Response {
    let data = lock(&backend);
    match data.shifts.iter().find(|shift| shift.id == id) {
        Some(shift) => Json(shift.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Shift not found"),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ShiftPatchBody {
    role_name: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    required_count: Option<u32>,
    status: Option<String>,
}

async fn update_shift(
    State(backend): State<Backend>,
    Path(id): Path<ShiftId>,
    Json(body): Json<ShiftPatchBody>,
) -> Response {
    let mut data = lock(&backend);
    let Some(shift) = data.shifts.iter_mut().find(|shift| shift.id == id) else {
        return error(StatusCode::NOT_FOUND, "Shift not found");
    };
    let start = body.start_time.unwrap_or(shift.start_time);
    let end = body.end_time.unwrap_or(shift.end_time);
    if end <= start {
        return error(StatusCode::BAD_REQUEST, "end_time must be after start_time");
    }
    shift.start_time = start;
    shift.end_time = end;
    if let Some(role_name) = body.role_name {
        shift.role_name = role_name;
    }
    if let Some(required_count) = body.required_count {
        shift.required_count = required_count;
    }
    if let Some(status) = body.status {
        shift.status = status;
    }
    Json(shift.clone()).into_response()
}

async fn list_shift_roles(State(backend): State<Backend>, Path(id): Path<ShiftId>) -> Response {
    let data = lock(&backend);
    match data.shifts.iter().find(|shift| shift.id == id) {
        Some(shift) => Json(shift.roles.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Shift not found"),
    }
}

async fn delete_shift(State(backend): State<Backend>, Path(id): Path<ShiftId>) -> Response {
    let mut data = lock(&backend);
    let before = data.shifts.len();
    data.shifts.retain(|shift| shift.id != id);
    if data.shifts.len() == before {
        return error(StatusCode::NOT_FOUND, "Shift not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Deserialize)]
struct ShiftRoleBody {
    role_title: String,
    required_count: u32,
}

async fn create_shift_role(
    State(backend): State<Backend>,
    Path(id): Path<ShiftId>,
    Json(body): Json<ShiftRoleBody>,
) -> Response {
    let mut data = lock(&backend);
    let role_id = ShiftRoleId::new(data.next_id());
    let Some(shift) = data.shifts.iter_mut().find(|shift| shift.id == id) else {
        return error(StatusCode::NOT_FOUND, "Shift not found");
    };
    let role = ShiftRole {
        id: role_id,
        shift_id: Some(id),
        role_title: body.role_title,
        required_count: body.required_count,
        filled_count: 0,
    };
    shift.roles.push(role.clone());
    (StatusCode::CREATED, Json(role)).into_response()
}

#[derive(Debug, Default, Deserialize)]
struct ShiftRolePatchBody {
    role_title: Option<String>,
    required_count: Option<u32>,
}

async fn update_shift_role(
    State(backend): State<Backend>,
    Path(id): Path<ShiftRoleId>,
    Json(body): Json<ShiftRolePatchBody>,
) -> Response {
    let mut data = lock(&backend);
    let Some(role) = data
        .shift_role_mut(id)
        .and_then(|(shift, index)| shift.roles.get_mut(index))
    else {
        return error(StatusCode::NOT_FOUND, "Shift role not found");
    };
    if let Some(role_title) = body.role_title {
        role.role_title = role_title;
    }
    if let Some(required_count) = body.required_count {
        role.required_count = required_count;
    }
    Json(role.clone()).into_response()
}

async fn role_signups(State(backend): State<Backend>, Path(id): Path<ShiftRoleId>) -> Response {
    let data = lock(&backend);
    if data.shift_roles().iter().all(|role| role.id != id) {
        return error(StatusCode::NOT_FOUND, "Shift role not found");
    }
    let signups: Vec<Signup> = data
        .signups
        .iter()
        .filter(|signup| signup.shift_role_id == id)
        .cloned()
        .collect();
    Json(signups).into_response()
}

async fn delete_shift_role(
    State(backend): State<Backend>,
    Path(id): Path<ShiftRoleId>,
) -> Response {
    let mut data = lock(&backend);
    let Some((shift, index)) = data.shift_role_mut(id) else {
        return error(StatusCode::NOT_FOUND, "Shift role not found");
    };
    shift.roles.remove(index);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Default, Deserialize)]
struct SignupBody {
    #[serde(default)]
    user_id: Option<UserId>,
}

async fn sign_up(
    State(backend): State<Backend>,
    Path(id): Path<ShiftRoleId>,
    Query(identity): Query<Identity>,
    Json(body): Json<SignupBody>,
) -> Response {
    let user_id = match body.user_id.map_or_else(|| identity.resolve(), Ok) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let mut data = lock(&backend);
    if data
        .signups
        .iter()
        .any(|signup| signup.shift_role_id == id && signup.user_id == user_id)
    {
        return error(StatusCode::CONFLICT, "Already signed up for this role");
    }
    let signup_id = SignupId::new(data.next_id());
    let Some((shift, index)) = data.shift_role_mut(id) else {
        return error(StatusCode::NOT_FOUND, "Shift role not found");
    };
    let Some(role) = shift.roles.get_mut(index) else {
        return error(StatusCode::NOT_FOUND, "Shift role not found");
    };
    if role.filled_count >= role.required_count {
        return error(StatusCode::CONFLICT, "Shift role is full");
    }
    role.filled_count += 1;
    shift.filled_count += 1;

    let signup = Signup {
        id: signup_id,
        shift_role_id: id,
        user_id,
    };
    data.signups.push(signup.clone());
    (StatusCode::CREATED, Json(json!({ "signup": signup }))).into_response()
}

async fn cancel_signup(State(backend): State<Backend>, Path(id): Path<SignupId>) -> Response {
    let mut data = lock(&backend);
    let Some(position) = data.signups.iter().position(|signup| signup.id == id) else {
        return error(StatusCode::NOT_FOUND, "Signup not found");
    };
    let signup = data.signups.remove(position);
    if let Some((shift, index)) = data.shift_role_mut(signup.shift_role_id) {
        if let Some(role) = shift.roles.get_mut(index) {
            role.filled_count = role.filled_count.saturating_sub(1);
        }
        shift.filled_count = shift.filled_count.saturating_sub(1);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn user_signups(State(backend): State<Backend>, Path(id): Path<UserId>) -> Json<Vec<Signup>> {
    let data = lock(&backend);
    Json(
        data.signups
            .iter()
            .filter(|signup| signup.user_id == id)
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Default, Deserialize)]
struct UserFilter {
    role: Option<String>,
}

async fn list_users(
    State(backend): State<Backend>,
    Query(filter): Query<UserFilter>,
) -> Json<Vec<User>> {
    let data = lock(&backend);
    Json(
        data.users
            .iter()
            .filter(|user| {
                filter.role.as_deref().is_none_or(|role| {
                    user.roles.iter().any(|held| held.as_str() == role)
                })
            })
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct UserBody {
    email: String,
    #[serde(default)]
    full_name: String,
}

async fn create_user(State(backend): State<Backend>, Json(body): Json<UserBody>) -> Response {
    let mut data = lock(&backend);
    if data.users.iter().any(|user| user.email == body.email) {
        return error(StatusCode::CONFLICT, "Email already exists");
    }
    let user = User {
        id: UserId::new(data.next_id()),
        email: body.email,
        full_name: Some(body.full_name).filter(|name| !name.is_empty()),
        roles: std::iter::once(RoleName::Volunteer).collect(),
    };
    data.users.push(user.clone());
    (StatusCode::CREATED, Json(json!({ "user": user }))).into_response()
}

#[derive(Debug, Deserialize)]
struct RoleAssignBody {
    role_id: RoleId,
}

async fn assign_role(
    State(backend): State<Backend>,
    Path(id): Path<UserId>,
    Json(body): Json<RoleAssignBody>,
) -> Response {
    let mut data = lock(&backend);
    let Some(role) = data.roles.iter().find(|role| role.id == body.role_id).cloned() else {
        return error(StatusCode::BAD_REQUEST, "Invalid role_id");
    };
    let Some(user) = data.users.iter_mut().find(|user| user.id == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user.roles.insert(role.name);
    Json(json!({ "message": "Role assigned" })).into_response()
}

async fn remove_role(
    State(backend): State<Backend>,
    Path((id, role_id)): Path<(UserId, RoleId)>,
) -> Response {
    let mut data = lock(&backend);
    let Some(role) = data.roles.iter().find(|role| role.id == role_id).cloned() else {
        return error(StatusCode::BAD_REQUEST, "Invalid role_id");
    };
    let Some(user) = data.users.iter_mut().find(|user| user.id == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user.roles.remove(&role.name);
    StatusCode::NO_CONTENT.into_response()
}

async fn public_shifts(State(backend): State<Backend>, Path(slug): Path<String>) -> Response {
    let data = lock(&backend);
    let Some(pantry) = data.pantries.iter().find(|pantry| pantry.slug == slug) else {
        return error(StatusCode::NOT_FOUND, "Pantry not found");
    };
    let shifts: Vec<Shift> = data
        .shifts
        .iter()
        .filter(|shift| shift.pantry_id == pantry.id)
        .cloned()
        .collect();
    Json(shifts).into_response()
}

/// Record the request, then answer with a canned response if one is queued.
async fn record(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();
    let canned = {
        let mut data = lock(&backend);
        data.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: parts.uri.query().map(str::to_owned),
            body: serde_json::from_slice(&bytes).ok(),
        });
        data.canned.remove(&(method, path))
    };
    match canned {
        Some(canned) => (canned.status, canned.body).into_response(),
        None => next.run(Request::from_parts(parts, Body::from(bytes))).await,
    }
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/roles", get(list_roles))
        .route("/api/pantries", get(list_pantries).post(create_pantry))
        .route("/api/all_pantries", get(all_pantries))
        .route(
            "/api/pantries/{id}",
            get(get_pantry).patch(update_pantry).delete(delete_pantry),
        )
        .route("/api/pantries/{id}/leads", post(add_lead))
        .route("/api/pantries/{id}/leads/{user_id}", delete(remove_lead))
        .route("/api/pantries/{id}/shifts", get(list_shifts).post(create_shift))
        .route(
            "/api/shifts/{id}",
            get(get_shift).patch(update_shift).delete(delete_shift),
        )
        .route(
            "/api/shifts/{id}/roles",
            get(list_shift_roles).post(create_shift_role),
        )
        .route(
            "/api/shift-roles/{id}",
            delete(delete_shift_role).patch(update_shift_role),
        )
        .route("/api/shift-roles/{id}/signups", get(role_signups))
        .route("/api/shift-roles/{id}/signup", post(sign_up))
        .route("/api/signups/{id}", delete(cancel_signup))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}/signups", get(user_signups))
        .route("/api/users/{id}/roles", post(assign_role))
        .route("/api/users/{id}/roles/{role_id}", delete(remove_role))
        .route("/api/public/pantries/{slug}/shifts", get(public_shifts))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

async fn serve(app: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    (addr, server)
}

// =============================================================================
// Fake backend
// =============================================================================

/// In-memory scheduling backend on a random local port.
///
/// Seeded with the `ADMIN`, `PANTRY_LEAD` and `VOLUNTEER` roles; everything
/// else is added by the test.
pub struct FakeBackend {
    addr: SocketAddr,
    data: Backend,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let data = Arc::new(Mutex::new(BackendData::seeded()));
        let (addr, server) = serve(router(data.clone())).await;
        Self { addr, data, server }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig::new(&self.url()).expect("Invalid fake backend URL")
    }

    /// Anonymous client for this backend.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).expect("Failed to build API client")
    }

    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        lock(&self.data)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.data().requests.clone()
    }

    /// Requests with the given method and path, in arrival order.
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.data()
            .requests
            .iter()
            .filter(|request| request.method == *method && request.path == path)
            .cloned()
            .collect()
    }

    /// Answer the next `method path` request with `status` and `body`.
    pub fn respond_once(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        self.data().canned.insert(
            (method, path.to_owned()),
            CannedResponse {
                status,
                body: body.to_owned(),
            },
        );
    }

    /// Hold every shift listing for `pantry` by `delay`.
    pub fn delay_shifts(&self, pantry: PantryId, delay: Duration) {
        self.data().delays.insert(pantry, delay);
    }

    pub fn add_user(&self, email: &str, full_name: &str, roles: &[RoleName]) -> UserId {
        let mut data = self.data();
        let id = UserId::new(data.next_id());
        data.users.push(User {
            id,
            email: email.to_owned(),
            full_name: Some(full_name.to_owned()).filter(|name| !name.is_empty()),
            roles: roles.iter().cloned().collect(),
        });
        id
    }

    pub fn add_pantry(&self, name: &str, slug: &str) -> PantryId {
        let mut data = self.data();
        let id = PantryId::new(data.next_id());
        data.pantries.push(Pantry {
            id,
            name: name.to_owned(),
            slug: slug.to_owned(),
            location_address: None,
            lead_id: None,
            leads: Vec::new(),
        });
        id
    }

    /// Add `user` to the pantry's lead list.
    pub fn add_lead(&self, pantry: PantryId, user: UserId) {
        let mut data = self.data();
        let Some(lead) = data.user(user).map(|user| LeadUser {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }) else {
            return;
        };
        if let Some(pantry) = data.pantries.iter_mut().find(|p| p.id == pantry) {
            pantry.leads.push(lead);
        }
    }

    /// Add a three-hour shift starting at `start`.
    pub fn add_shift(
        &self,
        pantry: PantryId,
        role_name: &str,
        start: DateTime<Utc>,
        required: u32,
    ) -> ShiftId {
        let mut data = self.data();
        let id = ShiftId::new(data.next_id());
        data.shifts.push(Shift {
            id,
            pantry_id: pantry,
            role_name: role_name.to_owned(),
            start_time: start,
            end_time: start + chrono::Duration::hours(3),
            required_count: required,
            filled_count: 0,
            status: "Open".to_string(),
            roles: Vec::new(),
        });
        id
    }

    pub fn add_shift_role(
        &self,
        shift: ShiftId,
        title: &str,
        required: u32,
        filled: u32,
    ) -> ShiftRoleId {
        let mut data = self.data();
        let id = ShiftRoleId::new(data.next_id());
        if let Some(shift) = data.shifts.iter_mut().find(|s| s.id == shift) {
            shift.filled_count += filled;
            shift.roles.push(ShiftRole {
                id,
                shift_id: Some(shift.id),
                role_title: title.to_owned(),
                required_count: required,
                filled_count: filled,
            });
        }
        id
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// The dashboard router served against a [`FakeBackend`].
pub struct DashboardServer {
    addr: SocketAddr,
    http: reqwest::Client,
    server: JoinHandle<()>,
}

/// Serve the dashboard on a random local port.
pub async fn spawn_dashboard(backend: &FakeBackend) -> DashboardServer {
    let state = AppState::new(DashboardConfig::new(backend.config()))
        .expect("Failed to create dashboard state");
    let (addr, server) = serve(pantry_shifts_dashboard::app(state)).await;
    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client");
    DashboardServer { addr, http, server }
}

impl DashboardServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("Dashboard request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Dashboard request failed")
    }
}

impl Drop for DashboardServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}
