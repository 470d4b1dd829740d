use crate::auth::{cleared_cookie, hash_password, session_cookie, verify_password, CurrentUser};
use crate::errors::AppError;
use crate::models::{
    Envelope, LoginRequest, RangeQuery, RegisterRequest, SessionResponse, Stat, StatItem,
    StatItemRequest, StatRequest, StatWithItems, UserProfile, UsernameRequest,
};
use crate::state::AppState;
use crate::stats::{build_report, resolve_range, today, StatReport};
use crate::store;
use crate::validation::{validate_item, validate_login, validate_register, validate_stat, validate_username};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;
type Created<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Created<UserProfile> {
    let new_user = validate_register(payload)?;
    if store::find_user_by_email(&*state.data.lock().await, &new_user.email).is_some() {
        return Err(AppError::conflict("User already exists"));
    }

    let password_hash = hash_password(new_user.password.clone(), state.bcrypt_cost).await?;

    let user = state
        .commit(|data| store::register_user(data, new_user, password_hash))
        .await?;

    info!(user_id = %user.id, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Success!", UserProfile::from(&user))),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = validate_login(&payload)?;
    let account = store::find_user_by_email(&*state.data.lock().await, &email).cloned();

    let Some(user) = account else {
        warn!("login attempt for unknown account");
        return Err(AppError::unauthorized("Invalid credentials"));
    };
    if !verify_password(payload.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login attempt with wrong password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let (token, session) = state.sessions.lock().await.create(&user.id);
    info!(user_id = %user.id, "user logged in");

    let cookie = session_cookie(&token, session.expires_at);
    let body = SessionResponse {
        token,
        expires_at: session.expires_at,
        user: UserProfile::from(&user),
    };
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(Envelope::ok("Logged in", body)),
    ))
}

pub async fn logout(State(state): State<AppState>, current: CurrentUser) -> impl IntoResponse {
    state.sessions.lock().await.revoke(&current.token);
    info!(user_id = %current.user_id, "user logged out");
    (
        [(header::SET_COOKIE, cleared_cookie())],
        Json(Envelope::ok("Logged out", ())),
    )
}

pub async fn get_user(State(state): State<AppState>, current: CurrentUser) -> ApiResult<UserProfile> {
    let data = state.data.lock().await;
    let user = store::user(&data, &current.user_id)?;
    Ok(Json(Envelope::ok("User fetched successfully!", UserProfile::from(user))))
}

pub async fn update_username(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UsernameRequest>,
) -> ApiResult<UserProfile> {
    let username = validate_username(&payload.username)?;
    let user = state
        .commit(|data| store::rename_user(data, &current.user_id, username))
        .await?;
    Ok(Json(Envelope::ok("Username updated!", UserProfile::from(&user))))
}

pub async fn list_stats(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Vec<Stat>> {
    let data = state.data.lock().await;
    let stats = store::list_stats(&data, &current.user_id);
    Ok(Json(Envelope::ok("Stats fetched successfully!", stats)))
}

pub async fn list_stats_with_items(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Vec<StatWithItems>> {
    let data = state.data.lock().await;
    let stats = store::stats_with_items(&data, &current.user_id);
    Ok(Json(Envelope::ok("Stats fetched successfully!", stats)))
}

pub async fn create_stat(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<StatRequest>,
) -> Created<Stat> {
    let request = validate_stat(payload)?;
    let stat = state
        .commit(|data| store::create_stat(data, &current.user_id, request))
        .await?;
    info!(user_id = %current.user_id, stat_id = %stat.id, "created stat");
    Ok((StatusCode::CREATED, Json(Envelope::ok("Stat created successfully!", stat))))
}

pub async fn update_stat(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(stat_id): Path<String>,
    Json(payload): Json<StatRequest>,
) -> ApiResult<Stat> {
    let request = validate_stat(payload)?;
    let stat = state
        .commit(|data| store::update_stat(data, &current.user_id, &stat_id, request))
        .await?;
    Ok(Json(Envelope::ok("Stat updated successfully!", stat)))
}

pub async fn delete_stat(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(stat_id): Path<String>,
) -> ApiResult<Stat> {
    let stat = state
        .commit(|data| store::delete_stat(data, &current.user_id, &stat_id))
        .await?;
    info!(user_id = %current.user_id, stat_id = %stat.id, "deleted stat");
    Ok(Json(Envelope::ok("Stat deleted successfully!", stat)))
}

pub async fn list_items(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(stat_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<StatItem>> {
    let range = resolve_range(&query, today())?;
    let data = state.data.lock().await;
    let items = store::list_items(&data, &current.user_id, &stat_id, Some(&range))?;
    Ok(Json(Envelope::ok("Stat items fetched successfully!", items)))
}

pub async fn add_items(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(stat_id): Path<String>,
    Json(payload): Json<Vec<StatItemRequest>>,
) -> Created<Vec<StatItem>> {
    if payload.is_empty() {
        return Err(AppError::unprocessable("Incorrect submission!"));
    }
    let requests = payload
        .into_iter()
        .map(validate_item)
        .collect::<Result<Vec<_>, _>>()?;

    let items = state
        .commit(|data| store::add_items(data, &current.user_id, &stat_id, requests))
        .await?;
    info!(user_id = %current.user_id, %stat_id, count = items.len(), "added stat items");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Stat items created successfully!", items)),
    ))
}

pub async fn update_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((stat_id, item_id)): Path<(String, String)>,
    Json(payload): Json<StatItemRequest>,
) -> ApiResult<StatItem> {
    let request = validate_item(payload)?;
    let item = state
        .commit(|data| store::update_item(data, &current.user_id, &stat_id, &item_id, request))
        .await?;
    Ok(Json(Envelope::ok("Stat item updated successfully!", item)))
}

pub async fn delete_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((stat_id, item_id)): Path<(String, String)>,
) -> ApiResult<StatItem> {
    let item = state
        .commit(|data| store::delete_item(data, &current.user_id, &stat_id, &item_id))
        .await?;
    Ok(Json(Envelope::ok("Stat item deleted successfully!", item)))
}

pub async fn get_report(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(stat_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<StatReport> {
    let range = resolve_range(&query, today())?;
    let items = {
        let data = state.data.lock().await;
        store::list_items(&data, &current.user_id, &stat_id, Some(&range))?
    };
    Ok(Json(Envelope::ok("Report computed", build_report(Some(range), &items))))
}
