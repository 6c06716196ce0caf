use axum::{ extract::{ Path, State }, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::user;
use crate::error::Result;
use crate::services::user_service::RegisterRequest;

use super::AppState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub phone: String,
    pub country_code: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub country_code: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub phone: String,
    pub country_code: String,
    pub full_name: String,
    pub referral_code: String,
    pub is_admin: bool,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            country_code: user.country_code,
            full_name: user.full_name,
            referral_code: user.referral_code,
            is_admin: user.is_admin,
        }
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>
) -> Result<Json<UserResponse>> {
    let user = state.user_service.register(RegisterRequest {
        phone: request.phone,
        country_code: request.country_code,
        full_name: request.full_name,
        password: request.password,
        referral_code: request.referral_code,
    }).await?;

    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>
) -> Result<Json<UserResponse>> {
    let user = state.user_service
        .login(&request.phone, &request.country_code, &request.password).await?;

    Ok(Json(user.into()))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>
) -> Result<Json<UserResponse>> {
    let user = state.user_service.get_user(user_id).await?;

    Ok(Json(user.into()))
}
