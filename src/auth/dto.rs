use serde::{Deserialize, Serialize};

/// Request body for sign-up.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "passwordConfirmation")]
    pub password_confirmation: String,
}

/// Request body for sign-in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Public part of the user returned after sign-up or sign-in.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserAuthResponse {
    pub user_id: i64,
    pub username: String,
}
