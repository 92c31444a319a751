use serde::{Deserialize, Serialize};

use crate::auth::repo::User;
use crate::model::RecordMeta;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    #[serde(default, rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Public part of a user returned to the client. The password hash never
/// appears here.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            meta: user.meta,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}
