use serde::{Deserialize, Serialize};

/// JWT payload binding a caller identity to a request. Decoded once at
/// verification time; nothing downstream touches raw claim maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String, // issuer tag
    pub sub: i64,    // owning user id
    pub email: String,
    pub exp: i64, // expiry (unix seconds)
}
