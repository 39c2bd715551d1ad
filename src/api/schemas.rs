//! Request and response bodies for the REST API.
//!
//! Response types never expose password hashes; [`UserResponse`] is the
//! only shape an account leaves the service in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{User, VoucherOffer};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            role: user.role.as_str().to_string(),
            points: user.points,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct ReportSubmitRequest {
    pub project_name: String,
    #[serde(default)]
    pub species_choice: String,
    pub area_sqm: f64,
    pub trees_planned: i64,
    #[serde(default)]
    pub green_area_sqm: Option<f64>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub voucher_id: String,
}

/// One catalog entry as listed to clients.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub brand: String,
    pub value: i64,
    pub desc: String,
}

impl CatalogEntry {
    pub fn from_offer(id: &str, offer: &VoucherOffer) -> Self {
        Self {
            id: id.to_string(),
            brand: offer.brand.clone(),
            value: offer.value,
            desc: offer.desc.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};

    #[test]
    fn user_response_omits_password_hash() {
        let user = User {
            id: UserId::new(),
            username: "asha".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Participant,
            points: 50,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("asha"));
    }

    #[test]
    fn report_request_defaults() {
        let req: ReportSubmitRequest = serde_json::from_str(
            r#"{"project_name": "Grove", "area_sqm": 800, "trees_planned": 10}"#,
        )
        .unwrap();
        assert_eq!(req.species_choice, "");
        assert_eq!(req.green_area_sqm, None);
        assert_eq!(req.lat, 0.0);
        assert_eq!(req.lon, 0.0);
    }
}
