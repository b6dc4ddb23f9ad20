//! User profile, login and registration models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile of the logged-in reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub card_id: String,
    pub account: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Role granted by the server at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Reader,
    Librarian,
    Admin,
    /// Role names the client does not know about
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Reader => "reader",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
            Role::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.to_lowercase().trim_start_matches("role_") {
            "reader" | "user" | "member" => Role::Reader,
            "librarian" => Role::Librarian,
            "admin" => Role::Admin,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Login request body
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("account", &self.account)
            .field("password", &"***")
            .finish()
    }
}

/// Login response: bearer token plus minimal identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub jwt: String,
    pub user_id: i32,
    pub role: Role,
}

/// Identity known right after login, before the profile is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginIdentity {
    pub user_id: i32,
    pub role: Role,
}

impl From<&LoginResponse> for LoginIdentity {
    fn from(response: &LoginResponse) -> Self {
        Self {
            user_id: response.user_id,
            role: response.role.clone(),
        }
    }
}

/// Registration request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub account: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Registration outcome reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

pub type RegistrationOutcome = RegistrationResponse;

/// Registration form as typed by the user
#[derive(Debug, Clone, Default, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, message = "Account is required"))]
    pub account: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl RegistrationForm {
    /// Passwords typed twice and different
    pub fn password_mismatch(&self) -> bool {
        !self.password.is_empty() && !self.confirm_password.is_empty() && self.password != self.confirm_password
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok() && !self.confirm_password.is_empty() && !self.password_mismatch()
    }

    /// Validate and report a single message fit for display
    pub fn check(&self) -> Result<(), String> {
        if self.is_valid() {
            Ok(())
        } else {
            Err("Please fill in all required fields and make sure the passwords match.".to_string())
        }
    }

    /// Build the request body; empty optional fields are sent as absent
    pub fn to_request(&self) -> RegistrationRequest {
        fn non_empty(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        RegistrationRequest {
            account: self.account.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: non_empty(&self.phone),
            address: non_empty(&self.address),
        }
    }
}
