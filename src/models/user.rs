//! User model, permission vocabulary and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Named permissions gating catalog mutations and loan management.
/// Checks are by name, via [`UserClaims::require`].
pub mod permissions {
    pub const ADD_AUTHOR: &str = "add_author";
    pub const CHANGE_AUTHOR: &str = "change_author";
    pub const DELETE_AUTHOR: &str = "delete_author";
    pub const ADD_BOOK: &str = "add_book";
    pub const CHANGE_BOOK: &str = "change_book";
    pub const DELETE_BOOK: &str = "delete_book";
    pub const ADD_GENRE: &str = "add_genre";
    pub const DELETE_GENRE: &str = "delete_genre";
    pub const ADD_BOOK_INSTANCE: &str = "add_bookinstance";
    pub const CAN_MARK_RETURNED: &str = "can_mark_returned";
}

/// Account type slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Patron,
    Librarian,
    Admin,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Patron => "patron",
            AccountType::Librarian => "librarian",
            AccountType::Admin => "admin",
        }
    }

    /// Permissions granted to this account type, resolved at token issue time
    pub fn permissions(&self) -> Vec<String> {
        use permissions::*;
        match self {
            AccountType::Patron => Vec::new(),
            AccountType::Librarian | AccountType::Admin => [
                ADD_AUTHOR,
                CHANGE_AUTHOR,
                DELETE_AUTHOR,
                ADD_BOOK,
                CHANGE_BOOK,
                DELETE_BOOK,
                ADD_GENRE,
                DELETE_GENRE,
                ADD_BOOK_INSTANCE,
                CAN_MARK_RETURNED,
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patron" => Ok(AccountType::Patron),
            "librarian" => Ok(AccountType::Librarian),
            "admin" => Ok(AccountType::Admin),
            _ => Err(format!("Invalid account type slug: {}", s)),
        }
    }
}

// SQLx conversion for AccountType
impl sqlx::Type<Postgres> for AccountType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for AccountType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AccountType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: AccountType,
    pub created_at: Option<DateTime<Utc>>,
}

/// Create user request (administrative)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Login must be at least 3 characters"))]
    pub login: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: Option<AccountType>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountType,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Does the caller hold the named permission?
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Guard for permission-gated operations
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }

    /// Check if user is admin (account_type = "admin")
    pub fn is_admin(&self) -> bool {
        self.account_type == AccountType::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_for(account_type: AccountType) -> UserClaims {
        UserClaims {
            sub: "someone".to_string(),
            user_id: 1,
            account_type,
            permissions: account_type.permissions(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn librarian_holds_loan_and_catalog_permissions() {
        let claims = claims_for(AccountType::Librarian);
        assert!(claims.has(permissions::CAN_MARK_RETURNED));
        assert!(claims.has(permissions::ADD_BOOK));
        assert!(claims.has(permissions::DELETE_AUTHOR));
        assert!(claims.require(permissions::CHANGE_BOOK).is_ok());
    }

    #[test]
    fn patron_holds_no_permissions() {
        let claims = claims_for(AccountType::Patron);
        assert!(claims.permissions.is_empty());
        assert!(claims.require(permissions::CAN_MARK_RETURNED).is_err());
    }

    #[test]
    fn only_admin_passes_admin_guard() {
        assert!(claims_for(AccountType::Admin).require_admin().is_ok());
        assert!(claims_for(AccountType::Librarian).require_admin().is_err());
    }

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("Librarian".parse::<AccountType>(), Ok(AccountType::Librarian));
        assert!("superuser".parse::<AccountType>().is_err());
    }
}
