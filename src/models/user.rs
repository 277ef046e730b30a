//! User model, roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Access levels per entity kind. `View` covers read, `Change` covers
/// editing existing records, `Full` additionally covers add and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rights {
    None = 0,
    View = 1,
    Change = 2,
    Full = 3,
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Visitor,
    Lawyer,
    OfficeAdmin,
    SystemAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Visitor => "visitor",
            Role::Lawyer => "lawyer",
            Role::OfficeAdmin => "office_admin",
            Role::SystemAdmin => "system_admin",
        }
    }

    /// Rights assigned to each role
    pub fn rights(&self) -> UserRights {
        match self {
            Role::Visitor => UserRights {
                books: Rights::View,
                users: Rights::View,
            },
            Role::Lawyer => UserRights {
                books: Rights::Change,
                users: Rights::Change,
            },
            Role::OfficeAdmin | Role::SystemAdmin => UserRights {
                books: Rights::Full,
                users: Rights::Full,
            },
        }
    }

    /// Staff roles may register users and manage reference entities
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::OfficeAdmin | Role::SystemAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visitor" => Ok(Role::Visitor),
            "lawyer" => Ok(Role::Lawyer),
            "office_admin" => Ok(Role::OfficeAdmin),
            "system_admin" => Ok(Role::SystemAdmin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Rights per entity kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserRights {
    pub books: Rights,
    pub users: Rights,
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub about: String,
    pub job: String,
    pub address: String,
    pub phone: Option<String>,
    pub twitter_url: String,
    pub facebook_url: String,
    pub insta_url: String,
    pub linkedin_url: String,
    #[schema(value_type = String)]
    pub role: Role,
    /// False until the emailed confirmation link is followed; inactive
    /// accounts cannot log in
    pub is_active: bool,
    pub date_of_registration: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// New-user registration request (staff only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

/// Profile self-edit request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: Option<String>,
    pub about: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub rights: UserRights,
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

    // Authorization checks. Each returns a tagged error before any
    // mutation proceeds; callers check first.
    pub fn require_view_books(&self) -> Result<(), AppError> {
        if self.rights.books as u8 >= Rights::View as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to view books".to_string()))
        }
    }

    pub fn require_add_books(&self) -> Result<(), AppError> {
        if self.rights.books as u8 >= Rights::Full as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to add books".to_string()))
        }
    }

    pub fn require_change_books(&self) -> Result<(), AppError> {
        if self.rights.books as u8 >= Rights::Change as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to change books".to_string()))
        }
    }

    pub fn require_delete_books(&self) -> Result<(), AppError> {
        if self.rights.books as u8 >= Rights::Full as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to delete books".to_string()))
        }
    }

    pub fn require_view_users(&self) -> Result<(), AppError> {
        if self.rights.users as u8 >= Rights::View as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to view users".to_string()))
        }
    }

    /// Registering users and managing reference entities is staff-only
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization("Staff privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Visitor, Role::Lawyer, Role::OfficeAdmin, Role::SystemAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_rights_per_role() {
        assert_eq!(Role::Visitor.rights().books, Rights::View);
        assert_eq!(Role::Lawyer.rights().books, Rights::Change);
        assert_eq!(Role::OfficeAdmin.rights().books, Rights::Full);
        assert!(!Role::Lawyer.is_staff());
        assert!(Role::SystemAdmin.is_staff());
    }

    #[test]
    fn test_lawyer_may_change_but_not_add() {
        let claims = UserClaims {
            sub: "maitre".to_string(),
            user_id: 1,
            role: Role::Lawyer,
            rights: Role::Lawyer.rights(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.require_change_books().is_ok());
        assert!(claims.require_add_books().is_err());
        assert!(claims.require_delete_books().is_err());
    }
}
