//! Platform record types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Group ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

/// User ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Membership ID. GitLab reports the member's user id here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

macro_rules! impl_id_conversions {
    ($($id:ident),+) => {
        $(
            impl From<u64> for $id {
                fn from(id: u64) -> Self {
                    Self(id)
                }
            }

            impl From<$id> for u64 {
                fn from(id: $id) -> Self {
                    id.0
                }
            }

            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

impl_id_conversions!(GroupId, UserId, MemberId);

/// GitLab membership access levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(try_from = "u32", into = "u32")]
pub enum AccessLevel {
    NoAccess,
    Minimal,
    Guest,
    Planner,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    Admin,
}

impl AccessLevel {
    /// Numeric value used on the wire.
    pub fn as_u32(self) -> u32 {
        match self {
            AccessLevel::NoAccess => 0,
            AccessLevel::Minimal => 5,
            AccessLevel::Guest => 10,
            AccessLevel::Planner => 15,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Admin => 60,
        }
    }
}

impl From<AccessLevel> for u32 {
    fn from(level: AccessLevel) -> Self {
        level.as_u32()
    }
}

impl TryFrom<u32> for AccessLevel {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AccessLevel::NoAccess),
            5 => Ok(AccessLevel::Minimal),
            10 => Ok(AccessLevel::Guest),
            15 => Ok(AccessLevel::Planner),
            20 => Ok(AccessLevel::Reporter),
            30 => Ok(AccessLevel::Developer),
            40 => Ok(AccessLevel::Maintainer),
            50 => Ok(AccessLevel::Owner),
            60 => Ok(AccessLevel::Admin),
            other => Err(format!("unknown access level {}", other)),
        }
    }
}

/// A group as returned by `/groups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub full_path: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A user as returned by `/users`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

/// A group member as returned by `/groups/:id/members`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    pub access_level: AccessLevel,
}

/// Body of `POST /groups`.
#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub path: String,
}

/// Body of `POST /users`.
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub reset_password: bool,
    pub force_random_password: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("reset_password", &self.reset_password)
            .field("force_random_password", &self.force_random_password)
            .finish()
    }
}

/// Body of `POST /groups/:id/members`.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub user_id: UserId,
    pub access_level: AccessLevel,
}

/// Body of `PUT /users/:id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

/// The closed set of platform failures the retry invoker recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteFailureKind {
    Authentication,
    Create,
    Update,
    Delete,
    List,
    Get,
}

impl fmt::Display for RemoteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteFailureKind::Authentication => "authentication",
            RemoteFailureKind::Create => "create",
            RemoteFailureKind::Update => "update",
            RemoteFailureKind::Delete => "delete",
            RemoteFailureKind::List => "list",
            RemoteFailureKind::Get => "get",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while talking to GitLab.
#[derive(Debug, Error)]
pub enum GitlabError {
    /// The platform answered with a non-success status.
    #[error("{kind} failed ({status}): {message}")]
    Remote {
        kind: RemoteFailureKind,
        status: u16,
        message: String,
    },

    /// Connection, TLS or timeout failure below the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Request could not be built from the given input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GitlabError {
    pub fn remote(kind: RemoteFailureKind, status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            kind,
            status,
            message: message.into(),
        }
    }

    /// The failure kind, when this error belongs to the classified set.
    pub fn classified(&self) -> Option<RemoteFailureKind> {
        match self {
            GitlabError::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type for GitLab operations.
pub type GitlabResult<T> = Result<T, GitlabError>;
