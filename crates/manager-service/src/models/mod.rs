//! Manager service models.
//!
//! Request and response bodies of the HTTP API, and the campus object
//! returned by the platform.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Welcome message returned by `/`.
pub const WELCOME_MESSAGE: &str = "Welcome to the Track Manager API";

/// Course (a platform event of type `piscine`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Event id.
    pub id: i64,

    /// Name of the underlying object.
    pub name: String,

    /// Campus hosting the event.
    pub campus: String,
}

/// Campus object as returned by the platform object API.
#[derive(Debug, Clone, Deserialize)]
pub struct Campus {
    pub id: i64,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attrs: Map<String, Value>,

    /// Child objects keyed by name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: BTreeMap<String, CampusChild>,
}

/// Deserialize `null` as the type's default, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Child object of a campus.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CampusChild {
    pub id: i64,

    /// Key of the child in the parent's `children` map.
    #[serde(default)]
    pub name: String,

    pub index: i64,
}

impl Campus {
    /// Copy each child's map key into its `name`.
    pub(crate) fn with_child_names(mut self) -> Self {
        for (key, child) in self.children.iter_mut() {
            child.name = key.clone();
        }
        self
    }
}

/// Response for `GET /campus`.
#[derive(Debug, Clone, Serialize)]
pub struct CampusResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<Campus> for CampusResponse {
    fn from(campus: Campus) -> Self {
        Self {
            id: campus.id,
            name: campus.name,
            kind: campus.kind,
        }
    }
}

/// Response for `GET /user/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNameResponse {
    pub first_name: String,
    pub last_name: String,
}

/// Response for `GET /user/roles`.
#[derive(Debug, Clone, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<String>,
}

/// Response for `GET /user/extractId`.
#[derive(Debug, Clone, Serialize)]
pub struct UserIdResponse {
    pub id: i64,
}

/// Body of `POST /campus/courses/register` and `/campus/courses/unregister`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRegistrationRequest {
    pub course_id: i64,
}

/// Confirmation message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status.
    pub status: String,

    /// Platform domain the service talks to.
    pub domain: String,

    /// Configured campus.
    pub campus: String,
}
