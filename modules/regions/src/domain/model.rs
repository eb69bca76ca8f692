use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// Tehsil read model. The owning district is carried both by id and by its
/// joined name, so listings render without a second lookup.
#[derive(Clone, Debug, PartialEq, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct Tehsil {
    pub id: i32,
    pub name: String,
    pub district_id: i32,
    /// `None` when the district row is gone (left join miss).
    pub district_name: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Write payload for create and update. `id: None` inserts a new row,
/// `Some` updates the row in place.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TehsilWrite {
    pub id: Option<i32>,
    pub name: String,
    pub district_id: i32,
}

/// `{id, name}` projection row for dropdowns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TehsilRef {
    pub id: i32,
    pub name: String,
}
