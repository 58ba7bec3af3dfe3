use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Exchange row - pre-seeded, read-only at sync time
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::exchanges)]
pub struct Exchange {
    pub id: i32,
    /// Exchange code (e.g., "NASDAQ")
    pub code: String,
    pub name: String,
}

/// Sector row, created lazily the first time a sync sees its name
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::sectors)]
pub struct Sector {
    pub id: i32,
    pub name: String,
}

/// Industry row, optionally tied to the sector it was first seen with
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::industries)]
pub struct Industry {
    pub id: i32,
    pub name: String,
    pub sector_id: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::sectors)]
pub struct NewSector<'a> {
    pub name: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::industries)]
pub struct NewIndustry<'a> {
    pub name: &'a str,
    pub sector_id: Option<i32>,
}
