use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::database::connection::DatabaseError;
use crate::database::models::{NewIndustry, NewSector};
use crate::database::schema::{exchanges, industries, sectors};

/// Maps free-text sector/industry labels and exchange codes to row ids
///
/// Sectors and industries are get-or-create; exchanges are lookup only.
/// Implementations are called from inside the per-ticker transaction, so a
/// failed ticker write also discards the dimension rows it created.
pub trait DimensionResolver {
    /// Blank or missing names resolve to `None` without touching storage
    fn resolve_sector(&mut self, name: Option<&str>) -> Result<Option<i32>, DatabaseError>;

    /// `sector_id` is only recorded when the industry row is first created
    fn resolve_industry(
        &mut self,
        name: Option<&str>,
        sector_id: Option<i32>,
    ) -> Result<Option<i32>, DatabaseError>;

    /// Unknown codes resolve to `None`
    fn resolve_exchange(&mut self, code: &str) -> Result<Option<i32>, DatabaseError>;
}

/// Trim a dimension label; blank labels mean "no dimension"
pub fn normalize_label(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

/// Postgres resolution: select, then `INSERT .. ON CONFLICT (name) DO NOTHING`
/// and select again. The unique constraint on `name` settles races between
/// concurrent syncs; the loser of the race reads the winner's row.
impl DimensionResolver for PgConnection {
    fn resolve_sector(&mut self, name: Option<&str>) -> Result<Option<i32>, DatabaseError> {
        let Some(name) = normalize_label(name) else {
            return Ok(None);
        };

        let existing = sectors::table
            .filter(sectors::name.eq(name))
            .select(sectors::id)
            .first::<i32>(self)
            .optional()?;

        if let Some(id) = existing {
            return Ok(Some(id));
        }

        diesel::insert_into(sectors::table)
            .values(&NewSector { name })
            .on_conflict(sectors::name)
            .do_nothing()
            .execute(self)?;

        let id = sectors::table
            .filter(sectors::name.eq(name))
            .select(sectors::id)
            .first::<i32>(self)?;

        tracing::debug!("Created sector '{}' (id {})", name, id);

        Ok(Some(id))
    }

    fn resolve_industry(
        &mut self,
        name: Option<&str>,
        sector_id: Option<i32>,
    ) -> Result<Option<i32>, DatabaseError> {
        let Some(name) = normalize_label(name) else {
            return Ok(None);
        };

        let existing = industries::table
            .filter(industries::name.eq(name))
            .select(industries::id)
            .first::<i32>(self)
            .optional()?;

        if let Some(id) = existing {
            return Ok(Some(id));
        }

        diesel::insert_into(industries::table)
            .values(&NewIndustry { name, sector_id })
            .on_conflict(industries::name)
            .do_nothing()
            .execute(self)?;

        let id = industries::table
            .filter(industries::name.eq(name))
            .select(industries::id)
            .first::<i32>(self)?;

        tracing::debug!("Created industry '{}' (id {})", name, id);

        Ok(Some(id))
    }

    fn resolve_exchange(&mut self, code: &str) -> Result<Option<i32>, DatabaseError> {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Ok(None);
        }

        exchanges::table
            .filter(exchanges::code.eq(code))
            .select(exchanges::id)
            .first::<i32>(self)
            .optional()
            .map_err(DatabaseError::from)
    }
}
