//! [`Amenity`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::Amenity,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Parses an [`Amenity`] out of the provided [`Row`].
fn parse_amenity(row: &Row) -> Amenity {
    Amenity {
        id: row.get("amenity_id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
    }
}

impl<C> Database<Select<By<Vec<Amenity>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Amenity>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT amenity_id, name, description, price \
            FROM amenities \
            ORDER BY amenity_id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(parse_amenity)
            .collect())
    }
}
