//! [`Room`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{reservation, room, Room, RoomType},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Parses a [`Room`] out of the `room_columns!` of the provided [`Row`].
///
/// [`None`] is returned if the [`Room`] wasn't joined.
pub(super) fn parse_room(row: &Row) -> Option<Room> {
    let id = row.get::<_, Option<room::Id>>("room_id")?;
    Some(Room {
        id,
        name: row.get("room_name"),
        number: row.get("room_number"),
        capacity: u16::try_from(row.get::<_, i32>("room_capacity"))
            .expect("`capacity` overflow"),
        status: row.get("room_status"),
        description: row.get("room_description"),
        room_type: parse_room_type(row),
    })
}

/// Parses a [`RoomType`] out of the `room_columns!` of the provided [`Row`].
fn parse_room_type(row: &Row) -> RoomType {
    RoomType {
        id: row.get("type_id"),
        title: row.get("type_title"),
        description: row.get("type_description"),
        adult_capacity: u16::try_from(row.get::<_, i32>("type_adult_capacity"))
            .expect("`adult_capacity` overflow"),
        child_capacity: u16::try_from(row.get::<_, i32>("type_child_capacity"))
            .expect("`child_capacity` overflow"),
        beds: u16::try_from(row.get::<_, i32>("type_bed_count"))
            .expect("`bed_count` overflow"),
        price: row.get("type_price"),
    }
}

impl<C> Database<Select<By<Vec<Room>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Room>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = concat!(
            "SELECT ",
            room_columns!(),
            " FROM rooms r \
              JOIN room_types t ON t.room_type_id = r.room_type_id \
              ORDER BY r.room_id",
        );
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .filter_map(parse_room)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<RoomType>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RoomType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<RoomType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT t.room_type_id AS type_id, \
                   t.title AS type_title, \
                   t.description AS type_description, \
                   t.adult_capacity AS type_adult_capacity, \
                   t.child_capacity AS type_child_capacity, \
                   t.bed_count AS type_bed_count, \
                   t.price AS type_price \
            FROM room_types t \
            ORDER BY t.room_type_id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(parse_room_type)
            .collect())
    }
}

impl<C, IDs> Database<Select<By<HashMap<room::Id, Room>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[room::Id]>,
{
    type Ok = HashMap<room::Id, Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<room::Id, Room>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[room::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = concat!(
            "SELECT ",
            room_columns!(),
            " FROM rooms r \
              JOIN room_types t ON t.room_type_id = r.room_type_id \
              WHERE r.room_id = ANY($1::INT4[])",
        );
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .filter_map(parse_room)
            .map(|r| (r.id, r))
            .collect())
    }
}

impl<C> Database<Select<By<read::room::InServiceCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room::InServiceCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::room::InServiceCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*) AS total \
            FROM rooms \
            WHERE status = $1::INT2";
        let row = self
            .query_opt(SQL, &[&room::Status::Available])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(row
            .map_or(0, |r| {
                u32::try_from(r.get::<_, i64>("total"))
                    .expect("`total` overflow")
            })
            .into())
    }
}

impl<C> Database<Select<By<Vec<Room>, read::room::Vacant>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, read::room::Vacant>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::room::Vacant(stay) = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            room_columns!(),
            " FROM rooms r \
              JOIN room_types t ON t.room_type_id = r.room_type_id \
              WHERE r.status = $1::INT2 \
                AND NOT EXISTS (\
                    SELECT 1 \
                    FROM reservation_rooms rr \
                    JOIN reservations res \
                      ON res.reservation_id = rr.reservation_id \
                    WHERE rr.room_id = r.room_id \
                      AND rr.state = $2::INT2 \
                      AND res.state <> $3::INT2 \
                      AND rr.check_in < $5::DATE \
                      AND rr.check_out > $4::DATE\
                ) \
              ORDER BY r.room_id",
        );
        Ok(self
            .query(
                SQL,
                &[
                    &room::Status::Available,
                    &reservation::link::State::Active,
                    &reservation::State::Cancelled,
                    &stay.check_in(),
                    &stay.check_out(),
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .filter_map(parse_room)
            .collect())
    }
}

impl<C> Database<Lock<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        const SQL: &str = "\
            SELECT room_id \
            FROM rooms \
            WHERE room_id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
