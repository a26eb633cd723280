//! [`Reservation`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    DateRange,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        availability::Occupancy,
        reservation::{self, link},
        Reservation,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::room::parse_room;

/// Parses a stay out of the `check_in` and `check_out` columns of the
/// provided [`Row`].
fn parse_stay(row: &Row) -> DateRange {
    DateRange::new(row.get("check_in"), row.get("check_out"))
        .expect("`check_out` is after `check_in`")
}

/// Parses a [`reservation::Link`] out of the provided [`Row`], along with its
/// room, if it was joined.
fn parse_link(row: &Row) -> reservation::Link {
    reservation::Link {
        reservation_id: row.get("reservation_id"),
        room_id: row.get("link_room_id"),
        price: row.get("price"),
        stay: parse_stay(row),
        state: row.get("state"),
        room: parse_room(row),
    }
}

impl<C, IDs> Database<Select<By<HashMap<reservation::Id, Reservation>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[reservation::Id]>,
{
    type Ok = HashMap<reservation::Id, Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<reservation::Id, Reservation>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[reservation::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT reservation_id, client_id, adults, children, \
                   subtotal, discount, confirmed_at, state \
            FROM reservations \
            WHERE reservation_id = ANY($1::INT4[])";
        let mut reservations = self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("reservation_id");
                let header = reservation::Header {
                    client_id: row.get("client_id"),
                    adults: u16::try_from(row.get::<_, i32>("adults"))
                        .expect("`adults` overflow"),
                    children: u16::try_from(row.get::<_, i32>("children"))
                        .expect("`children` overflow"),
                    subtotal: row.get("subtotal"),
                    discount: row.get("discount"),
                    confirmed_at: row.get("confirmed_at"),
                    state: row.get("state"),
                };
                (
                    id,
                    Reservation {
                        id,
                        header,
                        rooms: vec![],
                    },
                )
            })
            .collect::<HashMap<_, _>>();

        const LINKS_SQL: &str = concat!(
            "SELECT rr.reservation_id, rr.room_id AS link_room_id, \
                    rr.price, rr.check_in, rr.check_out, rr.state, ",
            room_columns!(),
            " FROM reservation_rooms rr \
              LEFT JOIN rooms r ON r.room_id = rr.room_id \
              LEFT JOIN room_types t ON t.room_type_id = r.room_type_id \
              WHERE rr.reservation_id = ANY($1::INT4[]) \
              ORDER BY rr.reservation_id, rr.room_id",
        );
        for row in self
            .query(LINKS_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
        {
            let link = parse_link(&row);
            if let Some(r) = reservations.get_mut(&link.reservation_id) {
                r.rooms.push(link);
            }
        }

        Ok(reservations)
    }
}

impl<C> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<reservation::Id, Reservation>, [reservation::Id; 1]>>,
        Ok = HashMap<reservation::Id, Reservation>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Reservation>, reservation::ClientId>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<reservation::Id, Reservation>, Vec<reservation::Id>>>,
        Ok = HashMap<reservation::Id, Reservation>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, reservation::ClientId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let client_id: reservation::ClientId = by.into_inner();

        const SQL: &str = "\
            SELECT reservation_id \
            FROM reservations \
            WHERE client_id = $1::VARCHAR \
            ORDER BY confirmed_at DESC, reservation_id DESC";
        let ids: Vec<reservation::Id> = self
            .query(SQL, &[&client_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("reservation_id"))
            .collect();

        let mut found = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| found.remove(&id)).collect())
    }
}

impl<C>
    Database<Select<By<Vec<reservation::Link>, read::reservation::InRange>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<reservation::Link>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<reservation::Link>, read::reservation::InRange>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::reservation::InRange { from, to } = by.into_inner();

        const SQL: &str = concat!(
            "SELECT rr.reservation_id, rr.room_id AS link_room_id, \
                    rr.price, rr.check_in, rr.check_out, rr.state, ",
            room_columns!(),
            " FROM reservation_rooms rr \
              JOIN reservations res ON res.reservation_id = rr.reservation_id \
              LEFT JOIN rooms r ON r.room_id = rr.room_id \
              LEFT JOIN room_types t ON t.room_type_id = r.room_type_id \
              WHERE rr.state = $1::INT2 \
                AND res.state <> $2::INT2 \
                AND rr.check_in <= $4::DATE \
                AND rr.check_out >= $3::DATE \
              ORDER BY rr.check_in, rr.reservation_id, rr.room_id",
        );
        Ok(self
            .query(
                SQL,
                &[
                    &link::State::Active,
                    &reservation::State::Cancelled,
                    &from,
                    &to,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(parse_link)
            .collect())
    }
}

impl<C>
    Database<
        Select<
            By<Option<read::availability::Conflict>, read::availability::Stay>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::availability::Conflict>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::availability::Conflict>, read::availability::Stay>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::availability::Stay { room_id, stay } = by.into_inner();

        const SQL: &str = "\
            SELECT rr.reservation_id, rr.check_in, rr.check_out \
            FROM reservation_rooms rr \
            JOIN reservations res ON res.reservation_id = rr.reservation_id \
            WHERE rr.room_id = $1::INT4 \
              AND rr.state = $2::INT2 \
              AND res.state <> $3::INT2 \
              AND rr.check_in < $5::DATE \
              AND rr.check_out > $4::DATE \
            LIMIT 1";
        Ok(self
            .query_opt(
                SQL,
                &[
                    &room_id,
                    &link::State::Active,
                    &reservation::State::Cancelled,
                    &stay.check_in(),
                    &stay.check_out(),
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| read::availability::Conflict {
                reservation_id: row.get("reservation_id"),
                stay: parse_stay(&row),
            }))
    }
}

impl<C> Database<Select<By<Vec<Occupancy>, read::availability::Window>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Occupancy>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Occupancy>, read::availability::Window>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::availability::Window { from, to } = by.into_inner();

        const SQL: &str = "\
            SELECT rr.room_id, rr.check_in, rr.check_out \
            FROM reservation_rooms rr \
            JOIN reservations res ON res.reservation_id = rr.reservation_id \
            WHERE rr.state = $1::INT2 \
              AND res.state = $2::INT2 \
              AND rr.check_in <= $4::DATE \
              AND rr.check_out >= $3::DATE";
        Ok(self
            .query(
                SQL,
                &[
                    &link::State::Active,
                    &reservation::State::Confirmed,
                    &from,
                    &to,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Occupancy {
                room_id: row.get("room_id"),
                stay: parse_stay(row),
            })
            .collect())
    }
}

impl<C> Database<Lock<By<Reservation, reservation::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Reservation, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reservation::Id = by.into_inner();

        const SQL: &str = "\
            SELECT reservation_id \
            FROM reservations \
            WHERE reservation_id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<reservation::Header>> for Postgres<C>
where
    C: Connection,
{
    type Ok = reservation::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(header): Insert<reservation::Header>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation::Header {
            client_id,
            adults,
            children,
            subtotal,
            discount,
            confirmed_at,
            state,
        } = header;

        let adults = i32::from(adults);
        let children = i32::from(children);

        const SQL: &str = "\
            INSERT INTO reservations (\
                client_id, adults, children, \
                subtotal, discount, \
                confirmed_at, state \
            ) VALUES (\
                $1::VARCHAR, $2::INT4, $3::INT4, \
                $4::NUMERIC, $5::NUMERIC, \
                $6::TIMESTAMPTZ, $7::INT2 \
            ) \
            RETURNING reservation_id";
        let row = self
            .query_opt(
                SQL,
                &[
                    &client_id,
                    &adults,
                    &children,
                    &subtotal,
                    &discount,
                    &confirmed_at,
                    &state,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`RETURNING` always returns a row");
        Ok(row.get("reservation_id"))
    }
}

impl<C> Database<Insert<reservation::Link>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(link): Insert<reservation::Link>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation::Link {
            reservation_id,
            room_id,
            price,
            stay,
            state,
            room: _,
        } = link;

        const SQL: &str = "\
            INSERT INTO reservation_rooms (\
                reservation_id, room_id, price, \
                check_in, check_out, state \
            ) VALUES (\
                $1::INT4, $2::INT4, $3::NUMERIC, \
                $4::DATE, $5::DATE, $6::INT2 \
            )";
        self.exec(
            SQL,
            &[
                &reservation_id,
                &room_id,
                &price,
                &stay.check_in(),
                &stay.check_out(),
                &state,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<reservation::StateChange>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<reservation::StateChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation::StateChange { id, state } = change;

        const SQL: &str = "\
            UPDATE reservations \
            SET state = $2::INT2 \
            WHERE reservation_id = $1::INT4";
        self.exec(SQL, &[&id, &state])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C> Database<Update<link::StateChange>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<link::StateChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let link::StateChange {
            key:
                link::Key {
                    reservation_id,
                    room_id,
                },
            state,
        } = change;

        const SQL: &str = "\
            UPDATE reservation_rooms \
            SET state = $3::INT2 \
            WHERE reservation_id = $1::INT4 \
              AND room_id = $2::INT4";
        self.exec(SQL, &[&reservation_id, &room_id, &state])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}
