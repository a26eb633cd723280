//! [`Contact`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{contact, Contact},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Parses a [`Contact`] out of the `contact_columns!` of the provided [`Row`].
fn parse_contact(row: &Row) -> Contact {
    Contact {
        id: row.get("contact_id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        state: row.get("state"),
        submitted_at: row.get("submitted_at"),
        responded_at: row.get("responded_at"),
    }
}

impl<C> Database<Select<By<Vec<Contact>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contact>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Contact>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = concat!(
            "SELECT ",
            contact_columns!(),
            " FROM contacts \
              ORDER BY submitted_at DESC, contact_id DESC",
        );
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(parse_contact)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Contact>, contact::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Contact>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contact>, contact::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: contact::Id = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            contact_columns!(),
            " FROM contacts \
              WHERE contact_id = $1::INT4",
        );
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(parse_contact))
    }
}

impl<C> Database<Insert<contact::Submission>> for Postgres<C>
where
    C: Connection,
{
    type Ok = contact::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(submission): Insert<contact::Submission>,
    ) -> Result<Self::Ok, Self::Err> {
        let contact::Submission {
            name,
            email,
            phone,
            message,
            submitted_at,
        } = submission;

        const SQL: &str = "\
            INSERT INTO contacts (\
                name, email, phone, message, \
                state, submitted_at \
            ) VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::TEXT, \
                $5::INT2, $6::TIMESTAMPTZ \
            ) \
            RETURNING contact_id";
        let row = self
            .query_opt(
                SQL,
                &[
                    &name,
                    &email,
                    &phone,
                    &message,
                    &contact::State::New,
                    &submitted_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`RETURNING` always returns a row");
        Ok(row.get("contact_id"))
    }
}

impl<C> Database<Update<contact::StateChange>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<contact::StateChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let contact::StateChange {
            id,
            state,
            responded_at,
        } = change;

        const SQL: &str = "\
            UPDATE contacts \
            SET state = $2::INT2, \
                responded_at = $3::TIMESTAMPTZ \
            WHERE contact_id = $1::INT4";
        self.exec(SQL, &[&id, &state, &responded_at])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}
