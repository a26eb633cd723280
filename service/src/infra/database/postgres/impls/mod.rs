//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]
#![allow(clippy::too_many_lines, reason = "SQL-related code a bit verbose")]

/// Columns of a [`Room`] joined as `r` along with its [`RoomType`] joined
/// as `t`.
///
/// [`Room`]: crate::domain::Room
/// [`RoomType`]: crate::domain::RoomType
macro_rules! room_columns {
    () => {
        "r.room_id AS room_id, \
         r.name AS room_name, \
         r.number AS room_number, \
         r.capacity AS room_capacity, \
         r.status AS room_status, \
         r.description AS room_description, \
         t.room_type_id AS type_id, \
         t.title AS type_title, \
         t.description AS type_description, \
         t.adult_capacity AS type_adult_capacity, \
         t.child_capacity AS type_child_capacity, \
         t.bed_count AS type_bed_count, \
         t.price AS type_price"
    };
}

/// Columns of a [`Contact`].
///
/// [`Contact`]: crate::domain::Contact
macro_rules! contact_columns {
    () => {
        "contact_id, name, email, phone, message, \
         state, submitted_at, responded_at"
    };
}

mod amenity;
mod contact;
mod reservation;
mod room;

use async_trait::async_trait;
use common::operations::{Commit, Rollback, Transact};
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tracerr::Traced;

use crate::infra::{database, postgres, Database};

use super::{NonTx, Postgres, Tx};

impl Database<Transact> for Postgres<NonTx> {
    type Ok = Postgres<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        self.begin().await.map(Postgres).map_err(tracerr::wrap!())
    }
}

impl Database<Transact> for Postgres<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}

impl Database<Rollback> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Rollback) -> Result<Self::Ok, Self::Err> {
        self.rollback().await.map_err(tracerr::wrap!())
    }
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self.pooled().await.map_err(tracerr::wrap!())?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self.pooled().await.map_err(tracerr::wrap!())?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
