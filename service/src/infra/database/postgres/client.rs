//! Postgres database client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every statement runs in autocommit mode on a connection borrowed from the
/// [`connection::Pool`] for its duration.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to borrow connections from.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Borrows a [`connection::Pooled`] from the [`connection::Pool`].
    pub(crate) async fn pooled(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Begins a new transaction, returning the [`Tx`] client running in it.
    ///
    /// # Errors
    ///
    /// If failed to borrow a connection or to begin the transaction.
    pub async fn begin(&self) -> Result<Tx, Traced<database::Error>> {
        let client = self.pooled().await.map_err(tracerr::wrap!())?;
        let tx = connection::Transaction::begin(client)
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Tx(Arc::new(RwLock::new(Some(tx)))))
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.pooled()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.pooled()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.pooled()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// Clones share the same transaction. It's rolled back once the last clone is
/// dropped without committing.
#[derive(Clone, Debug)]
pub struct Tx(Arc<RwLock<Option<connection::Transaction>>>);

impl Tx {
    /// Returns the open [`connection::Transaction`] of this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// With [`postgres::Error::Finished`] if the transaction was committed or
    /// rolled back already.
    async fn transaction(
        &self,
    ) -> Result<
        RwLockReadGuard<'_, connection::Transaction>,
        Traced<database::Error>,
    > {
        RwLockReadGuard::try_map(self.0.read().await, Option::as_ref).map_err(
            |_| tracerr::new!(database::Error::from(postgres::Error::Finished)),
        )
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.0.write().await.take() else {
            // Finished already, so nothing to do.
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }

    /// Rolls back the transaction of this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to roll back the transaction.
    pub async fn rollback(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.0.write().await.take() else {
            return Ok(());
        };
        tx.rollback().await.map_err(tracerr::wrap!())
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.transaction()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.transaction()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.transaction()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
