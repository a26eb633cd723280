//! In-memory [`Database`] implementation.
//!
//! Keeps the whole dataset behind a lock and serialises transactions with a
//! single writer lock held from [`Transact`] until [`Commit`], [`Rollback`]
//! or drop of the transactional client. Supports injecting [`Fault`]s for
//! exercising failure paths.

mod impls;

use std::{collections::BTreeMap, future::Future, sync::Arc};

use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracerr::Traced;

#[cfg(doc)]
use common::operations::{Commit, Rollback, Transact};

use crate::{
    domain::{
        amenity, contact, reservation, room, room_type, Amenity, Contact,
        Room, RoomType,
    },
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug)]
pub struct Memory<T = NonTx> {
    /// Shared [`Store`] of this client.
    store: Arc<Store>,

    /// Kind of this client.
    client: T,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rooms([])
    }

    /// Creates a new [`Memory`] database holding the provided [`Room`]s along
    /// with their [`RoomType`]s.
    #[must_use]
    pub fn with_rooms(rooms: impl IntoIterator<Item = Room>) -> Self {
        Self::seeded(rooms, [])
    }

    /// Creates a new [`Memory`] database holding the provided [`Room`]s along
    /// with their [`RoomType`]s, and the provided [`Amenity`] catalog.
    #[must_use]
    pub fn seeded(
        rooms: impl IntoIterator<Item = Room>,
        amenities: impl IntoIterator<Item = Amenity>,
    ) -> Self {
        let mut data = Data::default();
        for room in rooms {
            _ = data
                .room_types
                .insert(room.room_type.id, room.room_type.clone());
            _ = data.rooms.insert(room.id, room);
        }
        data.amenities = amenities.into_iter().map(|a| (a.id, a)).collect();
        Self {
            store: Arc::new(Store {
                data: RwLock::new(data),
                writer: Arc::new(Mutex::new(())),
                faults: Mutex::new(Vec::new()),
            }),
            client: NonTx,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Memory<T> {
    /// Schedules the provided [`Fault`] to happen once.
    pub async fn inject(&self, fault: Fault) {
        self.store.faults.lock().await.push(fault);
    }

    /// Removes the provided [`Fault`] if it was scheduled, returning whether
    /// it should happen now.
    async fn trigger(&self, fault: Fault) -> bool {
        let mut faults = self.store.faults.lock().await;
        faults
            .iter()
            .position(|f| *f == fault)
            .map(|i| faults.remove(i))
            .is_some()
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Copy, Debug)]
pub struct NonTx;

/// Transactional [`Memory`] client.
///
/// Works on its own copy of the data, published on commit only.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Work>>>);

/// Unfinished unit of work of a [`Tx`] client.
#[derive(Debug)]
struct Work {
    /// Working copy of the data.
    data: Data,

    /// Number of [`reservation::Link`]s inserted so far.
    links_inserted: usize,

    /// Number of [`reservation::Link`] updates attempted so far.
    links_updated: usize,

    /// Writer lock held until this [`Work`] is finished.
    _writer: OwnedMutexGuard<()>,
}

/// Shared state of [`Memory`] clients.
#[derive(Debug)]
struct Store {
    /// Committed data.
    data: RwLock<Data>,

    /// Lock serialising transactions.
    writer: Arc<Mutex<()>>,

    /// Scheduled [`Fault`]s.
    faults: Mutex<Vec<Fault>>,
}

/// Dataset of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
struct Data {
    /// Stored [`RoomType`]s.
    room_types: BTreeMap<room_type::Id, RoomType>,

    /// Stored [`Room`]s.
    rooms: BTreeMap<room::Id, Room>,

    /// Stored [`reservation::Header`]s.
    reservations: BTreeMap<reservation::Id, reservation::Header>,

    /// Stored [`reservation::Link`]s, never having their room resolved.
    links: Vec<reservation::Link>,

    /// Last generated [`reservation::Id`].
    last_reservation_id: i32,

    /// Stored [`Amenity`] catalog.
    amenities: BTreeMap<amenity::Id, Amenity>,

    /// Stored [`Contact`]s.
    contacts: BTreeMap<contact::Id, Contact>,

    /// Last generated [`contact::Id`].
    last_contact_id: i32,
}

/// Way a [`Memory`] client accesses the [`Data`].
trait Client {
    /// Runs the provided function over the [`Data`] visible to this client.
    fn read<R>(
        &self,
        store: &Store,
        f: impl FnOnce(&Data) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Client for NonTx {
    async fn read<R>(
        &self,
        store: &Store,
        f: impl FnOnce(&Data) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*store.data.read().await))
    }
}

impl Client for Tx {
    async fn read<R>(
        &self,
        _: &Store,
        f: impl FnOnce(&Data) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.with(|w| Ok(f(&w.data))).await
    }
}

impl Tx {
    /// Runs the provided function over the unfinished [`Work`] of this
    /// [`Tx`].
    async fn with<R>(
        &self,
        f: impl FnOnce(&mut Work) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut work = self.0.lock().await;
        let work = work
            .as_mut()
            .ok_or(Error::Finished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        f(work).map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    /// Finishes the [`Work`] of this [`Tx`], if it isn't yet.
    async fn finish(&self) -> Option<Work> {
        self.0.lock().await.take()
    }
}

/// Failure to be injected into a [`Memory`] database.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Fault {
    /// Inserting the [`reservation::Link`] with the provided zero-based
    /// index within a transaction fails.
    #[display("insertion of link #{_0}")]
    LinkInsert(usize),

    /// Updating the [`reservation::Link`] with the provided zero-based index
    /// within a transaction affects no rows, as if the link was missing.
    #[display("missing link #{_0} on update")]
    LinkMissing(usize),

    /// Committing a transaction fails, rolling it back.
    #[display("commit")]
    Commit,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Transaction was already committed or rolled back.
    #[display("transaction is already finished")]
    Finished,

    /// Referenced row doesn't exist.
    #[display("foreign key violation: {_0}")]
    ForeignKeyViolation(#[error(not(source))] &'static str),

    /// Injected [`Fault`] happened.
    #[display("injected fault: {_0}")]
    Injected(#[error(not(source))] Fault),

    /// Row with the same key already exists.
    #[display("unique violation: {_0}")]
    UniqueViolation(#[error(not(source))] &'static str),
}
