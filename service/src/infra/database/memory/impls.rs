//! [`Database`] implementations of the [`Memory`] clients.

use std::{collections::HashMap, sync::Arc};

use common::operations::{
    By, Commit, Insert, Lock, Rollback, Select, Transact, Update,
};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{
        availability::{self, Occupancy},
        contact,
        reservation::{self, link},
        room, Amenity, Contact, Reservation, Room, RoomType,
    },
    infra::{database, Database},
    read,
};

use super::{Client, Data, Error, Fault, Memory, NonTx, Tx, Work};

impl Data {
    /// Indicates whether the provided [`reservation::Link`] holds its room:
    /// it's active and its reservation isn't cancelled.
    fn holds(&self, link: &reservation::Link) -> bool {
        link.is_active()
            && self
                .reservations
                .get(&link.reservation_id)
                .is_some_and(|h| h.state != reservation::State::Cancelled)
    }

    /// Returns the provided [`reservation::Link`] with its room resolved.
    fn resolved(&self, link: &reservation::Link) -> reservation::Link {
        reservation::Link {
            room: self.rooms.get(&link.room_id).cloned(),
            ..link.clone()
        }
    }

    /// Assembles the [`Reservation`] with the provided ID.
    fn reservation(&self, id: reservation::Id) -> Option<Reservation> {
        let header = self.reservations.get(&id)?.clone();
        let mut rooms: Vec<_> = self
            .links
            .iter()
            .filter(|l| l.reservation_id == id)
            .map(|l| self.resolved(l))
            .collect();
        rooms.sort_by_key(|l| l.room_id);
        Some(Reservation { id, header, rooms })
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let writer = Arc::clone(&self.store.writer).lock_owned().await;
        let data = self.store.data.read().await.clone();
        Ok(Memory {
            store: Arc::clone(&self.store),
            client: Tx(Arc::new(Mutex::new(Some(Work {
                data,
                links_inserted: 0,
                links_updated: 0,
                _writer: writer,
            })))),
        })
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let Some(work) = self.client.finish().await else {
            // No transaction to commit, so nothing to do.
            return Ok(());
        };
        if self.trigger(Fault::Commit).await {
            return Err(tracerr::new!(database::Error::from(
                Error::Injected(Fault::Commit)
            )));
        }
        *self.store.data.write().await = work.data;
        Ok(())
    }
}

impl Database<Rollback> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Rollback) -> Result<Self::Ok, Self::Err> {
        drop(self.client.finish().await);
        Ok(())
    }
}

impl<T: Client> Database<Select<By<Vec<Room>, ()>>> for Memory<T> {
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Room>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .read(&self.store, |d| d.rooms.values().cloned().collect())
            .await
    }
}

impl<T: Client> Database<Select<By<Vec<RoomType>, ()>>> for Memory<T> {
    type Ok = Vec<RoomType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<RoomType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .read(&self.store, |d| d.room_types.values().cloned().collect())
            .await
    }
}

impl<T: Client> Database<Select<By<Vec<Amenity>, ()>>> for Memory<T> {
    type Ok = Vec<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Amenity>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .read(&self.store, |d| d.amenities.values().cloned().collect())
            .await
    }
}

impl<T, IDs> Database<Select<By<HashMap<room::Id, Room>, IDs>>> for Memory<T>
where
    T: Client,
    IDs: AsRef<[room::Id]>,
{
    type Ok = HashMap<room::Id, Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<room::Id, Room>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        self.client
            .read(&self.store, |d| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| d.rooms.get(id))
                    .map(|r| (r.id, r.clone()))
                    .collect()
            })
            .await
    }
}

impl<T: Client> Database<Select<By<read::room::InServiceCount, ()>>>
    for Memory<T>
{
    type Ok = read::room::InServiceCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::room::InServiceCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .read(&self.store, |d| {
                let count = d.rooms.values().filter(|r| r.is_in_service());
                u32::try_from(count.count()).unwrap_or(u32::MAX).into()
            })
            .await
    }
}

impl<T: Client> Database<Select<By<Vec<Room>, read::room::Vacant>>>
    for Memory<T>
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, read::room::Vacant>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::room::Vacant(stay) = by.into_inner();
        self.client
            .read(&self.store, |d| {
                d.rooms
                    .values()
                    .filter(|r| r.is_in_service())
                    .filter(|r| {
                        availability::is_free(
                            &stay,
                            d.links
                                .iter()
                                .filter(|l| l.room_id == r.id && d.holds(l))
                                .map(|l| &l.stay),
                        )
                    })
                    .cloned()
                    .collect()
            })
            .await
    }
}

impl<T: Client>
    Database<
        Select<
            By<Option<read::availability::Conflict>, read::availability::Stay>,
        >,
    > for Memory<T>
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
        self.client
            .read(&self.store, |d| {
                d.links
                    .iter()
                    .find(|l| {
                        l.room_id == room_id
                            && d.holds(l)
                            && l.stay.overlaps(&stay)
                    })
                    .map(|l| read::availability::Conflict {
                        reservation_id: l.reservation_id,
                        stay: l.stay,
                    })
            })
            .await
    }
}

impl<T: Client>
    Database<Select<By<Vec<Occupancy>, read::availability::Window>>>
    for Memory<T>
{
    type Ok = Vec<Occupancy>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Occupancy>, read::availability::Window>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::availability::Window { from, to } = by.into_inner();
        self.client
            .read(&self.store, |d| {
                d.links
                    .iter()
                    .filter(|l| {
                        l.is_active()
                            && l.stay.touches_window(from, to)
                            && d.reservations.get(&l.reservation_id).is_some_and(
                                |h| h.state == reservation::State::Confirmed,
                            )
                    })
                    .map(|l| Occupancy {
                        room_id: l.room_id,
                        stay: l.stay,
                    })
                    .collect()
            })
            .await
    }
}

impl<T: Client> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Memory<T>
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.client.read(&self.store, |d| d.reservation(id)).await
    }
}

impl<T: Client>
    Database<Select<By<Vec<Reservation>, reservation::ClientId>>>
    for Memory<T>
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, reservation::ClientId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let client_id = by.into_inner();
        self.client
            .read(&self.store, |d| {
                let mut found: Vec<_> = d
                    .reservations
                    .iter()
                    .filter(|(_, h)| h.client_id == client_id)
                    .filter_map(|(id, _)| d.reservation(*id))
                    .collect();
                found.sort_by(|a, b| {
                    b.header
                        .confirmed_at
                        .cmp(&a.header.confirmed_at)
                        .then(b.id.cmp(&a.id))
                });
                found
            })
            .await
    }
}

impl<T: Client>
    Database<Select<By<Vec<reservation::Link>, read::reservation::InRange>>>
    for Memory<T>
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
        self.client
            .read(&self.store, |d| {
                let mut found: Vec<_> = d
                    .links
                    .iter()
                    .filter(|l| d.holds(l) && l.stay.touches_window(from, to))
                    .map(|l| d.resolved(l))
                    .collect();
                found.sort_by_key(|l| {
                    (l.stay.check_in(), l.reservation_id, l.room_id)
                });
                found
            })
            .await
    }
}

impl<T: Client> Database<Select<By<Vec<Contact>, ()>>> for Memory<T> {
    type Ok = Vec<Contact>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Contact>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .read(&self.store, |d| {
                let mut found: Vec<_> = d.contacts.values().cloned().collect();
                found.sort_by(|a, b| {
                    b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id))
                });
                found
            })
            .await
    }
}

impl<T: Client> Database<Select<By<Option<Contact>, contact::Id>>>
    for Memory<T>
{
    type Ok = Option<Contact>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contact>, contact::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.client
            .read(&self.store, |d| d.contacts.get(&id).cloned())
            .await
    }
}

impl Database<Lock<By<Room, room::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are exclusive already.
        Ok(())
    }
}

impl Database<Lock<By<Reservation, reservation::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Reservation, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are exclusive already.
        Ok(())
    }
}

impl Database<Insert<reservation::Header>> for Memory<Tx> {
    type Ok = reservation::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(header): Insert<reservation::Header>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .with(|w| {
                w.data.last_reservation_id += 1;
                let id = reservation::Id::from(w.data.last_reservation_id);
                _ = w.data.reservations.insert(id, header);
                Ok(id)
            })
            .await
    }
}

impl Database<Insert<reservation::Link>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(link): Insert<reservation::Link>,
    ) -> Result<Self::Ok, Self::Err> {
        let n = self.client.with(|w| Ok(w.links_inserted)).await?;
        if self.trigger(Fault::LinkInsert(n)).await {
            return Err(tracerr::new!(database::Error::from(
                Error::Injected(Fault::LinkInsert(n))
            )));
        }

        self.client
            .with(|w| {
                if !w.data.reservations.contains_key(&link.reservation_id) {
                    return Err(Error::ForeignKeyViolation("reservation_id"));
                }
                if !w.data.rooms.contains_key(&link.room_id) {
                    return Err(Error::ForeignKeyViolation("room_id"));
                }
                if w.data.links.iter().any(|l| l.key() == link.key()) {
                    return Err(Error::UniqueViolation("reservation_rooms_pkey"));
                }
                w.data.links.push(reservation::Link { room: None, ..link });
                w.links_inserted += 1;
                Ok(())
            })
            .await
    }
}

impl Database<Update<reservation::StateChange>> for Memory<Tx> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<reservation::StateChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let reservation::StateChange { id, state } = change;
        self.client
            .with(|w| {
                let header = w.data.reservations.get_mut(&id);
                Ok(header.map(|h| h.state = state).is_some())
            })
            .await
    }
}

impl Database<Update<link::StateChange>> for Memory<Tx> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<link::StateChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let link::StateChange { key, state } = change;
        let n = self
            .client
            .with(|w| {
                w.links_updated += 1;
                Ok(w.links_updated - 1)
            })
            .await?;
        if self.trigger(Fault::LinkMissing(n)).await {
            return Ok(false);
        }

        self.client
            .with(|w| {
                let link = w.data.links.iter_mut().find(|l| l.key() == key);
                Ok(link.map(|l| l.state = state).is_some())
            })
            .await
    }
}

impl Database<Insert<contact::Submission>> for Memory<Tx> {
    type Ok = contact::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(submission): Insert<contact::Submission>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client
            .with(|w| {
                w.data.last_contact_id += 1;
                let id = contact::Id::from(w.data.last_contact_id);
                _ = w.data.contacts.insert(id, submission.into_contact(id));
                Ok(id)
            })
            .await
    }
}

impl Database<Update<contact::StateChange>> for Memory<Tx> {
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
        self.client
            .with(|w| {
                let contact = w.data.contacts.get_mut(&id);
                Ok(contact
                    .map(|c| {
                        c.state = state;
                        c.responded_at = Some(responded_at);
                    })
                    .is_some())
            })
            .await
    }
}
