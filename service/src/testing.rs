//! Fixtures shared by unit tests.

use std::sync::{Arc, Mutex};

use common::{operations::Notify, Date, DateTime, Money};

use crate::{
    command::CreateReservation,
    domain::{
        amenity,
        reservation::{self, request::RoomRequest},
        room, room_type, Amenity, Contact, Reservation, Room, RoomType,
    },
    infra::{Memory, Notifier},
    read::reservation::Summary,
    Clock, Command as _, Config, Service,
};

/// [`Service`] under test.
pub(crate) type TestService = Service<Memory, Recorder>;

/// Local "today" of the [`TestService`].
pub(crate) const TODAY: &str = "2024-05-01";

/// Parses a [`Date`] in the `YYYY-MM-DD` form.
pub(crate) fn date(s: &str) -> Date {
    s.parse().unwrap()
}

/// Builds an available [`Room`] with the provided ID, priced `100` a night.
pub(crate) fn room(id: i32) -> Room {
    Room {
        id: room::Id::from(id),
        name: room::Name::new(format!("Room {id}")).unwrap(),
        number: room::Number::new(format!("{}", 100 + id)).unwrap(),
        capacity: 2,
        status: room::Status::Available,
        description: String::new(),
        room_type: RoomType {
            id: room_type::Id::from(1),
            title: room_type::Title::new("Double").unwrap(),
            description: String::new(),
            adult_capacity: 2,
            child_capacity: 1,
            beds: 1,
            price: Money::from(100),
        },
    }
}

/// Builds the [`Amenity`] catalog seeded into every [`TestService`].
fn amenities() -> Vec<Amenity> {
    [(2, "Airport transfer", 25), (1, "Breakfast", 0)]
        .into_iter()
        .map(|(id, name, price)| Amenity {
            id: amenity::Id::from(id),
            name: amenity::Name::new(name).unwrap(),
            description: String::new(),
            price: Money::from(price),
        })
        .collect()
}

/// Creates a [`TestService`] over the provided [`Room`]s.
pub(crate) fn fixture_with(rooms: Vec<Room>) -> (TestService, Recorder) {
    let config = Config {
        clock: Clock::Fixed(
            DateTime::from_rfc3339("2024-05-01T12:00:00Z").unwrap(),
        ),
        ..Config::default()
    };
    let notifier = Recorder::default();
    let db = Memory::seeded(rooms, amenities());
    let svc = Service::new(config, db, notifier.clone());
    (svc, notifier)
}

/// Creates a [`TestService`] with available rooms numbered from `1` to
/// `count`.
pub(crate) fn fixture(count: i32) -> (TestService, Recorder) {
    fixture_with((1..=count).map(room).collect())
}

/// Books a single room for `100` a night in the provided initial `state`.
pub(crate) async fn book(
    svc: &TestService,
    room_id: i32,
    check_in: &str,
    check_out: &str,
    state: reservation::State,
) -> Reservation {
    svc.execute(CreateReservation(reservation::Request {
        client_id: "client-1".into(),
        adults: 1,
        children: 0,
        discount: None,
        confirmed_at: None,
        state: Some(state),
        rooms: vec![RoomRequest {
            room_id: room::Id::from(room_id),
            price: Money::from(100),
            check_in: date(check_in),
            check_out: date(check_out),
        }],
    }))
    .await
    .unwrap()
}

/// [`Notifier`] recording everything it's notified with.
#[derive(Clone, Debug, Default)]
pub(crate) struct Recorder {
    /// Recorded [`Summary`]s.
    sent: Arc<Mutex<Vec<Summary>>>,

    /// Recorded [`Contact`]s.
    contacts: Arc<Mutex<Vec<Contact>>>,

    /// Indicator whether notifying fails after recording.
    failing: Arc<Mutex<bool>>,
}

impl Recorder {
    /// Makes every further notification fail.
    pub(crate) fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Returns the recorded [`Summary`]s.
    pub(crate) fn sent(&self) -> Vec<Summary> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the recorded [`Contact`]s.
    pub(crate) fn contacts(&self) -> Vec<Contact> {
        self.contacts.lock().unwrap().clone()
    }
}

impl Notifier<Notify<Summary>> for Recorder {
    type Ok = ();
    type Err = String;

    async fn execute(
        &self,
        Notify(summary): Notify<Summary>,
    ) -> Result<Self::Ok, Self::Err> {
        self.sent.lock().unwrap().push(summary);
        if *self.failing.lock().unwrap() {
            return Err("mail server is down".into());
        }
        Ok(())
    }
}

impl Notifier<Notify<Contact>> for Recorder {
    type Ok = ();
    type Err = String;

    async fn execute(
        &self,
        Notify(contact): Notify<Contact>,
    ) -> Result<Self::Ok, Self::Err> {
        self.contacts.lock().unwrap().push(contact);
        if *self.failing.lock().unwrap() {
            return Err("mail server is down".into());
        }
        Ok(())
    }
}
