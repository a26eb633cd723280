//! [`Notifier`] implementations.

use std::convert::Infallible;

use common::operations::Notify;
use tracing as log;

use crate::{domain::Contact, read::reservation::Summary};

/// Notification of guests and staff.
pub use common::Handler as Notifier;

/// [`Notifier`] writing a structured log line per notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Notifier<Notify<Summary>> for Log {
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Notify(summary): Notify<Summary>,
    ) -> Result<Self::Ok, Self::Err> {
        for room in &summary.rooms {
            log::info!(
                reservation.id = %summary.id,
                room.name = %room.name,
                room.number = %room.number,
                check_in = %room.stay.check_in(),
                check_out = %room.stay.check_out(),
                nights = room.nights,
                price = %room.price,
                "room booked",
            );
        }
        log::info!(
            reservation.id = %summary.id,
            client.id = %summary.client_id,
            adults = summary.adults,
            children = summary.children,
            subtotal = %summary.subtotal,
            discount = %summary.discount,
            total = %summary.total,
            "reservation confirmed",
        );
        Ok(())
    }
}

impl Notifier<Notify<Contact>> for Log {
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Notify(contact): Notify<Contact>,
    ) -> Result<Self::Ok, Self::Err> {
        log::info!(
            contact.id = %contact.id,
            contact.name = %contact.name,
            contact.email = %contact.email,
            contact.phone = ?contact.phone.as_ref().map(ToString::to_string),
            has_message = contact.message.is_some(),
            "contact submitted",
        );
        Ok(())
    }
}

/// [`Notifier`] doing nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Disabled;

impl<T> Notifier<Notify<T>> for Disabled {
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Notify<T>) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
