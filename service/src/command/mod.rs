//! [`Command`] definition.

pub mod cancel_reservation;
pub mod complete_reservation;
pub mod confirm_reservation;
pub mod create_reservation;
pub mod submit_contact;
pub mod update_contact_state;
pub mod update_reservation_state;

use std::future::Future;

use common::operations::{Commit, Rollback};
use tracerr::Traced;
use tracing as log;

use crate::infra::{database, Database};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_reservation::CancelReservation,
    complete_reservation::CompleteReservation,
    confirm_reservation::ConfirmReservation,
    create_reservation::CreateReservation,
    submit_contact::SubmitContact,
    update_contact_state::UpdateContactState,
    update_reservation_state::UpdateReservationState,
};

/// Runs the provided `work` as a unit of work of the transactional `tx`
/// client: commits it on success and rolls it back on failure.
async fn within<Tx, T, E>(
    tx: &Tx,
    work: impl Future<Output = Result<T, Traced<E>>>,
) -> Result<T, Traced<E>>
where
    Tx: Database<Commit, Err = Traced<database::Error>>
        + Database<Rollback, Err = Traced<database::Error>>,
    E: From<database::Error>,
{
    match work.await {
        Ok(out) => {
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(out)
        }
        Err(e) => {
            if let Err(rollback) = tx.execute(Rollback).await {
                log::warn!("failed to roll back transaction: {rollback}");
            }
            Err(e)
        }
    }
}
