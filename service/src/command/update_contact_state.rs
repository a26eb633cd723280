//! [`Command`] for moving a [`Contact`] into another [`State`].

use common::operations::{
    By, Commit, Rollback, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contact::{self, State},
        Contact,
    },
    infra::{database, Database},
    Service,
};

use super::{within, Command};

/// [`Command`] for moving a [`Contact`] into another [`State`].
///
/// Any [`State`] may follow any other one. Every change stamps the moment
/// the staff responded.
#[derive(Clone, Copy, Debug)]
pub struct UpdateContactState {
    /// ID of the [`Contact`] to update.
    pub contact_id: contact::Id,

    /// [`State`] to move the [`Contact`] into.
    pub state: State,
}

impl<Db, Nt> Command<UpdateContactState> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Update<contact::StateChange>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contact>, contact::Id>>,
            Ok = Option<Contact>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>
        + Database<Rollback, Err = Traced<database::Error>>,
{
    type Ok = Contact;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateContactState,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateContactState {
            contact_id: id,
            state,
        } = cmd;
        let responded_at = self.now().coerce();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        within(&tx, async {
            let updated = tx
                .execute(Update(contact::StateChange {
                    id,
                    state,
                    responded_at,
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !updated {
                return Err(tracerr::new!(E::ContactNotExists(id)));
            }

            tx.execute(Select(By::<Option<Contact>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ContactNotExists(id))
                .map_err(tracerr::wrap!())
        })
        .await
    }
}

/// Error of [`UpdateContactState`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contact`] with the provided ID does not exist.
    #[display("`Contact(id: {_0})` does not exist")]
    ContactNotExists(#[error(not(source))] contact::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
