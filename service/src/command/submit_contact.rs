//! [`Command`] for submitting a new [`Contact`].

use std::fmt;

use common::operations::{
    Commit, Insert, Notify, Rollback, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contact, Contact},
    infra::{database, Database, Notifier},
    Service,
};

use super::{within, Command};

/// [`Command`] for submitting a new [`Contact`] through the contact form.
///
/// The staff is notified about the submission, unless notifications are
/// disabled in the [`Config`].
///
/// [`Config`]: crate::Config
#[derive(Clone, Debug)]
pub struct SubmitContact(pub contact::Request);

impl<Db, Nt> Command<SubmitContact> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<contact::Submission>,
            Ok = contact::Id,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>
        + Database<Rollback, Err = Traced<database::Error>>,
    Nt: Notifier<Notify<Contact>, Err: fmt::Display>,
{
    type Ok = Contact;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        SubmitContact(request): SubmitContact,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let submission = request
            .validate(self.now().coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = within(&tx, async {
            tx.execute(Insert(submission.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
        })
        .await?;
        let contact = submission.into_contact(id);

        if self.config().notifications {
            if let Err(e) =
                self.notifier().execute(Notify(contact.clone())).await
            {
                log::warn!(
                    contact.id = %contact.id,
                    "failed to notify about submitted contact: {e}",
                );
            }
        }

        Ok(contact)
    }
}

/// Error of [`SubmitContact`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Contact form is filled in wrong.
    #[display("invalid contact form: {_0}")]
    #[from]
    Request(contact::RequestError),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::contact,
        infra::memory::Fault,
        query,
        testing::fixture,
        Command as _, Config, Query as _,
    };

    use super::{ExecutionError, SubmitContact};

    fn form(name: &str) -> SubmitContact {
        SubmitContact(contact::Request {
            name: name.into(),
            email: "ana@example.com".into(),
            phone: Some("+51 984 123 456".into()),
            message: Some("Do you have a late check-out?".into()),
        })
    }

    #[tokio::test]
    async fn stores_new_contact_and_notifies_staff() {
        let (svc, notifier) = fixture(1);

        let contact = svc.execute(form("Ana Lopez")).await.unwrap();

        assert_eq!(contact.state, contact::State::New);
        assert_eq!(contact.responded_at, None);
        assert_eq!(contact.submitted_at, svc.now().coerce());
        assert_eq!(
            svc.execute(query::contact::All::by(())).await.unwrap(),
            [contact.clone()],
        );
        assert_eq!(notifier.contacts(), [contact]);
    }

    #[tokio::test]
    async fn rejects_invalid_form_without_storing() {
        let (svc, notifier) = fixture(1);

        let err = svc.execute(form("Al")).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Request(contact::RequestError::InvalidName),
        ));
        assert!(svc
            .execute(query::contact::All::by(()))
            .await
            .unwrap()
            .is_empty());
        assert!(notifier.contacts().is_empty());
    }

    #[tokio::test]
    async fn notifies_nobody_on_failed_commit() {
        let (svc, notifier) = fixture(1);
        svc.database().inject(Fault::Commit).await;

        let err = svc.execute(form("Ana Lopez")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert!(notifier.contacts().is_empty());
    }

    #[tokio::test]
    async fn survives_notification_failure() {
        let (svc, notifier) = fixture(1);
        notifier.fail();

        let contact = svc.execute(form("Ana Lopez")).await.unwrap();

        assert_eq!(notifier.contacts(), [contact]);
    }

    #[tokio::test]
    async fn skips_notification_when_disabled() {
        let (svc, notifier) = fixture(1);
        let svc = crate::Service::new(
            Config {
                notifications: false,
                ..*svc.config()
            },
            svc.database().clone(),
            notifier.clone(),
        );

        _ = svc.execute(form("Ana Lopez")).await.unwrap();

        assert!(notifier.contacts().is_empty());
    }
}
