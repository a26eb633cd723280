//! [`Query`] collection related to [`Contact`]s.

use common::operations::By;

use crate::domain::Contact;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries every [`Contact`], the most recently submitted first.
pub type All = DatabaseQuery<By<Vec<Contact>, ()>>;

#[cfg(test)]
mod spec {
    use crate::{
        command::SubmitContact,
        domain::contact,
        testing::fixture,
        Command as _, Query as _,
    };

    use super::All;

    #[tokio::test]
    async fn lists_latest_first() {
        let (svc, _) = fixture(1);
        for name in ["Ana Lopez", "Luis Quispe"] {
            _ = svc
                .execute(SubmitContact(contact::Request {
                    name: name.into(),
                    email: "guest@example.com".into(),
                    ..contact::Request::default()
                }))
                .await
                .unwrap();
        }

        let contacts = svc.execute(All::by(())).await.unwrap();

        assert_eq!(
            contacts.iter().map(|c| c.name.to_string()).collect::<Vec<_>>(),
            ["Luis Quispe", "Ana Lopez"],
        );
        assert!(contacts.iter().all(|c| c.state == contact::State::New));
    }
}
