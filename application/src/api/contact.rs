//! [`Contact`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::domain;

use crate::{api, Context};

/// A message left through the contact form of the hotel.
#[derive(Clone, Debug, From)]
pub struct Contact(domain::Contact);

/// A message left through the contact form of the hotel.
#[graphql_object(context = Context)]
impl Contact {
    /// Unique identifier of this `Contact`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contact.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of the visitor.
    pub fn name(&self) -> &str {
        self.0.name.as_ref()
    }

    /// Email address to answer the visitor at.
    pub fn email(&self) -> &str {
        self.0.email.as_ref()
    }

    /// Phone number of the visitor, if left.
    pub fn phone(&self) -> Option<&str> {
        self.0.phone.as_ref().map(AsRef::as_ref)
    }

    /// Message of the visitor, if left.
    pub fn message(&self) -> Option<&str> {
        self.0.message.as_ref().map(AsRef::as_ref)
    }

    /// Handling state of this `Contact`.
    pub fn state(&self) -> State {
        self.0.state.into()
    }

    /// `DateTime` this `Contact` was submitted.
    pub fn submitted_at(&self) -> DateTime {
        self.0.submitted_at.coerce()
    }

    /// `DateTime` the state of this `Contact` was last changed by the staff.
    pub fn responded_at(&self) -> Option<DateTime> {
        self.0.responded_at.map(|at| at.coerce())
    }
}

/// Unique identifier of a `Contact`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::contact::Id)]
#[into(domain::contact::Id)]
#[graphql(name = "ContactId", transparent)]
pub struct Id(i32);

/// Handling state of a `Contact`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ContactState")]
pub enum State {
    /// Nobody looked at the `Contact` yet.
    New,

    /// Staff is working on the `Contact`.
    InProgress,

    /// Visitor has been answered.
    Answered,

    /// `Contact` needs no further handling.
    Closed,
}

impl From<domain::contact::State> for State {
    fn from(state: domain::contact::State) -> Self {
        use domain::contact::State as S;

        match state {
            S::New => Self::New,
            S::InProgress => Self::InProgress,
            S::Answered => Self::Answered,
            S::Closed => Self::Closed,
        }
    }
}

/// Contact form filled in by a visitor.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ContactInput")]
pub struct NewContact {
    /// Name of the visitor, from 3 to 100 characters.
    pub name: String,

    /// Email address of the visitor.
    pub email: String,

    /// Phone number of the visitor, if any.
    pub phone: Option<String>,

    /// Message of the visitor, if any.
    pub message: Option<String>,
}

impl From<NewContact> for domain::contact::Request {
    fn from(input: NewContact) -> Self {
        let NewContact {
            name,
            email,
            phone,
            message,
        } = input;
        Self {
            name,
            email,
            phone,
            message,
        }
    }
}
