//! [`Contact`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;

/// Message left by a visitor through the contact form of the hotel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contact {
    /// ID of this [`Contact`].
    pub id: Id,

    /// [`Name`] of the visitor.
    pub name: Name,

    /// [`Email`] to answer the visitor at.
    pub email: Email,

    /// [`Phone`] of the visitor, if left.
    pub phone: Option<Phone>,

    /// [`Message`] of the visitor, if left.
    pub message: Option<Message>,

    /// Handling [`State`] of this [`Contact`].
    pub state: State,

    /// [`DateTime`] this [`Contact`] was submitted.
    pub submitted_at: SubmissionDateTime,

    /// [`DateTime`] the [`State`] of this [`Contact`] was last changed by the
    /// staff.
    pub responded_at: Option<ResponseDateTime>,
}

/// Validated [`Contact`] which isn't stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Submission {
    /// [`Name`] of the visitor.
    pub name: Name,

    /// [`Email`] to answer the visitor at.
    pub email: Email,

    /// [`Phone`] of the visitor, if left.
    pub phone: Option<Phone>,

    /// [`Message`] of the visitor, if left.
    pub message: Option<Message>,

    /// [`DateTime`] of the submission.
    pub submitted_at: SubmissionDateTime,
}

impl Submission {
    /// Turns this [`Submission`] into a [`New`] [`Contact`] stored under the
    /// provided ID.
    ///
    /// [`New`]: State::New
    #[must_use]
    pub fn into_contact(self, id: Id) -> Contact {
        let Self {
            name,
            email,
            phone,
            message,
            submitted_at,
        } = self;
        Contact {
            id,
            name,
            email,
            phone,
            message,
            state: State::New,
            submitted_at,
            responded_at: None,
        }
    }
}

/// Raw contact form, as filled in by a visitor.
#[derive(Clone, Debug, Default)]
pub struct Request {
    /// Name of the visitor.
    pub name: String,

    /// Email address of the visitor.
    pub email: String,

    /// Phone number of the visitor.
    ///
    /// Blank one is treated as omitted.
    pub phone: Option<String>,

    /// Free-form message of the visitor.
    ///
    /// Blank one is treated as omitted.
    pub message: Option<String>,
}

impl Request {
    /// Validates this [`Request`] into a [`Submission`] made at the provided
    /// [`DateTime`].
    ///
    /// Surrounding whitespace of every field is ignored.
    ///
    /// # Errors
    ///
    /// With a [`RequestError`] naming the first invalid field.
    pub fn validate(
        self,
        submitted_at: SubmissionDateTime,
    ) -> Result<Submission, RequestError> {
        /// Trims the provided optional field, omitting it if blank.
        fn filled(field: Option<String>) -> Option<String> {
            field
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
        }

        let Self {
            name,
            email,
            phone,
            message,
        } = self;

        let name =
            Name::new(name.trim()).ok_or(RequestError::InvalidName)?;
        let email =
            Email::new(email.trim()).ok_or(RequestError::InvalidEmail)?;
        let phone = filled(phone)
            .map(|p| Phone::new(p).ok_or(RequestError::InvalidPhone))
            .transpose()?;
        let message = filled(message).map(Message);

        Ok(Submission {
            name,
            email,
            phone,
            message,
            submitted_at,
        })
    }
}

/// Error of [`Request`] validation.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Provided email address is malformed or too long.
    #[display("email must be a valid address of at most 150 characters")]
    InvalidEmail,

    /// Provided name is too short or too long.
    #[display("name must have from 3 to 100 characters")]
    InvalidName,

    /// Provided phone number is malformed.
    #[display("phone must be a number of 5 to 20 characters")]
    InvalidPhone,
}

/// Change of a [`Contact`]'s [`State`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StateChange {
    /// ID of the [`Contact`] to change.
    pub id: Id,

    /// New [`State`] of the [`Contact`].
    pub state: State,

    /// [`DateTime`] of the change.
    pub responded_at: ResponseDateTime,
}

/// ID of a [`Contact`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(i32);

/// Name of a visitor leaving a [`Contact`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && (3..=100).contains(&name.chars().count())
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a visitor leaving a [`Contact`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 150 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a visitor leaving a [`Contact`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[+(]?\d[\d\s()-]{3,17}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Free-form message of a [`Contact`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Message(String);

/// [`DateTime`] of a [`Contact`] submission.
pub type SubmissionDateTime = DateTimeOf<(Contact, unit::Submission)>;

/// [`DateTime`] of a response to a [`Contact`].
pub type ResponseDateTime = DateTimeOf<(Contact, unit::Response)>;

define_kind! {
    #[doc = "Handling state of a [`Contact`]."]
    enum State {
        #[doc = "[`Contact`] is submitted and nobody looked at it yet."]
        New = 1,

        #[doc = "Staff is working on the [`Contact`]."]
        InProgress = 2,

        #[doc = "Visitor has been answered."]
        Answered = 3,

        #[doc = "[`Contact`] needs no further handling."]
        Closed = 4,
    }
}

impl State {
    /// Parses a [`State`] out of its exact name, like `InProgress`.
    ///
    /// # Errors
    ///
    /// With [`InvalidState`] if the `name` doesn't denote any [`State`].
    pub fn parse(name: &str) -> Result<Self, InvalidState> {
        name.parse().map_err(|_| InvalidState(name.to_owned()))
    }
}

/// String not denoting any [`State`].
#[derive(Clone, Debug, Display, Error)]
#[display("`{_0}` is not a valid contact state")]
pub struct InvalidState(#[error(not(source))] pub String);

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Email, Phone, Request, RequestError, State};

    fn request(name: &str, email: &str) -> Request {
        Request {
            name: name.into(),
            email: email.into(),
            ..Request::default()
        }
    }

    fn now() -> super::SubmissionDateTime {
        DateTime::from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .coerce()
    }

    #[test]
    fn trims_and_omits_blank_fields() {
        let sub = Request {
            phone: Some("   ".into()),
            message: Some("  Is breakfast included?  ".into()),
            ..request("  Ana Lopez ", " ana@example.com ")
        }
        .validate(now())
        .unwrap();

        assert_eq!(sub.name.to_string(), "Ana Lopez");
        assert_eq!(sub.email.to_string(), "ana@example.com");
        assert_eq!(sub.phone, None);
        assert_eq!(
            sub.message.map(|m| m.to_string()).as_deref(),
            Some("Is breakfast included?"),
        );
    }

    #[test]
    fn names_first_invalid_field() {
        for (req, expected) in [
            (request("Al", "al@example.com"), RequestError::InvalidName),
            (request(&"a".repeat(101), "a@b.c"), RequestError::InvalidName),
            (request("Ana", "ana.example.com"), RequestError::InvalidEmail),
            (
                request("Ana", &format!("{}@example.com", "a".repeat(140))),
                RequestError::InvalidEmail,
            ),
            (
                Request {
                    phone: Some("call me".into()),
                    ..request("Ana", "ana@example.com")
                },
                RequestError::InvalidPhone,
            ),
        ] {
            assert_eq!(req.validate(now()).unwrap_err(), expected);
        }
    }

    #[test]
    fn accepts_common_phone_formats() {
        for number in ["+51 984 123 456", "(084) 231-456", "12345"] {
            assert!(Phone::new(number).is_some(), "{number}");
        }
        for number in ["1234", "+", "123456789012345678901", "98a4123"] {
            assert!(Phone::new(number).is_none(), "{number}");
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(Email::new("guest@hotel.pe").is_some());
        for address in ["", "guest", "guest@", "@hotel.pe", "a b@hotel.pe"] {
            assert!(Email::new(address).is_none(), "{address}");
        }
    }

    #[test]
    fn parses_exact_state_names_only() {
        assert_eq!(State::parse("New").ok(), Some(State::New));
        assert_eq!(State::parse("InProgress").ok(), Some(State::InProgress));
        assert_eq!(State::parse("Answered").ok(), Some(State::Answered));
        assert_eq!(State::parse("Closed").ok(), Some(State::Closed));

        for name in ["", "new", "In Progress", "Nuevo"] {
            assert_eq!(State::parse(name).unwrap_err().0, name);
        }
    }
}
