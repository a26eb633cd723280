//! [`Room`]-related definitions.

use common::Money;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;

use crate::{api, api::scalar, Context};

/// A hotel room.
#[derive(Clone, Debug, From)]
pub struct Room(domain::Room);

/// A hotel room.
#[graphql_object(context = Context)]
impl Room {
    /// Unique identifier of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Door number of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn number(&self) -> Number {
        self.0.number.clone().into()
    }

    /// Number of guests this `Room` fits.
    pub fn capacity(&self) -> i32 {
        self.0.capacity.into()
    }

    /// Operational status of this `Room`.
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Free-form description of this `Room`.
    pub fn description(&self) -> &str {
        &self.0.description
    }

    /// `RoomType` of this `Room`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Room.type",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[graphql(name = "type")]
    pub fn room_type(&self) -> RoomType {
        self.0.room_type.clone().into()
    }
}

/// Unique identifier of a `Room`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::room::Id)]
#[into(domain::room::Id)]
#[graphql(name = "RoomId", transparent)]
pub struct Id(i32);

/// Name of a `Room`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "RoomName", with = scalar::Via::<domain::room::Name>)]
pub struct Name(domain::room::Name);

/// Door number of a `Room`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "RoomNumber", with = scalar::Via::<domain::room::Number>)]
pub struct Number(domain::room::Number);

/// Operational status of a `Room`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RoomStatus")]
pub enum Status {
    /// `Room` is in service and may be booked.
    Available,

    /// `Room` is occupied by guests.
    Occupied,

    /// `Room` is out of service for maintenance.
    Maintenance,
}

impl From<domain::room::Status> for Status {
    fn from(status: domain::room::Status) -> Self {
        use domain::room::Status as S;

        match status {
            S::Available => Self::Available,
            S::Occupied => Self::Occupied,
            S::Maintenance => Self::Maintenance,
        }
    }
}

/// A category of hotel rooms.
#[derive(Clone, Debug, From)]
pub struct RoomType(domain::RoomType);

/// A category of hotel rooms.
#[graphql_object(context = Context)]
impl RoomType {
    /// Unique identifier of this `RoomType`.
    pub fn id(&self) -> TypeId {
        self.0.id.into()
    }

    /// Title of this `RoomType`.
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Free-form description of this `RoomType`.
    pub fn description(&self) -> &str {
        &self.0.description
    }

    /// Number of adults the rooms of this `RoomType` fit.
    pub fn adult_capacity(&self) -> i32 {
        self.0.adult_capacity.into()
    }

    /// Number of children the rooms of this `RoomType` fit.
    pub fn child_capacity(&self) -> i32 {
        self.0.child_capacity.into()
    }

    /// Number of beds in the rooms of this `RoomType`.
    pub fn beds(&self) -> i32 {
        self.0.beds.into()
    }

    /// Listed nightly price of the rooms of this `RoomType`.
    pub fn price(&self) -> Money {
        self.0.price
    }
}

/// Unique identifier of a `RoomType`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::room_type::Id)]
#[into(domain::room_type::Id)]
#[graphql(name = "RoomTypeId", transparent)]
pub struct TypeId(i32);

/// Title of a `RoomType`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RoomTypeTitle",
    with = scalar::Via::<domain::room_type::Title>,
)]
pub struct Title(domain::room_type::Title);
