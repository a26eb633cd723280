//! [`Amenity`]-related definitions.

use common::Money;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;

use crate::{api::scalar, Context};

/// An extra service offered by the hotel.
#[derive(Clone, Debug, From)]
pub struct Amenity(domain::Amenity);

/// An extra service offered by the hotel.
#[graphql_object(context = Context)]
impl Amenity {
    /// Unique identifier of this `Amenity`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Amenity`.
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Free-form description of this `Amenity`.
    pub fn description(&self) -> &str {
        &self.0.description
    }

    /// Listed price of this `Amenity`, zero if complimentary.
    pub fn price(&self) -> Money {
        self.0.price
    }
}

/// Unique identifier of an `Amenity`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::amenity::Id)]
#[into(domain::amenity::Id)]
#[graphql(name = "AmenityId", transparent)]
pub struct Id(i32);

/// Name of an `Amenity`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "AmenityName", with = scalar::Via::<domain::amenity::Name>)]
pub struct Name(domain::amenity::Name);
