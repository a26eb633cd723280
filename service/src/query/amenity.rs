//! [`Query`] collection related to [`Amenity`]s.

use common::operations::By;

use crate::domain::Amenity;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries every [`Amenity`] of the hotel, ordered by ID.
pub type All = DatabaseQuery<By<Vec<Amenity>, ()>>;

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{testing::fixture, Query as _};

    use super::All;

    #[tokio::test]
    async fn lists_catalog_by_id() {
        let (svc, _) = fixture(1);

        let amenities = svc.execute(All::by(())).await.unwrap();

        assert_eq!(
            amenities.iter().map(|a| i32::from(a.id)).collect::<Vec<_>>(),
            [1, 2],
        );
        assert_eq!(amenities[0].price, Money::ZERO);
        assert_eq!(amenities[1].price, Money::from(25));
    }
}
