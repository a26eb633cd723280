//! [`Query`] collection related to [`Room`]s.

use common::operations::By;

use crate::domain::{Room, RoomType};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries every [`Room`] of the hotel, ordered by ID.
pub type All = DatabaseQuery<By<Vec<Room>, ()>>;

/// Queries every [`RoomType`] of the hotel, ordered by ID.
pub type Types = DatabaseQuery<By<Vec<RoomType>, ()>>;

#[cfg(test)]
mod spec {
    use crate::{
        domain::{room, room_type},
        testing::{fixture_with, room},
        Query as _,
    };

    use super::{All, Types};

    #[tokio::test]
    async fn lists_catalog_by_id() {
        let mut suite = room(3);
        suite.room_type.id = room_type::Id::from(2);
        suite.status = room::Status::Maintenance;
        let (svc, _) = fixture_with(vec![suite, room(1), room(2)]);

        let rooms = svc.execute(All::by(())).await.unwrap();
        assert_eq!(
            rooms.iter().map(|r| i32::from(r.id)).collect::<Vec<_>>(),
            [1, 2, 3],
        );
        assert_eq!(rooms[2].status, room::Status::Maintenance);

        let types = svc.execute(Types::by(())).await.unwrap();
        assert_eq!(
            types.iter().map(|t| i32::from(t.id)).collect::<Vec<_>>(),
            [1, 2],
        );
    }
}
