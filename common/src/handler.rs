//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Stores, commands, queries and notifiers are all [`Handler`]s of their
/// respective operation types, so a component states its required
/// capabilities as a set of `Handler<Op>` bounds.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
