//! Read entities definitions.

pub mod availability;
pub mod reservation;
pub mod room;
