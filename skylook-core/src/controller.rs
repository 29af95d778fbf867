//! User-facing flows: typed search and "use my location".
//!
//! Each flow is a short chain of awaited calls that reports only through
//! [`UiPorts`](crate::ui::UiPorts). Flows are not reentrant: running two at
//! once on the same ports may interleave their control-state updates.

pub mod location;
pub mod search;

pub use location::LocationController;
pub use search::SearchController;
