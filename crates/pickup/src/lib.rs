//! Pickup point domain module.
//!
//! This crate contains business rules for pickup points, receptions and the
//! products logged against them, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod pickup_point;
pub mod product;
pub mod query;
pub mod reception;
pub mod view;

pub use pickup_point::{City, PickupPoint, RegisterPickupPoint};
pub use product::{Product, ProductType};
pub use query::{ListQuery, Page, TimeWindow, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
pub use reception::{Reception, ReceptionStatus};
pub use view::{assemble, PickupPointView, ReceptionView};
