//! Business services layered over the remote gateways.
//!
//! Each service is an explicitly constructed object receiving its
//! gateway and cache dependencies; lifecycle is owned by `AppState`.

pub mod catalog;
pub mod entitlements;
pub mod orders;
pub mod settlement;

pub use catalog::CatalogService;
pub use entitlements::EntitlementResolver;
pub use orders::OrderService;
pub use settlement::SettlementService;
