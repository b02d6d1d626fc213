// One module per simulated resource family. Each holds its own
// module-level store, record factory, seed/clear helpers and route
// registration; the registry assembles them in a fixed order.
pub mod audit;
pub mod billing;
pub mod communications;
pub mod faults;
pub mod field_service;
pub mod inventory;
pub mod licensing;
pub mod notifications;
pub mod orchestration;
pub mod partners;
pub mod radius;
pub mod search;
pub mod subscribers;
