//! # tidewatch-database
//!
//! Entity store for Tidewatch: concurrent in-memory tables, a geospatial
//! radius index, and one repository per aggregate.
//!
//! Every repository write goes through [`StoreHealth`], so an operator (or a
//! test) can take the store offline and observe persistence failures
//! propagating as fatal errors.

pub mod connection;
pub mod geo;
pub mod repositories;
pub mod table;

pub use connection::{Database, StoreHealth};
pub use geo::GeoIndex;
pub use table::MemoryTable;
