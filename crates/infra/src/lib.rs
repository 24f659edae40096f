//! Infrastructure layer: repository ports, in-memory storage, change events and
//! the configurator service that wires the pure domain crates together.

pub mod catalog_events;
pub mod error;
pub mod repository;
pub mod service;


pub use catalog_events::{CatalogChange, CatalogEvent};
pub use error::ServiceError;
pub use repository::{
    AxisRepository, BundleRepository, CatalogRepository, InMemoryCatalogStore, PricingRepository,
    ProductRepository, StoreError, VariantRepository,
};
pub use service::ConfiguratorService;
