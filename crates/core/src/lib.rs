//! `forgecat-core` — shared building blocks for the configuration engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod numeric;
pub mod value_object;

pub use config::EngineConfig;
pub use entity::Entity;
pub use error::{
    ConfigurationError, DomainError, DomainResult, ErrorKind, NotFound, ValidationError,
};
pub use id::{AxisId, ComponentId, ProductId, SkuMappingId, TenantId};
pub use value_object::ValueObject;
