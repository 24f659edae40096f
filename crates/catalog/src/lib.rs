//! Catalog domain module: products, variant axes and variant resolution.
//!
//! This crate contains the selection rules for variant families implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod axis;
pub mod labels;
pub mod product;
pub mod resolver;
pub mod variant;

use std::collections::BTreeMap;

/// Attribute code → option code.
///
/// Ordered so that two selections with the same pairs compare and print identically.
pub type Selections = BTreeMap<String, String>;

/// Locale code → display string.
pub type LocalizedText = BTreeMap<String, String>;

pub use axis::{
    AxisCatalog, AxisInputKind, AxisOption, DiscoveredAxis, NewAxis, VariantAxis, order_axes,
};
pub use labels::{LabelTable, compose_display_name, humanize};
pub use product::{Product, ProductKind, ProductPrice};
pub use resolver::{OptionAvailability, ResolvedVariant, VariantResolver};
pub use variant::{AxisValueEntry, ProductVariant, combination_key, ensure_unique_combinations};
