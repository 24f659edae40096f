//! Parametric pricing: formula evaluation and SKU overrides.
//!
//! Pricing is a pure function of (pricing record, parameters, selections,
//! quantity, optional SKU override). Nothing here performs IO or holds state,
//! so concurrent quotes for the same product need no coordination.

pub mod formula;
pub mod sku;

use std::collections::BTreeMap;

/// Parameter code → numeric value (for `range` axes).
pub type Parameters = BTreeMap<String, f64>;

/// Breakdown key → amount.
pub type PriceBreakdown = BTreeMap<String, f64>;

pub use formula::{
    AxisOptions, FormulaEngine, FormulaKind, ParametricPricing, PriceQuote, PriceRequest,
    breakdown, params,
};
pub use sku::{SkuMapping, SkuMappingResolver};
