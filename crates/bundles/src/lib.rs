//! Bundles: products composed of simple, variant and parametric components.
//!
//! A bundle is priced either from its own price record (`fixed`) or as the sum
//! of its requested component lines (`computed`). Bundles never contain other
//! bundles; that is enforced when components are assigned.

pub mod component;
pub mod composer;

pub use component::{BundleComponent, BundleMode, BundlePriceMode, BundleSettings, NewComponent};
pub use composer::{
    BundleComposer, BundleLineQuote, BundleLineRequest, BundleQuote, ComponentSource,
};
