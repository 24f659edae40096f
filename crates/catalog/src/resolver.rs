//! Variant resolution: exact selection and per-axis availability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use forgecat_core::{
    ConfigurationError, DomainResult, NotFound, ProductId, ValidationError,
};

use crate::Selections;
use crate::axis::{VariantAxis, order_axes};
use crate::labels::{LabelTable, compose_display_name};
use crate::product::{Product, ProductKind, ProductPrice};
use crate::variant::{ProductVariant, combination_key};

/// A variant picked by a complete selection, enriched for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVariant {
    pub parent_id: ProductId,
    pub variant: ProductVariant,
    /// The variant's own price, or the parent's when the variant has none.
    pub price: Option<ProductPrice>,
}

/// Whether an option can still be chosen given the other selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAvailability {
    pub code: String,
    pub available: bool,
}

/// Stateless resolver over a parent's axes and variants.
#[derive(Debug, Clone, Default)]
pub struct VariantResolver;

impl VariantResolver {
    pub fn new() -> Self {
        Self
    }

    /// Find the single variant whose combination equals `selections`.
    ///
    /// `selections` must name every axis of the parent; partial selections are
    /// rejected rather than matched best-effort.
    pub fn select_variant(
        &self,
        parent: &Product,
        axes: &[VariantAxis],
        variants: &[ProductVariant],
        selections: &Selections,
        labels: &LabelTable,
    ) -> DomainResult<ResolvedVariant> {
        parent.ensure_kind(ProductKind::VariantParent)?;
        if axes.is_empty() {
            return Err(ConfigurationError::MissingAxes(parent.id.to_string()).into());
        }
        ensure_known_axes(axes, selections)?;
        if let Some(missing) = order_axes(axes.to_vec())
            .into_iter()
            .find(|axis| !selections.contains_key(&axis.attribute_code))
        {
            return Err(ValidationError::MissingAxisValue {
                attribute_code: missing.attribute_code,
            }
            .into());
        }

        let mut matches = variants
            .iter()
            .filter(|variant| variant.selections() == *selections);
        let variant = match (matches.next(), matches.next()) {
            (Some(variant), None) => variant,
            _ => return Err(NotFound::Variant(combination_key(selections)).into()),
        };

        Ok(enrich(parent, axes, variant, labels))
    }

    /// For every axis not already in `partial`, list its observed options and
    /// whether each one is reachable from some variant matching `partial`.
    ///
    /// Availability is computed per remaining axis independently. Options are
    /// listed in order of first appearance across `variants`.
    pub fn available_options(
        &self,
        axes: &[VariantAxis],
        variants: &[ProductVariant],
        partial: &Selections,
    ) -> DomainResult<BTreeMap<String, Vec<OptionAvailability>>> {
        ensure_known_axes(axes, partial)?;

        let candidates: Vec<&ProductVariant> = variants
            .iter()
            .filter(|variant| {
                partial
                    .iter()
                    .all(|(code, option)| variant.option_for(code) == Some(option.as_str()))
            })
            .collect();

        let mut result = BTreeMap::new();
        for axis in axes {
            if partial.contains_key(&axis.attribute_code) {
                continue;
            }
            let mut options: Vec<OptionAvailability> = Vec::new();
            for variant in variants {
                let Some(code) = variant.option_for(&axis.attribute_code) else {
                    continue;
                };
                if options.iter().any(|o| o.code == code) {
                    continue;
                }
                let available = candidates
                    .iter()
                    .any(|candidate| candidate.option_for(&axis.attribute_code) == Some(code));
                options.push(OptionAvailability {
                    code: code.to_string(),
                    available,
                });
            }
            result.insert(axis.attribute_code.clone(), options);
        }
        Ok(result)
    }
}

fn ensure_known_axes(axes: &[VariantAxis], selections: &Selections) -> DomainResult<()> {
    match selections
        .keys()
        .find(|code| !axes.iter().any(|axis| &axis.attribute_code == *code))
    {
        Some(unknown) => Err(ValidationError::UnknownAxis {
            attribute_code: unknown.clone(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Fill in what the variant does not carry itself.
///
/// Images are inherited wholesale only when the variant has none. Names are
/// synthesized per parent locale when the variant has no name there or just
/// repeats the parent's name.
fn enrich(
    parent: &Product,
    axes: &[VariantAxis],
    variant: &ProductVariant,
    labels: &LabelTable,
) -> ResolvedVariant {
    let mut enriched = variant.clone();

    if enriched.product.images.is_empty() {
        enriched.product.images = parent.images.clone();
    }

    for (locale, parent_name) in &parent.names {
        let needs_name = match enriched.product.names.get(locale) {
            None => true,
            Some(own) => own == parent_name,
        };
        if needs_name {
            let name = compose_display_name(parent_name, &variant.axis_values, axes, labels, locale);
            enriched.product.names.insert(locale.clone(), name);
        }
    }

    let price = variant
        .product
        .primary_price()
        .or_else(|| parent.primary_price())
        .cloned();

    ResolvedVariant {
        parent_id: parent.id,
        variant: enriched,
        price,
    }
}
