//! Concrete variants and the integrity rules of a variant family.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use forgecat_core::{
    AxisId, DomainError, DomainResult, Entity, ProductId, ValidationError, ValueObject,
};

use crate::Selections;
use crate::axis::VariantAxis;
use crate::product::{Product, ProductKind};

/// One axis value carried by a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisValueEntry {
    pub axis_id: AxisId,
    pub attribute_code: String,
    pub option_code: String,
}

impl ValueObject for AxisValueEntry {}

/// A purchasable member of a variant family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub product: Product,
    pub axis_values: Vec<AxisValueEntry>,
}

impl ProductVariant {
    pub fn new(product: Product, axis_values: Vec<AxisValueEntry>) -> Self {
        Self {
            product,
            axis_values,
        }
    }

    pub fn parent_id(&self) -> Option<ProductId> {
        self.product.parent_id
    }

    pub fn option_for(&self, attribute_code: &str) -> Option<&str> {
        self.axis_values
            .iter()
            .find(|entry| entry.attribute_code == attribute_code)
            .map(|entry| entry.option_code.as_str())
    }

    /// The variant's combination as a selection map.
    pub fn selections(&self) -> Selections {
        self.axis_values
            .iter()
            .map(|entry| (entry.attribute_code.clone(), entry.option_code.clone()))
            .collect()
    }

    /// Check this variant against its parent's axes.
    ///
    /// Every axis must carry exactly one value, and no value may reference an
    /// axis the parent does not own.
    pub fn validate_against(&self, parent_id: ProductId, axes: &[VariantAxis]) -> DomainResult<()> {
        self.product.ensure_kind(ProductKind::Variant)?;
        if self.product.parent_id != Some(parent_id) {
            return Err(DomainError::validation(format!(
                "variant {} does not belong to parent {parent_id}",
                self.product.id
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.axis_values {
            let owned = axes
                .iter()
                .any(|axis| axis.id == entry.axis_id && axis.attribute_code == entry.attribute_code);
            if !owned {
                return Err(ValidationError::UnknownAxis {
                    attribute_code: entry.attribute_code.clone(),
                }
                .into());
            }
            if !seen.insert(entry.attribute_code.as_str()) {
                return Err(ValidationError::DuplicateAxisValue {
                    attribute_code: entry.attribute_code.clone(),
                }
                .into());
            }
        }

        if let Some(missing) = axes
            .iter()
            .find(|axis| !seen.contains(axis.attribute_code.as_str()))
        {
            return Err(ValidationError::MissingAxisValue {
                attribute_code: missing.attribute_code.clone(),
            }
            .into());
        }

        Ok(())
    }
}

impl Entity for ProductVariant {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product.id
    }
}

/// Canonical text form of a combination (`color=red,size=xl`), ordered by attribute code.
pub fn combination_key(selections: &Selections) -> String {
    selections
        .iter()
        .map(|(code, option)| format!("{code}={option}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fail if any two variants share the same complete combination.
pub fn ensure_unique_combinations<'a>(
    variants: impl IntoIterator<Item = &'a ProductVariant>,
) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for variant in variants {
        let selections = variant.selections();
        if seen.contains(&selections) {
            return Err(ValidationError::DuplicateCombination {
                combination: combination_key(&selections),
            }
            .into());
        }
        seen.insert(selections);
    }
    Ok(())
}
