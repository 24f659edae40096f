//! Explicit SKU overrides keyed by a complete set of select-axis choices.

use serde::{Deserialize, Serialize};

use forgecat_catalog::{AxisInputKind, Selections, VariantAxis, combination_key};
use forgecat_core::{
    DomainError, DomainResult, Entity, ProductId, SkuMappingId, ValidationError,
};

/// A pre-priced SKU for one exact selection set of a parametric product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuMapping {
    pub id: SkuMappingId,
    pub product_id: ProductId,
    pub selections: Selections,
    pub sku: String,
    pub unit_price: f64,
    pub base_price: f64,
    #[serde(default)]
    pub stock: Option<i64>,
}

impl SkuMapping {
    pub fn new(
        product_id: ProductId,
        selections: Selections,
        sku: impl Into<String>,
        base_price: f64,
        unit_price: f64,
    ) -> Self {
        Self {
            id: SkuMappingId::new(),
            product_id,
            selections,
            sku: sku.into(),
            unit_price,
            base_price,
            stock: None,
        }
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Exact equality of selection sets: every key and value on both sides.
    pub fn matches(&self, selections: &Selections) -> bool {
        &self.selections == selections
    }
}

impl Entity for SkuMapping {
    type Id = SkuMappingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Finds and validates SKU mappings. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkuMappingResolver;

impl SkuMappingResolver {
    pub fn new() -> Self {
        Self
    }

    /// The mapping of `product_id` whose selection set equals `selections`.
    ///
    /// `None` is a normal outcome (empty selections, or no mapping for this
    /// combination); callers then price from the formula alone.
    pub fn resolve<'a>(
        &self,
        mappings: &'a [SkuMapping],
        product_id: ProductId,
        selections: &Selections,
    ) -> Option<&'a SkuMapping> {
        if selections.is_empty() {
            return None;
        }
        mappings
            .iter()
            .find(|mapping| mapping.product_id == product_id && mapping.matches(selections))
    }

    /// Check a new mapping against the product's axes.
    ///
    /// Keys must name select axes, and every select axis must be covered.
    pub fn validate_mapping(&self, axes: &[VariantAxis], candidate: &SkuMapping) -> DomainResult<()> {
        if candidate.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if candidate.selections.is_empty() {
            return Err(DomainError::validation("sku mapping needs at least one selection"));
        }

        let is_select = |code: &str| {
            axes.iter()
                .any(|axis| axis.input_kind == AxisInputKind::Select && axis.attribute_code == code)
        };
        if let Some(code) = candidate.selections.keys().find(|code| !is_select(code.as_str())) {
            return Err(ValidationError::UnknownAxis {
                attribute_code: code.clone(),
            }
            .into());
        }

        if let Some(axis) = axes.iter().find(|axis| {
            axis.input_kind == AxisInputKind::Select
                && !candidate.selections.contains_key(&axis.attribute_code)
        }) {
            return Err(ValidationError::MissingSelection {
                attribute_code: axis.attribute_code.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Fail when `existing` already maps the candidate's exact selection set.
    pub fn ensure_no_duplicate(&self, existing: &[SkuMapping], candidate: &SkuMapping) -> DomainResult<()> {
        let taken = existing.iter().any(|mapping| {
            mapping.product_id == candidate.product_id && mapping.matches(&candidate.selections)
        });
        if taken {
            return Err(DomainError::conflict(format!(
                "product {} already has a sku mapping for {}",
                candidate.product_id,
                combination_key(&candidate.selections)
            )));
        }
        Ok(())
    }
}
