use serde::{Deserialize, Serialize};

use forgecat_catalog::{Product, ProductKind, Selections};
use forgecat_core::{ComponentId, DomainResult, Entity, ProductId, ValidationError};
use forgecat_pricing::Parameters;

/// How a bundle's price is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundlePriceMode {
    /// The bundle's own price record.
    Fixed,
    /// Sum of the requested component lines.
    Computed,
}

/// Whether customers may change component quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleMode {
    #[default]
    Fixed,
    /// Requested quantities must stay within each component's bounds.
    Configurable,
}

/// Per-bundle pricing policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleSettings {
    pub bundle_id: ProductId,
    /// Unset is a setup error surfaced when the bundle is priced.
    #[serde(default)]
    pub price_mode: Option<BundlePriceMode>,
    #[serde(default)]
    pub bundle_mode: BundleMode,
}

impl BundleSettings {
    pub fn new(bundle_id: ProductId, price_mode: BundlePriceMode, bundle_mode: BundleMode) -> Self {
        Self {
            bundle_id,
            price_mode: Some(price_mode),
            bundle_mode,
        }
    }
}

/// A stored component row of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleComponent {
    pub id: ComponentId,
    pub bundle_id: ProductId,
    pub component_product_id: ProductId,
    pub default_quantity: i64,
    #[serde(default)]
    pub min_quantity: Option<i64>,
    #[serde(default)]
    pub max_quantity: Option<i64>,
    pub position: i32,
    /// Used for parametric components when a line supplies none of its own.
    #[serde(default)]
    pub default_parameters: Parameters,
    #[serde(default)]
    pub default_selections: Selections,
}

impl BundleComponent {
    /// Check `quantity` against this component's bounds.
    pub fn check_quantity(&self, quantity: i64) -> DomainResult<()> {
        let below = self.min_quantity.is_some_and(|min| quantity < min);
        let above = self.max_quantity.is_some_and(|max| quantity > max);
        if below || above {
            return Err(ValidationError::QuantityOutOfBounds {
                quantity,
                min: self.min_quantity,
                max: self.max_quantity,
            }
            .into());
        }
        Ok(())
    }
}

impl Entity for BundleComponent {
    type Id = ComponentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for assigning a component to a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComponent {
    pub component_product_id: ProductId,
    pub default_quantity: i64,
    #[serde(default)]
    pub min_quantity: Option<i64>,
    #[serde(default)]
    pub max_quantity: Option<i64>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub default_parameters: Parameters,
    #[serde(default)]
    pub default_selections: Selections,
}

impl NewComponent {
    pub fn new(component_product_id: ProductId, default_quantity: i64) -> Self {
        Self {
            component_product_id,
            default_quantity,
            min_quantity: None,
            max_quantity: None,
            position: 0,
            default_parameters: Parameters::new(),
            default_selections: Selections::new(),
        }
    }

    pub fn with_bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }

    pub fn at_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    pub fn with_default_parameter(mut self, code: impl Into<String>, value: f64) -> Self {
        self.default_parameters.insert(code.into(), value);
        self
    }

    pub fn with_default_selection(mut self, code: impl Into<String>, option: impl Into<String>) -> Self {
        self.default_selections.insert(code.into(), option.into());
        self
    }

    /// Validate against the referenced product and turn into a stored row.
    ///
    /// Bundles cannot nest, and a variant parent is ambiguous (the caller must
    /// pick a concrete variant), so both are rejected whatever the other fields say.
    pub fn into_component(self, bundle_id: ProductId, product: &Product) -> DomainResult<BundleComponent> {
        match product.kind {
            ProductKind::Simple | ProductKind::Variant | ProductKind::Parametric => {}
            ProductKind::Bundle | ProductKind::VariantParent => {
                return Err(ValidationError::InvalidComponentType {
                    product_id: product.id.to_string(),
                    kind: product.kind.to_string(),
                }
                .into());
            }
        }

        if let (Some(min), Some(max)) = (self.min_quantity, self.max_quantity) {
            if min > max {
                return Err(ValidationError::InvalidQuantityBounds { min, max }.into());
            }
        }

        if self.default_quantity <= 0 {
            return Err(ValidationError::QuantityOutOfBounds {
                quantity: self.default_quantity,
                min: self.min_quantity,
                max: self.max_quantity,
            }
            .into());
        }

        let component = BundleComponent {
            id: ComponentId::new(),
            bundle_id,
            component_product_id: product.id,
            default_quantity: self.default_quantity,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            position: self.position,
            default_parameters: self.default_parameters,
            default_selections: self.default_selections,
        };
        component.check_quantity(component.default_quantity)?;
        Ok(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgecat_core::DomainError;
    use proptest::prelude::*;

    fn product(kind: ProductKind) -> Product {
        Product::new(kind, "C-1")
    }

    #[test]
    fn simple_variant_and_parametric_are_accepted() {
        let bundle = ProductId::new();
        for kind in [ProductKind::Simple, ProductKind::Variant, ProductKind::Parametric] {
            let p = product(kind);
            let row = NewComponent::new(p.id, 1).into_component(bundle, &p).unwrap();
            assert_eq!(row.bundle_id, bundle);
            assert_eq!(row.component_product_id, p.id);
        }
    }

    #[test]
    fn default_outside_bounds_is_rejected() {
        let p = product(ProductKind::Simple);
        let err = NewComponent::new(p.id, 5)
            .with_bounds(Some(1), Some(3))
            .into_component(ProductId::new(), &p)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::QuantityOutOfBounds {
                quantity: 5,
                min: Some(1),
                max: Some(3)
            })
        );
    }

    #[test]
    fn zero_default_quantity_is_rejected() {
        let p = product(ProductKind::Simple);
        let err = NewComponent::new(p.id, 0)
            .into_component(ProductId::new(), &p)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::QuantityOutOfBounds { quantity: 0, .. })
        ));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let p = product(ProductKind::Simple);
        let err = NewComponent::new(p.id, 2)
            .with_bounds(Some(4), Some(1))
            .into_component(ProductId::new(), &p)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::InvalidQuantityBounds { min: 4, max: 1 })
        );
    }

    #[test]
    fn settings_deserialize_without_price_mode() {
        let json = format!(r#"{{"bundle_id":"{}"}}"#, ProductId::new());
        let settings: BundleSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings.price_mode, None);
        assert_eq!(settings.bundle_mode, BundleMode::Fixed);
    }

    proptest! {
        /// Property: bundles and variant parents are never valid components,
        /// whatever quantities are requested.
        #[test]
        fn nested_or_ambiguous_components_always_fail(
            default in -5i64..50,
            min in proptest::option::of(-5i64..50),
            max in proptest::option::of(-5i64..50),
            nested in any::<bool>()
        ) {
            let kind = if nested { ProductKind::Bundle } else { ProductKind::VariantParent };
            let p = product(kind);
            let result = NewComponent::new(p.id, default)
                .with_bounds(min, max)
                .into_component(ProductId::new(), &p);
            let is_invalid_type = matches!(
                result,
                Err(DomainError::Validation(ValidationError::InvalidComponentType { .. }))
            );
            prop_assert!(is_invalid_type);
        }
    }
}
