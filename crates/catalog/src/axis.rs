//! Variant axes: definition, validation on save, and option discovery.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use forgecat_core::{
    AxisId, DomainError, DomainResult, EngineConfig, Entity, ProductId, ValidationError,
    ValueObject,
};

use crate::LocalizedText;
use crate::labels::LabelTable;
use crate::product::{Product, ProductKind};
use crate::variant::ProductVariant;

/// How a caller supplies a value for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisInputKind {
    /// Continuous numeric parameter, optionally bounded and stepped.
    Range,
    /// One option code out of a discrete set.
    Select,
}

/// A dimension of variation owned by one parent product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAxis {
    pub id: AxisId,
    pub parent_id: ProductId,
    /// Stable identifier, e.g. `"color"`.
    pub attribute_code: String,
    pub position: i32,
    pub input_kind: AxisInputKind,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
}

impl Entity for VariantAxis {
    type Id = AxisId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Axis definition as submitted when a parent's axis set is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAxis {
    pub attribute_code: String,
    pub position: i32,
    pub input_kind: AxisInputKind,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
}

impl NewAxis {
    pub fn select(attribute_code: impl Into<String>, position: i32) -> Self {
        Self {
            attribute_code: attribute_code.into(),
            position,
            input_kind: AxisInputKind::Select,
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn range(
        attribute_code: impl Into<String>,
        position: i32,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    ) -> Self {
        Self {
            attribute_code: attribute_code.into(),
            position,
            input_kind: AxisInputKind::Range,
            min,
            max,
            step,
        }
    }
}

/// A discrete value for a `select` axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOption {
    pub code: String,
    #[serde(default)]
    pub labels: LocalizedText,
    pub position: i32,
}

impl AxisOption {
    pub fn new(code: impl Into<String>, position: i32) -> Self {
        Self {
            code: code.into(),
            labels: LocalizedText::new(),
            position,
        }
    }

    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(locale.into(), label.into());
        self
    }
}

impl ValueObject for AxisOption {}

/// An axis together with the option codes observed on existing variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredAxis {
    pub axis: VariantAxis,
    pub options: Vec<AxisOption>,
}

/// Validates axis sets and derives options from variants.
#[derive(Debug, Clone)]
pub struct AxisCatalog {
    config: EngineConfig,
}

impl AxisCatalog {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Validate a full replacement axis set for `parent` and assign row identities.
    ///
    /// Variant parents need between 1 and `max_variant_axes` `select` axes.
    /// Parametric products may declare any number of axes of either kind.
    /// The result is ordered by (position, attribute code).
    pub fn prepare_axes(&self, parent: &Product, axes: Vec<NewAxis>) -> DomainResult<Vec<VariantAxis>> {
        match parent.kind {
            ProductKind::VariantParent => {
                if axes.is_empty() {
                    return Err(ValidationError::NoAxes.into());
                }
                if axes.len() > self.config.max_variant_axes {
                    return Err(ValidationError::TooManyAxes {
                        count: axes.len(),
                        max: self.config.max_variant_axes,
                    }
                    .into());
                }
            }
            ProductKind::Parametric => {}
            _ => parent.ensure_kind(ProductKind::VariantParent)?,
        }

        let mut seen = HashSet::new();
        let mut prepared = Vec::with_capacity(axes.len());
        for axis in axes {
            let code = axis.attribute_code.trim().to_string();
            if code.is_empty() {
                return Err(DomainError::validation("attribute code cannot be empty"));
            }
            if !seen.insert(code.clone()) {
                return Err(ValidationError::DuplicateAxis { attribute_code: code }.into());
            }

            let (min, max, step) = match axis.input_kind {
                AxisInputKind::Select => (None, None, None),
                AxisInputKind::Range => {
                    if parent.kind == ProductKind::VariantParent {
                        return Err(bounds_error(&code, "variant axes must be select axes"));
                    }
                    check_range_bounds(&code, axis.min, axis.max, axis.step)?;
                    (axis.min, axis.max, axis.step)
                }
            };

            prepared.push(VariantAxis {
                id: AxisId::new(),
                parent_id: parent.id,
                attribute_code: code,
                position: axis.position,
                input_kind: axis.input_kind,
                min,
                max,
                step,
            });
        }

        Ok(order_axes(prepared))
    }

    /// Per axis, the distinct option codes used by `variants`, in order of first appearance.
    pub fn discover_options(
        &self,
        axes: &[VariantAxis],
        variants: &[ProductVariant],
        labels: &LabelTable,
    ) -> Vec<DiscoveredAxis> {
        order_axes(axes.to_vec())
            .into_iter()
            .map(|axis| {
                let mut codes: Vec<&str> = Vec::new();
                for variant in variants {
                    if let Some(code) = variant.option_for(&axis.attribute_code) {
                        if !codes.contains(&code) {
                            codes.push(code);
                        }
                    }
                }
                let options = codes
                    .into_iter()
                    .enumerate()
                    .map(|(position, code)| AxisOption {
                        code: code.to_string(),
                        labels: labels.option_labels(
                            &axis.attribute_code,
                            code,
                            &self.config.default_locale,
                        ),
                        position: position as i32,
                    })
                    .collect();
                DiscoveredAxis { axis, options }
            })
            .collect()
    }
}

/// Sort axes for display: by position, ties broken by attribute code.
pub fn order_axes(mut axes: Vec<VariantAxis>) -> Vec<VariantAxis> {
    axes.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.attribute_code.cmp(&b.attribute_code))
    });
    axes
}

fn check_range_bounds(
    code: &str,
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
) -> DomainResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(bounds_error(code, &format!("min {min} > max {max}")));
        }
    }
    if let Some(step) = step {
        if step <= 0.0 || step.is_nan() {
            return Err(bounds_error(code, "step must be positive"));
        }
    }
    Ok(())
}

fn bounds_error(code: &str, reason: &str) -> DomainError {
    ValidationError::InvalidAxisBounds {
        attribute_code: code.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::AxisValueEntry;

    fn parent() -> Product {
        Product::new(ProductKind::VariantParent, "SHIRT").with_name("en", "Work Shirt")
    }

    fn catalog() -> AxisCatalog {
        AxisCatalog::new(EngineConfig::default())
    }

    fn variant(parent: &Product, axes: &[VariantAxis], values: &[(&str, &str)]) -> ProductVariant {
        let product = Product::new(ProductKind::Variant, "SHIRT-V").with_parent(parent.id);
        let entries = values
            .iter()
            .map(|(code, option)| {
                let axis = axes.iter().find(|a| a.attribute_code == *code).unwrap();
                AxisValueEntry {
                    axis_id: axis.id,
                    attribute_code: code.to_string(),
                    option_code: option.to_string(),
                }
            })
            .collect();
        ProductVariant::new(product, entries)
    }

    #[test]
    fn prepare_orders_by_position() {
        let axes = catalog()
            .prepare_axes(&parent(), vec![NewAxis::select("size", 2), NewAxis::select("color", 1)])
            .unwrap();
        let codes: Vec<_> = axes.iter().map(|a| a.attribute_code.as_str()).collect();
        assert_eq!(codes, vec!["color", "size"]);
    }

    #[test]
    fn variant_parent_needs_at_least_one_axis() {
        let err = catalog().prepare_axes(&parent(), vec![]).unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::NoAxes));
    }

    #[test]
    fn more_than_max_axes_is_rejected_not_truncated() {
        let axes = (0..5).map(|i| NewAxis::select(format!("a{i}"), i)).collect();
        let err = catalog().prepare_axes(&parent(), axes).unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::TooManyAxes { count: 5, max: 4 })
        );
    }

    #[test]
    fn configured_limit_is_honoured() {
        let catalog = AxisCatalog::new(EngineConfig::default().with_max_variant_axes(1));
        let err = catalog
            .prepare_axes(&parent(), vec![NewAxis::select("a", 0), NewAxis::select("b", 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::TooManyAxes { count: 2, max: 1 })
        ));
    }

    #[test]
    fn duplicate_attribute_codes_are_rejected() {
        let err = catalog()
            .prepare_axes(&parent(), vec![NewAxis::select("color", 0), NewAxis::select(" color ", 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::DuplicateAxis { .. })
        ));
    }

    #[test]
    fn range_axes_belong_to_parametric_products() {
        let range = NewAxis::range("width_mm", 0, Some(100.0), Some(2000.0), Some(10.0));
        let err = catalog().prepare_axes(&parent(), vec![range.clone()]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::InvalidAxisBounds { .. })
        ));

        let panel = Product::new(ProductKind::Parametric, "PANEL");
        let axes = catalog().prepare_axes(&panel, vec![range]).unwrap();
        assert_eq!(axes[0].step, Some(10.0));
    }

    #[test]
    fn inverted_bounds_and_zero_step_are_rejected() {
        let panel = Product::new(ProductKind::Parametric, "PANEL");
        let inverted = NewAxis::range("width_mm", 0, Some(10.0), Some(1.0), None);
        assert!(catalog().prepare_axes(&panel, vec![inverted]).is_err());

        let zero_step = NewAxis::range("width_mm", 0, None, None, Some(0.0));
        assert!(catalog().prepare_axes(&panel, vec![zero_step]).is_err());
    }

    #[test]
    fn simple_products_cannot_have_axes() {
        let simple = Product::new(ProductKind::Simple, "BOLT");
        let err = catalog()
            .prepare_axes(&simple, vec![NewAxis::select("color", 0)])
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::WrongProductKind { .. })
        ));
    }

    #[test]
    fn discover_keeps_first_appearance_order() {
        let parent = parent();
        let axes = catalog()
            .prepare_axes(&parent, vec![NewAxis::select("color", 0), NewAxis::select("size", 1)])
            .unwrap();
        let variants = vec![
            variant(&parent, &axes, &[("color", "red"), ("size", "l")]),
            variant(&parent, &axes, &[("color", "blue"), ("size", "l")]),
            variant(&parent, &axes, &[("color", "red"), ("size", "m")]),
        ];
        let table = LabelTable::new().with_option_label("size", "l", "en", "Large");

        let discovered = catalog().discover_options(&axes, &variants, &table);

        let colors: Vec<_> = discovered[0].options.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(colors, vec!["red", "blue"]);
        assert_eq!(discovered[0].options[1].position, 1);
        assert_eq!(discovered[1].options[0].labels.get("en").unwrap(), "Large");
        assert_eq!(discovered[1].options[1].labels.get("en").unwrap(), "M");
    }
}
