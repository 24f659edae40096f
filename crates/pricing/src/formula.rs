//! Parametric formula engine.
//!
//! A quote is produced in two phases:
//!
//! 1. **Validation** of the caller's parameters and selections against the
//!    product's axes, in a fixed order that fails on the first violation:
//!    missing selection, missing parameter, parameter out of range, invalid step
//!    (then, for select axes that declare options, unknown option).
//! 2. **Evaluation** of the formula, followed by rounding and the minimum order
//!    value surcharge. Every adjustment is recorded in the breakdown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use forgecat_catalog::{AxisInputKind, AxisOption, Selections, VariantAxis, order_axes};
use forgecat_core::numeric::{on_step, round_to};
use forgecat_core::{DomainResult, EngineConfig, ProductId, ValidationError, ValueObject};

use crate::sku::SkuMapping;
use crate::{Parameters, PriceBreakdown};

/// Declared options per select axis (attribute code → options).
pub type AxisOptions = BTreeMap<String, Vec<AxisOption>>;

/// Parameter codes read by the area and length formulas.
pub mod params {
    pub const LENGTH_MM: &str = "length_mm";
    pub const WIDTH_MM: &str = "width_mm";
    pub const LENGTH_M: &str = "length_m";
}

/// Keys used in [`PriceQuote::breakdown`].
pub mod breakdown {
    pub const BASE_PRICE: &str = "base_price";
    pub const PRICE_PER_UNIT: &str = "price_per_unit";
    pub const AREA_M2: &str = "area_m2";
    pub const PRICE_PER_M2: &str = "price_per_m2";
    pub const LENGTH_M: &str = "length_m";
    pub const PRICE_PER_METER: &str = "price_per_meter";
    pub const MIN_ORDER_SURCHARGE: &str = "min_order_surcharge";
}

/// The pricing function applied to a parametric product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    /// unit = base
    Fixed,
    /// unit = base + unit price
    PerUnit,
    /// unit = base + (length_mm/1000 × width_mm/1000) × unit price
    #[serde(rename = "per_m2")]
    PerM2,
    /// unit = base + length_m × unit price
    PerRunningMeter,
}

/// Pricing record of a parametric product (one per product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametricPricing {
    pub product_id: ProductId,
    pub formula: FormulaKind,
    pub base_price: f64,
    #[serde(default)]
    pub unit_price: Option<f64>,
    pub currency: String,
    #[serde(default)]
    pub min_order_value: Option<f64>,
}

/// Caller input for a parametric quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRequest {
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub selections: Selections,
    /// Values ≤ 0 are treated as 1.
    #[serde(default)]
    pub quantity: i64,
}

impl PriceRequest {
    pub fn new(quantity: i64) -> Self {
        Self {
            quantity,
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, code: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(code.into(), value);
        self
    }

    pub fn with_selection(mut self, code: impl Into<String>, option: impl Into<String>) -> Self {
        self.selections.insert(code.into(), option.into());
        self
    }

    pub fn effective_quantity(&self) -> i64 {
        if self.quantity <= 0 { 1 } else { self.quantity }
    }
}

/// Result of a parametric quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// SKU of the resolved mapping; callers fall back to the product's own SKU.
    pub sku: Option<String>,
    pub unit_price: f64,
    pub total_price: f64,
    pub currency: String,
    pub quantity: i64,
    pub breakdown: PriceBreakdown,
    /// Stock of the resolved mapping, when it tracks one.
    pub stock: Option<i64>,
}

impl ValueObject for PriceQuote {}

/// Stateless formula evaluator.
#[derive(Debug, Clone)]
pub struct FormulaEngine {
    config: EngineConfig,
}

impl FormulaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Validate, then evaluate. `sku` overrides the base and unit price inputs.
    pub fn quote(
        &self,
        pricing: &ParametricPricing,
        axes: &[VariantAxis],
        options: &AxisOptions,
        request: &PriceRequest,
        sku: Option<&SkuMapping>,
    ) -> DomainResult<PriceQuote> {
        self.validate(axes, options, request)?;
        self.evaluate(pricing, request, sku)
    }

    /// Check `request` against the product's axes.
    ///
    /// Selections and parameters for codes that are not axes are ignored here.
    pub fn validate(
        &self,
        axes: &[VariantAxis],
        options: &AxisOptions,
        request: &PriceRequest,
    ) -> DomainResult<()> {
        let axes = order_axes(axes.to_vec());
        let select_axes = || axes.iter().filter(|a| a.input_kind == AxisInputKind::Select);
        let range_axes = || axes.iter().filter(|a| a.input_kind == AxisInputKind::Range);

        if let Some(axis) = select_axes().find(|a| !request.selections.contains_key(&a.attribute_code)) {
            return Err(ValidationError::MissingSelection {
                attribute_code: axis.attribute_code.clone(),
            }
            .into());
        }

        if let Some(axis) = range_axes().find(|a| !request.parameters.contains_key(&a.attribute_code)) {
            return Err(ValidationError::MissingParameter {
                attribute_code: axis.attribute_code.clone(),
            }
            .into());
        }

        for axis in range_axes() {
            let value = request.parameters[&axis.attribute_code];
            let below = axis.min.is_some_and(|min| value < min);
            let above = axis.max.is_some_and(|max| value > max);
            if below || above || !value.is_finite() {
                return Err(ValidationError::ParameterOutOfRange {
                    attribute_code: axis.attribute_code.clone(),
                    value,
                    min: axis.min,
                    max: axis.max,
                }
                .into());
            }
        }

        for axis in range_axes() {
            let Some(step) = axis.step else { continue };
            let value = request.parameters[&axis.attribute_code];
            let origin = axis.min.unwrap_or(0.0);
            if !on_step(value, origin, step, self.config.step_tolerance) {
                return Err(ValidationError::InvalidStep {
                    attribute_code: axis.attribute_code.clone(),
                    value,
                    step,
                }
                .into());
            }
        }

        for axis in select_axes() {
            let Some(declared) = options.get(&axis.attribute_code).filter(|o| !o.is_empty()) else {
                continue;
            };
            let chosen = &request.selections[&axis.attribute_code];
            if !declared.iter().any(|option| &option.code == chosen) {
                return Err(ValidationError::UnknownOption {
                    attribute_code: axis.attribute_code.clone(),
                    option_code: chosen.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Evaluate the formula without validating against axes.
    pub fn evaluate(
        &self,
        pricing: &ParametricPricing,
        request: &PriceRequest,
        sku: Option<&SkuMapping>,
    ) -> DomainResult<PriceQuote> {
        let quantity = request.effective_quantity();
        let base = sku.map_or(pricing.base_price, |m| m.base_price);
        let per_unit = sku.map(|m| m.unit_price).or(pricing.unit_price).unwrap_or(0.0);

        let mut lines = PriceBreakdown::new();
        lines.insert(breakdown::BASE_PRICE.to_string(), base);

        let raw_unit = match pricing.formula {
            FormulaKind::Fixed => base,
            FormulaKind::PerUnit => {
                lines.insert(breakdown::PRICE_PER_UNIT.to_string(), per_unit);
                base + per_unit
            }
            FormulaKind::PerM2 => {
                let length_mm = parameter(request, params::LENGTH_MM)?;
                let width_mm = parameter(request, params::WIDTH_MM)?;
                let area = (length_mm / 1000.0) * (width_mm / 1000.0);
                lines.insert(
                    breakdown::AREA_M2.to_string(),
                    round_to(area, self.config.area_decimals),
                );
                lines.insert(breakdown::PRICE_PER_M2.to_string(), per_unit);
                base + area * per_unit
            }
            FormulaKind::PerRunningMeter => {
                let length_m = parameter(request, params::LENGTH_M)?;
                lines.insert(breakdown::LENGTH_M.to_string(), length_m);
                lines.insert(breakdown::PRICE_PER_METER.to_string(), per_unit);
                base + length_m * per_unit
            }
        };

        let decimals = self.config.price_decimals;
        let unit_price = round_to(raw_unit, decimals);
        let mut total_price = round_to(unit_price * quantity as f64, decimals);

        if let Some(minimum) = pricing.min_order_value {
            if total_price < minimum {
                lines.insert(
                    breakdown::MIN_ORDER_SURCHARGE.to_string(),
                    round_to(minimum - total_price, decimals),
                );
                total_price = minimum;
            }
        }

        Ok(PriceQuote {
            sku: sku.map(|m| m.sku.clone()),
            unit_price,
            total_price,
            currency: pricing.currency.clone(),
            quantity,
            breakdown: lines,
            stock: sku.and_then(|m| m.stock),
        })
    }
}

fn parameter(request: &PriceRequest, code: &str) -> DomainResult<f64> {
    request.parameters.get(code).copied().ok_or_else(|| {
        ValidationError::MissingParameter {
            attribute_code: code.to_string(),
        }
        .into()
    })
}
