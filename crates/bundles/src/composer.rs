//! Bundle price aggregation.

use serde::{Deserialize, Serialize};

use forgecat_catalog::{Product, ProductKind, Selections};
use forgecat_core::numeric::round_to;
use forgecat_core::{
    ComponentId, ConfigurationError, DomainError, DomainResult, EngineConfig, NotFound, ProductId,
    ValidationError, ValueObject,
};
use forgecat_pricing::{Parameters, PriceQuote, PriceRequest};

use crate::component::{BundleComponent, BundleMode, BundlePriceMode, BundleSettings, NewComponent};

/// Data the composer needs about component products.
///
/// Implemented by the service layer on top of its repositories; the error type
/// lets storage failures flow through unchanged.
pub trait ComponentSource {
    type Error: From<DomainError>;

    fn product(&self, product_id: ProductId) -> Result<Product, Self::Error>;

    /// Quote a parametric product (SKU overrides included).
    fn parametric_quote(&self, product: &Product, request: &PriceRequest) -> Result<PriceQuote, Self::Error>;
}

/// One requested component line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleLineRequest {
    pub component_id: ComponentId,
    /// Falls back to the component's default quantity.
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub selections: Selections,
}

impl BundleLineRequest {
    pub fn new(component_id: ComponentId) -> Self {
        Self {
            component_id,
            ..Self::default()
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_parameter(mut self, code: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(code.into(), value);
        self
    }

    pub fn with_selection(mut self, code: impl Into<String>, option: impl Into<String>) -> Self {
        self.selections.insert(code.into(), option.into());
        self
    }
}

/// Priced component line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleLineQuote {
    pub component_id: ComponentId,
    pub product_id: ProductId,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
    pub currency: String,
}

/// Result of pricing a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleQuote {
    pub price_mode: BundlePriceMode,
    /// Empty for fixed-price bundles.
    pub components: Vec<BundleLineQuote>,
    pub total: f64,
    /// `None` for a computed bundle priced with no lines.
    pub currency: Option<String>,
}

impl ValueObject for BundleQuote {}

#[derive(Debug, Clone)]
pub struct BundleComposer {
    config: EngineConfig,
}

impl BundleComposer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Validate a full replacement component list for `bundle`.
    ///
    /// Rows come back ordered by position; nothing is returned unless every
    /// candidate passes.
    pub fn prepare_components<S: ComponentSource>(
        &self,
        bundle: &Product,
        components: Vec<NewComponent>,
        source: &S,
    ) -> Result<Vec<BundleComponent>, S::Error> {
        bundle.ensure_kind(ProductKind::Bundle)?;

        let mut rows = Vec::with_capacity(components.len());
        for candidate in components {
            let product = source.product(candidate.component_product_id)?;
            rows.push(candidate.into_component(bundle.id, &product)?);
        }
        rows.sort_by_key(|row| row.position);
        Ok(rows)
    }

    /// Price `bundle` for the requested lines.
    pub fn price<S: ComponentSource>(
        &self,
        bundle: &Product,
        settings: &BundleSettings,
        components: &[BundleComponent],
        lines: &[BundleLineRequest],
        source: &S,
    ) -> Result<BundleQuote, S::Error> {
        bundle.ensure_kind(ProductKind::Bundle)?;

        let price_mode = settings
            .price_mode
            .ok_or_else(|| DomainError::from(ConfigurationError::MissingPriceMode(bundle.id.to_string())))?;

        match price_mode {
            BundlePriceMode::Fixed => Ok(self.fixed_price(bundle)?),
            BundlePriceMode::Computed => self.computed_price(settings, components, lines, source),
        }
    }

    fn fixed_price(&self, bundle: &Product) -> DomainResult<BundleQuote> {
        let price = bundle
            .primary_price()
            .ok_or_else(|| ConfigurationError::MissingBundlePrice(bundle.id.to_string()))?;
        Ok(BundleQuote {
            price_mode: BundlePriceMode::Fixed,
            components: Vec::new(),
            total: price.amount,
            currency: Some(price.currency.clone()),
        })
    }

    fn computed_price<S: ComponentSource>(
        &self,
        settings: &BundleSettings,
        components: &[BundleComponent],
        lines: &[BundleLineRequest],
        source: &S,
    ) -> Result<BundleQuote, S::Error> {
        let decimals = self.config.price_decimals;
        let mut quoted = Vec::with_capacity(lines.len());
        let mut currency: Option<String> = None;
        let mut total = 0.0;

        for line in lines {
            let component = components
                .iter()
                .find(|c| c.id == line.component_id)
                .ok_or_else(|| DomainError::from(NotFound::Component(line.component_id.to_string())))?;

            let quantity = line.quantity.unwrap_or(component.default_quantity);
            if quantity <= 0 {
                return Err(DomainError::from(ValidationError::QuantityOutOfBounds {
                    quantity,
                    min: component.min_quantity,
                    max: component.max_quantity,
                })
                .into());
            }
            if settings.bundle_mode == BundleMode::Configurable {
                component.check_quantity(quantity)?;
            }

            let product = source.product(component.component_product_id)?;
            let (unit_price, line_currency, sku) = match product.kind {
                ProductKind::Simple | ProductKind::Variant => {
                    let price = product
                        .primary_price()
                        .ok_or_else(|| DomainError::from(ConfigurationError::MissingPriceRecord(product.id.to_string())))?;
                    (price.amount, price.currency.clone(), product.sku.clone())
                }
                ProductKind::Parametric => {
                    let request = parametric_request(component, line, quantity);
                    let quote = source.parametric_quote(&product, &request)?;
                    let sku = quote.sku.unwrap_or_else(|| product.sku.clone());
                    (quote.unit_price, quote.currency, sku)
                }
                ProductKind::Bundle | ProductKind::VariantParent => {
                    return Err(DomainError::from(ValidationError::InvalidComponentType {
                        product_id: product.id.to_string(),
                        kind: product.kind.to_string(),
                    })
                    .into());
                }
            };

            match &currency {
                Some(expected) if *expected != line_currency => {
                    return Err(DomainError::from(ConfigurationError::MixedCurrency {
                        expected: expected.clone(),
                        found: line_currency,
                    })
                    .into());
                }
                Some(_) => {}
                None => currency = Some(line_currency.clone()),
            }

            let line_total = round_to(unit_price * quantity as f64, decimals);
            total += line_total;
            quoted.push(BundleLineQuote {
                component_id: component.id,
                product_id: product.id,
                sku,
                quantity,
                unit_price,
                line_total,
                currency: line_currency,
            });
        }

        Ok(BundleQuote {
            price_mode: BundlePriceMode::Computed,
            components: quoted,
            total: round_to(total, decimals),
            currency,
        })
    }
}

/// Stored defaults overlaid with the line's own values, key by key.
fn parametric_request(component: &BundleComponent, line: &BundleLineRequest, quantity: i64) -> PriceRequest {
    let mut request = PriceRequest::new(quantity);
    request.parameters = component.default_parameters.clone();
    request.parameters.extend(line.parameters.clone());
    request.selections = component.default_selections.clone();
    request.selections.extend(line.selections.clone());
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use forgecat_catalog::{AxisInputKind, VariantAxis};
    use forgecat_core::{AxisId, ErrorKind};
    use forgecat_pricing::{AxisOptions, FormulaEngine, FormulaKind, ParametricPricing};
    use proptest::prelude::*;

    #[derive(Default)]
    struct Catalog {
        products: HashMap<ProductId, Product>,
        pricing: HashMap<ProductId, (ParametricPricing, Vec<VariantAxis>)>,
    }

    impl Catalog {
        fn add(&mut self, product: Product) -> ProductId {
            let id = product.id;
            self.products.insert(id, product);
            id
        }
    }

    impl ComponentSource for Catalog {
        type Error = DomainError;

        fn product(&self, product_id: ProductId) -> DomainResult<Product> {
            self.products
                .get(&product_id)
                .cloned()
                .ok_or_else(|| NotFound::Product(product_id.to_string()).into())
        }

        fn parametric_quote(&self, product: &Product, request: &PriceRequest) -> DomainResult<PriceQuote> {
            let (pricing, axes) = self
                .pricing
                .get(&product.id)
                .ok_or_else(|| DomainError::from(NotFound::PricingRecord(product.id.to_string())))?;
            FormulaEngine::new(EngineConfig::default()).quote(pricing, axes, &AxisOptions::new(), request, None)
        }
    }

    fn composer() -> BundleComposer {
        BundleComposer::new(EngineConfig::default())
    }

    fn bundle() -> Product {
        Product::new(ProductKind::Bundle, "KIT").with_price(99.0, "EUR")
    }

    fn computed(bundle: &Product, mode: BundleMode) -> BundleSettings {
        BundleSettings::new(bundle.id, BundlePriceMode::Computed, mode)
    }

    fn two_simple_components(catalog: &mut Catalog, bundle: &Product) -> Vec<BundleComponent> {
        let a = catalog.add(Product::new(ProductKind::Simple, "A").with_price(10.0, "EUR"));
        let b = catalog.add(Product::new(ProductKind::Simple, "B").with_price(15.0, "EUR"));
        composer()
            .prepare_components(
                bundle,
                vec![
                    NewComponent::new(b, 1).at_position(2),
                    NewComponent::new(a, 2).with_bounds(Some(1), Some(4)).at_position(1),
                ],
                &*catalog,
            )
            .unwrap()
    }

    #[test]
    fn components_are_ordered_by_position() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);
        let skus: Vec<_> = rows
            .iter()
            .map(|r| catalog.products[&r.component_product_id].sku.as_str())
            .collect();
        assert_eq!(skus, vec!["A", "B"]);
    }

    #[test]
    fn fixed_bundle_ignores_lines() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);
        let settings = BundleSettings::new(bundle.id, BundlePriceMode::Fixed, BundleMode::Configurable);
        let lines = vec![BundleLineRequest::new(rows[0].id).with_quantity(1000)];

        let quote = composer().price(&bundle, &settings, &rows, &lines, &catalog).unwrap();
        assert_eq!(quote.price_mode, BundlePriceMode::Fixed);
        assert!(quote.components.is_empty());
        assert_eq!(quote.total, 99.0);
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn fixed_bundle_without_price_is_a_setup_error() {
        let catalog = Catalog::default();
        let bundle = Product::new(ProductKind::Bundle, "KIT");
        let settings = BundleSettings::new(bundle.id, BundlePriceMode::Fixed, BundleMode::Fixed);
        let err = composer().price(&bundle, &settings, &[], &[], &catalog).unwrap_err();
        assert_eq!(
            err,
            DomainError::Configuration(ConfigurationError::MissingBundlePrice(bundle.id.to_string()))
        );
    }

    #[test]
    fn missing_price_mode_is_a_setup_error() {
        let catalog = Catalog::default();
        let bundle = bundle();
        let settings = BundleSettings {
            bundle_id: bundle.id,
            price_mode: None,
            bundle_mode: BundleMode::Fixed,
        };
        let err = composer().price(&bundle, &settings, &[], &[], &catalog).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn computed_bundle_sums_lines() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);
        let lines = vec![
            BundleLineRequest::new(rows[0].id).with_quantity(2),
            BundleLineRequest::new(rows[1].id).with_quantity(1),
        ];

        let quote = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Configurable), &rows, &lines, &catalog)
            .unwrap();
        assert_eq!(quote.total, 35.0);
        assert_eq!(quote.components.len(), 2);
        assert_eq!(quote.components[0].line_total, 20.0);
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn missing_quantity_uses_default() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);
        let lines = vec![BundleLineRequest::new(rows[0].id)];

        let quote = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Fixed), &rows, &lines, &catalog)
            .unwrap();
        assert_eq!(quote.components[0].quantity, 2);
        assert_eq!(quote.total, 20.0);
    }

    #[test]
    fn configurable_bundle_enforces_bounds() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);
        let lines = vec![BundleLineRequest::new(rows[0].id).with_quantity(9)];

        let err = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Configurable), &rows, &lines, &catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::QuantityOutOfBounds { quantity: 9, .. })
        ));

        let quote = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Fixed), &rows, &lines, &catalog)
            .unwrap();
        assert_eq!(quote.total, 90.0);
    }

    #[test]
    fn non_positive_line_quantity_is_rejected_in_every_mode() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);

        for quantity in [0, -3] {
            let lines = vec![BundleLineRequest::new(rows[1].id).with_quantity(quantity)];
            for mode in [BundleMode::Fixed, BundleMode::Configurable] {
                let err = composer()
                    .price(&bundle, &computed(&bundle, mode), &rows, &lines, &catalog)
                    .unwrap_err();
                assert!(matches!(
                    err,
                    DomainError::Validation(ValidationError::QuantityOutOfBounds { quantity: q, .. }) if q == quantity
                ));
            }
        }
    }

    #[test]
    fn unknown_component_line_is_not_found() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let rows = two_simple_components(&mut catalog, &bundle);
        let lines = vec![BundleLineRequest::new(ComponentId::new())];
        let err = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Fixed), &rows, &lines, &catalog)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn mixed_currency_is_rejected() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let eur = catalog.add(Product::new(ProductKind::Simple, "EUR-1").with_price(1.0, "EUR"));
        let usd = catalog.add(Product::new(ProductKind::Simple, "USD-1").with_price(1.0, "USD"));
        let rows = composer()
            .prepare_components(
                &bundle,
                vec![NewComponent::new(eur, 1), NewComponent::new(usd, 1).at_position(1)],
                &catalog,
            )
            .unwrap();
        let lines: Vec<_> = rows.iter().map(|r| BundleLineRequest::new(r.id)).collect();

        let err = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Fixed), &rows, &lines, &catalog)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Configuration(ConfigurationError::MixedCurrency {
                expected: "EUR".into(),
                found: "USD".into()
            })
        );
    }

    #[test]
    fn parametric_line_merges_defaults_with_line_values() {
        let mut catalog = Catalog::default();
        let bundle = bundle();
        let panel = catalog.add(Product::new(ProductKind::Parametric, "PANEL"));
        let axis = |code: &str, position| VariantAxis {
            id: AxisId::new(),
            parent_id: panel,
            attribute_code: code.to_string(),
            position,
            input_kind: AxisInputKind::Range,
            min: Some(100.0),
            max: Some(3000.0),
            step: None,
        };
        catalog.pricing.insert(
            panel,
            (
                ParametricPricing {
                    product_id: panel,
                    formula: FormulaKind::PerM2,
                    base_price: 5.0,
                    unit_price: Some(40.0),
                    currency: "EUR".into(),
                    min_order_value: None,
                },
                vec![axis("length_mm", 0), axis("width_mm", 1)],
            ),
        );

        let rows = composer()
            .prepare_components(
                &bundle,
                vec![
                    NewComponent::new(panel, 1)
                        .with_default_parameter("length_mm", 1000.0)
                        .with_default_parameter("width_mm", 1000.0),
                ],
                &catalog,
            )
            .unwrap();
        let lines = vec![
            BundleLineRequest::new(rows[0].id)
                .with_quantity(3)
                .with_parameter("width_mm", 500.0),
        ];

        let quote = composer()
            .price(&bundle, &computed(&bundle, BundleMode::Fixed), &rows, &lines, &catalog)
            .unwrap();
        // 5 + 0.5 m² × 40 = 25 per unit
        assert_eq!(quote.components[0].unit_price, 25.0);
        assert_eq!(quote.components[0].sku, "PANEL");
        assert_eq!(quote.total, 75.0);
    }

    #[test]
    fn non_bundle_product_cannot_take_components() {
        let catalog = Catalog::default();
        let not_a_bundle = Product::new(ProductKind::Simple, "X");
        let err = composer()
            .prepare_components(&not_a_bundle, Vec::new(), &catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::WrongProductKind { .. })
        ));
    }

    proptest! {
        /// Property: a computed total equals the sum of its line totals.
        #[test]
        fn computed_total_is_sum_of_lines(
            prices in prop::collection::vec((1u32..100_000, 1i64..20), 1..6)
        ) {
            let mut catalog = Catalog::default();
            let bundle = bundle();
            let new: Vec<_> = prices
                .iter()
                .enumerate()
                .map(|(i, (cents, qty))| {
                    let id = catalog.add(
                        Product::new(ProductKind::Simple, format!("P{i}"))
                            .with_price(f64::from(*cents) / 100.0, "EUR"),
                    );
                    NewComponent::new(id, *qty).at_position(i as i32)
                })
                .collect();
            let rows = composer().prepare_components(&bundle, new, &catalog).unwrap();
            let lines: Vec<_> = rows.iter().map(|r| BundleLineRequest::new(r.id)).collect();

            let quote = composer()
                .price(&bundle, &computed(&bundle, BundleMode::Fixed), &rows, &lines, &catalog)
                .unwrap();
            let sum: f64 = quote.components.iter().map(|l| l.line_total).sum();
            prop_assert!((quote.total - sum).abs() < 0.005);
        }
    }
}
