//! Configurator service: the tenant-scoped entry point for every configuration
//! operation.
//!
//! ```text
//! request
//!   ↓
//! 1. Load rows through the repository ports (tenant-scoped)
//!   ↓
//! 2. Run the pure domain step (axis catalog, resolver, formula engine,
//!    SKU resolver, bundle composer)
//!   ↓
//! 3. Mutations only: write through the repository, then publish a CatalogEvent
//! ```
//!
//! Reads never publish. A publish failure after a successful write is returned
//! as [`ServiceError::Publish`]; the write stays committed.

use std::collections::{BTreeMap, HashSet};

use forgecat_bundles::{
    BundleComponent, BundleComposer, BundleLineRequest, BundleMode, BundleQuote, BundleSettings,
    ComponentSource, NewComponent,
};
use forgecat_catalog::{
    AxisCatalog, AxisInputKind, AxisOption, DiscoveredAxis, LabelTable, NewAxis, OptionAvailability,
    Product, ProductKind, ProductVariant, ResolvedVariant, Selections, VariantAxis, VariantResolver,
    combination_key, ensure_unique_combinations, order_axes,
};
use forgecat_core::{
    ConfigurationError, DomainError, EngineConfig, ErrorKind, NotFound, ProductId, TenantId,
    ValidationError,
};
use forgecat_events::{EventBus, EventEnvelope};
use forgecat_pricing::{
    FormulaEngine, ParametricPricing, PriceQuote, PriceRequest, SkuMapping, SkuMappingResolver,
};

use crate::catalog_events::{CatalogChange, CatalogEvent};
use crate::error::ServiceError;
use crate::repository::CatalogRepository;

pub struct ConfiguratorService<R, B> {
    repo: R,
    bus: B,
    config: EngineConfig,
    labels: LabelTable,
    axis_catalog: AxisCatalog,
    resolver: VariantResolver,
    formulas: FormulaEngine,
    skus: SkuMappingResolver,
    composer: BundleComposer,
}

impl<R, B> ConfiguratorService<R, B> {
    pub fn new(repo: R, bus: B, config: EngineConfig) -> Self {
        Self {
            repo,
            bus,
            labels: LabelTable::new(),
            axis_catalog: AxisCatalog::new(config.clone()),
            resolver: VariantResolver::new(),
            formulas: FormulaEngine::new(config.clone()),
            skus: SkuMappingResolver::new(),
            composer: BundleComposer::new(config.clone()),
            config,
        }
    }

    /// Use `labels` for option labels and synthesized variant names.
    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = labels;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_parts(self) -> (R, B) {
        (self.repo, self.bus)
    }
}

impl<R, B> ConfiguratorService<R, B>
where
    R: CatalogRepository,
    B: EventBus<EventEnvelope<CatalogEvent>>,
{
    pub fn upsert_product(&self, tenant_id: TenantId, product: Product) -> Result<(), ServiceError> {
        traced("upsert_product", || {
            tracing::debug!(%tenant_id, product_id = %product.id, kind = %product.kind, "upserting product");
            self.repo.upsert_product(tenant_id, product)?;
            Ok(())
        })
    }

    pub fn product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Product, ServiceError> {
        traced("product", || self.load_product(tenant_id, product_id))
    }

    // --- axis catalog ---

    /// Replace the full axis set of a variant parent or parametric product.
    pub fn set_axes(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        axes: Vec<NewAxis>,
    ) -> Result<Vec<VariantAxis>, ServiceError> {
        traced("set_axes", || {
            tracing::debug!(%tenant_id, %product_id, count = axes.len(), "replacing axes");
            let product = self.load_product(tenant_id, product_id)?;
            let prepared = self.axis_catalog.prepare_axes(&product, axes)?;

            self.repo.replace_axes(tenant_id, product_id, prepared.clone())?;
            tracing::info!(%tenant_id, %product_id, count = prepared.len(), "axes replaced");

            self.publish(
                tenant_id,
                product_id,
                CatalogChange::AxesReplaced {
                    attribute_codes: prepared.iter().map(|a| a.attribute_code.clone()).collect(),
                },
            )?;
            Ok(prepared)
        })
    }

    /// Axes of a product ordered by (position, attribute code).
    pub fn get_axes(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<VariantAxis>, ServiceError> {
        traced("get_axes", || {
            self.load_product(tenant_id, product_id)?;
            Ok(order_axes(self.repo.axes(tenant_id, product_id)?))
        })
    }

    /// Axes of a variant parent with the options observed on its variants.
    pub fn discover_options(
        &self,
        tenant_id: TenantId,
        parent_id: ProductId,
    ) -> Result<Vec<DiscoveredAxis>, ServiceError> {
        traced("discover_options", || {
            let parent = self.load_product(tenant_id, parent_id)?;
            parent.ensure_kind(ProductKind::VariantParent)?;
            let axes = self.repo.axes(tenant_id, parent_id)?;
            let variants = self.repo.variants(tenant_id, parent_id)?;
            Ok(self.axis_catalog.discover_options(&axes, &variants, &self.labels))
        })
    }

    /// Declare the allowed options of one select axis of a parametric product.
    pub fn set_axis_options(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        attribute_code: &str,
        mut options: Vec<AxisOption>,
    ) -> Result<Vec<AxisOption>, ServiceError> {
        traced("set_axis_options", || {
            let product = self.load_product(tenant_id, product_id)?;
            product.ensure_kind(ProductKind::Parametric)?;

            let axes = self.repo.axes(tenant_id, product_id)?;
            let axis = axes
                .iter()
                .find(|a| a.attribute_code == attribute_code)
                .ok_or_else(|| ValidationError::UnknownAxis {
                    attribute_code: attribute_code.to_string(),
                })?;
            if axis.input_kind != AxisInputKind::Select {
                return Err(DomainError::validation(format!(
                    "axis {attribute_code} is a range axis and takes no options"
                ))
                .into());
            }

            let mut seen = HashSet::new();
            for option in &options {
                if option.code.trim().is_empty() {
                    return Err(DomainError::validation("option code cannot be empty").into());
                }
                if !seen.insert(option.code.as_str()) {
                    return Err(DomainError::validation(format!(
                        "duplicate option {} for axis {attribute_code}",
                        option.code
                    ))
                    .into());
                }
            }
            options.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));

            self.repo
                .replace_axis_options(tenant_id, product_id, attribute_code, options.clone())?;
            tracing::info!(%tenant_id, %product_id, attribute_code, count = options.len(), "axis options replaced");

            self.publish(
                tenant_id,
                product_id,
                CatalogChange::AxisOptionsReplaced {
                    attribute_code: attribute_code.to_string(),
                    option_codes: options.iter().map(|o| o.code.clone()).collect(),
                },
            )?;
            Ok(options)
        })
    }

    // --- variant resolver ---

    /// Store a new variant of `parent_id` after checking its axis values and
    /// that no sibling already has the same combination.
    pub fn register_variant(
        &self,
        tenant_id: TenantId,
        parent_id: ProductId,
        variant: ProductVariant,
    ) -> Result<(), ServiceError> {
        traced("register_variant", || {
            let parent = self.load_product(tenant_id, parent_id)?;
            parent.ensure_kind(ProductKind::VariantParent)?;
            let axes = self.repo.axes(tenant_id, parent_id)?;
            if axes.is_empty() {
                return Err(DomainError::from(ConfigurationError::MissingAxes(parent_id.to_string())).into());
            }
            variant.validate_against(parent_id, &axes)?;

            if let Some(existing) = self.repo.get_product(tenant_id, variant.product.id)? {
                let same_family =
                    existing.kind == ProductKind::Variant && existing.parent_id == Some(parent_id);
                if !same_family {
                    return Err(DomainError::conflict(format!(
                        "product {} already exists as {} and cannot be registered as a variant of {parent_id}",
                        existing.id, existing.kind
                    ))
                    .into());
                }
            }

            let siblings = self.repo.variants(tenant_id, parent_id)?;
            ensure_unique_combinations(
                siblings
                    .iter()
                    .filter(|s| s.product.id != variant.product.id)
                    .chain(std::iter::once(&variant)),
            )?;

            let variant_id = variant.product.id;
            let combination = variant.selections();
            self.repo.insert_variant(tenant_id, variant)?;
            tracing::info!(%tenant_id, %parent_id, %variant_id, combination = %combination_key(&combination), "variant registered");

            self.publish(
                tenant_id,
                parent_id,
                CatalogChange::VariantRegistered {
                    variant_id,
                    combination,
                },
            )
        })
    }

    /// The variant of `parent_id` matching `selections` exactly.
    pub fn select_variant(
        &self,
        tenant_id: TenantId,
        parent_id: ProductId,
        selections: &Selections,
    ) -> Result<ResolvedVariant, ServiceError> {
        traced("select_variant", || {
            tracing::debug!(%tenant_id, %parent_id, selections = %combination_key(selections), "selecting variant");
            let parent = self.load_product(tenant_id, parent_id)?;
            let axes = self.repo.axes(tenant_id, parent_id)?;
            let variants = self.repo.variants(tenant_id, parent_id)?;
            Ok(self
                .resolver
                .select_variant(&parent, &axes, &variants, selections, &self.labels)?)
        })
    }

    /// Remaining options per axis, flagged by whether they are still reachable.
    pub fn available_options(
        &self,
        tenant_id: TenantId,
        parent_id: ProductId,
        partial: &Selections,
    ) -> Result<BTreeMap<String, Vec<OptionAvailability>>, ServiceError> {
        traced("available_options", || {
            let parent = self.load_product(tenant_id, parent_id)?;
            parent.ensure_kind(ProductKind::VariantParent)?;
            let axes = self.repo.axes(tenant_id, parent_id)?;
            let variants = self.repo.variants(tenant_id, parent_id)?;
            Ok(self.resolver.available_options(&axes, &variants, partial)?)
        })
    }

    // --- parametric pricing ---

    pub fn set_parametric_pricing(&self, tenant_id: TenantId, pricing: ParametricPricing) -> Result<(), ServiceError> {
        traced("set_parametric_pricing", || {
            let product_id = pricing.product_id;
            let product = self.load_product(tenant_id, product_id)?;
            product.ensure_kind(ProductKind::Parametric)?;
            validate_pricing(&pricing)?;

            let formula = pricing.formula;
            self.repo.upsert_parametric_pricing(tenant_id, pricing)?;
            tracing::info!(%tenant_id, %product_id, ?formula, "parametric pricing updated");

            self.publish(tenant_id, product_id, CatalogChange::ParametricPricingUpdated { formula })
        })
    }

    /// Quote a parametric product, applying a SKU mapping when the selections
    /// match one exactly.
    pub fn calculate_parametric_price(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        request: &PriceRequest,
    ) -> Result<PriceQuote, ServiceError> {
        traced("calculate_parametric_price", || {
            tracing::debug!(%tenant_id, %product_id, quantity = request.quantity, "calculating parametric price");
            let product = self.load_product(tenant_id, product_id)?;
            self.quote_parametric(tenant_id, &product, request)
        })
    }

    pub fn add_sku_mapping(&self, tenant_id: TenantId, mapping: SkuMapping) -> Result<SkuMapping, ServiceError> {
        traced("add_sku_mapping", || {
            let product_id = mapping.product_id;
            let product = self.load_product(tenant_id, product_id)?;
            product.ensure_kind(ProductKind::Parametric)?;

            let axes = self.repo.axes(tenant_id, product_id)?;
            self.skus.validate_mapping(&axes, &mapping)?;
            let existing = self.repo.sku_mappings(tenant_id, product_id)?;
            self.skus.ensure_no_duplicate(&existing, &mapping)?;

            self.repo.insert_sku_mapping(tenant_id, mapping.clone())?;
            tracing::info!(%tenant_id, %product_id, sku = %mapping.sku, "sku mapping added");

            self.publish(
                tenant_id,
                product_id,
                CatalogChange::SkuMappingAdded {
                    mapping_id: mapping.id,
                    sku: mapping.sku.clone(),
                },
            )?;
            Ok(mapping)
        })
    }

    // --- bundles ---

    pub fn set_bundle_settings(&self, tenant_id: TenantId, settings: BundleSettings) -> Result<(), ServiceError> {
        traced("set_bundle_settings", || {
            let bundle_id = settings.bundle_id;
            self.load_bundle(tenant_id, bundle_id)?;

            let (price_mode, bundle_mode) = (settings.price_mode, settings.bundle_mode);
            self.repo.upsert_bundle_settings(tenant_id, settings)?;
            tracing::info!(%tenant_id, %bundle_id, ?price_mode, ?bundle_mode, "bundle settings updated");

            self.publish(
                tenant_id,
                bundle_id,
                CatalogChange::BundleSettingsUpdated {
                    price_mode,
                    bundle_mode,
                },
            )
        })
    }

    /// Replace the full component list of a bundle.
    pub fn set_bundle_components(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
        components: Vec<NewComponent>,
    ) -> Result<Vec<BundleComponent>, ServiceError> {
        traced("set_bundle_components", || {
            tracing::debug!(%tenant_id, %bundle_id, count = components.len(), "replacing bundle components");
            let bundle = self.load_bundle(tenant_id, bundle_id)?;
            let source = TenantComponents {
                service: self,
                tenant_id,
            };
            let rows = self.composer.prepare_components(&bundle, components, &source)?;

            self.repo.replace_components(tenant_id, bundle_id, rows.clone())?;
            tracing::info!(%tenant_id, %bundle_id, count = rows.len(), "bundle components replaced");

            self.publish(
                tenant_id,
                bundle_id,
                CatalogChange::BundleComponentsReplaced {
                    component_count: rows.len(),
                },
            )?;
            Ok(rows)
        })
    }

    /// Components of a bundle ordered by position.
    pub fn get_bundle_components(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
    ) -> Result<Vec<BundleComponent>, ServiceError> {
        traced("get_bundle_components", || {
            self.load_bundle(tenant_id, bundle_id)?;
            let mut rows = self.repo.components(tenant_id, bundle_id)?;
            rows.sort_by_key(|row| row.position);
            Ok(rows)
        })
    }

    pub fn calculate_bundle_price(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
        lines: &[BundleLineRequest],
    ) -> Result<BundleQuote, ServiceError> {
        traced("calculate_bundle_price", || {
            tracing::debug!(%tenant_id, %bundle_id, lines = lines.len(), "calculating bundle price");
            let bundle = self.load_bundle(tenant_id, bundle_id)?;
            let settings = self
                .repo
                .bundle_settings(tenant_id, bundle_id)?
                .unwrap_or(BundleSettings {
                    bundle_id,
                    price_mode: None,
                    bundle_mode: BundleMode::default(),
                });
            let components = self.repo.components(tenant_id, bundle_id)?;
            let source = TenantComponents {
                service: self,
                tenant_id,
            };
            self.composer
                .price(&bundle, &settings, &components, lines, &source)
        })
    }

    fn publish(&self, tenant_id: TenantId, product_id: ProductId, change: CatalogChange) -> Result<(), ServiceError> {
        let event = CatalogEvent::now(tenant_id, product_id, change);
        self.bus
            .publish(EventEnvelope::wrap(tenant_id, product_id, event))
            .map_err(|err| ServiceError::Publish(err.to_string()))
    }
}

impl<R, B> ConfiguratorService<R, B>
where
    R: CatalogRepository,
{
    fn load_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Product, ServiceError> {
        self.repo
            .get_product(tenant_id, product_id)?
            .ok_or_else(|| NotFound::Product(product_id.to_string()).into())
    }

    fn load_bundle(&self, tenant_id: TenantId, bundle_id: ProductId) -> Result<Product, ServiceError> {
        let bundle = self
            .repo
            .get_product(tenant_id, bundle_id)?
            .ok_or_else(|| NotFound::Bundle(bundle_id.to_string()))?;
        bundle.ensure_kind(ProductKind::Bundle)?;
        Ok(bundle)
    }

    fn quote_parametric(
        &self,
        tenant_id: TenantId,
        product: &Product,
        request: &PriceRequest,
    ) -> Result<PriceQuote, ServiceError> {
        product.ensure_kind(ProductKind::Parametric)?;
        let pricing = self
            .repo
            .parametric_pricing(tenant_id, product.id)?
            .ok_or_else(|| NotFound::PricingRecord(product.id.to_string()))?;
        let axes = self.repo.axes(tenant_id, product.id)?;
        let options = self.repo.axis_options(tenant_id, product.id)?;
        let mappings = self.repo.sku_mappings(tenant_id, product.id)?;

        let mapping = self.skus.resolve(&mappings, product.id, &request.selections);
        if let Some(mapping) = mapping {
            tracing::debug!(product_id = %product.id, sku = %mapping.sku, "sku mapping applied");
        }

        let mut quote = self
            .formulas
            .quote(&pricing, &axes, &options, request, mapping)?;
        if quote.sku.is_none() {
            quote.sku = Some(product.sku.clone());
        }
        Ok(quote)
    }
}

/// Component data for one tenant, as seen by the bundle composer.
struct TenantComponents<'a, R, B> {
    service: &'a ConfiguratorService<R, B>,
    tenant_id: TenantId,
}

impl<R, B> ComponentSource for TenantComponents<'_, R, B>
where
    R: CatalogRepository,
{
    type Error = ServiceError;

    fn product(&self, product_id: ProductId) -> Result<Product, ServiceError> {
        self.service.load_product(self.tenant_id, product_id)
    }

    fn parametric_quote(&self, product: &Product, request: &PriceRequest) -> Result<PriceQuote, ServiceError> {
        self.service.quote_parametric(self.tenant_id, product, request)
    }
}

fn validate_pricing(pricing: &ParametricPricing) -> Result<(), DomainError> {
    if pricing.currency.trim().is_empty() {
        return Err(DomainError::validation("currency cannot be empty"));
    }
    let amounts = [
        ("base_price", Some(pricing.base_price)),
        ("unit_price", pricing.unit_price),
        ("min_order_value", pricing.min_order_value),
    ];
    for (field, amount) in amounts {
        if let Some(amount) = amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(DomainError::validation(format!("{field} must be a non-negative amount")));
            }
        }
    }
    Ok(())
}

/// Run `operation` and log its failure at a level matching who is at fault.
fn traced<T>(operation: &'static str, f: impl FnOnce() -> Result<T, ServiceError>) -> Result<T, ServiceError> {
    f().inspect_err(|err| match err.kind() {
        Some(ErrorKind::Validation | ErrorKind::InvalidId | ErrorKind::Conflict) => {
            tracing::warn!(operation, error = %err, "rejected input");
        }
        Some(ErrorKind::Configuration) => {
            tracing::warn!(operation, error = %err, "catalog setup error");
        }
        Some(ErrorKind::NotFound) => {
            tracing::debug!(operation, error = %err, "not found");
        }
        None => {
            tracing::error!(operation, error = %err, "operation failed");
        }
    })
}
