//! Change events emitted by [`ConfiguratorService`](crate::service::ConfiguratorService).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgecat_bundles::{BundleMode, BundlePriceMode};
use forgecat_catalog::Selections;
use forgecat_core::{ProductId, SkuMappingId, TenantId};
use forgecat_events::Event;
use forgecat_pricing::FormulaKind;

/// What changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogChange {
    AxesReplaced {
        attribute_codes: Vec<String>,
    },
    AxisOptionsReplaced {
        attribute_code: String,
        option_codes: Vec<String>,
    },
    VariantRegistered {
        variant_id: ProductId,
        combination: Selections,
    },
    ParametricPricingUpdated {
        formula: FormulaKind,
    },
    SkuMappingAdded {
        mapping_id: SkuMappingId,
        sku: String,
    },
    BundleComponentsReplaced {
        component_count: usize,
    },
    BundleSettingsUpdated {
        price_mode: Option<BundlePriceMode>,
        bundle_mode: BundleMode,
    },
}

/// A committed configuration change of one catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEvent {
    pub tenant_id: TenantId,
    /// Parent, parametric product or bundle the change belongs to.
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
    pub change: CatalogChange,
}

impl CatalogEvent {
    pub fn now(tenant_id: TenantId, product_id: ProductId, change: CatalogChange) -> Self {
        Self {
            tenant_id,
            product_id,
            occurred_at: Utc::now(),
            change,
        }
    }
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self.change {
            CatalogChange::AxesReplaced { .. } => "catalog.axes.replaced",
            CatalogChange::AxisOptionsReplaced { .. } => "catalog.axis_options.replaced",
            CatalogChange::VariantRegistered { .. } => "catalog.variant.registered",
            CatalogChange::ParametricPricingUpdated { .. } => "pricing.parametric.updated",
            CatalogChange::SkuMappingAdded { .. } => "pricing.sku_mapping.added",
            CatalogChange::BundleComponentsReplaced { .. } => "bundle.components.replaced",
            CatalogChange::BundleSettingsUpdated { .. } => "bundle.settings.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgecat_events::EventEnvelope;

    #[test]
    fn envelope_takes_type_from_change() {
        let tenant = TenantId::new();
        let product = ProductId::new();
        let event = CatalogEvent::now(
            tenant,
            product,
            CatalogChange::BundleComponentsReplaced { component_count: 3 },
        );
        let envelope = EventEnvelope::wrap(tenant, product, event);
        assert_eq!(envelope.event_type(), "bundle.components.replaced");
        assert_eq!(envelope.tenant_id(), tenant);
        assert_eq!(envelope.product_id(), product);
    }

    #[test]
    fn change_serializes_with_snake_case_tag() {
        let change = CatalogChange::ParametricPricingUpdated {
            formula: FormulaKind::PerM2,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "parametric_pricing_updated");
        assert_eq!(json["formula"], "per_m2");
    }
}
