//! In-memory catalog store for tests/dev.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use forgecat_bundles::{BundleComponent, BundleSettings};
use forgecat_catalog::{AxisOption, Product, ProductVariant, VariantAxis};
use forgecat_core::{ProductId, TenantId};
use forgecat_pricing::{AxisOptions, ParametricPricing, SkuMapping};

use super::{
    AxisRepository, BundleRepository, PricingRepository, ProductRepository, StoreError, VariantRepository,
};

type Key = (TenantId, ProductId);

#[derive(Debug, Default)]
struct CatalogState {
    /// Which tenant a product id was first written under.
    owners: HashMap<ProductId, TenantId>,
    products: HashMap<Key, Product>,
    axes: HashMap<Key, Vec<VariantAxis>>,
    axis_options: HashMap<Key, AxisOptions>,
    /// Keyed by parent product.
    variants: HashMap<Key, Vec<ProductVariant>>,
    pricing: HashMap<Key, ParametricPricing>,
    sku_mappings: HashMap<Key, Vec<SkuMapping>>,
    bundle_settings: HashMap<Key, BundleSettings>,
    components: HashMap<Key, Vec<BundleComponent>>,
}

impl CatalogState {
    fn check_owner(&self, tenant_id: TenantId, product_id: ProductId) -> Result<(), StoreError> {
        match self.owners.get(&product_id) {
            Some(owner) if *owner != tenant_id => Err(StoreError::TenantIsolation(format!(
                "product {product_id} belongs to another tenant"
            ))),
            _ => Ok(()),
        }
    }

    fn claim(&mut self, tenant_id: TenantId, product_id: ProductId) -> Result<(), StoreError> {
        self.check_owner(tenant_id, product_id)?;
        self.owners.insert(product_id, tenant_id);
        Ok(())
    }
}

/// Tenant-isolated in-memory implementation of every repository port.
///
/// All state sits behind one `RwLock`, so each write (including the
/// replace operations) is applied atomically with respect to readers.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Storage("catalog store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Storage("catalog store lock poisoned".to_string()))
    }
}

impl ProductRepository for InMemoryCatalogStore {
    fn get_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&(tenant_id, product_id)).cloned())
    }

    fn upsert_product(&self, tenant_id: TenantId, product: Product) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.claim(tenant_id, product.id)?;
        state.products.insert((tenant_id, product.id), product);
        Ok(())
    }
}

impl AxisRepository for InMemoryCatalogStore {
    fn axes(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<VariantAxis>, StoreError> {
        Ok(self
            .read()?
            .axes
            .get(&(tenant_id, product_id))
            .cloned()
            .unwrap_or_default())
    }

    fn replace_axes(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        axes: Vec<VariantAxis>,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.check_owner(tenant_id, product_id)?;

        // Options of axes that no longer exist go with them.
        if let Some(options) = state.axis_options.get_mut(&(tenant_id, product_id)) {
            options.retain(|code, _| axes.iter().any(|axis| &axis.attribute_code == code));
        }
        state.axes.insert((tenant_id, product_id), axes);
        Ok(())
    }

    fn axis_options(&self, tenant_id: TenantId, product_id: ProductId) -> Result<AxisOptions, StoreError> {
        Ok(self
            .read()?
            .axis_options
            .get(&(tenant_id, product_id))
            .cloned()
            .unwrap_or_default())
    }

    fn replace_axis_options(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        attribute_code: &str,
        options: Vec<AxisOption>,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.check_owner(tenant_id, product_id)?;
        state
            .axis_options
            .entry((tenant_id, product_id))
            .or_default()
            .insert(attribute_code.to_string(), options);
        Ok(())
    }
}

impl VariantRepository for InMemoryCatalogStore {
    fn variants(&self, tenant_id: TenantId, parent_id: ProductId) -> Result<Vec<ProductVariant>, StoreError> {
        Ok(self
            .read()?
            .variants
            .get(&(tenant_id, parent_id))
            .cloned()
            .unwrap_or_default())
    }

    /// Stores the variant's product record together with its axis values.
    fn insert_variant(&self, tenant_id: TenantId, variant: ProductVariant) -> Result<(), StoreError> {
        let parent_id = variant
            .parent_id()
            .ok_or_else(|| StoreError::Storage(format!("variant {} has no parent", variant.product.id)))?;

        let mut state = self.write()?;
        state.check_owner(tenant_id, parent_id)?;
        state.claim(tenant_id, variant.product.id)?;

        state
            .products
            .insert((tenant_id, variant.product.id), variant.product.clone());
        let family = state.variants.entry((tenant_id, parent_id)).or_default();
        family.retain(|existing| existing.product.id != variant.product.id);
        family.push(variant);
        Ok(())
    }
}

impl PricingRepository for InMemoryCatalogStore {
    fn parametric_pricing(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Option<ParametricPricing>, StoreError> {
        Ok(self.read()?.pricing.get(&(tenant_id, product_id)).cloned())
    }

    fn upsert_parametric_pricing(&self, tenant_id: TenantId, pricing: ParametricPricing) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.check_owner(tenant_id, pricing.product_id)?;
        state.pricing.insert((tenant_id, pricing.product_id), pricing);
        Ok(())
    }

    fn sku_mappings(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<SkuMapping>, StoreError> {
        Ok(self
            .read()?
            .sku_mappings
            .get(&(tenant_id, product_id))
            .cloned()
            .unwrap_or_default())
    }

    fn insert_sku_mapping(&self, tenant_id: TenantId, mapping: SkuMapping) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.check_owner(tenant_id, mapping.product_id)?;
        state
            .sku_mappings
            .entry((tenant_id, mapping.product_id))
            .or_default()
            .push(mapping);
        Ok(())
    }
}

impl BundleRepository for InMemoryCatalogStore {
    fn bundle_settings(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
    ) -> Result<Option<BundleSettings>, StoreError> {
        Ok(self.read()?.bundle_settings.get(&(tenant_id, bundle_id)).cloned())
    }

    fn upsert_bundle_settings(&self, tenant_id: TenantId, settings: BundleSettings) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.check_owner(tenant_id, settings.bundle_id)?;
        state.bundle_settings.insert((tenant_id, settings.bundle_id), settings);
        Ok(())
    }

    fn components(&self, tenant_id: TenantId, bundle_id: ProductId) -> Result<Vec<BundleComponent>, StoreError> {
        Ok(self
            .read()?
            .components
            .get(&(tenant_id, bundle_id))
            .cloned()
            .unwrap_or_default())
    }

    fn replace_components(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
        components: Vec<BundleComponent>,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.check_owner(tenant_id, bundle_id)?;
        state.components.insert((tenant_id, bundle_id), components);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgecat_catalog::{AxisInputKind, ProductKind};
    use forgecat_core::AxisId;

    fn axis(product_id: ProductId, code: &str) -> VariantAxis {
        VariantAxis {
            id: AxisId::new(),
            parent_id: product_id,
            attribute_code: code.to_string(),
            position: 0,
            input_kind: AxisInputKind::Select,
            min: None,
            max: None,
            step: None,
        }
    }

    #[test]
    fn reads_are_tenant_scoped() {
        let store = InMemoryCatalogStore::new();
        let tenant = TenantId::new();
        let product = Product::new(ProductKind::Simple, "A");
        let id = product.id;
        store.upsert_product(tenant, product).unwrap();

        assert!(store.get_product(tenant, id).unwrap().is_some());
        assert!(store.get_product(TenantId::new(), id).unwrap().is_none());
    }

    #[test]
    fn cross_tenant_write_is_rejected() {
        let store = InMemoryCatalogStore::new();
        let owner = TenantId::new();
        let product = Product::new(ProductKind::VariantParent, "P");
        let id = product.id;
        store.upsert_product(owner, product.clone()).unwrap();

        let intruder = TenantId::new();
        assert!(matches!(
            store.upsert_product(intruder, product),
            Err(StoreError::TenantIsolation(_))
        ));
        assert!(matches!(
            store.replace_axes(intruder, id, vec![axis(id, "color")]),
            Err(StoreError::TenantIsolation(_))
        ));
    }

    #[test]
    fn replace_axes_swaps_whole_set_and_drops_stale_options() {
        let store = InMemoryCatalogStore::new();
        let tenant = TenantId::new();
        let product = Product::new(ProductKind::Parametric, "P");
        let id = product.id;
        store.upsert_product(tenant, product).unwrap();

        store
            .replace_axes(tenant, id, vec![axis(id, "color"), axis(id, "size")])
            .unwrap();
        store
            .replace_axis_options(tenant, id, "color", vec![AxisOption::new("red", 0)])
            .unwrap();

        store.replace_axes(tenant, id, vec![axis(id, "size")]).unwrap();

        let codes: Vec<_> = store
            .axes(tenant, id)
            .unwrap()
            .into_iter()
            .map(|a| a.attribute_code)
            .collect();
        assert_eq!(codes, vec!["size"]);
        assert!(store.axis_options(tenant, id).unwrap().is_empty());
    }
}
