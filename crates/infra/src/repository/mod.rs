//! Tenant-scoped repository ports consumed by the configurator service.
//!
//! Every read and write is scoped by `TenantId`. Replacement operations
//! (`replace_axes`, `replace_axis_options`, `replace_components`) swap the whole
//! row set at once: readers see either the old set or the new one, never a mix.

pub mod memory;

use std::sync::Arc;

use forgecat_bundles::{BundleComponent, BundleSettings};
use forgecat_catalog::{AxisOption, Product, ProductVariant, VariantAxis};
use forgecat_core::{ProductId, TenantId};
use forgecat_pricing::{AxisOptions, ParametricPricing, SkuMapping};

pub use memory::InMemoryCatalogStore;

/// Repository error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A write referenced a record owned by another tenant.
    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub trait ProductRepository: Send + Sync {
    fn get_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    fn upsert_product(&self, tenant_id: TenantId, product: Product) -> Result<(), StoreError>;
}

pub trait AxisRepository: Send + Sync {
    /// Axes of a product, in stored order.
    fn axes(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<VariantAxis>, StoreError>;

    /// Remove every axis of `product_id` and store `axes` in their place.
    fn replace_axes(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        axes: Vec<VariantAxis>,
    ) -> Result<(), StoreError>;

    /// Declared options of every select axis of `product_id`.
    fn axis_options(&self, tenant_id: TenantId, product_id: ProductId) -> Result<AxisOptions, StoreError>;

    fn replace_axis_options(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        attribute_code: &str,
        options: Vec<AxisOption>,
    ) -> Result<(), StoreError>;
}

pub trait VariantRepository: Send + Sync {
    fn variants(&self, tenant_id: TenantId, parent_id: ProductId) -> Result<Vec<ProductVariant>, StoreError>;

    fn insert_variant(&self, tenant_id: TenantId, variant: ProductVariant) -> Result<(), StoreError>;
}

pub trait PricingRepository: Send + Sync {
    fn parametric_pricing(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Option<ParametricPricing>, StoreError>;

    fn upsert_parametric_pricing(&self, tenant_id: TenantId, pricing: ParametricPricing) -> Result<(), StoreError>;

    fn sku_mappings(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<SkuMapping>, StoreError>;

    fn insert_sku_mapping(&self, tenant_id: TenantId, mapping: SkuMapping) -> Result<(), StoreError>;
}

pub trait BundleRepository: Send + Sync {
    fn bundle_settings(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
    ) -> Result<Option<BundleSettings>, StoreError>;

    fn upsert_bundle_settings(&self, tenant_id: TenantId, settings: BundleSettings) -> Result<(), StoreError>;

    fn components(&self, tenant_id: TenantId, bundle_id: ProductId) -> Result<Vec<BundleComponent>, StoreError>;

    /// Remove every component of `bundle_id` and store `components` in their place.
    fn replace_components(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
        components: Vec<BundleComponent>,
    ) -> Result<(), StoreError>;
}

/// Everything the configurator service reads and writes.
pub trait CatalogRepository:
    ProductRepository + AxisRepository + VariantRepository + PricingRepository + BundleRepository
{
}

impl<T> CatalogRepository for T where
    T: ProductRepository + AxisRepository + VariantRepository + PricingRepository + BundleRepository
{
}

impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    fn get_product(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(tenant_id, product_id)
    }

    fn upsert_product(&self, tenant_id: TenantId, product: Product) -> Result<(), StoreError> {
        (**self).upsert_product(tenant_id, product)
    }
}

impl<S> AxisRepository for Arc<S>
where
    S: AxisRepository + ?Sized,
{
    fn axes(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<VariantAxis>, StoreError> {
        (**self).axes(tenant_id, product_id)
    }

    fn replace_axes(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        axes: Vec<VariantAxis>,
    ) -> Result<(), StoreError> {
        (**self).replace_axes(tenant_id, product_id, axes)
    }

    fn axis_options(&self, tenant_id: TenantId, product_id: ProductId) -> Result<AxisOptions, StoreError> {
        (**self).axis_options(tenant_id, product_id)
    }

    fn replace_axis_options(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        attribute_code: &str,
        options: Vec<AxisOption>,
    ) -> Result<(), StoreError> {
        (**self).replace_axis_options(tenant_id, product_id, attribute_code, options)
    }
}

impl<S> VariantRepository for Arc<S>
where
    S: VariantRepository + ?Sized,
{
    fn variants(&self, tenant_id: TenantId, parent_id: ProductId) -> Result<Vec<ProductVariant>, StoreError> {
        (**self).variants(tenant_id, parent_id)
    }

    fn insert_variant(&self, tenant_id: TenantId, variant: ProductVariant) -> Result<(), StoreError> {
        (**self).insert_variant(tenant_id, variant)
    }
}

impl<S> PricingRepository for Arc<S>
where
    S: PricingRepository + ?Sized,
{
    fn parametric_pricing(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Option<ParametricPricing>, StoreError> {
        (**self).parametric_pricing(tenant_id, product_id)
    }

    fn upsert_parametric_pricing(&self, tenant_id: TenantId, pricing: ParametricPricing) -> Result<(), StoreError> {
        (**self).upsert_parametric_pricing(tenant_id, pricing)
    }

    fn sku_mappings(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Vec<SkuMapping>, StoreError> {
        (**self).sku_mappings(tenant_id, product_id)
    }

    fn insert_sku_mapping(&self, tenant_id: TenantId, mapping: SkuMapping) -> Result<(), StoreError> {
        (**self).insert_sku_mapping(tenant_id, mapping)
    }
}

impl<S> BundleRepository for Arc<S>
where
    S: BundleRepository + ?Sized,
{
    fn bundle_settings(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
    ) -> Result<Option<BundleSettings>, StoreError> {
        (**self).bundle_settings(tenant_id, bundle_id)
    }

    fn upsert_bundle_settings(&self, tenant_id: TenantId, settings: BundleSettings) -> Result<(), StoreError> {
        (**self).upsert_bundle_settings(tenant_id, settings)
    }

    fn components(&self, tenant_id: TenantId, bundle_id: ProductId) -> Result<Vec<BundleComponent>, StoreError> {
        (**self).components(tenant_id, bundle_id)
    }

    fn replace_components(
        &self,
        tenant_id: TenantId,
        bundle_id: ProductId,
        components: Vec<BundleComponent>,
    ) -> Result<(), StoreError> {
        (**self).replace_components(tenant_id, bundle_id, components)
    }
}
