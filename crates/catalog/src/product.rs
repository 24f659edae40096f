//! Product records as the configuration engine sees them.
//!
//! A product's [`ProductKind`] decides which operations apply to it: variant
//! parents own axes and variants, parametric products own pricing records and
//! SKU mappings, bundles own components.

use serde::{Deserialize, Serialize};

use forgecat_core::{DomainResult, Entity, ProductId, ValidationError};

use crate::LocalizedText;

/// What a catalog entry is, for configuration purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Directly purchasable, one price.
    Simple,
    /// Not purchasable itself; owns variants selected along axes.
    VariantParent,
    /// A concrete member of a variant family.
    Variant,
    /// Priced by formula over parameters.
    Parametric,
    /// Composed of other products.
    Bundle,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::VariantParent => "variant_parent",
            ProductKind::Variant => "variant",
            ProductKind::Parametric => "parametric",
            ProductKind::Bundle => "bundle",
        }
    }
}

impl core::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored price record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub amount: f64,
    /// ISO currency code (e.g. "EUR").
    pub currency: String,
}

impl ProductPrice {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Catalog entry as delivered by the product repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub kind: ProductKind,
    pub sku: String,
    /// Localized display names.
    #[serde(default)]
    pub names: LocalizedText,
    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
    /// Owning variant parent (variants only).
    #[serde(default)]
    pub parent_id: Option<ProductId>,
    /// Price records in repository order.
    #[serde(default)]
    pub prices: Vec<ProductPrice>,
}

impl Product {
    pub fn new(kind: ProductKind, sku: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            kind,
            sku: sku.into(),
            names: LocalizedText::new(),
            images: Vec::new(),
            parent_id: None,
            prices: Vec::new(),
        }
    }

    pub fn with_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(locale.into(), name.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    pub fn with_price(mut self, amount: f64, currency: impl Into<String>) -> Self {
        self.prices.push(ProductPrice::new(amount, currency));
        self
    }

    pub fn with_parent(mut self, parent_id: ProductId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// The first price record. Tiered pricing is not modelled.
    pub fn primary_price(&self) -> Option<&ProductPrice> {
        self.prices.first()
    }

    pub fn name(&self, locale: &str) -> Option<&str> {
        self.names.get(locale).map(String::as_str)
    }

    /// Reject the product unless it is of `expected` kind.
    pub fn ensure_kind(&self, expected: ProductKind) -> DomainResult<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ValidationError::WrongProductKind {
                product_id: self.id.to_string(),
                expected: expected.to_string(),
                actual: self.kind.to_string(),
            }
            .into())
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgecat_core::DomainError;

    #[test]
    fn primary_price_is_first_record() {
        let product = Product::new(ProductKind::Simple, "BOLT-M8")
            .with_price(0.40, "EUR")
            .with_price(0.35, "EUR");
        assert_eq!(product.primary_price().map(|p| p.amount), Some(0.40));
    }

    #[test]
    fn ensure_kind_reports_both_kinds() {
        let product = Product::new(ProductKind::Bundle, "KIT-1");
        let err = product.ensure_kind(ProductKind::VariantParent).unwrap_err();
        match err {
            DomainError::Validation(ValidationError::WrongProductKind { expected, actual, .. }) => {
                assert_eq!(expected, "variant_parent");
                assert_eq!(actual, "bundle");
            }
            other => panic!("expected WrongProductKind, got {other:?}"),
        }
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ProductKind::VariantParent).unwrap();
        assert_eq!(json, "\"variant_parent\"");
    }
}
