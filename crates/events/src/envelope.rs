use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgecat_core::{ProductId, TenantId};

use crate::event::Event;

/// Envelope for a change event, carrying tenant + subject metadata.
///
/// - **Multi-tenancy** is enforced here via `tenant_id`.
/// - `product_id` is the catalog entry the change belongs to (parent, parametric
///   product or bundle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    tenant_id: TenantId,
    product_id: ProductId,
    event_type: String,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap `payload` with a fresh time-ordered event id.
    pub fn wrap(tenant_id: TenantId, product_id: ProductId, payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            tenant_id,
            product_id,
            event_type: payload.event_type().to_string(),
            payload,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
