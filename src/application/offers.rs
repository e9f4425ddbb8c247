use crate::domain::offer::{DiscountRule, Offer};
use crate::domain::ports::OfferStoreRef;
use crate::error::{CommerceError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOfferRequest {
    pub coupon_code: String,
    pub rule: DiscountRule,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferPatch {
    pub rule: Option<DiscountRule>,
    pub is_active: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub usage_limit: Option<u32>,
}

/// Admin CRUD over offers. Redemption-side reads go through the payment
/// pipeline, not through here.
pub struct OfferService {
    offers: OfferStoreRef,
}

impl OfferService {
    pub fn new(offers: OfferStoreRef) -> Self {
        Self { offers }
    }

    pub async fn create_offer(&self, req: NewOfferRequest) -> Result<Offer> {
        let code = req.coupon_code.trim();
        if code.is_empty() {
            return Err(CommerceError::validation("couponCode is required"));
        }
        if req.valid_until < req.valid_from {
            return Err(CommerceError::validation(
                "validUntil must not precede validFrom",
            ));
        }
        if self.offers.find_by_code(code).await?.is_some() {
            return Err(CommerceError::conflict(format!(
                "Coupon code \"{code}\" already exists"
            )));
        }

        let offer = Offer::new(
            code,
            req.rule,
            req.valid_from,
            req.valid_until,
            req.usage_limit,
        );
        self.offers.put(offer.clone()).await?;
        info!(coupon_code = %offer.coupon_code, "offer created");
        Ok(offer)
    }

    pub async fn get_offer(&self, id: Uuid) -> Result<Offer> {
        self.offers
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Offer not found"))
    }

    pub async fn list_offers(&self) -> Result<Vec<Offer>> {
        let mut offers = self.offers.all().await?;
        offers.sort_by(|a, b| a.coupon_code.cmp(&b.coupon_code));
        Ok(offers)
    }

    pub async fn update_offer(&self, id: Uuid, patch: OfferPatch) -> Result<Offer> {
        let mut offer = self.get_offer(id).await?;
        if let Some(rule) = patch.rule {
            offer.rule = rule;
        }
        if let Some(is_active) = patch.is_active {
            offer.is_active = is_active;
        }
        if let Some(valid_from) = patch.valid_from {
            offer.valid_from = valid_from;
        }
        if let Some(valid_until) = patch.valid_until {
            offer.valid_until = valid_until;
        }
        if let Some(usage_limit) = patch.usage_limit {
            offer.usage_limit = Some(usage_limit);
        }
        self.offers.put(offer.clone()).await?;
        Ok(offer)
    }

    /// Offers are never deleted, only deactivated.
    pub async fn deactivate_offer(&self, id: Uuid) -> Result<Offer> {
        let mut offer = self.get_offer(id).await?;
        offer.is_active = false;
        self.offers.put(offer.clone()).await?;
        Ok(offer)
    }
}
