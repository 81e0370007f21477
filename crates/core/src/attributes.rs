//! Feed-type specific attribute blocks.
//!
//! Google product-review feeds carry publisher details; merchant-promotion
//! feeds carry the promotion definition itself.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation;

/// Maximum length of a promotion id accepted by Google.
pub const MAX_PROMOTION_ID_LENGTH: usize = 50;

/// Maximum length of a promotion long title.
pub const MAX_LONG_TITLE_LENGTH: usize = 60;

// ---------------------------------------------------------------------------
// Review feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAttributes {
    #[serde(default)]
    pub aggregator_name: Option<String>,
    #[serde(default)]
    pub publisher_name: String,
    #[serde(default)]
    pub publisher_favicon_url: Option<String>,
}

impl ReviewAttributes {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.publisher_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Review feed publisher name must not be empty".to_string(),
            ));
        }
        if let Some(url) = self.publisher_favicon_url.as_deref().filter(|u| !u.is_empty()) {
            validation::validate_url(url)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Promotion feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductApplicability {
    #[default]
    AllProducts,
    SpecificProducts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    #[default]
    NoCode,
    GenericCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionChannel {
    Online,
    InStore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionAttributes {
    #[serde(default)]
    pub promotion_id: String,
    #[serde(default)]
    pub product_applicability: ProductApplicability,
    #[serde(default)]
    pub offer_type: OfferType,
    /// Required when `offer_type` is [`OfferType::GenericCode`].
    #[serde(default)]
    pub generic_redemption_code: Option<String>,
    #[serde(default)]
    pub long_title: String,
    #[serde(default)]
    pub effective_start: Option<Timestamp>,
    #[serde(default)]
    pub effective_end: Option<Timestamp>,
    #[serde(default)]
    pub redemption_channels: Vec<RedemptionChannel>,
}

impl PromotionAttributes {
    pub fn validate(&self) -> Result<(), CoreError> {
        let id = self.promotion_id.trim();
        if id.is_empty() {
            return Err(CoreError::Validation(
                "Promotion id must not be empty".to_string(),
            ));
        }
        if id.len() > MAX_PROMOTION_ID_LENGTH {
            return Err(CoreError::Validation(format!(
                "Promotion id exceeds maximum length of {MAX_PROMOTION_ID_LENGTH} characters"
            )));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(CoreError::Validation(format!(
                "Promotion id '{id}' must not contain whitespace"
            )));
        }

        let title = self.long_title.trim();
        if title.is_empty() || title.chars().count() > MAX_LONG_TITLE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Promotion long title must be 1 to {MAX_LONG_TITLE_LENGTH} characters"
            )));
        }

        if self.offer_type == OfferType::GenericCode
            && self
                .generic_redemption_code
                .as_deref()
                .map_or(true, |c| c.trim().is_empty())
        {
            return Err(CoreError::Validation(
                "A generic redemption code is required for generic_code offers".to_string(),
            ));
        }

        match (self.effective_start, self.effective_end) {
            (Some(start), Some(end)) if end <= start => {
                return Err(CoreError::Validation(
                    "Promotion end date must be after its start date".to_string(),
                ));
            }
            (None, _) | (_, None) => {
                return Err(CoreError::Validation(
                    "Promotion effective dates are required".to_string(),
                ));
            }
            _ => {}
        }

        if self.redemption_channels.is_empty() {
            return Err(CoreError::Validation(
                "Select at least one redemption channel".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn valid_promotion() -> PromotionAttributes {
        let start = Utc.with_ymd_and_hms(2026, 11, 20, 0, 0, 0).unwrap();
        PromotionAttributes {
            promotion_id: "BLACKFRIDAY_26".to_string(),
            product_applicability: ProductApplicability::AllProducts,
            offer_type: OfferType::NoCode,
            generic_redemption_code: None,
            long_title: "20% off all shoes".to_string(),
            effective_start: Some(start),
            effective_end: Some(start + Duration::days(10)),
            redemption_channels: vec![RedemptionChannel::Online],
        }
    }

    #[test]
    fn review_requires_publisher() {
        let mut review = ReviewAttributes::default();
        assert!(review.validate().is_err());
        review.publisher_name = "My Shop".to_string();
        assert!(review.validate().is_ok());
    }

    #[test]
    fn review_favicon_must_be_url() {
        let review = ReviewAttributes {
            publisher_name: "My Shop".to_string(),
            publisher_favicon_url: Some("favicon.ico".to_string()),
            ..Default::default()
        };
        assert!(review.validate().is_err());
    }

    #[test]
    fn valid_promotion_passes() {
        assert!(valid_promotion().validate().is_ok());
    }

    #[test]
    fn generic_code_offer_needs_code() {
        let mut promo = valid_promotion();
        promo.offer_type = OfferType::GenericCode;
        assert!(promo.validate().is_err());
        promo.generic_redemption_code = Some("SAVE20".to_string());
        assert!(promo.validate().is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut promo = valid_promotion();
        promo.effective_end = promo.effective_start;
        let msg = promo.validate().unwrap_err().to_string();
        assert!(msg.contains("end date"));
    }

    #[test]
    fn missing_dates_are_rejected() {
        let mut promo = valid_promotion();
        promo.effective_end = None;
        assert!(promo.validate().is_err());
    }

    #[test]
    fn promotion_id_without_whitespace() {
        let mut promo = valid_promotion();
        promo.promotion_id = "BLACK FRIDAY".to_string();
        assert!(promo.validate().is_err());
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        let json = serde_json::to_value(valid_promotion()).unwrap();
        assert_eq!(json["product_applicability"], "all_products");
        assert_eq!(json["offer_type"], "no_code");
        assert_eq!(json["redemption_channels"][0], "online");
    }
}
