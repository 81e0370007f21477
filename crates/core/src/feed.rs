//! Feed configuration held by an editor session.
//!
//! [`FeedConfiguration`] is the in-memory feed being edited: identity,
//! schedule, channel, the set of active shop categories with their mapping
//! mode, and the attribute block belonging to the feed type. It is the
//! value that gets serialized and posted back for persistence.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::{PromotionAttributes, ReviewAttributes};
use crate::channels;
use crate::error::CoreError;
use crate::types::{CategoryId, ChannelId, FeedId};
use crate::validation;

// ---------------------------------------------------------------------------
// Status / type
// ---------------------------------------------------------------------------

/// Processing status of a feed file, stored as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FeedStatus {
    #[default]
    Unknown,
    OnHold,
    Processing,
    InQueue,
    HasErrors,
    FailedProcessing,
    Ok,
}

impl TryFrom<u8> for FeedStatus {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Unknown,
            1 => Self::OnHold,
            2 => Self::Processing,
            3 => Self::InQueue,
            4 => Self::HasErrors,
            5 => Self::FailedProcessing,
            6 => Self::Ok,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown feed status id {other}"
                )))
            }
        })
    }
}

impl From<FeedStatus> for u8 {
    fn from(status: FeedStatus) -> Self {
        match status {
            FeedStatus::Unknown => 0,
            FeedStatus::OnHold => 1,
            FeedStatus::Processing => 2,
            FeedStatus::InQueue => 3,
            FeedStatus::HasErrors => 4,
            FeedStatus::FailedProcessing => 5,
            FeedStatus::Ok => 6,
        }
    }
}

/// Kind of feed being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FeedType {
    ProductFeed,
    GoogleProductReview,
    GoogleMerchantPromotions,
}

impl TryFrom<u8> for FeedType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ProductFeed),
            2 => Ok(Self::GoogleProductReview),
            3 => Ok(Self::GoogleMerchantPromotions),
            other => Err(CoreError::Validation(format!(
                "Unknown feed type id {other}"
            ))),
        }
    }
}

impl From<FeedType> for u8 {
    fn from(feed_type: FeedType) -> Self {
        match feed_type {
            FeedType::ProductFeed => 1,
            FeedType::GoogleProductReview => 2,
            FeedType::GoogleMerchantPromotions => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Allowed numbers of feed refreshes per scheduled day.
pub const VALID_FREQUENCIES: &[u8] = &[1, 2, 4, 6, 8, 12, 24];

/// Feed refresh schedule, stored as `days:hh:mm:frequency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Schedule {
    /// Refresh every `days` days.
    pub days: u32,
    pub hour: u8,
    pub minute: u8,
    /// Refreshes per day, one of [`VALID_FREQUENCIES`].
    pub frequency: u8,
}

impl Default for Schedule {
    fn default() -> Self {
        Self { days: 1, hour: 0, minute: 0, frequency: 1 }
    }
}

impl Schedule {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.days == 0 {
            return Err(CoreError::Validation(
                "Schedule must repeat at least every 1 day".to_string(),
            ));
        }
        if self.hour > 23 || self.minute > 59 {
            return Err(CoreError::Validation(format!(
                "Invalid schedule time {:02}:{:02}",
                self.hour, self.minute
            )));
        }
        if !VALID_FREQUENCIES.contains(&self.frequency) {
            return Err(CoreError::Validation(format!(
                "Invalid schedule frequency {}. Must be one of: {VALID_FREQUENCIES:?}",
                self.frequency
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}:{}",
            self.days, self.hour, self.minute, self.frequency
        )
    }
}

impl FromStr for Schedule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Malformed schedule '{s}'"));

        let parts: Vec<&str> = s.trim().split(':').collect();
        let [days, hour, minute, frequency] = parts.as_slice() else {
            return Err(invalid());
        };

        let schedule = Schedule {
            days: days.parse().map_err(|_| invalid())?,
            hour: hour.parse().map_err(|_| invalid())?,
            minute: minute.parse().map_err(|_| invalid())?,
            frequency: frequency.parse().map_err(|_| invalid())?,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

impl TryFrom<String> for Schedule {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Schedule> for String {
    fn from(schedule: Schedule) -> Self {
        schedule.to_string()
    }
}

// ---------------------------------------------------------------------------
// Category mapping
// ---------------------------------------------------------------------------

/// How an active shop category is presented to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// The shop's own category name is sent as-is.
    OwnShopCategory,
    /// The category is mapped onto the channel taxonomy, initially the
    /// channel's default category.
    Default,
}

impl MappingMode {
    pub fn for_channel(uses_shop_categories: bool) -> Self {
        if uses_shop_categories {
            Self::OwnShopCategory
        } else {
            Self::Default
        }
    }
}

/// Mapping state of one active category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub mode: MappingMode,
    /// Channel taxonomy path chosen for this category, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_category: Option<String>,
}

/// One entry of the persisted `category_mapping` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMappingEntry {
    pub shop_category_id: CategoryId,
    pub mapping_mode: MappingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_category: Option<String>,
}

// ---------------------------------------------------------------------------
// FeedConfiguration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfiguration {
    /// `None` until the feed has been saved once.
    pub id: Option<FeedId>,
    pub title: String,
    /// Feed file name without extension.
    pub file_name: String,
    pub url: String,
    pub schedule: Schedule,
    pub status: FeedStatus,
    pub feed_type: FeedType,
    channel: ChannelId,
    active: BTreeMap<CategoryId, CategoryMapping>,
    pub review: Option<ReviewAttributes>,
    pub promotion: Option<PromotionAttributes>,
}

impl FeedConfiguration {
    /// An empty, unsaved feed of the given type.
    pub fn new(feed_type: FeedType, channel: ChannelId) -> Self {
        Self {
            id: None,
            title: String::new(),
            file_name: String::new(),
            url: String::new(),
            schedule: Schedule::default(),
            status: FeedStatus::Unknown,
            feed_type,
            channel,
            active: BTreeMap::new(),
            review: match feed_type {
                FeedType::GoogleProductReview => Some(ReviewAttributes::default()),
                _ => None,
            },
            promotion: match feed_type {
                FeedType::GoogleMerchantPromotions => Some(PromotionAttributes::default()),
                _ => None,
            },
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn uses_shop_categories(&self) -> bool {
        channels::uses_shop_categories(self.channel)
    }

    /// Switch channel and re-derive the mapping mode of every active
    /// category. Chosen channel categories are dropped when the mode changes
    /// because they belong to the old channel's taxonomy. Returns whether the
    /// channel changed.
    ///
    /// Callers outside the crate go through
    /// [`switch_channel`](crate::propagator::switch_channel) so the category
    /// table is relabelled too.
    pub(crate) fn set_channel(&mut self, channel: ChannelId) -> bool {
        if channel == self.channel {
            return false;
        }
        self.channel = channel;
        let mode = MappingMode::for_channel(self.uses_shop_categories());
        for mapping in self.active.values_mut() {
            if mapping.mode != mode {
                mapping.mode = mode;
                mapping.feed_category = None;
            }
        }
        tracing::debug!(channel, ?mode, "Feed channel changed");
        true
    }

    /// Mark a category active. Returns `true` if it was not active before.
    ///
    /// Re-activating keeps the existing mapping untouched.
    pub(crate) fn activate_category(&mut self, id: &str, uses_shop_categories: bool) -> bool {
        if self.active.contains_key(id) {
            return false;
        }
        self.active.insert(
            id.to_string(),
            CategoryMapping {
                mode: MappingMode::for_channel(uses_shop_categories),
                feed_category: None,
            },
        );
        true
    }

    /// Mark a category inactive. Returns `true` if it was active before.
    pub(crate) fn deactivate_category(&mut self, id: &str) -> bool {
        self.active.remove(id).is_some()
    }

    /// Record the channel category chosen for an active shop category.
    /// Inactive categories are ignored; returns whether anything changed.
    pub(crate) fn set_feed_category(&mut self, id: &str, path: impl Into<String>) -> bool {
        match self.active.get_mut(id) {
            Some(mapping) => {
                mapping.feed_category = Some(path.into());
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn mapping(&self, id: &str) -> Option<&CategoryMapping> {
        self.active.get(id)
    }

    /// Active categories ordered by id.
    pub fn active_categories(&self) -> impl Iterator<Item = (&CategoryId, &CategoryMapping)> {
        self.active.iter()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Keep only the active categories for which `keep` returns `true`.
    pub(crate) fn retain_active(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.active.retain(|id, _| keep(id.as_str()));
    }

    /// The persisted `category_mapping` list.
    pub fn category_mapping(&self) -> Vec<CategoryMappingEntry> {
        self.active
            .iter()
            .map(|(id, mapping)| CategoryMappingEntry {
                shop_category_id: id.clone(),
                mapping_mode: mapping.mode,
                feed_category: mapping.feed_category.clone(),
            })
            .collect()
    }

    /// Restore the active set from a persisted `category_mapping` list.
    fn load_category_mapping(&mut self, entries: Vec<CategoryMappingEntry>) {
        self.active = entries
            .into_iter()
            .map(|e| {
                (
                    e.shop_category_id,
                    CategoryMapping { mode: e.mapping_mode, feed_category: e.feed_category },
                )
            })
            .collect();
    }

    /// Copy of the plain fields the settings form edits.
    pub fn details(&self) -> FeedDetails {
        FeedDetails {
            title: self.title.clone(),
            file_name: self.file_name.clone(),
            url: self.url.clone(),
            schedule: self.schedule,
            review: self.review.clone(),
            promotion: self.promotion.clone(),
        }
    }

    /// Write edited plain fields back. Returns whether anything changed.
    pub fn apply_details(&mut self, details: FeedDetails) -> bool {
        if details == self.details() {
            return false;
        }
        let FeedDetails { title, file_name, url, schedule, review, promotion } = details;
        self.title = title;
        self.file_name = file_name;
        self.url = url;
        self.schedule = schedule;
        self.review = review;
        self.promotion = promotion;
        true
    }

    /// Check everything the save form would reject.
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::validate_feed_title(&self.title)?;
        validation::validate_feed_file_name(&self.file_name)?;
        if !self.url.is_empty() {
            validation::validate_url(&self.url)?;
        }
        self.schedule.validate()?;

        match self.feed_type {
            FeedType::ProductFeed => {
                if self.active.is_empty() {
                    return Err(CoreError::Validation(
                        "Select at least one shop category for the feed".to_string(),
                    ));
                }
            }
            FeedType::GoogleProductReview => {
                let review = self.review.as_ref().ok_or_else(|| {
                    CoreError::Validation("Review feed is missing its review attributes".to_string())
                })?;
                review.validate()?;
            }
            FeedType::GoogleMerchantPromotions => {
                let promotion = self.promotion.as_ref().ok_or_else(|| {
                    CoreError::Validation(
                        "Promotions feed is missing its promotion attributes".to_string(),
                    )
                })?;
                promotion.validate()?;
            }
        }
        Ok(())
    }

    /// Serializable save payload for this feed.
    pub fn to_payload(&self) -> FeedPayload {
        FeedPayload {
            feed_id: self.id,
            title: self.title.clone(),
            file_name: self.file_name.clone(),
            url: self.url.clone(),
            schedule: self.schedule,
            status: self.status,
            feed_type: self.feed_type,
            channel: self.channel,
            category_mapping: self.category_mapping(),
            review: self.review.clone(),
            promotion: self.promotion.clone(),
        }
    }
}

/// Feed fields that can be edited without touching category state.
///
/// Active categories and the channel are changed through the
/// [`Propagator`](crate::propagator::Propagator) so they stay in step with
/// the category table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDetails {
    pub title: String,
    pub file_name: String,
    pub url: String,
    pub schedule: Schedule,
    pub review: Option<ReviewAttributes>,
    pub promotion: Option<PromotionAttributes>,
}

/// Wire form of a feed, as posted to the save endpoint and as embedded in
/// the page's `data-wppfm-feed-data` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub feed_id: Option<FeedId>,
    pub title: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub status: FeedStatus,
    pub feed_type: FeedType,
    pub channel: ChannelId,
    #[serde(default)]
    pub category_mapping: Vec<CategoryMappingEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionAttributes>,
}

impl From<FeedPayload> for FeedConfiguration {
    fn from(payload: FeedPayload) -> Self {
        let mut feed = FeedConfiguration::new(payload.feed_type, payload.channel);
        feed.id = payload.feed_id;
        feed.title = payload.title;
        feed.file_name = payload.file_name;
        feed.url = payload.url;
        feed.schedule = payload.schedule;
        feed.status = payload.status;
        if payload.review.is_some() {
            feed.review = payload.review;
        }
        if payload.promotion.is_some() {
            feed.promotion = payload.promotion;
        }
        feed.load_category_mapping(payload.category_mapping);
        feed
    }
}
