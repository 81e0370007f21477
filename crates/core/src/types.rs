/// Shop category ids are WordPress term ids, carried as rendered text.
pub type CategoryId = String;

/// Feed primary key as stored by the plugin.
pub type FeedId = i64;

/// Numeric channel id (1 = Google Merchant Center, ...).
pub type ChannelId = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
