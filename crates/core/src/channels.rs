//! Known merchant channels.
//!
//! The only behavioural property the editor needs from a channel is whether
//! it works with the shop's own category names or with its own taxonomy
//! that shop categories must be mapped onto.

use crate::types::ChannelId;

/// A merchant channel a feed can be submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub short_name: &'static str,
    pub name: &'static str,
    /// `true` when the channel accepts the shop's own category names and
    /// has no taxonomy of its own.
    pub uses_shop_categories: bool,
}

pub const GOOGLE: ChannelId = 1;
pub const BING: ChannelId = 2;
pub const BESLIST: ChannelId = 3;
pub const PRICEGRABBER: ChannelId = 4;
pub const CONNEXITY: ChannelId = 7;
pub const KIESKEURIG: ChannelId = 10;
pub const VERGELIJK: ChannelId = 11;
pub const FACEBOOK: ChannelId = 16;
pub const CUSTOM: ChannelId = 999;

/// All channels the editor knows about.
pub const CHANNELS: &[Channel] = &[
    Channel { id: GOOGLE, short_name: "google", name: "Google Merchant Center", uses_shop_categories: false },
    Channel { id: BING, short_name: "bing", name: "Bing Shopping", uses_shop_categories: false },
    Channel { id: BESLIST, short_name: "beslist", name: "Beslist.nl", uses_shop_categories: false },
    Channel { id: PRICEGRABBER, short_name: "pricegrabber", name: "PriceGrabber", uses_shop_categories: false },
    Channel { id: CONNEXITY, short_name: "connexity", name: "Connexity", uses_shop_categories: false },
    Channel { id: KIESKEURIG, short_name: "kieskeurig", name: "Kieskeurig.nl", uses_shop_categories: true },
    Channel { id: VERGELIJK, short_name: "vergelijk", name: "Vergelijk.nl", uses_shop_categories: true },
    Channel { id: FACEBOOK, short_name: "facebook", name: "Facebook", uses_shop_categories: false },
    Channel { id: CUSTOM, short_name: "custom", name: "Custom feed", uses_shop_categories: true },
];

/// Look up a channel by id.
pub fn find_channel(id: ChannelId) -> Option<&'static Channel> {
    CHANNELS.iter().find(|c| c.id == id)
}

/// Whether categories for `id` map onto the shop's own names.
///
/// Unknown channels are assumed to carry their own taxonomy.
pub fn uses_shop_categories(id: ChannelId) -> bool {
    find_channel(id).is_some_and(|c| c.uses_shop_categories)
}
