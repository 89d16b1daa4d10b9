//! Delivery channels reported by the Printpost metrics API.
//!
//! Each channel contributes a family of flat fields to a dataset entry:
//! `<channel>All`, `<channel>Receive` / `<channel>Received`,
//! `<channel>NotReceive` and the status sequence under `<channel>` itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// ─── Channels ───────────────────────────────────────────────────────────────

/// Delivery medium used by a campaign.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    /// Physical letter.
    Carta,
    Email,
    Sms,
    Whatsapp,
    Rcs,
}

impl DeliveryChannel {
    /// The fixed channel set, in dashboard order.
    pub const ALL: [DeliveryChannel; 5] = [
        DeliveryChannel::Carta,
        DeliveryChannel::Email,
        DeliveryChannel::Sms,
        DeliveryChannel::Whatsapp,
        DeliveryChannel::Rcs,
    ];

    /// Field prefix used by the metrics API.
    pub fn key(&self) -> &'static str {
        match self {
            DeliveryChannel::Carta => "carta",
            DeliveryChannel::Email => "email",
            DeliveryChannel::Sms => "sms",
            DeliveryChannel::Whatsapp => "whatsapp",
            DeliveryChannel::Rcs => "rcs",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeliveryChannel::Carta => "Carta",
            DeliveryChannel::Email => "E-mail",
            DeliveryChannel::Sms => "SMS",
            DeliveryChannel::Whatsapp => "WhatsApp",
            DeliveryChannel::Rcs => "RCS",
        }
    }

    /// Field names holding `metric` for this channel, in lookup order.
    pub fn metric_fields(&self, metric: ChannelMetric) -> impl Iterator<Item = String> + '_ {
        metric
            .suffixes()
            .iter()
            .map(move |suffix| format!("{}{}", self.key(), suffix))
    }
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown delivery channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for DeliveryChannel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DeliveryChannel::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

// ─── Metrics ────────────────────────────────────────────────────────────────

/// Numeric counters carried per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMetric {
    Sent,
    Delivered,
    NotDelivered,
}

impl ChannelMetric {
    /// Accepted field suffixes, first match wins.
    ///
    /// The metrics API has shipped both `Receive` and `Received` for the
    /// delivered counter; every reader goes through this list.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            ChannelMetric::Sent => &["All"],
            ChannelMetric::Delivered => &["Receive", "Received"],
            ChannelMetric::NotDelivered => &["NotReceive"],
        }
    }
}
