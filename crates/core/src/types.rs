//! Raw payloads returned by the Printpost metrics API.

use crate::channels::{ChannelMetric, DeliveryChannel};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One reporting bucket as returned by the metrics API.
///
/// The payload is a flat JSON object whose channel fields are all optional,
/// so the raw object is kept and read through typed accessors. Reads never
/// fail: missing or malformed counters count as zero, and an element that
/// is not an object decodes as an empty entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestDatasetEntry {
    fields: Map<String, Value>,
}

impl<'de> Deserialize<'de> for RequestDatasetEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Ok(Self::default()),
        }
    }
}

impl RequestDatasetEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Counter for `metric` on `channel`, following the metric's alias list.
    pub fn metric(&self, channel: DeliveryChannel, metric: ChannelMetric) -> u64 {
        channel
            .metric_fields(metric)
            .find_map(|field| self.fields.get(&field).filter(|v| !v.is_null()))
            .map(coerce_count)
            .unwrap_or(0)
    }

    pub fn sent(&self, channel: DeliveryChannel) -> u64 {
        self.metric(channel, ChannelMetric::Sent)
    }

    pub fn delivered(&self, channel: DeliveryChannel) -> u64 {
        self.metric(channel, ChannelMetric::Delivered)
    }

    pub fn not_delivered(&self, channel: DeliveryChannel) -> u64 {
        self.metric(channel, ChannelMetric::NotDelivered)
    }

    /// Status breakdown items for `channel`, in payload order.
    ///
    /// Returns an empty list when the field is absent or not an array.
    /// Items that are not objects are kept as unlabeled zero-quantity items
    /// so positional labels stay aligned with the payload.
    pub fn statuses(&self, channel: DeliveryChannel) -> Vec<StatusItem> {
        match self.fields.get(channel.key()) {
            Some(Value::Array(items)) => items.iter().map(StatusItem::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

/// Lenient numeric read: numbers and numeric strings count, anything else
/// (negative, non-finite, booleans, objects) is zero. Fractions truncate.
pub fn coerce_count(value: &Value) -> u64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n as u64
    } else {
        0
    }
}

/// One `{description|label, quantity|value}` item of a channel's status list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusItem {
    pub label: Option<String>,
    pub quantity: u64,
}

impl StatusItem {
    fn from_value(value: &Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };
        let label = ["description", "label"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                _ => None,
            });
        let quantity = ["quantity", "value"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !v.is_null())
            .map(coerce_count)
            .unwrap_or(0);
        Self { label, quantity }
    }
}

// ─── Request summary ────────────────────────────────────────────────────────

/// A request-status bucket; only its total is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestBucket {
    #[serde(default)]
    pub total: u64,
}

/// Request counts per workflow stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestsSummary {
    #[serde(default)]
    pub analise: RequestBucket,
    #[serde(default)]
    pub execucao: RequestBucket,
    #[serde(default)]
    pub finalizados: RequestBucket,
    #[serde(default)]
    pub cancelados: RequestBucket,
}

impl RequestsSummary {
    pub fn total(&self) -> u64 {
        [self.analise, self.execucao, self.finalizados, self.cancelados]
            .iter()
            .fold(0u64, |acc, bucket| acc.saturating_add(bucket.total))
    }
}
