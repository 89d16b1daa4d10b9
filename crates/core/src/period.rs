//! Reporting periods and query filters sent to the metrics API.

use crate::error::{CampaignError, CampaignResult};
use chrono::{Datelike, FixedOffset, NaiveDate, SecondsFormat, TimeZone};

/// Offset the metrics API expects on every timestamp (UTC-03:00).
pub const DEFAULT_UTC_OFFSET_SECS: i32 = -3 * 3600;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> CampaignResult<Self> {
        if from > to {
            return Err(CampaignError::Validation(format!(
                "date range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn start(&self) -> NaiveDate {
        self.from
    }

    pub fn end(&self) -> NaiveDate {
        self.to
    }

    /// Start of the first day, e.g. `2024-01-01T00:00:00-03:00`.
    pub fn start_timestamp(&self, offset: FixedOffset) -> String {
        render(self.from, (0, 0, 0), offset)
    }

    /// End of the last day, e.g. `2024-01-31T23:59:59-03:00`.
    pub fn end_timestamp(&self, offset: FixedOffset) -> String {
        render(self.to, (23, 59, 59), offset)
    }

    /// Split into calendar months, clipped to the range ends, oldest first.
    pub fn months(&self) -> Vec<MonthSpan> {
        let mut spans = Vec::new();
        let mut cursor = self.from;
        while cursor <= self.to {
            let month_end = last_day_of_month(cursor);
            let end = month_end.min(self.to);
            spans.push(MonthSpan {
                key: format!("{:04}-{:02}", cursor.year(), cursor.month()),
                label: format!(
                    "{}/{}",
                    MONTH_ABBREVIATIONS[cursor.month0() as usize],
                    cursor.year()
                ),
                range: DateRange { from: cursor, to: end },
            });
            match month_end.succ_opt() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        spans
    }
}

fn render(date: NaiveDate, (h, m, s): (u32, u32, u32), offset: FixedOffset) -> String {
    date.and_hms_opt(h, m, s)
        .and_then(|local| offset.from_local_datetime(&local).single())
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
        .unwrap_or_else(|| format!("{date}T{h:02}:{m:02}:{s:02}{offset}"))
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// One calendar month (or the part of it inside a larger range).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSpan {
    /// `YYYY-MM`.
    pub key: String,
    /// Short display label, e.g. `jan/2024`.
    pub label: String,
    pub range: DateRange,
}

/// Filters accepted by the dashboard endpoints of the metrics API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetQuery {
    pub range: DateRange,
    pub cost_center_id: Option<String>,
    pub campaign_id: Option<String>,
}

impl DatasetQuery {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            cost_center_id: None,
            campaign_id: None,
        }
    }

    pub fn with_cost_center(mut self, id: impl Into<String>) -> Self {
        self.cost_center_id = Some(id.into());
        self
    }

    pub fn with_campaign(mut self, id: impl Into<String>) -> Self {
        self.campaign_id = Some(id.into());
        self
    }

    /// Same filters over a narrower range.
    pub fn for_range(&self, range: DateRange) -> Self {
        Self {
            range,
            cost_center_id: self.cost_center_id.clone(),
            campaign_id: self.campaign_id.clone(),
        }
    }

    /// Query-string pairs in the metrics API's naming.
    pub fn to_params(&self, offset: FixedOffset) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("from", self.range.start_timestamp(offset)),
            ("to", self.range.end_timestamp(offset)),
        ];
        if let Some(id) = &self.cost_center_id {
            params.push(("costCenterId", id.clone()));
        }
        if let Some(id) = &self.campaign_id {
            params.push(("campaignId", id.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn brt() -> FixedOffset {
        FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap()
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, CampaignError::Validation(_)));
    }

    #[test]
    fn test_timestamps_use_fixed_offset() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.start_timestamp(brt()), "2024-01-01T00:00:00-03:00");
        assert_eq!(range.end_timestamp(brt()), "2024-01-31T23:59:59-03:00");
    }

    #[test]
    fn test_months_are_clipped_and_ordered() {
        let range = DateRange::new(date(2023, 11, 15), date(2024, 2, 10)).unwrap();
        let months = range.months();
        let keys: Vec<&str> = months.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);

        assert_eq!(months[0].range.start(), date(2023, 11, 15));
        assert_eq!(months[0].range.end(), date(2023, 11, 30));
        assert_eq!(months[1].label, "dez/2023");
        assert_eq!(months[2].range.end(), date(2024, 1, 31));
        assert_eq!(months[3].range.start(), date(2024, 2, 1));
        assert_eq!(months[3].range.end(), date(2024, 2, 10));
    }

    #[test]
    fn test_single_day_range_is_one_month() {
        let range = DateRange::new(date(2024, 2, 29), date(2024, 2, 29)).unwrap();
        let months = range.months();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].key, "2024-02");
    }

    #[test]
    fn test_query_params() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let params = DatasetQuery::new(range)
            .with_campaign("camp-9")
            .to_params(brt());
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], ("from", "2024-03-01T00:00:00-03:00".to_string()));
        assert_eq!(params[2], ("campaignId", "camp-9".to_string()));
    }
}
