use crate::error::{FreqError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format of the date pickers: "dd-mm-yyyy".
pub const PICKER_FORMAT: &str = "%d-%m-%Y";

/// Format the server uses in bootstrap and response payloads: "YYYY-MM-DD".
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// An inclusive date range whose start never lies after its end.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = FreqError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(FreqError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse the two date-picker strings ("dd-mm-yyyy", ISO also accepted).
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// The `{start, end}` control value sent for the `datepicker` button.
    pub fn picker_value(&self) -> serde_json::Value {
        serde_json::json!({
            "start": format_picker(&self.start),
            "end": format_picker(&self.end),
        })
    }

    /// Clamp the end to `today`, since pickers do not offer future dates.
    pub fn clamped_to(&self, today: NaiveDate) -> Self {
        let end = self.end.min(today);
        let start = self.start.min(end);
        Self { start, end }
    }
}

/// Parse a picker date, falling back to ISO.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, PICKER_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, ISO_FORMAT))
        .map_err(|e| FreqError::DateParse(format!("{s}: {e}")))
}

/// Format a date for the pickers.
pub fn format_picker(date: &NaiveDate) -> String {
    date.format(PICKER_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::new(ymd(2022, 3, 15), ymd(2022, 3, 14)).unwrap_err();
        assert!(matches!(err, FreqError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(ymd(2022, 3, 15), ymd(2022, 3, 15)).unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn test_parse_picker_and_iso() {
        let range = DateRange::parse("01-02-2010", "2015-12-31").unwrap();
        assert_eq!(range.start(), ymd(2010, 2, 1));
        assert_eq!(range.end(), ymd(2015, 12, 31));
        assert!(DateRange::parse("31-02-2010", "01-01-2011").is_err());
    }

    #[test]
    fn test_picker_value_uses_picker_format() {
        let range = DateRange::new(ymd(2010, 2, 1), ymd(2015, 12, 31)).unwrap();
        assert_eq!(
            range.picker_value(),
            serde_json::json!({"start": "01-02-2010", "end": "31-12-2015"})
        );
    }

    #[test]
    fn test_clamped_to_today() {
        let range = DateRange::new(ymd(2030, 1, 1), ymd(2031, 1, 1)).unwrap();
        let clamped = range.clamped_to(ymd(2026, 10, 18));
        assert_eq!(clamped.end(), ymd(2026, 10, 18));
        assert!(clamped.start() <= clamped.end());
    }

    #[test]
    fn test_deserialize_validates_order() {
        let ok: DateRange =
            serde_json::from_str(r#"{"start":"2001-01-01","end":"2002-01-01"}"#).unwrap();
        assert_eq!(ok.start(), ymd(2001, 1, 1));
        let bad: std::result::Result<DateRange, _> =
            serde_json::from_str(r#"{"start":"2003-01-01","end":"2002-01-01"}"#);
        assert!(bad.is_err());
    }
}
