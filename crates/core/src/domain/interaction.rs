use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;

/// Naive ISO 8601 layouts read as UTC, with either `T` or a space between date and time.
const NAIVE_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Upstream timestamp, kept raw when it could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InteractionTimestamp {
    Parsed(DateTime<Utc>),
    Unparsable(String),
}

impl InteractionTimestamp {
    /// Accepts RFC 3339 (also with a space separator), a naive date-time with or without
    /// seconds (read as UTC) or a bare date (midnight UTC).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::Parsed(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Self::Parsed(parsed.with_timezone(&Utc));
        }
        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        {
            return Self::Parsed(naive.and_utc());
        }
        if let Some(midnight) =
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Self::Parsed(midnight.and_utc());
        }

        Self::Unparsable(raw.to_string())
    }

    pub fn parsed(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Parsed(at) => Some(*at),
            Self::Unparsable(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub customer_id: CustomerId,
    pub timestamp: InteractionTimestamp,
    pub notes: String,
    #[serde(default)]
    pub objections: Vec<String>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::InteractionTimestamp;

    #[test]
    fn parses_rfc3339_with_zulu_suffix() {
        let parsed = InteractionTimestamp::parse("2024-05-02T08:30:00Z");
        assert_eq!(
            parsed.parsed(),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).single().expect("valid date"))
        );
    }

    #[test]
    fn parses_offset_naive_and_date_only_forms() {
        let offset = InteractionTimestamp::parse("2024-05-02T11:30:00+03:00");
        let naive = InteractionTimestamp::parse("2024-05-02T08:30:00.250");
        let date_only = InteractionTimestamp::parse("2024-05-02");

        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).single().expect("valid date");
        assert_eq!(offset.parsed(), Some(expected));
        assert_eq!(
            naive.parsed().map(|at| at.timestamp()),
            Some(expected.timestamp()),
        );
        assert_eq!(
            date_only.parsed(),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).single().expect("valid date"))
        );

        for raw in [
            "2024-05-02 08:30:00",
            "2024-05-02 08:30",
            "2024-05-02T08:30",
            "2024-05-02 11:30:00+03:00",
        ] {
            assert_eq!(InteractionTimestamp::parse(raw).parsed(), Some(expected), "raw = {raw}");
        }
    }

    #[test]
    fn keeps_raw_text_when_unparsable() {
        assert_eq!(
            InteractionTimestamp::parse("last tuesday"),
            InteractionTimestamp::Unparsable("last tuesday".to_string())
        );
        assert_eq!(InteractionTimestamp::parse("").parsed(), None);
    }
}
