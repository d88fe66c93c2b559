use serde_json::Value;

/// Term-meta mode holding frequency data
pub const FREQUENCY_MODE: &str = "freq";

/// One frequency annotation from a `freq` meta row.
///
/// Dictionaries store these in several shapes: a bare number, a bare
/// string, `{value, displayValue}`, or any of those wrapped as
/// `{reading, frequency}` to pin it to one reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequency {
    /// Reading this applies to; `None` applies to every reading
    pub reading: Option<String>,
    /// Numeric rank (lower = more common), when the payload has one
    pub rank: Option<i64>,
    /// Text to show the user
    pub display: String,
}

impl Frequency {
    /// Decode the `data` column of a `freq` meta row
    pub fn parse(data: &str) -> Option<Self> {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(data) {
            Ok(Value::Object(map)) if map.contains_key("frequency") => {
                let reading = map.get("reading").and_then(Value::as_str).map(str::to_string);
                let mut frequency = Self::from_value(map.get("frequency")?)?;
                frequency.reading = reading;
                Some(frequency)
            }
            Ok(value) => Self::from_value(&value),
            // Plain text payloads were stored unquoted
            Err(_) => Some(Self {
                reading: None,
                rank: data.parse().ok(),
                display: data.to_string(),
            }),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let rank = n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64));
                Some(Self {
                    reading: None,
                    rank,
                    display: n.to_string(),
                })
            }
            Value::String(s) => Some(Self {
                reading: None,
                rank: s.trim().parse().ok(),
                display: s.clone(),
            }),
            Value::Object(map) => {
                let rank = map.get("value").and_then(Value::as_i64);
                let display = map
                    .get("displayValue")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| rank.map(|r| r.to_string()))?;
                Some(Self {
                    reading: None,
                    rank,
                    display,
                })
            }
            _ => None,
        }
    }

    pub fn applies_to(&self, reading: &str) -> bool {
        self.reading.as_deref().is_none_or(|r| r == reading)
    }

    pub fn level(&self) -> FrequencyLevel {
        FrequencyLevel::from_rank(self.rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyLevel {
    VeryCommon,
    Common,
    Uncommon,
    Rare,
    Unknown,
}

impl FrequencyLevel {
    pub fn from_rank(rank: Option<i64>) -> Self {
        match rank {
            Some(rank) if rank <= 0 => FrequencyLevel::Unknown,
            Some(rank) if rank <= 1000 => FrequencyLevel::VeryCommon,
            Some(rank) if rank <= 5000 => FrequencyLevel::Common,
            Some(rank) if rank <= 10000 => FrequencyLevel::Uncommon,
            Some(_) => FrequencyLevel::Rare,
            None => FrequencyLevel::Unknown,
        }
    }

    /// Star rating, 0 when unknown
    pub fn stars(rank: Option<i64>) -> u8 {
        match rank {
            Some(rank) if rank <= 0 => 0,
            Some(rank) if rank <= 500 => 5,
            Some(rank) if rank <= 2000 => 4,
            Some(rank) if rank <= 5000 => 3,
            Some(rank) if rank <= 10000 => 2,
            Some(_) => 1,
            None => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyLevel::VeryCommon => "Very Common",
            FrequencyLevel::Common => "Common",
            FrequencyLevel::Uncommon => "Uncommon",
            FrequencyLevel::Rare => "Rare",
            FrequencyLevel::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes() {
        let plain = Frequency::parse("1").unwrap();
        assert_eq!((plain.rank, plain.display.as_str()), (Some(1), "1"));

        let text = Frequency::parse("four").unwrap();
        assert_eq!((text.rank, text.display.as_str()), (None, "four"));

        let display = Frequency::parse(r#"{"value":5,"displayValue":"5㋕"}"#).unwrap();
        assert_eq!((display.rank, display.display.as_str()), (Some(5), "5㋕"));

        let pinned = Frequency::parse(r#"{"reading":"うちこむ","frequency":7}"#).unwrap();
        assert_eq!(pinned.reading.as_deref(), Some("うちこむ"));
        assert_eq!(pinned.rank, Some(7));

        let nested =
            Frequency::parse(r#"{"reading":"うつ","frequency":{"value":3,"displayValue":"3"}}"#).unwrap();
        assert_eq!(nested.reading.as_deref(), Some("うつ"));
        assert_eq!(nested.display, "3");
    }

    #[test]
    fn test_unusable_payloads() {
        assert!(Frequency::parse("").is_none());
        assert!(Frequency::parse("[1,2]").is_none());
        assert!(Frequency::parse(r#"{"reading":"x"}"#).is_none());
    }

    #[test]
    fn test_reading_filter() {
        let pinned = Frequency::parse(r#"{"reading":"うつ","frequency":3}"#).unwrap();
        assert!(pinned.applies_to("うつ"));
        assert!(!pinned.applies_to("ぶつ"));
        assert!(Frequency::parse("3").unwrap().applies_to("ぶつ"));
    }

    #[test]
    fn test_levels_and_stars() {
        assert_eq!(FrequencyLevel::from_rank(Some(100)), FrequencyLevel::VeryCommon);
        assert_eq!(FrequencyLevel::from_rank(Some(4000)), FrequencyLevel::Common);
        assert_eq!(FrequencyLevel::from_rank(Some(20000)), FrequencyLevel::Rare);
        assert_eq!(FrequencyLevel::from_rank(None), FrequencyLevel::Unknown);
        assert_eq!(FrequencyLevel::stars(Some(400)), 5);
        assert_eq!(FrequencyLevel::stars(Some(9000)), 2);
        assert_eq!(FrequencyLevel::stars(None), 0);
    }
}
