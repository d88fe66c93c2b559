use serde::Deserialize;

/// Term-meta mode holding pitch accent data
pub const PITCH_MODE: &str = "pitch";

#[derive(Debug, Deserialize)]
struct RawPitch {
    #[serde(default)]
    reading: String,
    #[serde(default)]
    pitches: Vec<RawPosition>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    position: u32,
}

/// Pitch accents of one reading, from a `pitch` meta row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchAccent {
    pub reading: String,
    pub patterns: Vec<PitchPattern>,
}

impl PitchAccent {
    pub fn parse(data: &str) -> Option<Self> {
        let raw: RawPitch = serde_json::from_str(data).ok()?;
        let morae = mora_count(&raw.reading);
        let patterns = raw
            .pitches
            .iter()
            .map(|p| PitchPattern::from_drop_position(p.position, morae))
            .collect();
        Some(Self {
            reading: raw.reading,
            patterns,
        })
    }

    /// e.g. `◎ ③`
    pub fn notation(&self) -> String {
        self.patterns
            .iter()
            .map(PitchPattern::to_notation)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const SMALL_KANA: &str = "ゃゅょぁぃぅぇぉゎャュョァィゥェォヮ";

/// Morae in a kana reading; small ya/yu/yo and vowels fuse with the
/// previous kana
pub fn mora_count(reading: &str) -> u32 {
    reading.chars().filter(|c| !SMALL_KANA.contains(*c)).count() as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchPattern {
    /// Mora after which pitch drops (0 = heiban, never drops)
    pub drop_position: u32,
    pub pattern_type: PatternType,
}

impl PitchPattern {
    pub fn from_drop_position(drop: u32, morae: u32) -> Self {
        let pattern_type = match drop {
            0 => PatternType::Heiban,
            1 => PatternType::Atamadaka,
            d if d == morae => PatternType::Odaka,
            _ => PatternType::Nakadaka,
        };

        Self {
            drop_position: drop,
            pattern_type,
        }
    }

    pub fn to_notation(&self) -> String {
        match self.pattern_type {
            PatternType::Heiban => "◎".to_string(),
            _ => circled(self.drop_position),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.pattern_type.as_str()
    }
}

fn circled(n: u32) -> String {
    match n {
        1..=20 => char::from_u32(0x2460 + n - 1)
            .map(String::from)
            .unwrap_or_else(|| format!("[{n}]")),
        _ => format!("[{n}]"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    Heiban,    // 平板型
    Atamadaka, // 頭高型
    Nakadaka,  // 中高型
    Odaka,     // 尾高型
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Heiban => "Heiban (Flat)",
            PatternType::Atamadaka => "Atamadaka (Head-high)",
            PatternType::Nakadaka => "Nakadaka (Mid-high)",
            PatternType::Odaka => "Odaka (Tail-high)",
        }
    }
}
