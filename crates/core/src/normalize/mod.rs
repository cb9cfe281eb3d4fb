use serde::{Deserialize, Serialize};

const SENTINELS: [&str; 4] = ["-", "N/A", "", "R$ -"];

// Longest forms first so "milhões" is never read as "mil".
const MAGNITUDE_WORDS: [(&str, Magnitude); 6] = [
    ("bilhões", Magnitude::Billion),
    ("bilhão", Magnitude::Billion),
    ("milhões", Magnitude::Million),
    ("milhão", Magnitude::Million),
    ("mils", Magnitude::Thousand),
    ("mil", Magnitude::Thousand),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Magnitude {
    Thousand,
    Million,
    Billion,
}

impl Magnitude {
    pub fn factor(self) -> f64 {
        match self {
            Magnitude::Thousand => 1e3,
            Magnitude::Million => 1e6,
            Magnitude::Billion => 1e9,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let t = token.trim().to_lowercase();
        if t.is_empty() {
            return None;
        }
        match t.as_str() {
            "k" => return Some(Magnitude::Thousand),
            "m" => return Some(Magnitude::Million),
            "b" => return Some(Magnitude::Billion),
            _ => {}
        }
        MAGNITUDE_WORDS
            .iter()
            .find(|(word, _)| t == *word)
            .map(|(_, m)| *m)
    }
}

/// Normalizes a localized numeric string. Never fails: sentinels and unparseable
/// input both become `0.0`.
pub fn normalize_numeric(raw: &str, multiplier_hint: Option<&str>) -> f64 {
    parse_localized(raw, multiplier_hint.and_then(Magnitude::from_token)).unwrap_or(0.0)
}

pub fn parse_localized(raw: &str, hint: Option<Magnitude>) -> Option<f64> {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return None;
    }

    let (body, magnitude) = split_magnitude(trimmed);
    let magnitude = magnitude.or(hint);

    let cleaned: String = body
        .replace("R$", "")
        .replace('%', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v * magnitude.map(Magnitude::factor).unwrap_or(1.0)),
        _ => {
            tracing::trace!(raw, "unparseable numeric value treated as missing");
            None
        }
    }
}

pub fn parse_plain(raw: &str, hint: Option<Magnitude>) -> Option<f64> {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v * hint.map(Magnitude::factor).unwrap_or(1.0)),
        Ok(_) => None,
        Err(_) => parse_localized(trimmed, hint),
    }
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "1.0" | "yes" | "sim" | "s"
    )
}

pub fn is_sentinel(trimmed: &str) -> bool {
    SENTINELS.contains(&trimmed) || trimmed.eq_ignore_ascii_case("nan")
}

fn split_magnitude(s: &str) -> (&str, Option<Magnitude>) {
    let lower = s.to_lowercase();
    for (word, magnitude) in MAGNITUDE_WORDS {
        if let Some(pos) = lower.find(word) {
            // Lowercasing "ã"/"õ" keeps byte lengths, so positions map back to `s`.
            if s.is_char_boundary(pos) {
                return (&s[..pos], Some(magnitude));
            }
        }
    }

    // Compact suffix glued to the digits, uppercase only: "1,5M", "850K".
    let mut chars = s.chars();
    if let Some(last @ ('K' | 'M' | 'B')) = chars.next_back() {
        let rest = chars.as_str();
        if rest.ends_with(|c: char| c.is_ascii_digit()) {
            if let Some(m) = Magnitude::from_token(&last.to_string()) {
                return (rest, Some(m));
            }
        }
    }

    (s, None)
}
