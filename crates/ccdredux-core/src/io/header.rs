use std::fmt;

use tracing::warn;

use crate::consts::FITS_CARD_SIZE;

/// Room for a string value's characters between its quotes (columns 12-79).
const MAX_TEXT_LEN: usize = FITS_CARD_SIZE - 12;

/// Keywords the writer derives from the data array itself. They are never
/// copied from a frame's header.
const STRUCTURAL_KEYWORDS: [&str; 10] = [
    "SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "NAXIS3", "EXTEND", "BSCALE", "BZERO",
    "BLANK",
];

/// Value of a FITS header card.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Real(r) if r.fract() == 0.0 => Some(*r as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(true) => write!(f, "T"),
            Self::Logical(false) => write!(f, "F"),
            Self::Integer(i) => write!(f, "{i}"),
            // `{:E}` is the shortest exact representation and always parses back as real.
            Self::Real(r) => write!(f, "{r:E}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                write!(f, "'{escaped:<8}'")
            }
        }
    }
}

/// One 80-column header record.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderCard {
    pub keyword: String,
    /// `None` for commentary cards (COMMENT, HISTORY, blank keyword).
    pub value: Option<HeaderValue>,
    pub comment: Option<String>,
}

impl HeaderCard {
    pub fn new(keyword: &str, value: HeaderValue) -> Self {
        Self {
            keyword: keyword.to_ascii_uppercase(),
            value: Some(value),
            comment: None,
        }
    }

    pub fn commentary(keyword: &str, text: &str) -> Self {
        Self {
            keyword: keyword.to_ascii_uppercase(),
            value: None,
            comment: Some(text.to_string()),
        }
    }

    pub fn is_structural(&self) -> bool {
        STRUCTURAL_KEYWORDS.contains(&self.keyword.as_str())
    }

    /// Parse a single 80-byte record. Returns `None` for the END card.
    pub fn parse(record: &[u8]) -> Option<Self> {
        let decoded = String::from_utf8_lossy(record);
        let text: &str = &decoded;
        let keyword = text.get(..8).unwrap_or(text).trim_end().to_ascii_uppercase();

        if keyword == "END" {
            return None;
        }

        let has_value = text.get(8..10) == Some("= ");
        if !has_value {
            let body = text.get(8..).unwrap_or("").trim_end();
            return Some(Self {
                keyword,
                value: None,
                comment: Some(body.trim_start().to_string()),
            });
        }

        let (value, comment) = parse_value_field(text.get(10..).unwrap_or(""));
        Some(Self {
            keyword,
            value,
            comment,
        })
    }

    /// Render as an 80-byte record. Anything that does not fit is cut, with
    /// a warning; a string value always keeps its closing quote.
    pub fn to_record(&self) -> [u8; FITS_CARD_SIZE] {
        let mut line = format!("{:<8}", self.keyword);
        match &self.value {
            Some(value) => {
                line.push_str("= ");
                match value {
                    HeaderValue::Text(text) => line.push_str(&self.quoted(text)),
                    // Fixed format: numbers and logicals right-justified to column 30.
                    other => line.push_str(&format!("{:>20}", other.to_string())),
                }
                if let Some(comment) = &self.comment {
                    line.push_str(" / ");
                    line.push_str(comment);
                }
            }
            None => {
                if let Some(comment) = &self.comment {
                    line.push_str(comment);
                }
            }
        }

        let ascii: Vec<u8> = line.bytes().filter(u8::is_ascii).collect();
        if ascii.len() > FITS_CARD_SIZE {
            warn!(
                keyword = %self.keyword,
                len = ascii.len(),
                "Header card truncated to 80 columns"
            );
        }
        let mut record = [b' '; FITS_CARD_SIZE];
        for (dst, src) in record.iter_mut().zip(ascii) {
            *dst = src;
        }
        record
    }

    /// Quote and escape a string value, cutting it so the closing quote still
    /// lands inside the card. An escaped quote is never split.
    fn quoted(&self, text: &str) -> String {
        let mut escaped = String::with_capacity(text.len().min(MAX_TEXT_LEN));
        let mut kept = 0;
        for c in text.chars().filter(char::is_ascii) {
            let width = if c == '\'' { 2 } else { 1 };
            if escaped.len() + width > MAX_TEXT_LEN {
                break;
            }
            escaped.push(c);
            if c == '\'' {
                escaped.push('\'');
            }
            kept += 1;
        }
        let total = text.chars().filter(char::is_ascii).count();
        if kept < total {
            warn!(
                keyword = %self.keyword,
                kept,
                total,
                "Header string value truncated to fit one card"
            );
        }
        format!("'{escaped:<8}'")
    }
}

/// Split the value field of a card (columns 11-80) into value and comment.
fn parse_value_field(field: &str) -> (Option<HeaderValue>, Option<String>) {
    let trimmed = field.trim_start();

    if let Some(rest) = trimmed.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote.
        let mut value = String::new();
        let mut chars = rest.char_indices().peekable();
        let mut end = rest.len();
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    value.push('\'');
                    chars.next();
                } else {
                    end = i + 1;
                    break;
                }
            } else {
                value.push(c);
            }
        }
        let comment = split_comment(&rest[end.min(rest.len())..]);
        return (Some(HeaderValue::Text(value.trim_end().to_string())), comment);
    }

    let (raw, comment) = match trimmed.find('/') {
        Some(idx) => (trimmed[..idx].trim(), split_comment(&trimmed[idx..])),
        None => (trimmed.trim(), None),
    };

    let value = match raw {
        "" => None,
        "T" => Some(HeaderValue::Logical(true)),
        "F" => Some(HeaderValue::Logical(false)),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                Some(HeaderValue::Integer(i))
            } else if let Ok(r) = raw.replace(['D', 'd'], "E").parse::<f64>() {
                Some(HeaderValue::Real(r))
            } else {
                Some(HeaderValue::Text(raw.to_string()))
            }
        }
    };
    (value, comment)
}

fn split_comment(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let comment = rest.strip_prefix('/')?.trim();
    if comment.is_empty() {
        None
    } else {
        Some(comment.to_string())
    }
}

/// Ordered collection of header cards with case-insensitive lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitsHeader {
    cards: Vec<HeaderCard>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[HeaderCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn push(&mut self, card: HeaderCard) {
        self.cards.push(card);
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|c| c.value.is_some() && c.keyword.eq_ignore_ascii_case(keyword))
            .and_then(|c| c.value.as_ref())
    }

    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(HeaderValue::as_f64)
    }

    pub fn get_i64(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(HeaderValue::as_i64)
    }

    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderValue::as_str)
    }

    /// Replace the first card with this keyword, or append a new one.
    pub fn set(&mut self, keyword: &str, value: HeaderValue) {
        match self
            .cards
            .iter_mut()
            .find(|c| c.value.is_some() && c.keyword.eq_ignore_ascii_case(keyword))
        {
            Some(card) => card.value = Some(value),
            None => self.cards.push(HeaderCard::new(keyword, value)),
        }
    }

    pub fn add_history(&mut self, text: &str) {
        self.cards.push(HeaderCard::commentary("HISTORY", text));
    }

    pub fn history(&self) -> impl Iterator<Item = &str> + '_ {
        self.cards
            .iter()
            .filter(|c| c.keyword == "HISTORY")
            .filter_map(|c| c.comment.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(s: &str) -> [u8; FITS_CARD_SIZE] {
        let mut r = [b' '; FITS_CARD_SIZE];
        r[..s.len()].copy_from_slice(s.as_bytes());
        r
    }

    #[test]
    fn parses_integer_with_comment() {
        let card = HeaderCard::parse(&record("NAXIS1  =                   10 / width")).unwrap();
        assert_eq!(card.keyword, "NAXIS1");
        assert_eq!(card.value, Some(HeaderValue::Integer(10)));
        assert_eq!(card.comment.as_deref(), Some("width"));
    }

    #[test]
    fn parses_fortran_exponent() {
        let card = HeaderCard::parse(&record("EXPTIME =             6.0D+01")).unwrap();
        assert_eq!(card.value, Some(HeaderValue::Real(60.0)));
    }

    #[test]
    fn parses_quoted_string_with_escape() {
        let card = HeaderCard::parse(&record("OBJECT  = 'M''31    '  / target")).unwrap();
        assert_eq!(card.value, Some(HeaderValue::Text("M'31".into())));
        assert_eq!(card.comment.as_deref(), Some("target"));
    }

    #[test]
    fn slash_inside_string_is_not_a_comment() {
        let card = HeaderCard::parse(&record("DATE-OBS= '2017/08/17'")).unwrap();
        assert_eq!(card.value, Some(HeaderValue::Text("2017/08/17".into())));
        assert!(card.comment.is_none());
    }

    #[test]
    fn end_card_terminates() {
        assert!(HeaderCard::parse(&record("END")).is_none());
    }

    #[test]
    fn history_is_commentary() {
        let card = HeaderCard::parse(&record("HISTORY dark subtracted")).unwrap();
        assert!(card.value.is_none());
        assert_eq!(card.comment.as_deref(), Some("dark subtracted"));
    }

    #[test]
    fn real_survives_record_roundtrip() {
        let card = HeaderCard::new("EXPTIME", HeaderValue::Real(0.1 + 0.2));
        let parsed = HeaderCard::parse(&card.to_record()).unwrap();
        assert_eq!(parsed.value, Some(HeaderValue::Real(0.1 + 0.2)));
    }

    #[test]
    fn long_string_keeps_closing_quote() {
        let card = HeaderCard::new("OBJECT", HeaderValue::Text("x".repeat(100)));
        let record = card.to_record();
        assert_eq!(record[FITS_CARD_SIZE - 1], b'\'');
        let parsed = HeaderCard::parse(&record).unwrap();
        assert_eq!(parsed.value, Some(HeaderValue::Text("x".repeat(MAX_TEXT_LEN))));
    }

    #[test]
    fn truncation_never_splits_escaped_quote() {
        let text = format!("{}'tail", "y".repeat(MAX_TEXT_LEN - 1));
        let card = HeaderCard::new("OBJECT", HeaderValue::Text(text));
        let parsed = HeaderCard::parse(&card.to_record()).unwrap();
        assert_eq!(
            parsed.value,
            Some(HeaderValue::Text("y".repeat(MAX_TEXT_LEN - 1)))
        );
    }

    #[test]
    fn long_history_is_cut_at_card_width() {
        let card = HeaderCard::commentary("HISTORY", &"z".repeat(120));
        let record = card.to_record();
        assert_eq!(&record[..8], b"HISTORY ");
        assert!(record[8..].iter().all(|&b| b == b'z'));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut header = FitsHeader::new();
        header.set("exposure", HeaderValue::Real(30.0));
        assert_eq!(header.get_f64("EXPOSURE"), Some(30.0));
        assert_eq!(header.get_f64("Exposure"), Some(30.0));
        header.set("EXPOSURE", HeaderValue::Integer(45));
        assert_eq!(header.len(), 1);
        assert_eq!(header.get_f64("exposure"), Some(45.0));
    }
}
