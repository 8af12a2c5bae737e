//! # Field Table
//!
//! The fixed set of fields this tool knows how to report, and for each one
//! where in which modem response it lives and how the raw token becomes a
//! [`FieldValue`].
//!
//! Table order is the canonical output order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed value of one field
///
/// `Unknown` covers everything the modem could not or would not report:
/// `-` placeholders, `99` "not detectable" codes, the `-32768` invalid marker,
/// fields that do not exist on the current RAT, and tokens that fail to parse.
/// In JSON it is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Unknown,
}

impl FieldValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Unknown => f.write_str("unknown"),
        }
    }
}

/// Radio access technology as reported by the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rat {
    Gsm,
    Wcdma,
    Lte,
}

impl Rat {
    /// Parse the RAT token of `+QENG` / `+QCSQ`
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().trim_matches('"') {
            "GSM" => Some(Rat::Gsm),
            "WCDMA" => Some(Rat::Wcdma),
            "LTE" => Some(Rat::Lte),
            _ => None,
        }
    }
}

/// Which response a rule reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `+QENG: "servingcell",…`; `None` matches every RAT
    ServingCell(Option<Rat>),
    /// `+CSQ: <rssi>,<ber>`
    Csq,
    /// `+QCSQ: "<sysmode>",…` for the given sysmode
    Qcsq(Rat),
}

/// Token transform: raw token in, field value out
pub type Transform = fn(&str) -> FieldValue;

/// One way of extracting a field
#[derive(Clone, Copy)]
pub struct Rule {
    pub source: Source,
    /// Token index after the response prefix, 0-based
    pub position: usize,
    pub transform: Transform,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("source", &self.source)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// A reportable field and its extraction rules, tried in order
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

const fn rule(source: Source, position: usize, transform: Transform) -> Rule {
    Rule { source, position, transform }
}

const fn any_rat(position: usize, transform: Transform) -> Rule {
    rule(Source::ServingCell(None), position, transform)
}

const fn gsm(position: usize, transform: Transform) -> Rule {
    rule(Source::ServingCell(Some(Rat::Gsm)), position, transform)
}

const fn wcdma(position: usize, transform: Transform) -> Rule {
    rule(Source::ServingCell(Some(Rat::Wcdma)), position, transform)
}

const fn lte(position: usize, transform: Transform) -> Rule {
    rule(Source::ServingCell(Some(Rat::Lte)), position, transform)
}

macro_rules! field {
    ($name:literal => [$($rule:expr),+ $(,)?]) => {
        FieldSpec { name: $name, rules: &[$($rule),+] }
    };
}

/// Every field, in canonical order
///
/// Serving-cell positions follow the Quectel EG25-G `AT+QENG="servingcell"`
/// layout where token 0 is `servingcell`, 1 the connection state and 2 the RAT.
pub static FIELD_SPECS: &[FieldSpec] = &[
    field!("state" => [any_rat(1, text)]),
    field!("rat" => [any_rat(2, text)]),
    field!("duplex" => [lte(3, text)]),
    field!("mcc" => [gsm(3, text), wcdma(3, text), lte(4, text)]),
    field!("mnc" => [gsm(4, text), wcdma(4, text), lte(5, text)]),
    field!("lac" => [gsm(5, text), wcdma(5, text)]),
    field!("tac" => [lte(12, text)]),
    field!("cellid" => [gsm(6, text), wcdma(6, text), lte(6, text)]),
    field!("pcid" => [lte(7, int)]),
    field!("earfcn" => [lte(8, int)]),
    field!("uarfcn" => [wcdma(7, int)]),
    field!("arfcn" => [gsm(8, int)]),
    field!("band" => [gsm(9, int), lte(9, int)]),
    field!("band_name" => [lte(9, lte_band_name)]),
    field!("ul_bandwidth" => [lte(10, bandwidth_mhz)]),
    field!("dl_bandwidth" => [lte(11, bandwidth_mhz)]),
    field!("bsic" => [gsm(7, int)]),
    field!("psc" => [wcdma(8, int)]),
    field!("rac" => [wcdma(9, int)]),
    field!("rsrp" => [lte(13, int), rule(Source::Qcsq(Rat::Lte), 1, int)]),
    field!("rsrq" => [lte(14, int), rule(Source::Qcsq(Rat::Lte), 2, int)]),
    field!("rssi" => [
        lte(15, int),
        rule(Source::Qcsq(Rat::Lte), 4, int),
        rule(Source::Qcsq(Rat::Wcdma), 1, int),
        rule(Source::Qcsq(Rat::Gsm), 1, int),
        rule(Source::Csq, 0, csq_rssi),
    ]),
    field!("sinr" => [lte(16, int), rule(Source::Qcsq(Rat::Lte), 3, int)]),
    field!("rscp" => [wcdma(10, int), rule(Source::Qcsq(Rat::Wcdma), 2, int)]),
    field!("ecio" => [wcdma(11, int), rule(Source::Qcsq(Rat::Wcdma), 3, int)]),
    field!("ber" => [rule(Source::Csq, 1, csq_ber)]),
    field!("rxlev" => [gsm(10, int), lte(17, int)]),
    field!("txp" => [gsm(11, int)]),
    field!("rla" => [gsm(12, int)]),
    field!("drx" => [gsm(13, int)]),
    field!("c1" => [gsm(14, int)]),
    field!("c2" => [gsm(15, int)]),
    field!("gprs" => [gsm(16, int)]),
    field!("tch" => [gsm(17, int)]),
    field!("ts" => [gsm(18, int)]),
    field!("ta" => [gsm(19, int)]),
    field!("maio" => [gsm(20, int)]),
    field!("hsn" => [gsm(21, int)]),
    field!("rxlevsub" => [gsm(22, int)]),
    field!("rxlevfull" => [gsm(23, int)]),
    field!("rxqualsub" => [gsm(24, int)]),
    field!("rxqualfull" => [gsm(25, int)]),
    field!("voicecodec" => [gsm(26, text)]),
    field!("phych" => [wcdma(12, int)]),
    field!("sf" => [wcdma(13, int)]),
    field!("slot" => [wcdma(14, int)]),
    field!("speech_code" => [wcdma(15, text)]),
    field!("commod" => [wcdma(16, int)]),
];

/// Look a field up by name
pub fn find_field(name: &str) -> Option<(usize, &'static FieldSpec)> {
    FIELD_SPECS.iter().enumerate().find(|(_, spec)| spec.name == name)
}

/// Placeholder the modem prints for values it does not have
const PLACEHOLDER: &str = "-";

/// Quectel's "invalid" marker for signed 16-bit measurements
const INVALID_MARKER: i64 = -32768;

fn clean(token: &str) -> &str {
    token.trim().trim_matches('"')
}

fn parse_code(token: &str) -> Option<i64> {
    let token = clean(token);
    if token == PLACEHOLDER {
        return None;
    }
    token.parse::<i64>().ok()
}

/// Text as reported, quotes stripped
pub fn text(token: &str) -> FieldValue {
    match clean(token) {
        "" | PLACEHOLDER => FieldValue::Unknown,
        t => FieldValue::Text(t.to_string()),
    }
}

/// Signed decimal integer
pub fn int(token: &str) -> FieldValue {
    match parse_code(token) {
        Some(INVALID_MARKER) | None => FieldValue::Unknown,
        Some(v) => FieldValue::Int(v),
    }
}

/// `+CSQ` RSSI code 0..=31 to dBm
pub fn csq_rssi(token: &str) -> FieldValue {
    match parse_code(token) {
        Some(code @ 0..=31) => FieldValue::Int(-113 + 2 * code),
        // 99 is "not known or not detectable"
        _ => FieldValue::Unknown,
    }
}

/// `+CSQ` bit error rate class 0..=7
pub fn csq_ber(token: &str) -> FieldValue {
    match parse_code(token) {
        Some(class @ 0..=7) => FieldValue::Int(class),
        _ => FieldValue::Unknown,
    }
}

/// LTE bandwidth code to MHz
pub fn bandwidth_mhz(token: &str) -> FieldValue {
    let mhz = match parse_code(token) {
        Some(0) => 1.4,
        Some(1) => 3.0,
        Some(2) => 5.0,
        Some(3) => 10.0,
        Some(4) => 15.0,
        Some(5) => 20.0,
        _ => return FieldValue::Unknown,
    };
    FieldValue::Float(mhz)
}

/// E-UTRA operating bands the EG2x family supports
static LTE_BAND_NAMES: &[(i64, &str)] = &[
    (1, "B1 2100MHz"),
    (2, "B2 1900MHz"),
    (3, "B3 1800MHz"),
    (4, "B4 AWS-1"),
    (5, "B5 850MHz"),
    (7, "B7 2600MHz"),
    (8, "B8 900MHz"),
    (12, "B12 700MHz"),
    (13, "B13 700MHz"),
    (14, "B14 700MHz"),
    (17, "B17 700MHz"),
    (18, "B18 800MHz"),
    (19, "B19 800MHz"),
    (20, "B20 800MHz"),
    (25, "B25 1900MHz"),
    (26, "B26 850MHz"),
    (28, "B28 700MHz"),
    (38, "B38 TDD 2600MHz"),
    (39, "B39 TDD 1900MHz"),
    (40, "B40 TDD 2300MHz"),
    (41, "B41 TDD 2500MHz"),
    (66, "B66 AWS-3"),
    (71, "B71 600MHz"),
];

/// LTE band number to a readable band name
pub fn lte_band_name(token: &str) -> FieldValue {
    parse_code(token)
        .and_then(|band| LTE_BAND_NAMES.iter().find(|(b, _)| *b == band))
        .map(|(_, name)| FieldValue::Text((*name).to_string()))
        .unwrap_or(FieldValue::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let names: HashSet<&str> = FIELD_SPECS.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), FIELD_SPECS.len());
    }

    #[test]
    fn test_every_field_has_a_rule() {
        for spec in FIELD_SPECS {
            assert!(!spec.rules.is_empty(), "{} has no rule", spec.name);
        }
    }

    #[test]
    fn test_any_is_not_a_field_name() {
        assert!(find_field("any").is_none());
    }

    #[test]
    fn test_find_field() {
        let (idx, spec) = find_field("rsrp").unwrap();
        assert_eq!(FIELD_SPECS[idx].name, "rsrp");
        assert_eq!(spec.rules.len(), 2);
        assert!(find_field("cell-id").is_none());
    }

    #[test]
    fn test_int_transform() {
        assert_eq!(int("-95"), FieldValue::Int(-95));
        assert_eq!(int(" 20 "), FieldValue::Int(20));
        assert_eq!(int("0"), FieldValue::Int(0));
        assert_eq!(int("-"), FieldValue::Unknown);
        assert_eq!(int("-32768"), FieldValue::Unknown);
        assert_eq!(int("1A2B"), FieldValue::Unknown);
        assert_eq!(int(""), FieldValue::Unknown);
    }

    #[test]
    fn test_text_transform() {
        assert_eq!(text("\"LTE\""), FieldValue::Text("LTE".to_string()));
        assert_eq!(text("1A2B3C"), FieldValue::Text("1A2B3C".to_string()));
        assert_eq!(text("-"), FieldValue::Unknown);
        assert_eq!(text("\"\""), FieldValue::Unknown);
    }

    #[test]
    fn test_csq_rssi_scaling() {
        assert_eq!(csq_rssi("0"), FieldValue::Int(-113));
        assert_eq!(csq_rssi("20"), FieldValue::Int(-73));
        assert_eq!(csq_rssi("31"), FieldValue::Int(-51));
        assert_eq!(csq_rssi("99"), FieldValue::Unknown);
        assert_eq!(csq_rssi("32"), FieldValue::Unknown);
        assert_eq!(csq_rssi("-1"), FieldValue::Unknown);
    }

    #[test]
    fn test_csq_ber() {
        assert_eq!(csq_ber("0"), FieldValue::Int(0));
        assert_eq!(csq_ber("7"), FieldValue::Int(7));
        assert_eq!(csq_ber("99"), FieldValue::Unknown);
        assert_eq!(csq_ber("8"), FieldValue::Unknown);
    }

    #[test]
    fn test_bandwidth_lookup() {
        assert_eq!(bandwidth_mhz("0"), FieldValue::Float(1.4));
        assert_eq!(bandwidth_mhz("3"), FieldValue::Float(10.0));
        assert_eq!(bandwidth_mhz("5"), FieldValue::Float(20.0));
        assert_eq!(bandwidth_mhz("6"), FieldValue::Unknown);
        assert_eq!(bandwidth_mhz("-"), FieldValue::Unknown);
    }

    #[test]
    fn test_band_name_lookup() {
        assert_eq!(lte_band_name("1"), FieldValue::Text("B1 2100MHz".to_string()));
        assert_eq!(lte_band_name("19"), FieldValue::Text("B19 800MHz".to_string()));
        assert_eq!(lte_band_name("255"), FieldValue::Unknown);
        assert_eq!(lte_band_name("-"), FieldValue::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Int(-95).to_string(), "-95");
        assert_eq!(FieldValue::Float(1.4).to_string(), "1.4");
        assert_eq!(FieldValue::Float(20.0).to_string(), "20");
        assert_eq!(FieldValue::Text("LTE".into()).to_string(), "LTE");
        assert_eq!(FieldValue::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_unknown_serializes_as_null() {
        assert_eq!(serde_json::to_string(&FieldValue::Unknown).unwrap(), "null");
        assert_eq!(serde_json::to_string(&FieldValue::Int(0)).unwrap(), "0");
        let back: FieldValue = serde_json::from_str("null").unwrap();
        assert_eq!(back, FieldValue::Unknown);
    }

    #[test]
    fn test_rat_from_token() {
        assert_eq!(Rat::from_token("\"LTE\""), Some(Rat::Lte));
        assert_eq!(Rat::from_token("GSM"), Some(Rat::Gsm));
        assert_eq!(Rat::from_token("WCDMA"), Some(Rat::Wcdma));
        assert_eq!(Rat::from_token("NOSERVICE"), None);
    }
}
