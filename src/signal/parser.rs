//! # AT Response Parser
//!
//! Turns the information lines of the serving-cell and signal-quality
//! queries into a [`SignalReading`].
//!
//! Parsing never fails as a whole: each field is extracted on its own, and a
//! token that is missing or malformed only makes that one field `Unknown`.

use tracing::trace;

use super::fields::{FieldSpec, FieldValue, Rat, Rule, Source, FIELD_SPECS};
use crate::at::protocol::{find_response, PREFIX_CSQ, PREFIX_QCSQ, PREFIX_QENG};

/// Tokenised information responses collected from the modem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModemResponses {
    serving_cell: Option<Vec<String>>,
    csq: Option<Vec<String>>,
    qcsq: Option<Vec<String>>,
}

/// Split a response body on commas, trimming whitespace and quotes
fn tokenize(body: &str) -> Vec<String> {
    body.split(',')
        .map(|t| t.trim().trim_matches('"').to_string())
        .collect()
}

impl ModemResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every known information line from raw response text
    ///
    /// ```
    /// use onyx_signal_info::signal::{FieldValue, ModemResponses, SignalReading};
    ///
    /// let responses = ModemResponses::from_text("+CSQ: 20,99\r\nOK\r\n");
    /// assert!(responses.serving_rat().is_none());
    ///
    /// let reading = SignalReading::extract(&responses);
    /// assert_eq!(reading.get("rssi"), Some(&FieldValue::Int(-73)));
    /// ```
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        let mut responses = Self::new();
        responses.add_lines(&lines);
        responses
    }

    /// Pick up whichever information lines are present in `lines`
    pub fn add_lines(&mut self, lines: &[String]) {
        if let Some(body) = find_response(lines, PREFIX_QENG) {
            self.set_serving_cell(body);
        }
        if let Some(body) = find_response(lines, PREFIX_CSQ) {
            self.set_csq(body);
        }
        if let Some(body) = find_response(lines, PREFIX_QCSQ) {
            self.set_qcsq(body);
        }
    }

    /// Body of `+QENG: "servingcell",…` (text after the prefix)
    pub fn set_serving_cell(&mut self, body: &str) {
        self.serving_cell = Some(tokenize(body));
    }

    /// Body of `+CSQ: <rssi>,<ber>`
    pub fn set_csq(&mut self, body: &str) {
        self.csq = Some(tokenize(body));
    }

    /// Body of `+QCSQ: "<sysmode>",…`
    pub fn set_qcsq(&mut self, body: &str) {
        self.qcsq = Some(tokenize(body));
    }

    /// RAT of the serving cell, if camped on a known one
    pub fn serving_rat(&self) -> Option<Rat> {
        self.serving_cell
            .as_ref()
            .and_then(|t| t.get(2))
            .and_then(|t| Rat::from_token(t))
    }

    fn qcsq_rat(&self) -> Option<Rat> {
        self.qcsq
            .as_ref()
            .and_then(|t| t.first())
            .and_then(|t| Rat::from_token(t))
    }

    /// The raw token a rule points at, if its source applies
    fn token(&self, rule: &Rule) -> Option<&str> {
        let tokens = match rule.source {
            Source::ServingCell(None) => self.serving_cell.as_ref()?,
            Source::ServingCell(Some(rat)) => {
                if self.serving_rat() != Some(rat) {
                    return None;
                }
                self.serving_cell.as_ref()?
            }
            Source::Csq => self.csq.as_ref()?,
            Source::Qcsq(rat) => {
                if self.qcsq_rat() != Some(rat) {
                    return None;
                }
                self.qcsq.as_ref()?
            }
        };
        tokens.get(rule.position).map(String::as_str)
    }

    /// Apply a field's rules in order; the first known value wins
    fn extract(&self, spec: &FieldSpec) -> FieldValue {
        for rule in spec.rules {
            if let Some(token) = self.token(rule) {
                let value = (rule.transform)(token);
                if !value.is_unknown() {
                    return value;
                }
                trace!("{}: token {:?} from {:?} is not a reading", spec.name, token, rule.source);
            }
        }
        FieldValue::Unknown
    }
}

/// Every field of the table with its parsed value, in canonical order
#[derive(Debug, Clone, PartialEq)]
pub struct SignalReading {
    values: Vec<(&'static str, FieldValue)>,
}

impl SignalReading {
    /// Build a reading from collected responses
    pub fn extract(responses: &ModemResponses) -> Self {
        let values = FIELD_SPECS
            .iter()
            .map(|spec| (spec.name, responses.extract(spec)))
            .collect();
        Self { values }
    }

    /// Shorthand for [`ModemResponses::from_text`] followed by [`Self::extract`]
    ///
    /// ```
    /// use onyx_signal_info::signal::{FieldValue, SignalReading};
    ///
    /// let reading = SignalReading::parse("+CSQ: 99,99");
    /// assert_eq!(reading.get("rssi"), Some(&FieldValue::Unknown));
    /// assert_eq!(reading.get("ber"), Some(&FieldValue::Unknown));
    /// ```
    pub fn parse(text: &str) -> Self {
        Self::extract(&ModemResponses::from_text(text))
    }

    /// Value of a field, `None` only for names outside the table
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Value at a table index
    pub fn at(&self, index: usize) -> Option<&(&'static str, FieldValue)> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of fields that carry an actual reading
    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|(_, v)| !v.is_unknown()).count()
    }
}
