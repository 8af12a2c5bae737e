//! # AT Protocol Constants
//!
//! Command strings, response prefixes and final result codes used with the
//! Quectel EG2x modem family.

/// Serving cell engineering query (Quectel)
pub const CMD_SERVING_CELL: &str = "AT+QENG=\"servingcell\"";

/// 3GPP signal quality query
pub const CMD_CSQ: &str = "AT+CSQ";

/// Quectel extended signal quality query
pub const CMD_QCSQ: &str = "AT+QCSQ";

/// Information response prefix of `AT+QENG`
pub const PREFIX_QENG: &str = "+QENG:";

/// Information response prefix of `AT+CSQ`
pub const PREFIX_CSQ: &str = "+CSQ:";

/// Information response prefix of `AT+QCSQ`
pub const PREFIX_QCSQ: &str = "+QCSQ:";

/// Command line terminator (S3 register default)
pub const COMMAND_TERMINATOR: &str = "\r";

/// Final result code that closes a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalResult {
    /// `OK`
    Ok,
    /// `ERROR`, `+CME ERROR: <n>`, `+CMS ERROR: <n>` or `NO CARRIER`
    Error,
}

/// Classify a response line, `None` for anything that is not a final result
pub fn final_result(line: &str) -> Option<FinalResult> {
    match line {
        "OK" => Some(FinalResult::Ok),
        "ERROR" | "NO CARRIER" => Some(FinalResult::Error),
        l if l.starts_with("+CME ERROR:") || l.starts_with("+CMS ERROR:") => {
            Some(FinalResult::Error)
        }
        _ => None,
    }
}

/// Find the first line carrying `prefix` and return the text after it
///
/// Echoed commands and unsolicited result codes are skipped over.
pub fn find_response<'a>(lines: &'a [String], prefix: &str) -> Option<&'a str> {
    lines
        .iter()
        .find_map(|l| l.strip_prefix(prefix))
        .map(str::trim)
}
