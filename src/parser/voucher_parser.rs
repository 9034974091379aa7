use crate::config::ParserConfig;
use crate::error::Result;
use crate::parser::brands::BrandMatcher;
use crate::record::{VoucherRecord, EXPIRY_FORMAT};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVoucher {
    pub record: VoucherRecord,
    /// Display name of the detected platform, or `Unknown`.
    pub platform_label: String,
}

/// Regex heuristics for the marketing-message templates we know about.
///
/// Parsing never fails: every field that has no match is left empty,
/// except `shared_via` which falls back to the configured channel.
pub struct VoucherParser {
    brands: BrandMatcher,
    voucher_code: Regex,
    expiry_days: Regex,
    link: Regex,
    shared_via: Regex,
    default_shared_via: String,
}

impl VoucherParser {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        Ok(Self {
            brands: BrandMatcher::new(&config.brands)?,
            voucher_code: Regex::new(r"(?i)Voucher code:\s*([A-Za-z0-9-]+)")?,
            expiry_days: Regex::new(r"(?i)Expiring in ([0-9]+) days?")?,
            link: Regex::new(r"(?i)https?://\S+")?,
            shared_via: Regex::new(r"(?i)on (.*?)!")?,
            default_shared_via: config.default_shared_via.clone(),
        })
    }

    pub fn parse(&self, text: &str) -> ParsedVoucher {
        self.parse_at(text, Utc::now())
    }

    /// Parses `text` with expiry dates counted from `now`.
    pub fn parse_at(&self, text: &str, now: DateTime<Utc>) -> ParsedVoucher {
        let (platform, platform_label) = match self.brands.detect(text) {
            Some(found) => (found.platform, found.label),
            None => (String::new(), "Unknown".to_string()),
        };

        let record = VoucherRecord {
            title: extract_title(text),
            platform,
            shared_via: self.extract_shared_via(text),
            voucher_code: self.extract_voucher_code(text),
            link: self.extract_link(text),
            expiry: self.extract_expiry(text, now),
        };

        debug!(
            platform = %record.platform,
            voucher_code = %record.voucher_code,
            missing = record.missing_fields().len(),
            "parsed voucher text"
        );

        ParsedVoucher {
            record,
            platform_label,
        }
    }

    fn extract_voucher_code(&self, text: &str) -> String {
        first_capture(&self.voucher_code, text).unwrap_or_default()
    }

    fn extract_link(&self, text: &str) -> String {
        self.link
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    fn extract_shared_via(&self, text: &str) -> String {
        first_capture(&self.shared_via, text).unwrap_or_else(|| self.default_shared_via.clone())
    }

    fn extract_expiry(&self, text: &str, now: DateTime<Utc>) -> String {
        first_capture(&self.expiry_days, text)
            .and_then(|days| days.parse::<i64>().ok())
            .and_then(Duration::try_days)
            .and_then(|offset| now.checked_add_signed(offset))
            .map(|date| date.format(EXPIRY_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// Lines two and three joined when there are at least three lines,
/// otherwise the first line.
fn extract_title(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    match lines.as_slice() {
        [_, second, third, ..] => format!("{} {}", second, third),
        [first, ..] => first.to_string(),
        [] => String::new(),
    }
}

fn first_capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
