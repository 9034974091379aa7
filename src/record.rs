use crate::error::{Result, VouchrError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// A voucher as extracted from a message and sent to the save endpoint.
///
/// Every field is a plain string so that a partially parsed or hand-edited
/// record can be held before it is complete. Missing keys deserialize to
/// empty strings, which is how stored records with absent fields arrive
/// from the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoucherRecord {
    pub title: String,
    pub platform: String,
    pub shared_via: String,
    pub voucher_code: String,
    pub link: String,
    pub expiry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Platform,
    SharedVia,
    VoucherCode,
    Link,
    Expiry,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Platform,
        Field::SharedVia,
        Field::VoucherCode,
        Field::Link,
        Field::Expiry,
    ];

    /// Key used in the JSON body.
    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Platform => "platform",
            Field::SharedVia => "sharedVia",
            Field::VoucherCode => "voucherCode",
            Field::Link => "link",
            Field::Expiry => "expiry",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Platform => "Platform",
            Field::SharedVia => "Shared Via",
            Field::VoucherCode => "Voucher Code",
            Field::Link => "Link",
            Field::Expiry => "Expiry",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = VouchrError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "title" => Ok(Field::Title),
            "platform" => Ok(Field::Platform),
            "sharedvia" => Ok(Field::SharedVia),
            "vouchercode" | "code" => Ok(Field::VoucherCode),
            "link" | "url" => Ok(Field::Link),
            "expiry" | "expires" => Ok(Field::Expiry),
            _ => Err(VouchrError::InvalidField {
                field: s.to_string(),
                message: format!(
                    "unknown field, expected one of: {}",
                    Field::ALL.map(Field::key).join(", ")
                ),
            }),
        }
    }
}

impl VoucherRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Platform => &self.platform,
            Field::SharedVia => &self.shared_via,
            Field::VoucherCode => &self.voucher_code,
            Field::Link => &self.link,
            Field::Expiry => &self.expiry,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Platform => &mut self.platform,
            Field::SharedVia => &mut self.shared_via,
            Field::VoucherCode => &mut self.voucher_code,
            Field::Link => &mut self.link,
            Field::Expiry => &mut self.expiry,
        }
    }

    /// Sets a field from user input.
    ///
    /// Expiry must be a `YYYY-MM-DD` date and links must be http(s) URLs.
    /// An empty value always clears the field.
    pub fn set(&mut self, field: Field, value: &str) -> Result<()> {
        let value = value.trim();

        if !value.is_empty() {
            match field {
                Field::Expiry => {
                    NaiveDate::parse_from_str(value, EXPIRY_FORMAT).map_err(|e| {
                        VouchrError::InvalidField {
                            field: field.label().to_string(),
                            message: format!("'{}' is not a date ({})", value, e),
                        }
                    })?;
                }
                Field::Link => {
                    let scheme_ok = Url::parse(value)
                        .map(|url| matches!(url.scheme(), "http" | "https"))
                        .unwrap_or(false);
                    if !scheme_ok {
                        return Err(VouchrError::InvalidField {
                            field: field.label().to_string(),
                            message: format!("'{}' is not an http(s) URL", value),
                        });
                    }
                }
                _ => {}
            }
        }

        *self.slot(field) = value.to_string();
        Ok(())
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    pub fn is_submittable(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fails with the labels of every empty field.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(VouchrError::Validation {
                missing: missing.iter().map(|f| f.label().to_string()).collect(),
            })
        }
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(No title)"
        } else {
            &self.title
        }
    }
}
