use crate::config::BrandConfig;
use crate::error::Result;
use regex::{Regex, RegexBuilder};
use url::Url;

/// Platform detected in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandMatch {
    /// Text stored in the record: the brand as written in the message, or
    /// the first domain label of the fallback URL.
    pub platform: String,
    pub label: String,
}

struct BrandPattern {
    regex: Regex,
    label: String,
}

/// Ordered, first-match-wins brand detection with a URL fallback.
pub struct BrandMatcher {
    brands: Vec<BrandPattern>,
    url_pattern: Regex,
}

impl BrandMatcher {
    pub fn new(brands: &[BrandConfig]) -> Result<Self> {
        let brands = brands
            .iter()
            .map(|brand| -> Result<BrandPattern> {
                let regex = RegexBuilder::new(&brand.pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok(BrandPattern {
                    regex,
                    label: brand.label.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            brands,
            url_pattern: Regex::new(r"(?i)https?://\S+")?,
        })
    }

    pub fn detect(&self, text: &str) -> Option<BrandMatch> {
        for brand in &self.brands {
            if let Some(found) = brand.regex.find(text) {
                return Some(BrandMatch {
                    platform: found.as_str().to_string(),
                    label: brand.label.clone(),
                });
            }
        }

        let url = self.url_pattern.find(text)?;
        let platform = domain_label(url.as_str())?;
        Some(BrandMatch {
            label: capitalize(&platform),
            platform,
        })
    }
}

/// `https://www.shop.example.com/x` -> `shop`.
fn domain_label(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or_default();

    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
