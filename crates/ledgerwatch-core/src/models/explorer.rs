//! Explorer and alert channel models

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholders accepted in an explorer URL template
const ADDRESS_SLOTS: [&str; 3] = ["{address}", "%s", "%v"];

/// A block-explorer endpoint and how to read a balance from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explorer {
    /// Display name
    pub name: String,

    /// URL template with exactly one address slot
    #[serde(alias = "url")]
    pub url_pattern: String,

    /// Pattern with exactly one capturing group around the balance
    #[serde(alias = "pattern")]
    pub regexp: String,
}

impl Explorer {
    /// Create a new explorer description
    pub fn new(
        name: impl Into<String>,
        url_pattern: impl Into<String>,
        regexp: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url_pattern: url_pattern.into(),
            regexp: regexp.into(),
        }
    }

    /// Build the lookup URL for an address
    pub fn request_url(&self, address: &str) -> String {
        ADDRESS_SLOTS
            .iter()
            .find(|slot| self.url_pattern.contains(*slot))
            .map_or_else(
                || self.url_pattern.clone(),
                |slot| self.url_pattern.replacen(slot, address, 1),
            )
    }

    /// Host part of the explorer URL, if the template parses as a URL
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.request_url("address"))
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Check the template and pattern before any lookup runs
    pub fn validate(&self) -> Result<()> {
        let slots: usize = ADDRESS_SLOTS
            .iter()
            .map(|slot| self.url_pattern.matches(slot).count())
            .sum();
        if slots != 1 {
            return Err(Error::config(format!(
                "explorer url_pattern must contain exactly one address slot, found {slots}"
            )));
        }

        let regex = Regex::new(&self.regexp)?;
        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(Error::config(format!(
                "explorer regexp must contain exactly one capturing group, found {groups}"
            )));
        }

        Ok(())
    }
}

/// Sender and recipient for alert emails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertChannel {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
}

impl AlertChannel {
    /// Check that both addresses are present
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(Error::config("email_alert needs both `from` and `to`"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://explorer.test/address/{address}")]
    #[case("https://explorer.test/address/%s")]
    #[case("https://explorer.test/address/%v")]
    fn test_request_url_substitutes_slot(#[case] template: &str) {
        let explorer = Explorer::new("test", template, r"Balance: (\d+)");

        assert_eq!(
            explorer.request_url("LTC1abc"),
            "https://explorer.test/address/LTC1abc"
        );
        assert!(explorer.validate().is_ok());
    }

    #[test]
    fn test_host() {
        let explorer = Explorer::new(
            "blockchair",
            "https://blockchair.com/litecoin/address/%s",
            r"(\d+)",
        );
        assert_eq!(explorer.host().as_deref(), Some("blockchair.com"));
    }

    #[rstest]
    #[case("https://explorer.test/address", r"Balance: (\d+)")]
    #[case("https://explorer.test/{address}/%s", r"Balance: (\d+)")]
    #[case("https://explorer.test/{address}", r"Balance: \d+")]
    #[case("https://explorer.test/{address}", r"(Balance): (\d+)")]
    #[case("https://explorer.test/{address}", r"Balance: (\d+")]
    fn test_validate_rejects(#[case] template: &str, #[case] pattern: &str) {
        let explorer = Explorer::new("test", template, pattern);

        assert!(matches!(explorer.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_non_capturing_groups_allowed() {
        let explorer = Explorer::new(
            "test",
            "https://explorer.test/{address}",
            r"(?:Balance|Final): (\d+\.\d+)",
        );
        assert!(explorer.validate().is_ok());
    }

    #[test]
    fn test_alert_channel_requires_addresses() {
        let channel = AlertChannel {
            from: "monitor@example.com".to_string(),
            to: " ".to_string(),
        };
        assert!(channel.validate().is_err());
    }
}
