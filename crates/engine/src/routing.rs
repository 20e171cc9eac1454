//! Country routing-code reference table.
//!
//! Static configuration keyed by ISO-3166 alpha-2 country code. Countries
//! absent from the table do not use a routing code at all; countries present
//! with `required: false` validate the pattern only when a non-empty code is
//! supplied.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::{EngineError, ResultEngine};

/// Routing-code rule for one destination country.
#[derive(Clone, Copy, Debug)]
pub struct RoutingRule {
    pub country: &'static str,
    /// Label shown next to the input field ("ABA routing number", ...).
    pub label: &'static str,
    /// Placeholder hint for the field ("9 digits", ...).
    pub placeholder: &'static str,
    pub required: bool,
    pattern: &'static str,
}

const BIC: &str = r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$";

static RULES: &[RoutingRule] = &[
    RoutingRule { country: "US", label: "ABA routing number", placeholder: "9 digits", required: true, pattern: r"^\d{9}$" },
    RoutingRule { country: "CA", label: "Transit and institution number", placeholder: "12345-678", required: true, pattern: r"^\d{5}-?\d{3}$" },
    RoutingRule { country: "GB", label: "Sort code", placeholder: "12-34-56", required: true, pattern: r"^\d{2}-?\d{2}-?\d{2}$" },
    RoutingRule { country: "IE", label: "Sort code", placeholder: "6 digits", required: false, pattern: r"^\d{6}$" },
    RoutingRule { country: "DE", label: "Bankleitzahl", placeholder: "8 digits", required: false, pattern: r"^\d{8}$" },
    RoutingRule { country: "FR", label: "Code banque et guichet", placeholder: "10 digits", required: false, pattern: r"^\d{10}$" },
    RoutingRule { country: "ES", label: "BIC", placeholder: "e.g. BSCHESMM", required: false, pattern: BIC },
    RoutingRule { country: "IT", label: "BIC", placeholder: "e.g. BCITITMM", required: false, pattern: BIC },
    RoutingRule { country: "PT", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "NL", label: "BIC", placeholder: "e.g. INGBNL2A", required: false, pattern: BIC },
    RoutingRule { country: "BE", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "LU", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "AT", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "CH", label: "BC number", placeholder: "3 to 5 digits", required: false, pattern: r"^\d{3,5}$" },
    RoutingRule { country: "SE", label: "Clearing number", placeholder: "4 or 5 digits", required: false, pattern: r"^\d{4,5}$" },
    RoutingRule { country: "NO", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "DK", label: "Registration number", placeholder: "4 digits", required: false, pattern: r"^\d{4}$" },
    RoutingRule { country: "FI", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "PL", label: "Sort code", placeholder: "8 digits", required: false, pattern: r"^\d{8}$" },
    RoutingRule { country: "CZ", label: "Bank code", placeholder: "4 digits", required: false, pattern: r"^\d{4}$" },
    RoutingRule { country: "GR", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "AU", label: "BSB number", placeholder: "123-456", required: true, pattern: r"^\d{3}-?\d{3}$" },
    RoutingRule { country: "NZ", label: "Bank and branch number", placeholder: "6 digits", required: true, pattern: r"^\d{6}$" },
    RoutingRule { country: "JP", label: "Bank and branch code", placeholder: "7 digits", required: false, pattern: r"^\d{7}$" },
    RoutingRule { country: "CN", label: "CNAPS code", placeholder: "12 digits", required: true, pattern: r"^\d{12}$" },
    RoutingRule { country: "HK", label: "Bank and branch code", placeholder: "6 digits", required: false, pattern: r"^\d{6}$" },
    RoutingRule { country: "SG", label: "Bank and branch code", placeholder: "7 digits", required: false, pattern: r"^\d{7}$" },
    RoutingRule { country: "KR", label: "Bank code", placeholder: "7 digits", required: false, pattern: r"^\d{7}$" },
    RoutingRule { country: "TW", label: "Bank code", placeholder: "7 digits", required: false, pattern: r"^\d{7}$" },
    RoutingRule { country: "IN", label: "IFSC code", placeholder: "e.g. HDFC0001234", required: true, pattern: r"^[A-Z]{4}0[A-Z0-9]{6}$" },
    RoutingRule { country: "MY", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "TH", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "PH", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "ID", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "VN", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "AE", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "SA", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "IL", label: "Bank and branch number", placeholder: "5 or 6 digits", required: false, pattern: r"^\d{5,6}$" },
    RoutingRule { country: "ZA", label: "Branch code", placeholder: "6 digits", required: true, pattern: r"^\d{6}$" },
    RoutingRule { country: "NG", label: "Sort code", placeholder: "9 digits", required: false, pattern: r"^\d{9}$" },
    RoutingRule { country: "KE", label: "Branch code", placeholder: "5 digits", required: false, pattern: r"^\d{5}$" },
    RoutingRule { country: "BR", label: "Bank and agency code", placeholder: "7 digits", required: false, pattern: r"^\d{7}$" },
    RoutingRule { country: "MX", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "AR", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
    RoutingRule { country: "CL", label: "BIC", placeholder: "8 or 11 characters", required: false, pattern: BIC },
];

static COMPILED: LazyLock<HashMap<&'static str, (&'static RoutingRule, Regex)>> =
    LazyLock::new(|| {
        RULES
            .iter()
            .filter_map(|rule| {
                // A malformed pattern is a programming error in the table
                // above; the entry is skipped rather than poisoning the map,
                // and the table test below catches it.
                let regex = Regex::new(rule.pattern).ok()?;
                Some((rule.country, (rule, regex)))
            })
            .collect()
    });

/// Looks up the rule for a destination country, if it uses routing codes.
pub fn routing_rule(country: &str) -> Option<&'static RoutingRule> {
    COMPILED.get(country).map(|(rule, _)| *rule)
}

/// Validates a submitted routing code against the destination country's rule.
///
/// - Country absent from the table: any submitted code is ignored.
/// - Rule `required: true`: code must be present, non-empty and match.
/// - Rule `required: false`: empty/absent is fine; non-empty must match.
pub fn validate_routing_code(country: &str, code: Option<&str>) -> ResultEngine<()> {
    let Some((rule, regex)) = COMPILED.get(country) else {
        return Ok(());
    };

    let trimmed = code.map(str::trim).filter(|s| !s.is_empty());
    match trimmed {
        None => {
            if rule.required {
                return Err(EngineError::InvalidRoutingCode(format!(
                    "{} requires a {}",
                    rule.country, rule.label
                )));
            }
            Ok(())
        }
        Some(value) => {
            if !regex.is_match(value) {
                return Err(EngineError::InvalidRoutingCode(format!(
                    "invalid {} for {}",
                    rule.label, rule.country
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_pattern_compiles() {
        for rule in RULES {
            assert!(
                COMPILED.contains_key(rule.country),
                "pattern for {} failed to compile",
                rule.country
            );
        }
    }

    #[test]
    fn us_requires_nine_digits() {
        assert!(validate_routing_code("US", Some("021000021")).is_ok());
        assert_eq!(
            validate_routing_code("US", Some("12345")),
            Err(EngineError::InvalidRoutingCode(
                "invalid ABA routing number for US".to_string()
            ))
        );
        assert!(matches!(
            validate_routing_code("US", None),
            Err(EngineError::InvalidRoutingCode(_))
        ));
        assert!(matches!(
            validate_routing_code("US", Some("  ")),
            Err(EngineError::InvalidRoutingCode(_))
        ));
    }

    #[test]
    fn de_is_optional_but_validated_when_present() {
        assert!(validate_routing_code("DE", None).is_ok());
        assert!(validate_routing_code("DE", Some("")).is_ok());
        assert!(validate_routing_code("DE", Some("10070000")).is_ok());
        assert!(matches!(
            validate_routing_code("DE", Some("abc")),
            Err(EngineError::InvalidRoutingCode(_))
        ));
    }

    #[test]
    fn unlisted_countries_skip_the_field() {
        assert!(validate_routing_code("AQ", None).is_ok());
        assert!(validate_routing_code("AQ", Some("whatever")).is_ok());
    }

    #[test]
    fn in_ifsc_format() {
        assert!(validate_routing_code("IN", Some("HDFC0001234")).is_ok());
        assert!(matches!(
            validate_routing_code("IN", Some("hdfc0001234")),
            Err(EngineError::InvalidRoutingCode(_))
        ));
    }

    #[test]
    fn rule_lookup_exposes_ui_hints() {
        let rule = routing_rule("US").unwrap();
        assert_eq!(rule.label, "ABA routing number");
        assert!(rule.required);
        assert!(routing_rule("AQ").is_none());
    }
}
