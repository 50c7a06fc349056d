//! Report templates and `{{name}}` placeholder substitution.
//!
//! Substitution is purely textual: a placeholder is replaced by the value
//! registered under its trimmed name and nothing inside the braces is ever
//! interpreted.

use std::collections::BTreeMap;

use roi_core::CalculatorKind;
use tracing::debug;

const SUPPORT_TEMPLATE: &str = include_str!("../../../assets/templates/support.tmpl");
const CHURN_TEMPLATE: &str = include_str!("../../../assets/templates/churn.tmpl");
const CONVERSION_TEMPLATE: &str = include_str!("../../../assets/templates/conversion.tmpl");

/// Template shipped for a report kind.
pub fn builtin_template(kind: CalculatorKind) -> &'static str {
    match kind {
        CalculatorKind::Support => SUPPORT_TEMPLATE,
        CalculatorKind::Churn => CHURN_TEMPLATE,
        CalculatorKind::Conversion => CONVERSION_TEMPLATE,
    }
}

/// Replace every `{{name}}` with `values[name]`.
///
/// Unknown names are dropped. An opening `{{` without a closing `}}` is kept
/// verbatim along with the rest of the text.
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = after[..close].trim();
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => debug!(placeholder = name, "dropping unknown placeholder"),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn values() -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        m.insert("planPrice".to_string(), "$139".to_string());
        m.insert("roi".to_string(), "30.0%".to_string());
        m
    }

    #[test]
    fn replaces_known_names() {
        assert_eq!(
            substitute("Cost: -{{planPrice}} ({{ roi }})", &values()),
            "Cost: -$139 (30.0%)"
        );
    }

    #[test]
    fn drops_unknown_names_without_evaluating() {
        assert_eq!(substitute("a{{missing}}b", &values()), "ab");
        assert_eq!(substitute("{{ 7 * 6 }}", &values()), "");
        assert_eq!(substitute("{{planPrice.constructor}}", &values()), "");
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        assert_eq!(substitute("x {{planPrice", &values()), "x {{planPrice");
        assert_eq!(substitute("{{roi}} {{", &values()), "30.0% {{");
    }

    #[test]
    fn values_are_not_rescanned() {
        let mut m = values();
        m.insert("loop".to_string(), "{{planPrice}}".to_string());
        assert_eq!(substitute("{{loop}}", &m), "{{planPrice}}");
    }

    #[test]
    fn builtin_templates_reference_only_known_kinds() {
        for kind in [
            CalculatorKind::Support,
            CalculatorKind::Churn,
            CalculatorKind::Conversion,
        ] {
            assert!(builtin_template(kind).contains("{{planPrice}}"));
        }
    }

    proptest! {
        #[test]
        fn text_without_braces_is_unchanged(s in "[^{}]*") {
            prop_assert_eq!(substitute(&s, &values()), s);
        }
    }
}
