//! Resource implementations
//!
//! Every resource follows the same write path: send the encoded plan, fetch
//! the object again, and persist `merge_for_write(plan, fresh)`. Refresh
//! persists `merge_for_read(state, fresh)`.

pub mod network;
pub mod organization;
pub mod wireless_radio_settings;

pub use network::NetworkResource;
pub use organization::OrganizationResource;
pub use wireless_radio_settings::WirelessRadioSettingsResource;

use serde_json::Value;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

/// Identity attribute that must already be known (prior state, import)
pub(crate) fn required_id(state: &DynamicValue, name: &str) -> Result<String, Diagnostic> {
    state
        .get_optional_string(&AttributePath::new(name))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Diagnostic::error(
                format!("Missing {}", name),
                format!("The '{}' attribute is required to address the object", name),
            )
            .with_attribute(AttributePath::new(name))
        })
}

/// The `id` field of a create response; organization ids arrive as strings
/// or numbers depending on the endpoint
pub(crate) fn wire_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Finds the entry of a list response whose `name` matches
pub(crate) fn find_by_name<'a>(items: &'a [Value], name: &str) -> Option<&'a Value> {
    items
        .iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
}

pub(crate) fn unsupported(type_name: &str, operation: &str) -> Diagnostic {
    Diagnostic::error(
        format!("{} has no {} method", type_name, operation),
        format!(
            "The Dashboard API cannot {} this object. It was only removed from the Terraform state.",
            operation
        ),
    )
}

pub(crate) fn removed_outside_terraform(type_name: &str, id: &str) -> Diagnostic {
    Diagnostic::warning(
        "Resource not found",
        format!(
            "{} {} no longer exists and was removed from state",
            type_name, id
        ),
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_id_accepts_strings_and_numbers() {
        assert_eq!(wire_id(&json!({"id": "N_1"})), Some("N_1".to_string()));
        assert_eq!(wire_id(&json!({"id": 549236})), Some("549236".to_string()));
        assert_eq!(wire_id(&json!({"id": ""})), None);
        assert_eq!(wire_id(&json!({})), None);
    }

    #[test]
    fn find_by_name_matches_exactly() {
        let items = vec![json!({"id": "1", "name": "HQ"}), json!({"id": "2", "name": "HQ 2"})];
        assert_eq!(find_by_name(&items, "HQ 2").and_then(wire_id), Some("2".to_string()));
        assert!(find_by_name(&items, "hq").is_none());
    }

    #[test]
    fn required_id_rejects_null_and_empty() {
        let mut state = DynamicValue::object();
        assert!(required_id(&state, "serial").is_err());

        state.set_string(&AttributePath::new("serial"), "").unwrap();
        assert!(required_id(&state, "serial").is_err());

        state.set_string(&AttributePath::new("serial"), "Q2").unwrap();
        assert_eq!(required_id(&state, "serial").unwrap(), "Q2");
    }
}
