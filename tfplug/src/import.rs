//! Import helpers for resources addressed by one or more identity attributes

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Splits a comma-separated import ID into the given attributes
///
/// `"123,N_456"` with `["organization_id", "network_id"]` yields a state
/// with both attributes set. A single attribute takes the whole ID.
pub fn import_state_composite_id(
    attributes: &[&str],
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let parts: Vec<&str> = if attributes.len() == 1 {
        vec![request.id.as_str()]
    } else {
        request.id.split(',').map(str::trim).collect()
    };

    if parts.len() != attributes.len() || parts.iter().any(|p| p.is_empty()) {
        response.diagnostics.push(Diagnostic::error(
            "Unexpected import identifier",
            format!(
                "Expected import identifier with format: {}. Got: {:?}",
                attributes.join(","),
                request.id
            ),
        ));
        return;
    }

    let mut state = DynamicValue::object();
    for (name, value) in attributes.iter().zip(parts) {
        let path = AttributePath::new(name);
        if let Err(e) = state.set_string(&path, value) {
            response.diagnostics.push(
                Diagnostic::error(
                    format!("Failed to set import ID: {}", e),
                    format!("Could not set attribute '{}' to '{}'", path, value),
                )
                .with_attribute(path),
            );
            return;
        }
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "meraki_networks".to_string(),
            id: id.to_string(),
        }
    }

    fn empty_response() -> ImportResourceStateResponse {
        ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        }
    }

    #[test]
    fn single_attribute_takes_whole_id() {
        let mut response = empty_response();
        import_state_composite_id(&["serial"], &request("Q234-ABCD-5678"), &mut response);

        assert!(response.diagnostics.is_empty());
        let state = &response.imported_resources[0].state;
        assert_eq!(
            state.get_string(&AttributePath::new("serial")).unwrap(),
            "Q234-ABCD-5678"
        );
    }

    #[test]
    fn composite_id_is_split_in_order() {
        let mut response = empty_response();
        import_state_composite_id(
            &["organization_id", "network_id"],
            &request("123, N_456"),
            &mut response,
        );

        let state = &response.imported_resources[0].state;
        assert_eq!(state.get_string(&AttributePath::new("organization_id")).unwrap(), "123");
        assert_eq!(state.get_string(&AttributePath::new("network_id")).unwrap(), "N_456");
    }

    #[test]
    fn wrong_part_count_is_reported() {
        let mut response = empty_response();
        import_state_composite_id(
            &["organization_id", "network_id"],
            &request("N_456"),
            &mut response,
        );

        assert!(response.imported_resources.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("organization_id,network_id"));
    }
}
