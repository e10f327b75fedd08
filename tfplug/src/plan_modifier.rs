//! Plan-time decisions driven by attribute roles
//!
//! An identity attribute addresses the remote object, so changing it cannot
//! be applied in place: the resource must be destroyed and created again.

use crate::resource::{ModifyPlanRequest, ModifyPlanResponse};
use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Identity attributes whose planned value differs from the stored one
///
/// Null or unknown on either side is not a change: a new resource has no
/// stored identity, and computed identities stay unknown until apply.
pub fn changed_identities(
    schema: &Schema,
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> Vec<AttributePath> {
    schema
        .identity_attributes()
        .map(|attr| AttributePath::new(&attr.name))
        .filter(|path| match (prior.get(path), planned.get(path)) {
            (Ok(before), Ok(after)) => before.is_known() && after.is_known() && before != after,
            _ => false,
        })
        .collect()
}

/// Marks every changed identity attribute as requiring replacement
pub fn requires_replace_if_identity_changed(
    schema: &Schema,
    request: ModifyPlanRequest,
) -> ModifyPlanResponse {
    let requires_replace = if request.prior_state.is_null() {
        vec![]
    } else {
        changed_identities(schema, &request.prior_state, &request.proposed_new_state)
    };

    ModifyPlanResponse {
        planned_state: request.proposed_new_state,
        requires_replace,
        diagnostics: vec![],
    }
}

/// Refuses an in-place update that would retarget the resource
pub fn ensure_identity_unchanged(
    schema: &Schema,
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> Result<(), Diagnostic> {
    match changed_identities(schema, prior, planned).into_iter().next() {
        None => Ok(()),
        Some(path) => Err(Diagnostic::error(
            "Identity attribute changed",
            format!(
                "{} identifies the remote object and cannot be updated in place; the resource must be replaced",
                path
            ),
        )
        .with_attribute(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
    use crate::types::Dynamic;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("organization_id", AttributeType::String)
                    .required()
                    .identity()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("network_id", AttributeType::String)
                    .computed()
                    .identity()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .build()
    }

    fn state(organization_id: &str, network_id: Dynamic, name: &str) -> DynamicValue {
        let mut state = DynamicValue::object();
        state
            .set_string(&AttributePath::new("organization_id"), organization_id)
            .unwrap();
        state.set(&AttributePath::new("network_id"), network_id).unwrap();
        state.set_string(&AttributePath::new("name"), name).unwrap();
        state
    }

    fn request(prior: DynamicValue, proposed: DynamicValue) -> ModifyPlanRequest {
        ModifyPlanRequest {
            type_name: "meraki_networks".to_string(),
            config: proposed.clone(),
            prior_state: prior,
            proposed_new_state: proposed,
        }
    }

    #[test]
    fn changed_identity_requires_replace() {
        let prior = state("123", Dynamic::String("N_1".to_string()), "office");
        let proposed = state("456", Dynamic::String("N_1".to_string()), "office");

        let response = requires_replace_if_identity_changed(&schema(), request(prior, proposed));

        assert_eq!(response.requires_replace, vec![AttributePath::new("organization_id")]);
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn other_attributes_update_in_place() {
        let prior = state("123", Dynamic::String("N_1".to_string()), "office");
        let proposed = state("123", Dynamic::String("N_1".to_string()), "renamed");

        let response = requires_replace_if_identity_changed(&schema(), request(prior, proposed));

        assert!(response.requires_replace.is_empty());
        assert_eq!(
            response
                .planned_state
                .get_string(&AttributePath::new("name"))
                .unwrap(),
            "renamed"
        );
    }

    #[test]
    fn unknown_computed_identity_is_not_a_change() {
        let prior = state("123", Dynamic::String("N_1".to_string()), "office");
        let proposed = state("123", Dynamic::Unknown, "office");

        assert!(changed_identities(&schema(), &prior, &proposed).is_empty());
    }

    #[test]
    fn creation_never_requires_replace() {
        let proposed = state("123", Dynamic::Unknown, "office");

        let response = requires_replace_if_identity_changed(
            &schema(),
            request(DynamicValue::null(), proposed),
        );

        assert!(response.requires_replace.is_empty());
    }

    #[test]
    fn update_guard_names_the_changed_attribute() {
        let prior = state("123", Dynamic::String("N_1".to_string()), "office");
        let proposed = state("123", Dynamic::String("N_2".to_string()), "office");

        let diag = ensure_identity_unchanged(&schema(), &prior, &proposed).unwrap_err();

        assert!(diag.is_error());
        assert_eq!(diag.attribute, Some(AttributePath::new("network_id")));
        assert!(ensure_identity_unchanged(&schema(), &prior, &prior).is_ok());
    }
}
