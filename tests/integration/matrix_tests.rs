//! Permission matrix integration tests

use std::collections::BTreeSet;

use permission_matrix::models::{PermissionDiffItem, PermissionEffect, ResourcePermissionGrant};
use permission_matrix::services::{apply_edits, build_resource_tree, validate_edits};
use permission_matrix::{MatrixEdit, PermissionMatrixState};
use rstest::rstest;

use crate::common::{codes, keys, CatalogFixtures, ResourceFactory};

fn loaded() -> PermissionMatrixState {
    PermissionMatrixState::from_response(&CatalogFixtures::role_response())
}

fn sorted_items(mut items: Vec<PermissionDiffItem>) -> Vec<PermissionDiffItem> {
    items.sort_by(|a, b| {
        (a.resource_key.as_str(), a.permission_code.as_str())
            .cmp(&(b.resource_key.as_str(), b.permission_code.as_str()))
    });
    items
}

fn item(key: &str, code: &str, effect: Option<PermissionEffect>) -> PermissionDiffItem {
    PermissionDiffItem {
        resource_key: key.to_string(),
        permission_code: code.to_string(),
        effect,
    }
}

#[rstest]
#[case::empty(vec![])]
#[case::fixture(CatalogFixtures::role_response().permissions)]
#[case::mixed(vec![
    ResourcePermissionGrant::allow("a", &["VIEW", "USE"]),
    ResourcePermissionGrant::allow("b", &["DELETE"]).with_effect(PermissionEffect::Deny),
    ResourcePermissionGrant::allow("c", &[]),
])]
fn test_round_trip_without_edits_is_empty(#[case] permissions: Vec<ResourcePermissionGrant>) {
    let state = PermissionMatrixState::create(&permissions);
    let payload = state.generate_diff_payload(&CatalogFixtures::codes());
    assert!(payload.items.is_empty());
    assert!(!state.is_dirty());
}

#[test]
fn test_fixture_effects_loaded() {
    let state = loaded();
    assert_eq!(state.effect(keys::USERS, "EDIT"), PermissionEffect::Allow);
    assert_eq!(state.effect(keys::USER_DELETE, "USE"), PermissionEffect::Deny);
    assert_eq!(state.effect(keys::ROLES, "VIEW"), PermissionEffect::None);
}

#[test]
fn test_full_editing_session_payload() {
    let tree = build_resource_tree(&CatalogFixtures::flat()).unwrap();
    let edited = loaded()
        // Grant the whole agent area
        .apply_to_resource_and_children(keys::AGENT, &codes(&["VIEW", "USE"]), PermissionEffect::Allow, &tree)
        // Stop denying user deletion
        .set_permission_effect(keys::USER_DELETE, "USE", PermissionEffect::None)
        // Users row becomes view only
        .apply_row_permissions(keys::USERS, &codes(&["VIEW"]), PermissionEffect::Allow);

    let payload = edited.generate_diff_payload(&CatalogFixtures::codes());
    assert_eq!(
        sorted_items(payload.items),
        vec![
            item(keys::USER_DELETE, "USE", None),
            item(keys::USERS, "EDIT", None),
            item(keys::AGENT, "USE", Some(PermissionEffect::Allow)),
            item(keys::AGENT, "VIEW", Some(PermissionEffect::Allow)),
            item(keys::AGENT_CHAT, "USE", Some(PermissionEffect::Allow)),
            item(keys::AGENT_CHAT, "VIEW", Some(PermissionEffect::Allow)),
        ]
    );

    let changed: BTreeSet<String> = edited.changed_resources();
    assert_eq!(changed.len(), 4);
    assert!(!changed.contains(keys::ADMIN));
}

#[test]
fn test_preview_matches_payload() {
    let edited = loaded()
        .toggle_permission_effect(keys::ADMIN, "VIEW")
        .apply_column_permissions("APPROVE", &codes(&[keys::ROLES, keys::USERS]), PermissionEffect::Deny);

    let all = CatalogFixtures::codes();
    let preview = edited.change_preview(&all);
    let payload = edited.generate_diff_payload(&all);
    assert_eq!(preview.len(), payload.items.len());

    for change in &preview {
        let matching = payload
            .items
            .iter()
            .find(|i| i.resource_key == change.resource_key && i.permission_code == change.permission_code)
            .unwrap();
        assert_eq!(matching.effect, change.to.as_grant());
        assert_ne!(change.from, change.to);
    }

    let admin = preview.iter().find(|c| c.resource_key == keys::ADMIN).unwrap();
    assert_eq!(admin.from, PermissionEffect::Allow);
    assert_eq!(admin.to, PermissionEffect::Deny);
}

#[test]
fn test_apply_all_then_reset() {
    let keys_all: Vec<String> = CatalogFixtures::flat()
        .into_iter()
        .map(|n| n.resource_key)
        .collect();
    let state = loaded();
    let edited = state.apply_all_permissions(&keys_all, &codes(&["VIEW"]), PermissionEffect::Deny);

    assert_eq!(edited.current().len(), keys_all.len());
    assert!(edited
        .current()
        .values()
        .all(|grants| grants.len() == 1 && grants["VIEW"] == PermissionEffect::Deny));

    let reset = edited.reset();
    assert!(!reset.is_dirty());
    assert_eq!(**reset.current(), **state.current());
}

#[test]
fn test_subtree_on_deep_chain() {
    let factory = ResourceFactory::new();
    let chain = factory.chain(64);
    let tree = build_resource_tree(&chain).unwrap();

    let state = PermissionMatrixState::create(&[]);
    let edited = state.apply_to_resource_and_children(
        &chain[0].resource_key,
        &codes(&["EXECUTE"]),
        PermissionEffect::Allow,
        &tree,
    );
    assert_eq!(edited.current().len(), 64);
    assert_eq!(
        edited.generate_diff_payload(&codes(&["EXECUTE"])).items.len(),
        64
    );
}

#[test]
fn test_recorded_edits_replay() {
    let tree = build_resource_tree(&CatalogFixtures::flat()).unwrap();
    let yaml = r#"
- op: subtree
  resource_key: menu.admin
  codes: [VIEW]
  effect: ALLOW
- op: clear_row
  resource_key: button.admin.users.delete
- op: column
  code: DELETE
  resource_keys: [menu.admin.users, menu.admin.roles]
  effect: DENY
"#;
    let edits: Vec<MatrixEdit> = serde_norway::from_str(yaml).unwrap();
    assert!(validate_edits(&edits, &tree).is_ok());

    let edited = apply_edits(&loaded(), &edits, &tree);
    assert_eq!(edited.effect(keys::USERS_API, "VIEW"), PermissionEffect::Allow);
    assert!(edited.grants(keys::USER_DELETE).is_none());
    assert_eq!(edited.effect(keys::USER_CREATE, "VIEW"), PermissionEffect::Allow);
    assert_eq!(edited.effect(keys::ROLES, "DELETE"), PermissionEffect::Deny);
    assert_eq!(edited.effect(keys::USERS, "EDIT"), PermissionEffect::Allow);
}
