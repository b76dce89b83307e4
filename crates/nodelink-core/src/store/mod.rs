//! Overlaying user configuration onto defaults and gating persisted-state imports.
//!
//! Merges keep the original order and append anything new: a user override never
//! reorders the defaults it applies to.

use serde_json::Value;
use thiserror::Error;

use crate::types::{Asset, NetworkDescriptor, NodeDescriptor};

/// Why an exported document cannot be imported into the current store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportMismatch {
    /// `version` differs (either side may lack it).
    #[error("version mismatch: expected {}, found {}", show_version(.expected), show_version(.found))]
    VersionMismatch { expected: Option<Value>, found: Option<Value> },

    /// Top-level keys of the current store absent from the import.
    #[error("missing keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// One of the documents is not a JSON object.
    #[error("document is not a JSON object")]
    NotAnObject,
}

fn show_version(version: &Option<Value>) -> String {
    version.as_ref().map_or_else(|| "none".to_string(), Value::to_string)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store cannot be imported: {0}")]
    ImportIncompatible(ImportMismatch),

    #[error("failed to parse store document: {0}")]
    Parse(String),
}

/// Overlays inbound networks onto the original list.
///
/// For each original network with a same-id inbound network, same-named nodes are
/// overlaid, new inbound nodes append, and `selected_node` comes from the inbound network.
/// Original networks without a match are kept as they are. Inbound networks with no
/// original counterpart append. Fields other than nodes and `selected_node` always come
/// from the original.
#[must_use]
pub fn merge_network_config(
    inbound: &[NetworkDescriptor],
    original: &[NetworkDescriptor],
) -> Vec<NetworkDescriptor> {
    original
        .iter()
        .map(|o| match inbound.iter().find(|i| i.id == o.id) {
            Some(i) => NetworkDescriptor {
                nodes: merge_nodes(&i.nodes, &o.nodes),
                selected_node: i.selected_node.clone(),
                ..o.clone()
            },
            None => o.clone(),
        })
        .chain(inbound.iter().filter(|i| !original.iter().any(|o| o.id == i.id)).cloned())
        .collect()
}

/// Overlays inbound nodes onto the original list by name.
#[must_use]
pub fn merge_nodes(inbound: &[NodeDescriptor], original: &[NodeDescriptor]) -> Vec<NodeDescriptor> {
    original
        .iter()
        .map(|o| match inbound.iter().find(|i| i.name == o.name) {
            Some(i) => overlay_node(o, i),
            None => o.clone(),
        })
        .chain(inbound.iter().filter(|i| !original.iter().any(|o| o.name == i.name)).cloned())
        .collect()
}

fn overlay_node(original: &NodeDescriptor, inbound: &NodeDescriptor) -> NodeDescriptor {
    NodeDescriptor {
        name: original.name.clone(),
        node_type: inbound.node_type,
        url: inbound.url.clone().or_else(|| original.url.clone()),
        auth: inbound.auth.clone().or_else(|| original.auth.clone()),
        disable_by_default: inbound.disable_by_default.or(original.disable_by_default),
    }
}

/// Overlays inbound assets onto the original list by uuid.
#[must_use]
pub fn merge_assets(inbound: &[Asset], original: &[Asset]) -> Vec<Asset> {
    original
        .iter()
        .map(|o| inbound.iter().find(|i| i.uuid == o.uuid).unwrap_or(o).clone())
        .chain(inbound.iter().filter(|i| !original.iter().any(|o| o.uuid == i.uuid)).cloned())
        .collect()
}

/// Checks that `to_import` is structurally compatible with `current`.
///
/// # Errors
///
/// [`StoreError::ImportIncompatible`] describing the first reason found: a version
/// mismatch takes precedence over missing keys.
pub fn check_import(to_import: &Value, current: &Value) -> Result<(), StoreError> {
    let (Some(import_map), Some(current_map)) = (to_import.as_object(), current.as_object())
    else {
        return Err(StoreError::ImportIncompatible(ImportMismatch::NotAnObject));
    };

    let expected = current_map.get("version");
    let found = import_map.get("version");
    if expected != found {
        return Err(StoreError::ImportIncompatible(ImportMismatch::VersionMismatch {
            expected: expected.cloned(),
            found: found.cloned(),
        }));
    }

    let missing: Vec<String> =
        current_map.keys().filter(|key| !import_map.contains_key(*key)).cloned().collect();
    if !missing.is_empty() {
        return Err(StoreError::ImportIncompatible(ImportMismatch::MissingKeys(missing)));
    }

    Ok(())
}

/// `true` iff the versions match and every top-level key of `current` is in `to_import`.
#[must_use]
pub fn can_import_store(to_import: &Value, current: &Value) -> bool {
    check_import(to_import, current).is_ok()
}

/// Parses an exported store document and checks it against `current`.
///
/// # Errors
///
/// [`StoreError::Parse`] for invalid JSON, [`StoreError::ImportIncompatible`] when the
/// document does not fit the current store.
pub fn import_store(json: &str, current: &Value) -> Result<Value, StoreError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    check_import(&document, current)?;
    tracing::info!(keys = document.as_object().map_or(0, |m| m.len()), "store document accepted");
    Ok(document)
}

/// Reads the `networks` list of a store document.
///
/// # Errors
///
/// [`StoreError::Parse`] if the key is missing or does not hold network descriptors.
pub fn networks_from_store(document: &Value) -> Result<Vec<NetworkDescriptor>, StoreError> {
    let networks = document
        .get("networks")
        .ok_or_else(|| StoreError::Parse("document has no networks".to_string()))?;
    serde_json::from_value(networks.clone()).map_err(|e| StoreError::Parse(e.to_string()))
}
