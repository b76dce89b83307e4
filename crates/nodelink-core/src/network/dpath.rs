use crate::types::{DPath, DPathFormat, NetworkDescriptor};

/// The derivation path `network` registers for `format`, if any.
#[must_use]
pub fn get_dpath(network: Option<&NetworkDescriptor>, format: DPathFormat) -> Option<&DPath> {
    network.and_then(|n| n.dpaths.get(&format))
}

/// Distinct derivation paths for `format` across `networks`, in first-seen order.
#[must_use]
pub fn get_dpaths(networks: &[NetworkDescriptor], format: DPathFormat) -> Vec<DPath> {
    let mut paths: Vec<DPath> = Vec::new();
    for dpath in networks.iter().filter_map(|n| get_dpath(Some(n), format)) {
        if !paths.contains(dpath) {
            paths.push(dpath.clone());
        }
    }
    paths
}
