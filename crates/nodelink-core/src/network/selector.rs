use crate::types::{NetworkDescriptor, NodeDescriptor, NodeType};

/// Filters and orders the nodes of `network` into the fallback chain.
///
/// 1. `WEB3_INJECTED` nodes are dropped unless an injected wallet is available.
/// 2. `disable_by_default` nodes are dropped unless they are the selected node.
/// 3. If the selected node survived, it is returned alone.
/// 4. Otherwise the survivors keep their configured order.
///
/// An empty result means nothing can serve the network.
#[must_use]
pub fn select_endpoints(
    network: &NetworkDescriptor,
    injected_available: bool,
) -> Vec<NodeDescriptor> {
    let selected = network.selected_node();

    let eligible: Vec<&NodeDescriptor> = network
        .nodes
        .iter()
        .filter(|node| injected_available || node.node_type != NodeType::Web3Injected)
        .filter(|node| !node.is_disabled_by_default() || Some(node.name.as_str()) == selected)
        .collect();

    if let Some(name) = selected {
        if let Some(node) = eligible.iter().find(|node| node.name == name) {
            tracing::debug!(network = %network.id, node = %name, "using selected node only");
            return vec![(*node).clone()];
        }
    }

    tracing::debug!(
        network = %network.id,
        configured = network.nodes.len(),
        eligible = eligible.len(),
        "selected fallback endpoints"
    );

    eligible.into_iter().cloned().collect()
}
