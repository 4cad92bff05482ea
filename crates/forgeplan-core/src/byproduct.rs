//! Byproduct reconciliation: a single pass that routes every unconsumed
//! recipe byproduct out of the buffer it lands in, through a relay, into a
//! dedicated storage buffer.

use crate::error::PlanError;
use crate::graph::{FabInput, FactoryGraph, RelayTarget, StorageConsumer};
use crate::rate::Rate;
use crate::registry::Registry;

/// Route unconsumed byproducts for every storage node in creation order.
///
/// Idempotent: a byproduct already drawn by a relay on the node is left
/// alone. Buffers with no fabrication producers emit no byproducts and are
/// skipped; buffers with no outgoing-link headroom are skipped as well --
/// the link cap outranks byproduct routing and the byproduct stays buffered.
pub fn reconcile_byproducts(
    graph: &mut FactoryGraph,
    registry: &Registry,
) -> Result<(), PlanError> {
    for sid in graph.storage_ids() {
        let item = graph.storage(sid).item;
        let Some(recipe) = registry.recipe(item) else {
            continue;
        };
        let fab_count = graph.storage(sid).fabrication_producers();
        if fab_count == 0 {
            continue;
        }

        for byproduct in &recipe.byproducts {
            // Any consumer already drawing the byproduct item counts, relay
            // or fabrication alike.
            let handled = graph.storage(sid).consumers.iter().any(|c| match c {
                StorageConsumer::Relay(r) => graph.relay(*r).item == byproduct.item,
                StorageConsumer::Fabrication(f) => {
                    graph.fabrication(*f).inputs.iter().any(|input| {
                        matches!(input, FabInput::Storage { storage, item, .. }
                            if *storage == sid && *item == byproduct.item)
                    })
                }
            });
            if handled {
                continue;
            }
            if !graph.storage(sid).can_add_outgoing(1) {
                continue;
            }

            let byproduct_rate = recipe.entry_rate(byproduct) * Rate::from_num(fab_count as u32);

            // Reuse a relay already routing this byproduct into storage.
            let existing_relay = graph.relays_for_item(byproduct.item).iter().copied().find(|&r| {
                graph.relay(r).can_add_input(1)
                    && matches!(graph.relay(r).output, Some(RelayTarget::Storage(_)))
            });
            let relay = match existing_relay {
                Some(r) => r,
                None => {
                    let relay = graph.add_relay(byproduct.item);
                    let existing_buffer = graph
                        .storages_for_item(byproduct.item)
                        .iter()
                        .copied()
                        .find(|&s| graph.storage(s).can_add_incoming(1));
                    let buffer = match existing_buffer {
                        Some(s) => s,
                        None => graph.add_storage(byproduct.item, false),
                    };
                    graph.relay_to_storage(relay, buffer)?;
                    relay
                }
            };

            graph.take_from(sid, StorageConsumer::Relay(relay), byproduct.item, byproduct_rate)?;
        }
    }
    Ok(())
}
