//! Link-limit resolution: fabrication nodes whose direct inputs exceed the
//! industry link cap get a subset of those inputs consolidated behind a
//! relay-storage node, which occupies a single input link.

use crate::error::PlanError;
use crate::graph::{FactoryGraph, StorageConsumer, MAX_INDUSTRY_LINKS};
use crate::id::ItemId;
use crate::registry::Registry;

/// Bring every fabrication node's incoming links within the industry cap.
///
/// For a node exceeding the cap by `e` links, consolidating `e + 1` direct
/// inputs behind one relay-storage link nets `e` links of relief, landing
/// the node exactly at the cap. The lowest-quantity ingredients are chosen
/// so the bulk flows stay on direct links.
pub fn resolve_link_limits(
    graph: &mut FactoryGraph,
    registry: &Registry,
) -> Result<(), PlanError> {
    for fid in graph.fabrication_ids() {
        let incoming = graph.fabrication(fid).incoming_links();
        if incoming <= MAX_INDUSTRY_LINKS {
            continue;
        }
        let exceeding = incoming - MAX_INDUSTRY_LINKS;
        let need = exceeding + 1;

        let item = graph.fabrication(fid).item;
        let recipe = registry.recipe(item).ok_or(PlanError::MissingRecipe(item))?;

        // Stable sort: equal quantities keep recipe order, which keeps the
        // chosen cover deterministic.
        let mut ingredients = recipe.ingredients.clone();
        ingredients.sort_by_key(|e| e.quantity);
        let ingredient_items: Vec<ItemId> = ingredients.iter().map(|e| e.item).collect();

        // Reuse an existing relay-storage node whose item set is drawn from
        // this recipe and large enough, provided it can take another
        // consumer and every one of its relays has input headroom.
        let found = graph.relay_storage_ids().iter().copied().find(|&rsid| {
            let rs = graph.relay_storage(rsid);
            rs.items.len() >= need
                && rs.items.iter().all(|i| ingredient_items.contains(i))
                && rs.can_add_consumer(1)
                && rs.relays.iter().all(|&r| graph.relay(r).can_add_input(1))
        });
        let rsid = match found {
            Some(rsid) => rsid,
            None => {
                let cover: Vec<ItemId> = ingredients.iter().take(need).map(|e| e.item).collect();
                let rsid = graph.add_relay_storage(cover.clone());
                for cover_item in cover {
                    let relay = graph.add_relay(cover_item);
                    graph.relay_to_relay_storage(relay, rsid)?;
                }
                rsid
            }
        };

        // Rewire each covered item: drop the direct link, draw the same rate
        // through the relay instead. A covered item with no direct input
        // left to move is fatal.
        for relay in graph.relay_storage(rsid).relays.clone() {
            let relay_item = graph.relay(relay).item;
            let (sid, moved) = graph.detach_storage_input(fid, relay_item)?;
            graph.take_from(sid, StorageConsumer::Relay(relay), relay_item, moved)?;
        }
        graph.relay_storage_to_fabrication(rsid, fid)?;
    }
    Ok(())
}
