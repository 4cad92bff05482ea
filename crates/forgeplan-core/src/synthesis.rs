//! Recursive production synthesis: resolve an (item, rate) demand into
//! storage nodes able to supply it, creating fabrication, storage, and
//! upstream capacity as needed.

use crate::error::PlanError;
use crate::graph::{FabOutput, FactoryGraph, StorageConsumer, MAX_CONTAINER_LINKS};
use crate::id::{FabricationId, ItemId, StorageId};
use crate::rate::{units_for, Rate};
use crate::registry::{Recipe, Registry};

/// Resolve a demand for `rate` additional units/minute of `item`.
///
/// Returns the storage nodes now collectively able to source the demand, in
/// the order the caller should attach them. The scans are first-fit over
/// creation order, which makes the whole synthesis deterministic for a fixed
/// requirement ordering.
pub fn produce(
    graph: &mut FactoryGraph,
    registry: &Registry,
    item: ItemId,
    rate: Rate,
) -> Result<Vec<StorageId>, PlanError> {
    // Ores have no producers; they are externally supplied. Reuse the first
    // buffer with a free outgoing link, otherwise open a new one.
    if registry.is_ore(item) {
        for &sid in graph.storages_for_item(item) {
            if graph.storage(sid).can_add_outgoing(1) {
                return Ok(vec![sid]);
            }
        }
        return Ok(vec![graph.add_storage(item, true)]);
    }

    let recipe = registry.recipe(item).ok_or(PlanError::MissingRecipe(item))?;
    let per_fab = recipe.product_rate();

    // Existing headroom covers the demand outright: reuse, no new
    // fabrication. Equality counts — ceil provisioning over-supplies, so a
    // node whose leftover exactly equals the demand genuinely covers it.
    for &sid in graph.storages_for_item(item) {
        let storage = graph.storage(sid);
        if storage.headroom() >= rate && storage.can_add_outgoing(1) {
            return Ok(vec![sid]);
        }
    }

    // Scale an existing buffer in place: the extra fabrication nodes for
    // the shortfall must fit its incoming links, and it needs a free
    // outgoing link for the new consumer.
    let mut scaled: Option<(StorageId, u32)> = None;
    for &sid in graph.storages_for_item(item) {
        let storage = graph.storage(sid);
        if !storage.can_add_outgoing(1) || storage.headroom() >= rate {
            continue;
        }
        let shortfall = rate - storage.headroom();
        let extra = units_for(shortfall, per_fab);
        if storage.can_add_incoming(extra as usize) {
            scaled = Some((sid, extra));
            break;
        }
    }
    if let Some((sid, extra)) = scaled {
        spawn_fabrications(graph, registry, recipe, extra, &[sid])?;
        return Ok(vec![sid]);
    }

    // Fresh capacity. When the fabrication count overflows one container's
    // incoming links, partition it across split buffers, links spread as
    // evenly as the round-robin below allows.
    let count = units_for(rate, per_fab);
    let targets = if count as usize > MAX_CONTAINER_LINKS {
        let nodes = count.div_ceil(MAX_CONTAINER_LINKS as u32);
        let base = count / nodes;
        let extra = count % nodes;
        let mut targets = Vec::with_capacity(nodes as usize);
        for i in 0..nodes {
            let share = base + u32::from(i < extra);
            let fraction = Rate::from_num(share) / Rate::from_num(count);
            targets.push(graph.add_split_storage(item, fraction));
        }
        targets
    } else {
        vec![graph.add_storage(item, false)]
    };
    spawn_fabrications(graph, registry, recipe, count, &targets)?;
    Ok(targets)
}

/// Create `count` fabrication nodes for `recipe`, round-robin their outputs
/// across `targets`, and recurse into every ingredient of each.
fn spawn_fabrications(
    graph: &mut FactoryGraph,
    registry: &Registry,
    recipe: &Recipe,
    count: u32,
    targets: &[StorageId],
) -> Result<(), PlanError> {
    let per_fab = recipe.product_rate();
    for i in 0..count as usize {
        let fab = graph.add_fabrication(recipe.product.item);
        let target = targets[i % targets.len()];
        graph.output_to(fab, FabOutput::Storage(target), per_fab)?;

        for entry in &recipe.ingredients {
            let ingredient_rate = recipe.entry_rate(entry);
            let sources = produce(graph, registry, entry.item, ingredient_rate)?;
            attach_inputs(graph, fab, entry.item, ingredient_rate, &sources)?;
        }
    }
    Ok(())
}

/// Attach resolved source storages as inputs of a fabrication node,
/// apportioning the rate by split fraction where a source is split.
pub(crate) fn attach_inputs(
    graph: &mut FactoryGraph,
    fab: FabricationId,
    item: ItemId,
    rate: Rate,
    sources: &[StorageId],
) -> Result<(), PlanError> {
    for &sid in sources {
        let share = match graph.storage(sid).split {
            Some(fraction) => rate * fraction,
            None => rate,
        };
        graph.take_from(sid, StorageConsumer::Fabrication(fab), item, share)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::rate;
    use crate::test_utils::*;

    // -----------------------------------------------------------------------
    // Test 1: Ore demand opens one buffer and reuses it afterwards
    // -----------------------------------------------------------------------
    #[test]
    fn ore_buffer_created_then_reused() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        let first = produce(&mut graph, &registry, items.hematite, rate(10.0)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(graph.storage_count(), 1);

        let second = produce(&mut graph, &registry, items.hematite, rate(5.0)).unwrap();
        assert_eq!(second, first);
        assert_eq!(graph.storage_count(), 1);
    }

    // -----------------------------------------------------------------------
    // Test 2: Ore buffer with no free outgoing link is replaced
    // -----------------------------------------------------------------------
    #[test]
    fn exhausted_ore_buffer_spawns_a_new_one() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        let first = produce(&mut graph, &registry, items.hematite, rate(1.0)).unwrap()[0];
        for _ in 0..MAX_CONTAINER_LINKS {
            let fab = graph.add_fabrication(items.pure_iron);
            graph
                .take_from(first, StorageConsumer::Fabrication(fab), items.hematite, rate(1.0))
                .unwrap();
        }

        let next = produce(&mut graph, &registry, items.hematite, rate(1.0)).unwrap()[0];
        assert_ne!(next, first);
        assert_eq!(graph.storages_for_item(items.hematite).len(), 2);
    }

    // -----------------------------------------------------------------------
    // Test 3: Craftable demand creates fabrication plus upstream ore buffer
    // -----------------------------------------------------------------------
    #[test]
    fn craftable_demand_builds_chain() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        // pure_iron: 2/min per unit. Demand 3/min -> 2 units.
        let out = produce(&mut graph, &registry, items.pure_iron, rate(3.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(graph.fabrication_count(), 2);

        let storage = graph.storage(out[0]);
        assert_eq!(storage.ingress, rate(4.0));
        assert_eq!(storage.fabrication_producers(), 2);
        // Both units draw hematite from one shared ore buffer.
        assert_eq!(graph.storages_for_item(items.hematite).len(), 1);
    }

    // -----------------------------------------------------------------------
    // Test 4: Headroom reuse adds no fabrication
    // -----------------------------------------------------------------------
    #[test]
    fn headroom_reuse_adds_nothing() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        let first = produce(&mut graph, &registry, items.pure_iron, rate(3.0)).unwrap()[0];
        let fabs_before = graph.fabrication_count();
        // 4/min ingress, nothing consumed yet: 1/min demand fits the headroom.
        let second = produce(&mut graph, &registry, items.pure_iron, rate(1.0)).unwrap()[0];
        assert_eq!(second, first);
        assert_eq!(graph.fabrication_count(), fabs_before);
    }

    // -----------------------------------------------------------------------
    // Test 5: Exact headroom equality is reused
    // -----------------------------------------------------------------------
    #[test]
    fn exact_headroom_counts_as_coverage() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        let first = produce(&mut graph, &registry, items.pure_iron, rate(4.0)).unwrap()[0];
        let fabs_before = graph.fabrication_count();
        let second = produce(&mut graph, &registry, items.pure_iron, rate(4.0)).unwrap()[0];
        assert_eq!(second, first);
        assert_eq!(graph.fabrication_count(), fabs_before);
    }

    // -----------------------------------------------------------------------
    // Test 6: Shortfall scales an existing buffer in place
    // -----------------------------------------------------------------------
    #[test]
    fn shortfall_scales_existing_buffer() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        let first = produce(&mut graph, &registry, items.pure_iron, rate(3.0)).unwrap()[0];
        // Claim the existing headroom so the next demand has a shortfall.
        let sink = graph.add_fabrication(items.gear);
        graph
            .take_from(first, StorageConsumer::Fabrication(sink), items.pure_iron, rate(4.0))
            .unwrap();

        let second = produce(&mut graph, &registry, items.pure_iron, rate(3.0)).unwrap()[0];
        assert_eq!(second, first);
        // 2 original units plus 2 more for the 3/min shortfall.
        assert_eq!(graph.storage(first).fabrication_producers(), 4);
        assert_eq!(graph.storage(first).ingress, rate(8.0));
    }

    // -----------------------------------------------------------------------
    // Test 7: Oversized demand partitions into split buffers
    // -----------------------------------------------------------------------
    #[test]
    fn oversized_demand_creates_split_buffers() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        // pure_iron at 2/min per unit: 24/min -> 12 units > 10 links.
        let out = produce(&mut graph, &registry, items.pure_iron, rate(24.0)).unwrap();
        assert_eq!(out.len(), 2);

        for &sid in &out {
            let storage = graph.storage(sid);
            assert_eq!(storage.fabrication_producers(), 6);
            assert_eq!(storage.split, Some(rate(0.5)));
        }
        // 12 units in total; hematite is an ore, so no upstream fabrication.
        assert_eq!(graph.fabrication_count(), 12);
    }

    // -----------------------------------------------------------------------
    // Test 8: Split sources apportion the attached rate by fraction
    // -----------------------------------------------------------------------
    #[test]
    fn attach_inputs_apportions_split_fraction() {
        let (registry, items) = standard_registry();
        let mut graph = FactoryGraph::new();

        let sources = produce(&mut graph, &registry, items.pure_iron, rate(24.0)).unwrap();
        let fab = graph.add_fabrication(items.gear);
        attach_inputs(&mut graph, fab, items.pure_iron, rate(24.0), &sources).unwrap();

        for &sid in &sources {
            let storage = graph.storage(sid);
            assert_eq!(storage.egress, rate(12.0));
            assert_eq!(storage.outgoing_links(), 1);
        }
        assert_eq!(graph.fabrication(fab).incoming_links(), 2);
    }

    // -----------------------------------------------------------------------
    // Test 9: An item with no recipe is treated as externally supplied
    // -----------------------------------------------------------------------
    #[test]
    fn recipe_less_item_resolves_as_ore() {
        let (registry, _items) = standard_registry();
        let mut graph = FactoryGraph::new();
        let unregistered = crate::id::ItemId(9999);
        let out = produce(&mut graph, &registry, unregistered, rate(1.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert!(graph.storage(out[0]).externally_fed);
        assert_eq!(graph.fabrication_count(), 0);
    }
}
