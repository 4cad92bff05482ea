//! Top-level orchestration: turn a list of delivery requirements into a
//! validated factory graph.

use crate::byproduct::reconcile_byproducts;
use crate::error::PlanError;
use crate::graph::{FabOutput, FactoryGraph};
use crate::id::ItemId;
use crate::link_limit::resolve_link_limits;
use crate::rate::Rate;
use crate::registry::Registry;
use crate::synthesis::{attach_inputs, produce};
use crate::validate::validate;

/// One delivery requirement: `count` fabrication units of `item` feeding a
/// sink that keeps `maintain` units buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub item: ItemId,
    pub count: u32,
    pub maintain: u32,
}

/// Plan a factory meeting `requirements`, in order.
///
/// Requirements are processed strictly in slice order and all scans inside
/// are first-fit over creation order, so equal inputs always produce the
/// same graph. The passes run in a fixed sequence: synthesis, byproduct
/// reconciliation, link-limit resolution, validation.
pub fn build_factory(
    registry: &Registry,
    requirements: &[Requirement],
) -> Result<FactoryGraph, PlanError> {
    let mut graph = FactoryGraph::new();

    for req in requirements {
        let recipe = registry
            .recipe(req.item)
            .ok_or(PlanError::MissingRecipe(req.item))?;
        let per_fab = recipe.product_rate();
        let target = per_fab * Rate::from_num(req.count);
        let sink = graph.add_output(req.item, target, req.maintain);

        // Top-level fabrication units deliver straight into the sink; only
        // their ingredients go through storage.
        for _ in 0..req.count {
            let fab = graph.add_fabrication(req.item);
            graph.output_to(fab, FabOutput::Sink(sink), per_fab)?;
            for entry in &recipe.ingredients {
                let ingredient_rate = recipe.entry_rate(entry);
                let sources = produce(&mut graph, registry, entry.item, ingredient_rate)?;
                attach_inputs(&mut graph, fab, entry.item, ingredient_rate, &sources)?;
            }
        }
    }

    reconcile_byproducts(&mut graph, registry)?;
    resolve_link_limits(&mut graph, registry)?;
    validate(&graph)?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::rate;
    use crate::test_utils::*;

    // -----------------------------------------------------------------------
    // Test 1: A single-ingredient requirement yields the minimal graph
    // -----------------------------------------------------------------------
    #[test]
    fn minimal_requirement_builds_minimal_graph() {
        let (registry, items) = standard_registry();
        let reqs = [Requirement {
            item: items.pure_iron,
            count: 1,
            maintain: 100,
        }];
        let graph = build_factory(&registry, &reqs).unwrap();

        assert_eq!(graph.output_count(), 1);
        assert_eq!(graph.fabrication_count(), 1);
        assert_eq!(graph.storage_count(), 1);
        assert_eq!(graph.relay_count(), 0);
        assert_eq!(graph.relay_storage_count(), 0);

        let sink = graph.output(graph.output_ids()[0]);
        assert_eq!(sink.item, items.pure_iron);
        assert_eq!(sink.rate, rate(2.0));
        assert_eq!(sink.maintain, 100);
        assert_eq!(sink.producers.len(), 1);

        // One ore buffer with a single outgoing link to the unit.
        let ore = graph.storage(graph.storages_for_item(items.hematite)[0]);
        assert!(ore.externally_fed);
        assert_eq!(ore.outgoing_links(), 1);
        assert_eq!(ore.egress, rate(3.0));
    }

    // -----------------------------------------------------------------------
    // Test 2: count > 1 spawns one top-level unit per count
    // -----------------------------------------------------------------------
    #[test]
    fn count_spawns_one_unit_each() {
        let (registry, items) = standard_registry();
        let reqs = [Requirement {
            item: items.gear,
            count: 3,
            maintain: 50,
        }];
        let graph = build_factory(&registry, &reqs).unwrap();

        let sink = graph.output(graph.output_ids()[0]);
        assert_eq!(sink.producers.len(), 3);
        assert_eq!(sink.rate, rate(3.0));

        // gear consumes 1 pure_iron/min each: 3/min total, 2 iron units.
        let iron_fabs = graph
            .fabrication_ids()
            .into_iter()
            .filter(|&f| graph.fabrication(f).item == items.pure_iron)
            .count();
        assert_eq!(iron_fabs, 2);
    }

    // -----------------------------------------------------------------------
    // Test 3: A requirement for an item with no recipe is fatal
    // -----------------------------------------------------------------------
    #[test]
    fn requirement_without_recipe_is_fatal() {
        let (registry, items) = standard_registry();
        let reqs = [Requirement {
            item: items.hematite,
            count: 1,
            maintain: 0,
        }];
        let result = build_factory(&registry, &reqs);
        assert!(matches!(
            result,
            Err(PlanError::MissingRecipe(id)) if id == items.hematite
        ));
    }

    // -----------------------------------------------------------------------
    // Test 4: Byproducts and link limits are repaired before return
    // -----------------------------------------------------------------------
    #[test]
    fn repair_passes_run_before_return() {
        let (registry, items) = standard_registry();
        let reqs = [
            Requirement {
                item: items.circuit,
                count: 2,
                maintain: 10,
            },
            Requirement {
                item: items.assembly_unit,
                count: 1,
                maintain: 10,
            },
        ];
        let graph = build_factory(&registry, &reqs).unwrap();

        // Slag routed away.
        assert_eq!(graph.storages_for_item(items.slag).len(), 1);
        // Nine-ingredient unit consolidated to the cap.
        assert_eq!(graph.relay_storage_count(), 1);
        for fid in graph.fabrication_ids() {
            assert!(
                graph.fabrication(fid).incoming_links()
                    <= crate::graph::MAX_INDUSTRY_LINKS
            );
        }
    }

    // -----------------------------------------------------------------------
    // Test 5: Two identical runs produce identical graphs
    // -----------------------------------------------------------------------
    #[test]
    fn identical_runs_are_deterministic() {
        let (registry, items) = standard_registry();
        let reqs = [
            Requirement {
                item: items.gear,
                count: 4,
                maintain: 20,
            },
            Requirement {
                item: items.refined_copper,
                count: 1,
                maintain: 5,
            },
        ];
        let a = build_factory(&registry, &reqs).unwrap();
        let b = build_factory(&registry, &reqs).unwrap();
        assert_eq!(a.summary(), b.summary());
    }
}
