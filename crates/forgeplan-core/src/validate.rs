//! Structural validation of a finished factory graph. The synthesis and
//! repair passes are supposed to maintain these invariants by construction;
//! validation is the backstop that refuses to hand out a broken plan.

use crate::error::PlanError;
use crate::graph::{FactoryGraph, MAX_CONTAINER_LINKS, MAX_INDUSTRY_LINKS};

/// Check every node against the link caps and flow conservation.
///
/// Checks run in creation order and the first violation is returned, so a
/// given broken graph always reports the same error.
pub fn validate(graph: &FactoryGraph) -> Result<(), PlanError> {
    for sid in graph.storage_ids() {
        let storage = graph.storage(sid);
        if storage.incoming_links() > MAX_CONTAINER_LINKS
            || storage.outgoing_links() > MAX_CONTAINER_LINKS
        {
            return Err(PlanError::ContainerLinksOverflow(sid));
        }
        if storage.egress > storage.ingress {
            return Err(PlanError::FlowImbalance(sid));
        }
        if storage.split.is_some() && storage.outgoing_links() > 1 {
            return Err(PlanError::SplitFanout(sid));
        }
    }
    for fid in graph.fabrication_ids() {
        if graph.fabrication(fid).incoming_links() > MAX_INDUSTRY_LINKS {
            return Err(PlanError::IndustryLinksOverflow(fid));
        }
    }
    Ok(())
}
