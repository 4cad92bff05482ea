//! The factory graph: node arenas, per-item indexes, and every link-attach
//! operation. All flow and link-count bookkeeping lives here; the synthesis
//! and repair passes never touch ledgers directly.
//!
//! Nodes are added and never removed, so `SlotMap` iteration order is
//! creation order. The first-fit scans in the planner rely on that.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

use crate::error::PlanError;
use crate::id::{FabricationId, ItemId, OutputId, RelayId, RelayStorageId, StorageId};
use crate::rate::Rate;

/// Hard cap on a storage node's incoming links, and on its outgoing links.
/// A fixed parameter of the simulated container hardware.
pub const MAX_CONTAINER_LINKS: usize = 10;

/// Hard cap on a fabrication node's incoming links.
pub const MAX_INDUSTRY_LINKS: usize = 7;

// ---------------------------------------------------------------------------
// Link endpoints
// ---------------------------------------------------------------------------

/// A node feeding a storage node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageProducer {
    Fabrication(FabricationId),
    Relay(RelayId),
}

/// A node drawing from a storage node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageConsumer {
    Fabrication(FabricationId),
    Relay(RelayId),
}

/// One input link on a fabrication node. Records the item and rate so the
/// link-limit resolver can reverse it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FabInput {
    Storage {
        storage: StorageId,
        item: ItemId,
        rate: Rate,
    },
    RelayStorage {
        relay_storage: RelayStorageId,
    },
}

/// Where a fabrication node delivers its product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FabOutput {
    Storage(StorageId),
    Sink(OutputId),
}

/// Where a relay delivers its item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayTarget {
    Storage(StorageId),
    RelayStorage(RelayStorageId),
}

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// A buffer of one item. `ingress`/`egress` track the node's own item;
/// byproduct flow drawn through the node affects link counts only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageNode {
    pub item: ItemId,
    pub ingress: Rate,
    pub egress: Rate,
    /// Share of total fabrication demand this node carries, when the demand
    /// was partitioned across several storage nodes. A split node has
    /// outgoing capacity 1.
    pub split: Option<Rate>,
    /// Ore buffers: external supply keeps pace with whatever is drawn, so
    /// consumer attachment mirrors the rate into `ingress`.
    pub externally_fed: bool,
    pub producers: Vec<StorageProducer>,
    pub consumers: Vec<StorageConsumer>,
}

impl StorageNode {
    pub fn incoming_links(&self) -> usize {
        self.producers.len()
    }

    pub fn outgoing_links(&self) -> usize {
        self.consumers.len()
    }

    fn outgoing_cap(&self) -> usize {
        if self.split.is_some() {
            1
        } else {
            MAX_CONTAINER_LINKS
        }
    }

    pub fn can_add_incoming(&self, n: usize) -> bool {
        self.incoming_links() + n <= MAX_CONTAINER_LINKS
    }

    pub fn can_add_outgoing(&self, n: usize) -> bool {
        self.outgoing_links() + n <= self.outgoing_cap()
    }

    /// Supply not yet claimed by a consumer.
    pub fn headroom(&self) -> Rate {
        self.ingress - self.egress
    }

    /// How many fabrication nodes deliver into this buffer.
    pub fn fabrication_producers(&self) -> usize {
        self.producers
            .iter()
            .filter(|p| matches!(p, StorageProducer::Fabrication(_)))
            .count()
    }
}

/// One running instance of a recipe for one item.
///
/// The input cap is enforced post-hoc by the link-limit resolver, not at
/// attach time: synthesis may temporarily exceed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricationNode {
    pub item: ItemId,
    pub inputs: Vec<FabInput>,
    pub output: Option<FabOutput>,
}

impl FabricationNode {
    pub fn incoming_links(&self) -> usize {
        self.inputs.len()
    }
}

/// Terminal delivery sink for a top-level requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputNode {
    pub item: ItemId,
    /// Target delivery rate, items per minute.
    pub rate: Rate,
    /// Buffer quantity the sink maintains.
    pub maintain: u32,
    pub producers: Vec<FabricationId>,
}

/// Single-item pass-through: drains one item from producer storages into
/// exactly one consumer (a storage buffer or a relay-storage node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayNode {
    pub item: ItemId,
    pub inputs: Vec<StorageId>,
    pub output: Option<RelayTarget>,
    /// Sum of the rates drawn through this relay. Propagated into the
    /// output storage's ingress.
    pub throughput: Rate,
}

impl RelayNode {
    pub fn can_add_input(&self, n: usize) -> bool {
        self.inputs.len() + n <= MAX_CONTAINER_LINKS
    }
}

/// Consolidation point: a fixed set of distinct items, each supplied by one
/// dedicated relay, presented to fabrication nodes as a single input link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStorageNode {
    pub items: Vec<ItemId>,
    pub relays: Vec<RelayId>,
    pub consumers: Vec<FabricationId>,
}

impl RelayStorageNode {
    pub fn can_add_consumer(&self, n: usize) -> bool {
        self.consumers.len() + n <= MAX_CONTAINER_LINKS
    }
}

// ---------------------------------------------------------------------------
// Graph summary
// ---------------------------------------------------------------------------

/// Per-kind node counts and the total directed link count. Two identical
/// planning runs must produce equal summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub storages: usize,
    pub fabrications: usize,
    pub outputs: usize,
    pub relays: usize,
    pub relay_storages: usize,
    pub links: usize,
}

// ---------------------------------------------------------------------------
// FactoryGraph
// ---------------------------------------------------------------------------

/// Registry owning all nodes of a planning run. Created once per run,
/// populated monotonically, returned as the final artifact.
///
/// Accessors index directly: every id handed out by this graph stays valid
/// because nodes are never removed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FactoryGraph {
    storages: SlotMap<StorageId, StorageNode>,
    fabrications: SlotMap<FabricationId, FabricationNode>,
    outputs: SlotMap<OutputId, OutputNode>,
    relays: SlotMap<RelayId, RelayNode>,
    relay_storages: SlotMap<RelayStorageId, RelayStorageNode>,

    /// Creation-ordered per-item indexes. BTreeMap keeps serialization
    /// deterministic.
    storages_by_item: BTreeMap<ItemId, Vec<StorageId>>,
    relays_by_item: BTreeMap<ItemId, Vec<RelayId>>,
    relay_storage_order: Vec<RelayStorageId>,
}

impl FactoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Node constructors
    // -----------------------------------------------------------------------

    pub fn add_storage(&mut self, item: ItemId, externally_fed: bool) -> StorageId {
        let id = self.storages.insert(StorageNode {
            item,
            ingress: Rate::ZERO,
            egress: Rate::ZERO,
            split: None,
            externally_fed,
            producers: Vec::new(),
            consumers: Vec::new(),
        });
        self.storages_by_item.entry(item).or_default().push(id);
        id
    }

    pub fn add_split_storage(&mut self, item: ItemId, fraction: Rate) -> StorageId {
        let id = self.add_storage(item, false);
        self.storages[id].split = Some(fraction);
        id
    }

    pub fn add_fabrication(&mut self, item: ItemId) -> FabricationId {
        self.fabrications.insert(FabricationNode {
            item,
            inputs: Vec::new(),
            output: None,
        })
    }

    pub fn add_output(&mut self, item: ItemId, rate: Rate, maintain: u32) -> OutputId {
        self.outputs.insert(OutputNode {
            item,
            rate,
            maintain,
            producers: Vec::new(),
        })
    }

    pub fn add_relay(&mut self, item: ItemId) -> RelayId {
        let id = self.relays.insert(RelayNode {
            item,
            inputs: Vec::new(),
            output: None,
            throughput: Rate::ZERO,
        });
        self.relays_by_item.entry(item).or_default().push(id);
        id
    }

    pub fn add_relay_storage(&mut self, items: Vec<ItemId>) -> RelayStorageId {
        let id = self.relay_storages.insert(RelayStorageNode {
            items,
            relays: Vec::new(),
            consumers: Vec::new(),
        });
        self.relay_storage_order.push(id);
        id
    }

    // -----------------------------------------------------------------------
    // Link-attach operations — the only flow mutators
    // -----------------------------------------------------------------------

    /// Wire a fabrication node's output. A storage target gains a producer
    /// link and `rate` of ingress.
    pub fn output_to(
        &mut self,
        fab: FabricationId,
        target: FabOutput,
        rate: Rate,
    ) -> Result<(), PlanError> {
        match target {
            FabOutput::Storage(sid) => {
                if !self.storages[sid].can_add_incoming(1) {
                    return Err(PlanError::StorageLinksExceeded(sid));
                }
                let storage = &mut self.storages[sid];
                storage.producers.push(StorageProducer::Fabrication(fab));
                storage.ingress += rate;
            }
            FabOutput::Sink(oid) => {
                self.outputs[oid].producers.push(fab);
            }
        }
        self.fabrications[fab].output = Some(target);
        Ok(())
    }

    /// Attach a consumer drawing `rate` of `item` from a storage node.
    ///
    /// The egress ledger moves only when the drawn item is the storage's own
    /// item; a byproduct drawn through the buffer costs a link, not flow.
    /// A relay consumer accumulates throughput and propagates ingress to its
    /// output storage if one is already wired.
    pub fn take_from(
        &mut self,
        sid: StorageId,
        consumer: StorageConsumer,
        item: ItemId,
        rate: Rate,
    ) -> Result<(), PlanError> {
        if !self.storages[sid].can_add_outgoing(1) {
            return Err(PlanError::StorageLinksExceeded(sid));
        }
        match consumer {
            StorageConsumer::Fabrication(fid) => {
                self.fabrications[fid].inputs.push(FabInput::Storage {
                    storage: sid,
                    item,
                    rate,
                });
            }
            StorageConsumer::Relay(rid) => {
                if !self.relays[rid].can_add_input(1) {
                    return Err(PlanError::RelayLinksExceeded(rid));
                }
                let relay = &mut self.relays[rid];
                relay.inputs.push(sid);
                relay.throughput += rate;
                if let Some(RelayTarget::Storage(out)) = relay.output {
                    self.storages[out].ingress += rate;
                }
            }
        }
        let storage = &mut self.storages[sid];
        storage.consumers.push(consumer);
        if storage.item == item {
            storage.egress += rate;
            if storage.externally_fed {
                storage.ingress += rate;
            }
        }
        Ok(())
    }

    /// Wire a relay's single output to a storage buffer. Accumulated
    /// throughput lands as ingress on the target.
    pub fn relay_to_storage(&mut self, rid: RelayId, sid: StorageId) -> Result<(), PlanError> {
        if self.relays[rid].output.is_some() {
            return Err(PlanError::RelayLinksExceeded(rid));
        }
        if !self.storages[sid].can_add_incoming(1) {
            return Err(PlanError::StorageLinksExceeded(sid));
        }
        self.relays[rid].output = Some(RelayTarget::Storage(sid));
        let throughput = self.relays[rid].throughput;
        let storage = &mut self.storages[sid];
        storage.producers.push(StorageProducer::Relay(rid));
        storage.ingress += throughput;
        Ok(())
    }

    /// Wire a dedicated relay into a relay-storage node.
    pub fn relay_to_relay_storage(
        &mut self,
        rid: RelayId,
        rsid: RelayStorageId,
    ) -> Result<(), PlanError> {
        if self.relays[rid].output.is_some() {
            return Err(PlanError::RelayLinksExceeded(rid));
        }
        self.relays[rid].output = Some(RelayTarget::RelayStorage(rsid));
        self.relay_storages[rsid].relays.push(rid);
        Ok(())
    }

    /// Present a relay-storage node to a fabrication node as one input link.
    pub fn relay_storage_to_fabrication(
        &mut self,
        rsid: RelayStorageId,
        fid: FabricationId,
    ) -> Result<(), PlanError> {
        if !self.relay_storages[rsid].can_add_consumer(1) {
            return Err(PlanError::RelayStorageLinksExceeded(rsid));
        }
        self.relay_storages[rsid].consumers.push(fid);
        self.fabrications[fid]
            .inputs
            .push(FabInput::RelayStorage { relay_storage: rsid });
        Ok(())
    }

    /// Remove the first direct storage input carrying `item` from a
    /// fabrication node, reversing both directions of the link and restoring
    /// the storage's ledger. Used only by the link-limit resolver.
    pub fn detach_storage_input(
        &mut self,
        fid: FabricationId,
        item: ItemId,
    ) -> Result<(StorageId, Rate), PlanError> {
        let pos = self.fabrications[fid].inputs.iter().position(
            |input| matches!(input, FabInput::Storage { item: i, .. } if *i == item),
        );
        let Some(pos) = pos else {
            return Err(PlanError::NoDirectInput {
                fabrication: fid,
                item,
            });
        };
        let FabInput::Storage { storage, rate, .. } = self.fabrications[fid].inputs.remove(pos)
        else {
            unreachable!("position matched a storage input");
        };

        let node = &mut self.storages[storage];
        if let Some(cpos) = node
            .consumers
            .iter()
            .position(|c| matches!(c, StorageConsumer::Fabrication(f) if *f == fid))
        {
            node.consumers.remove(cpos);
        }
        if node.item == item {
            node.egress -= rate;
            if node.externally_fed {
                node.ingress -= rate;
            }
        }
        Ok((storage, rate))
    }

    // -----------------------------------------------------------------------
    // Lookups — creation order throughout
    // -----------------------------------------------------------------------

    pub fn storages_for_item(&self, item: ItemId) -> &[StorageId] {
        self.storages_by_item
            .get(&item)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn relays_for_item(&self, item: ItemId) -> &[RelayId] {
        self.relays_by_item
            .get(&item)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn relay_storage_ids(&self) -> &[RelayStorageId] {
        &self.relay_storage_order
    }

    pub fn storage(&self, id: StorageId) -> &StorageNode {
        &self.storages[id]
    }

    pub fn fabrication(&self, id: FabricationId) -> &FabricationNode {
        &self.fabrications[id]
    }

    pub fn output(&self, id: OutputId) -> &OutputNode {
        &self.outputs[id]
    }

    pub fn relay(&self, id: RelayId) -> &RelayNode {
        &self.relays[id]
    }

    pub fn relay_storage(&self, id: RelayStorageId) -> &RelayStorageNode {
        &self.relay_storages[id]
    }

    /// Creation-order snapshot of all storage ids. The repair passes iterate
    /// over a snapshot so mid-pass node creation cannot invalidate borrows.
    pub fn storage_ids(&self) -> Vec<StorageId> {
        self.storages.keys().collect()
    }

    pub fn fabrication_ids(&self) -> Vec<FabricationId> {
        self.fabrications.keys().collect()
    }

    pub fn output_ids(&self) -> Vec<OutputId> {
        self.outputs.keys().collect()
    }

    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    pub fn fabrication_count(&self) -> usize {
        self.fabrications.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn relay_count(&self) -> usize {
        self.relays.len()
    }

    pub fn relay_storage_count(&self) -> usize {
        self.relay_storages.len()
    }

    /// Test-only escape hatch for constructing invalid node states the
    /// attach operations refuse to produce.
    #[cfg(test)]
    pub(crate) fn storage_mut(&mut self, id: StorageId) -> &mut StorageNode {
        &mut self.storages[id]
    }

    /// Per-kind counts plus total directed links.
    pub fn summary(&self) -> GraphSummary {
        let storage_links: usize = self
            .storages
            .values()
            .map(|s| s.producers.len() + s.consumers.len())
            .sum();
        let output_links: usize = self.outputs.values().map(|o| o.producers.len()).sum();
        let relay_storage_links: usize = self
            .relay_storages
            .values()
            .map(|rs| rs.relays.len() + rs.consumers.len())
            .sum();
        GraphSummary {
            storages: self.storages.len(),
            fabrications: self.fabrications.len(),
            outputs: self.outputs.len(),
            relays: self.relays.len(),
            relay_storages: self.relay_storages.len(),
            links: storage_links + output_links + relay_storage_links,
        }
    }
}
