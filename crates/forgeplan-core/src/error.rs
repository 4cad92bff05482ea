use crate::id::{FabricationId, ItemId, RelayId, RelayStorageId, StorageId};

/// Fatal planning failures. Every variant signals either a precondition
/// violation in the supplied demand or an internal inconsistency in the
/// synthesized graph; none are recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A craftable demand references an item with no registered recipe.
    #[error("no recipe registered for item {0:?}")]
    MissingRecipe(ItemId),

    /// A link attach would push a storage node past its link cap.
    /// Callers are expected to consult the capacity predicates first.
    #[error("link capacity exceeded on storage node {0:?}")]
    StorageLinksExceeded(StorageId),

    /// A link attach would push a relay past its input cap or second output.
    #[error("link capacity exceeded on relay {0:?}")]
    RelayLinksExceeded(RelayId),

    /// A link attach would push a relay-storage node past its output cap.
    #[error("link capacity exceeded on relay-storage node {0:?}")]
    RelayStorageLinksExceeded(RelayStorageId),

    /// The link-limit resolver found no direct storage input to redirect
    /// for a relay's item. The relay-storage node references an item that
    /// is not actually feeding the fabrication node: a logic bug in the
    /// graph built so far.
    #[error("no direct storage input for item {item:?} on fabrication node {fabrication:?}")]
    NoDirectInput {
        fabrication: FabricationId,
        item: ItemId,
    },

    /// Validation: a storage node's link count exceeds the container cap.
    #[error("storage node {0:?} exceeds the container link cap")]
    ContainerLinksOverflow(StorageId),

    /// Validation: a fabrication node's input count exceeds the industry cap.
    #[error("fabrication node {0:?} exceeds the industry link cap")]
    IndustryLinksOverflow(FabricationId),

    /// Validation: a storage node's egress exceeds its ingress.
    #[error("storage node {0:?} egresses more than it ingests")]
    FlowImbalance(StorageId),

    /// Validation: a split storage node does not have exactly one outgoing link.
    #[error("split storage node {0:?} must have exactly one outgoing link")]
    SplitFanout(StorageId),
}
