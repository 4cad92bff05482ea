use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a storage node (single-item buffer) in the factory graph.
    pub struct StorageId;

    /// Identifies a fabrication node (one recipe-execution unit).
    pub struct FabricationId;

    /// Identifies an output node (terminal delivery sink).
    pub struct OutputId;

    /// Identifies a relay node (single-item pass-through).
    pub struct RelayId;

    /// Identifies a relay-storage node (multi-item link consolidator).
    pub struct RelayStorageId;
}

/// Identifies an item in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_equality() {
        let a = ItemId(0);
        let b = ItemId(0);
        let c = ItemId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn item_ids_are_ordered_and_hashable() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert(ItemId(1), "hematite");
        map.insert(ItemId(0), "pure_iron");
        let keys: Vec<ItemId> = map.keys().copied().collect();
        assert_eq!(keys, vec![ItemId(0), ItemId(1)]);
    }
}
