use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a machine in a layout.
    pub struct MachineId;

    /// Identifies a connector in a layout.
    pub struct ConnectorId;
}

/// Identifies an item type in the recipe catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Identifies a recipe in the recipe catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub u32);

/// Either kind of layout node, for error reporting and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Machine(MachineId),
    Connector(ConnectorId),
}

impl From<MachineId> for NodeRef {
    fn from(id: MachineId) -> Self {
        NodeRef::Machine(id)
    }
}

impl From<ConnectorId> for NodeRef {
    fn from(id: ConnectorId) -> Self {
        NodeRef::Connector(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn item_id_equality() {
        let a = ItemId(0);
        let b = ItemId(0);
        let c = ItemId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ItemId(0), "iron-plate");
        map.insert(ItemId(1), "copper-cable");
        assert_eq!(map[&ItemId(1)], "copper-cable");
    }

    #[test]
    fn node_ref_from_keys() {
        let mut machines: SlotMap<MachineId, ()> = SlotMap::with_key();
        let mut connectors: SlotMap<ConnectorId, ()> = SlotMap::with_key();
        let m = machines.insert(());
        let c = connectors.insert(());
        assert_eq!(NodeRef::from(m), NodeRef::Machine(m));
        assert_eq!(NodeRef::from(c), NodeRef::Connector(c));
    }
}
