//! RM 1.1.0 data structures: item structures and the items they hold.
//!
//! Every type here is a `LOCATABLE`; the locatable attributes (`uid`, `archetype_node_id`,
//! `name`, `archetype_details`) are repeated on each struct so that wire order follows the RM.

use super::common::Archetyped;
use super::data_types::{DataValue, DvCodedText, TextValue};
use super::identification::UidBasedId;
use crate::model::{rm_model, rm_union};
use rm_types::Optional;
use serde::{Deserialize, Serialize};

/// RM `ELEMENT`: a leaf item holding one data value.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "ELEMENT")]
pub struct Element {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub uid: Optional<UidBasedId>,
    pub archetype_node_id: String,
    pub name: TextValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub archetype_details: Optional<Archetyped>,
    /// Why `value` is missing, when it is.
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub null_flavour: Optional<DvCodedText>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub value: Optional<DataValue>,
}

impl Element {
    pub fn new(archetype_node_id: impl Into<String>, name: TextValue, value: DataValue) -> Self {
        Self {
            uid: Optional::absent(),
            archetype_node_id: archetype_node_id.into(),
            name,
            archetype_details: Optional::absent(),
            null_flavour: Optional::absent(),
            value: Optional::present(value),
        }
    }
}

/// RM `CLUSTER`: a branch item.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "CLUSTER")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub uid: Optional<UidBasedId>,
    pub archetype_node_id: String,
    pub name: TextValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub archetype_details: Optional<Archetyped>,
    pub items: Vec<Item>,
}

/// RM `ITEM_TREE`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "ITEM_TREE")]
pub struct ItemTree {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub uid: Optional<UidBasedId>,
    pub archetype_node_id: String,
    pub name: TextValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub archetype_details: Optional<Archetyped>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub items: Optional<Vec<Item>>,
}

impl ItemTree {
    /// An empty tree (no `items` key on the wire).
    pub fn new(archetype_node_id: impl Into<String>, name: TextValue) -> Self {
        Self {
            uid: Optional::absent(),
            archetype_node_id: archetype_node_id.into(),
            name,
            archetype_details: Optional::absent(),
            items: Optional::absent(),
        }
    }
}

/// RM `ITEM_LIST`: a flat list of elements.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "ITEM_LIST")]
pub struct ItemList {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub uid: Optional<UidBasedId>,
    pub archetype_node_id: String,
    pub name: TextValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub archetype_details: Optional<Archetyped>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub items: Optional<Vec<Element>>,
}

/// RM `ITEM_SINGLE`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "ITEM_SINGLE")]
pub struct ItemSingle {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub uid: Optional<UidBasedId>,
    pub archetype_node_id: String,
    pub name: TextValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub archetype_details: Optional<Archetyped>,
    pub item: Element,
}

rm_model! {
    Element => "ELEMENT",
    Cluster => "CLUSTER",
    ItemTree => "ITEM_TREE",
    ItemList => "ITEM_LIST",
    ItemSingle => "ITEM_SINGLE",
}

rm_union! {
    /// RM `ITEM`.
    pub enum Item = "ITEM" {
        Cluster(Cluster),
        Element(Element),
    }
}

rm_union! {
    /// RM `ITEM_STRUCTURE`.
    pub enum ItemStructure = "ITEM_STRUCTURE" {
        ItemTree(ItemTree),
        ItemList(ItemList),
        ItemSingle(ItemSingle),
    }
}

impl Item {
    pub fn archetype_node_id(&self) -> &str {
        match self {
            Self::Cluster(cluster) => &cluster.archetype_node_id,
            Self::Element(element) => &element.archetype_node_id,
        }
    }
}

impl ItemStructure {
    /// Visits every element in the structure, depth first.
    pub fn elements(&self) -> Vec<&Element> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a Element>) {
            for item in items {
                match item {
                    Item::Element(element) => out.push(element),
                    Item::Cluster(cluster) => walk(&cluster.items, out),
                }
            }
        }

        let mut out = Vec::new();
        match self {
            Self::ItemTree(tree) => {
                if let Some(items) = tree.items.get() {
                    walk(items, &mut out);
                }
            }
            Self::ItemList(list) => {
                if let Some(items) = list.items.get() {
                    out.extend(items.iter());
                }
            }
            Self::ItemSingle(single) => out.push(&single.item),
        }
        out
    }
}
