//! Activation records and the tree that keeps them.
//!
//! Every element activated with enable codes leaves an [`ActivationRecord`]
//! keyed by its code (the base code). The record remembers which codes the
//! base pulled in, which it disabled and which categories it pinned, so the
//! selection can be explained and undone later.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::category::{Category, Channel};

/// Codes pulled in by a code, keyed by code, nested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationNode {
    pub children: IndexMap<String, ActivationNode>,
}

impl ActivationNode {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn insert(&mut self, code: impl Into<String>, node: ActivationNode) {
        self.children.insert(code.into(), node);
    }

    /// Child node for `code`, created empty if missing.
    pub fn entry(&mut self, code: &str) -> &mut ActivationNode {
        self.children.entry(code.to_string()).or_default()
    }

    /// Merge `other` into this node; entries of `other` win.
    pub fn merge(&mut self, other: ActivationNode) {
        self.children.extend(other.children);
    }

    /// Every code in the subtree, depth first, each once.
    pub fn codes(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut IndexSet<String>) {
        for (code, child) in &self.children {
            out.insert(code.clone());
            child.collect(out);
        }
    }
}

/// OR alternatives a channel still allows, and the codes it rules out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrCodeGroup {
    pub or: Vec<String>,
    pub not: Vec<String>,
}

/// Result of resolving one base code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    pub base: String,
    /// Contains `base` at the top level.
    pub nodes: ActivationNode,
    pub attach: Vec<String>,
    pub disabled_codes: Vec<String>,
    pub filtered_code_groups: IndexMap<Channel, OrCodeGroup>,
    pub locked_categories: IndexMap<Category, String>,
}

impl ActivationRecord {
    /// The base code and everything it pulled in.
    pub fn activated_codes(&self) -> IndexSet<String> {
        self.nodes.codes()
    }

    pub fn activates(&self, code: &str) -> bool {
        self.activated_codes().contains(code)
    }

    pub fn disables(&self, code: &str) -> bool {
        self.disabled_codes.iter().any(|disabled| disabled == code)
    }

    /// True when the only locked category is the one the base belongs to.
    fn locks_only(&self, category: Category) -> bool {
        self.locked_categories.len() == 1 && self.locked_categories.contains_key(&category)
    }
}

/// Who activated and who disabled each code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReverseMap {
    pub activated: IndexMap<String, IndexSet<String>>,
    pub disabled: IndexMap<String, IndexSet<String>>,
}

impl ReverseMap {
    pub fn activated_by(&self, code: &str) -> Option<&IndexSet<String>> {
        self.activated.get(code)
    }

    pub fn disabled_by(&self, code: &str) -> Option<&IndexSet<String>> {
        self.disabled.get(code)
    }
}

/// Categories pinned by activations, with the OR alternatives still offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockedCategories {
    pub locked: IndexMap<Category, String>,
    pub alternatives: IndexMap<Category, Vec<Vec<String>>>,
}

/// Category -> base code -> record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationTree {
    categories: IndexMap<Category, IndexMap<String, ActivationRecord>>,
}

impl ActivationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(IndexMap::is_empty)
    }

    /// Number of records across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    pub fn records(&self) -> impl Iterator<Item = (Category, &ActivationRecord)> {
        self.categories.iter().flat_map(|(category, records)| {
            records.values().map(move |record| (*category, record))
        })
    }

    pub fn records_in(&self, category: Category) -> impl Iterator<Item = &ActivationRecord> {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(IndexMap::values)
    }

    /// The record whose base is `code`, in any category.
    pub fn get(&self, code: &str) -> Option<&ActivationRecord> {
        self.categories
            .values()
            .find_map(|records| records.get(code))
    }

    /// Store a record. Accessory records accumulate; any other category keeps
    /// only its newest record.
    pub fn insert(&mut self, category: Category, record: ActivationRecord) {
        let records = self.categories.entry(category).or_default();
        if category != Category::Accessories {
            records.clear();
        }
        records.insert(record.base.clone(), record);
    }

    /// Delete the record keyed by `code`. With `remove_nested`, records of
    /// other categories that pulled `code` in are deleted as well.
    ///
    /// Returns the base codes of the deleted records.
    pub fn remove_activation(&mut self, code: &str, remove_nested: bool) -> Vec<String> {
        let mut removed = Vec::new();
        for records in self.categories.values_mut() {
            if records.shift_remove(code).is_some() {
                removed.push(code.to_string());
                continue;
            }
            if remove_nested {
                records.retain(|base, record| {
                    let keep = !record.activates(code);
                    if !keep {
                        removed.push(base.clone());
                    }
                    keep
                });
            }
        }
        self.categories.retain(|_, records| !records.is_empty());
        removed
    }

    /// With `exclude_self`, a base is not listed as activating itself.
    pub fn reverse_map(&self, exclude_self: bool) -> ReverseMap {
        let mut map = ReverseMap::default();
        for (_, record) in self.records() {
            for code in record.activated_codes() {
                if exclude_self && code == record.base {
                    continue;
                }
                map.activated
                    .entry(code)
                    .or_default()
                    .insert(record.base.clone());
            }
            for code in &record.disabled_codes {
                map.disabled
                    .entry(code.clone())
                    .or_default()
                    .insert(record.base.clone());
            }
        }
        map
    }

    pub fn disabled_codes(&self) -> IndexSet<String> {
        self.records()
            .flat_map(|(_, record)| record.disabled_codes.iter().cloned())
            .collect()
    }

    pub fn attach_codes(&self) -> Vec<String> {
        self.records()
            .flat_map(|(_, record)| record.attach.iter().cloned())
            .collect()
    }

    /// Locked categories across the tree. Unless `include_self`, a record that
    /// only pins its own category is left out.
    pub fn locked_categories(&self, include_self: bool) -> LockedCategories {
        let mut out = LockedCategories::default();
        for (category, record) in self.records() {
            if !include_self && record.locks_only(category) {
                continue;
            }
            for (locked, code) in &record.locked_categories {
                out.locked.insert(*locked, code.clone());
                let offered = Channel::ALL
                    .into_iter()
                    .find(|channel| channel.category() == Some(*locked))
                    .and_then(|channel| record.filtered_code_groups.get(&channel))
                    .filter(|group| !group.or.is_empty());
                if let Some(group) = offered {
                    out.alternatives
                        .entry(*locked)
                        .or_default()
                        .push(group.or.clone());
                }
            }
        }
        out
    }
}
