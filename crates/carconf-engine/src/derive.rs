//! Standard and hidden element derivation.
//!
//! After every change the configuration is completed with the accessories
//! and standard parts the catalog forces on, accessories that cannot be
//! chosen are hidden, and non-core values that cannot be chosen are
//! reported.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, warn};

use carconf_catalog::Catalog;
use carconf_model::{ActivationTree, Category, Element, OptionsState};

use crate::availability::{
    is_available, is_standard, standard_or_first_available, unavailable_non_core,
};
use crate::merge::activate;

/// A complete, derived configuration. Callers own it and hand it back to
/// the next operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub options: OptionsState,
    pub tree: ActivationTree,
    pub standard_parts: Vec<String>,
    pub standard_accessories: Vec<String>,
    pub hidden_accessories: Vec<String>,
    /// Non-core codes that are neither standard nor available.
    pub unavailable: Vec<String>,
}

impl Configuration {
    /// Codes a user cannot toggle: hidden and standard accessories plus
    /// unavailable non-core values.
    pub fn hidden_codes(&self) -> Vec<&str> {
        self.hidden_accessories
            .iter()
            .chain(&self.unavailable)
            .chain(&self.standard_accessories)
            .map(String::as_str)
            .collect()
    }
}

/// Accessories forced on or hidden by the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryDerivation {
    pub options: OptionsState,
    pub tree: ActivationTree,
    pub standard: Vec<String>,
    pub hidden: Vec<String>,
}

/// Standard parts in effect for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardParts {
    pub options: OptionsState,
    pub tree: ActivationTree,
    pub codes: Vec<String>,
}

/// Complete `options`/`tree` with standard accessories, standard parts and
/// the hidden/unavailable lists.
///
/// `prioritized` is the accessory the user just picked; in its group it is
/// considered first and does not count as an earlier selection.
pub fn derive_standard_and_hidden(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    prioritized: Option<&str>,
) -> Configuration {
    let accessories = standard_and_hidden_accessories(catalog, options, tree, prioritized);
    let changed = options.changed_categories(&accessories.options, &tracked_categories());
    if !changed.is_empty() {
        warn!(?changed, "options changed while activating standard accessories");
    }

    let parts = standard_parts(catalog, &accessories.options, &accessories.tree);
    let changed = accessories
        .options
        .changed_categories(&parts.options, &tracked_categories());
    if !changed.is_empty() {
        warn!(?changed, "options changed while activating standard parts");
    }

    let disabled = parts.tree.disabled_codes();
    let unavailable = unavailable_non_core(catalog, &parts.options, &disabled);

    Configuration {
        options: parts.options,
        tree: parts.tree,
        standard_parts: parts.codes,
        standard_accessories: accessories.standard,
        hidden_accessories: accessories.hidden,
        unavailable,
    }
}

fn tracked_categories() -> Vec<Category> {
    Category::STYLE
        .into_iter()
        .chain(Category::NON_CORE)
        .collect()
}

/// Walk the accessory groups and activate standard accessories.
///
/// In a single-select group that already has a selection, standard elements
/// are reported but not activated. Elements that are neither standard nor
/// available are hidden and switched off.
pub fn standard_and_hidden_accessories(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    prioritized: Option<&str>,
) -> AccessoryDerivation {
    let disabled = tree.disabled_codes();
    let active: Vec<String> = options
        .active_accessories()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut next = options.clone();
    let mut next_tree = tree.clone();
    let mut standard = Vec::new();
    let mut hidden = Vec::new();
    let mut found_prioritized = false;

    for group in catalog.accessory_groups() {
        let mut elements: Vec<&Element> = group.elements.iter().collect();
        let holds_prioritized = prioritized.is_some_and(|code| group.contains(code));
        if holds_prioritized && !found_prioritized {
            found_prioritized = true;
            if let Some(index) = elements
                .iter()
                .position(|element| Some(element.code.as_str()) == prioritized)
            {
                let element = elements.remove(index);
                elements.insert(0, element);
            }
        }

        let has_selection = group.elements.iter().any(|element| active.contains(&element.code));
        let mut selected_one = has_selection && !holds_prioritized;

        for element in elements {
            if disabled.contains(&element.code) {
                continue;
            }
            let selected = next.selected_codes();
            let element_standard = is_standard(element, &selected);
            let element_available = is_available(element, &selected);

            if !element_standard {
                if !element_available {
                    hidden.push(element.code.clone());
                }
                continue;
            }
            if selected_one && !group.multiple_selection {
                standard.push(element.code.clone());
                continue;
            }

            match activate(catalog, &next, &next_tree, element, &[]) {
                Ok((options, tree)) => {
                    next = options;
                    next_tree = tree;
                }
                Err(error) => {
                    warn!(code = %element.code, %error, "failed to activate standard accessory");
                    continue;
                }
            }
            standard.push(element.code.clone());
            selected_one = true;
        }
    }

    for code in &hidden {
        if next.is_accessory_selected(code) {
            debug!(code, "switching off hidden accessory");
            next.remove_accessory(code);
            next_tree.remove_activation(code, false);
        }
    }

    AccessoryDerivation {
        options: next,
        tree: next_tree,
        standard,
        hidden,
    }
}

/// Standard parts whose `standard` expression holds for the selection.
///
/// A part is skipped when it is already selected or attached by something
/// other than its own activation, or when one of its mutually excluded codes
/// is present. Parts with enable codes are activated; parts that stopped
/// being standard lose their activation.
pub fn standard_parts(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
) -> StandardParts {
    let selected = options.selected_codes();
    let attached = tree.attach_codes().join("&");
    let own: IndexSet<&str> = tree
        .records_in(Category::StandardPart)
        .map(|record| record.base.as_str())
        .collect();
    let present: IndexSet<&str> = selected
        .iter()
        .map(String::as_str)
        .chain(attached.split('&'))
        .filter(|code| !code.is_empty())
        .collect();

    let parts: Vec<&Element> = catalog
        .elements_of(Category::StandardPart)
        .iter()
        .filter(|part| part.standard.is_some())
        .filter(|part| !present.contains(part.code.as_str()) || own.contains(part.code.as_str()))
        .filter(|part| is_standard(part, &selected))
        .filter(|part| {
            !part
                .mutually_excluded
                .iter()
                .any(|code| present.contains(code.as_str()))
        })
        .collect();

    let mut next = options.clone();
    let mut next_tree = tree.clone();

    for stale in own.iter().filter(|base| !parts.iter().any(|part| part.code == **base)) {
        debug!(code = stale, "dropping activation of former standard part");
        next_tree.remove_activation(stale, false);
        next.remove_accessory(stale);
    }

    for part in parts.iter().filter(|part| part.has_enable_codes()) {
        match activate(catalog, &next, &next_tree, part, &[]) {
            Ok((options, tree)) => {
                next = options;
                next_tree = tree;
            }
            Err(error) => {
                warn!(code = %part.code, %error, "failed to activate standard part");
            }
        }
    }

    StandardParts {
        options: next,
        tree: next_tree,
        codes: parts.into_iter().map(|part| part.code.clone()).collect(),
    }
}

/// Re-pick the value of each category in `categories`, in order.
///
/// Candidates come from [`standard_or_first_available`], skipping disabled
/// and `disallowed` codes. A candidate with enable codes is activated; if its
/// activation fails, changes a `restricted` category or evicts the record
/// holding a restricted value, it is set aside and the next one is tried. A
/// category with no candidate left is cleared.
pub fn correct_category_values(
    catalog: &Catalog,
    options: &OptionsState,
    categories: &[Category],
    tree: &ActivationTree,
    disallowed: &[String],
    restricted: &[Category],
) -> (OptionsState, ActivationTree) {
    let mut next = options.clone();
    let mut next_tree = tree.clone();
    let mut excluded = tree.disabled_codes();
    excluded.extend(disallowed.iter().cloned());

    let mut done = Vec::new();
    for category in categories.iter().copied() {
        if done.contains(&category) {
            continue;
        }
        done.push(category);

        loop {
            let Some(element) = standard_or_first_available(catalog, &next, category, &excluded)
            else {
                debug!(%category, "no candidate left, clearing category");
                next.set(category, "");
                break;
            };
            if !element.has_enable_codes() {
                next.set(category, element.code.clone());
                break;
            }

            let skip: Vec<String> = excluded.iter().cloned().collect();
            match activate(catalog, &next, &next_tree, element, &skip) {
                Ok((options, tree))
                    if touches_restricted(&next, &next_tree, &options, &tree, restricted) =>
                {
                    warn!(
                        code = %element.code,
                        %category,
                        "skipping candidate that changes a restricted category"
                    );
                    excluded.insert(element.code.clone());
                }
                Ok((options, tree)) => {
                    next = options;
                    next_tree = tree;
                    break;
                }
                Err(error) => {
                    warn!(
                        code = %element.code,
                        %category,
                        %error,
                        "skipping candidate without a valid activation"
                    );
                    excluded.insert(element.code.clone());
                }
            }
        }
    }

    (next, next_tree)
}

/// Whether going from `before` to `after` changes a restricted value or drops
/// a record that activated one.
fn touches_restricted(
    before: &OptionsState,
    before_tree: &ActivationTree,
    after: &OptionsState,
    after_tree: &ActivationTree,
    restricted: &[Category],
) -> bool {
    if !before.changed_categories(after, restricted).is_empty() {
        return true;
    }
    before_tree.records().any(|(_, record)| {
        after_tree.get(&record.base).is_none()
            && restricted
                .iter()
                .any(|category| record.activates(before.get(*category)))
    })
}
