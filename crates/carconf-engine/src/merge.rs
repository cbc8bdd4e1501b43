//! Applying activation records to a configuration.
//!
//! A new record is merged into the activation tree after evicting every
//! record it conflicts with. The options are then re-flattened from the
//! records that survived, and non-core categories left without a valid value
//! are corrected.

use indexmap::IndexSet;
use tracing::{debug, warn};

use carconf_catalog::Catalog;
use carconf_model::{ActivationRecord, ActivationTree, Category, Element, OptionsState};

use crate::availability::is_available_or_standard;
use crate::derive::correct_category_values;
use crate::error::Result;
use crate::resolver::resolve;

/// Resolve `element` against `options` and merge the record into `tree`.
///
/// On error nothing is returned and the inputs are untouched.
pub fn activate(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    element: &Element,
    skip_codes: &[String],
) -> Result<(OptionsState, ActivationTree)> {
    let category = catalog.category_of(&element.code);
    let record = resolve(catalog, options, element, &options.style_key(), skip_codes)?;
    debug!(
        code = %element.code,
        %category,
        activated = record.activated_codes().len(),
        "resolved activation"
    );
    Ok(apply(catalog, options, tree, category, record))
}

/// Merge `record` (whose base belongs to `category`) into `tree`.
pub fn apply(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    category: Category,
    record: ActivationRecord,
) -> (OptionsState, ActivationTree) {
    let activated = record.activated_codes();
    let mut next_tree = tree.clone();
    let mut evicted: IndexSet<String> = IndexSet::new();

    for (_, existing) in tree.records() {
        if existing.base == record.base {
            continue;
        }
        let existing_codes = existing.activated_codes();
        if conflicts(existing, &existing_codes, &record, &activated, &evicted) {
            warn!(
                base = %existing.base,
                by = %record.base,
                "evicted conflicting activation"
            );
            next_tree.remove_activation(&existing.base, false);
            evicted.extend(existing_codes);
        }
    }

    // Records keyed by a code the new record pulls in are superseded by it.
    for code in &activated {
        next_tree.remove_activation(code, false);
    }

    let base = record.base.clone();
    let own = direct_codes(&record);
    next_tree.insert(category, record);

    let mut next = options.clone();
    next.clear_accessories();
    let mut restricted = Vec::new();

    let surviving = next_tree
        .records()
        .filter(|(owner, existing)| !(*owner == category && existing.base == base))
        .flat_map(|(_, existing)| direct_codes(existing))
        .chain(own);
    for code in surviving {
        if next.is_accessory_selected(&code) {
            continue;
        }
        let owner = catalog.category_of(&code);
        if owner.is_accessory_like() {
            next.select_accessory(code);
        } else {
            restricted.push(owner);
            next.set(owner, code);
        }
    }

    let disabled = next_tree.disabled_codes();
    let to_correct: Vec<Category> = Category::NON_CORE
        .into_iter()
        .filter(|category| !restricted.contains(category))
        .filter(|category| {
            let current = next.get(*category);
            evicted.contains(options.get(*category))
                || (!catalog.elements_of(*category).is_empty()
                    && !is_available_or_standard(catalog, &next, current, &disabled))
        })
        .collect();

    if to_correct.is_empty() {
        return (next, next_tree);
    }

    warn!(categories = ?to_correct, "correcting categories after merge");
    let disallowed: Vec<String> = disabled.into_iter().collect();
    correct_category_values(
        catalog,
        &next,
        &to_correct,
        &next_tree,
        &disallowed,
        &restricted,
    )
}

/// Codes a record activates, without the ones it only attaches. Attach codes
/// reach the renderer, not the selection.
fn direct_codes(record: &ActivationRecord) -> Vec<String> {
    record
        .activated_codes()
        .into_iter()
        .filter(|code| !record.attach.contains(code))
        .collect()
}

fn conflicts(
    existing: &ActivationRecord,
    existing_codes: &IndexSet<String>,
    incoming: &ActivationRecord,
    incoming_codes: &IndexSet<String>,
    evicted: &IndexSet<String>,
) -> bool {
    existing_codes.iter().any(|code| incoming.disables(code))
        || incoming_codes.iter().any(|code| existing.disables(code))
        || existing_codes.iter().any(|code| evicted.contains(code))
        || existing
            .locked_categories
            .iter()
            .any(|(category, code)| {
                incoming
                    .locked_categories
                    .get(category)
                    .is_some_and(|other| other != code)
            })
}

/// Remove the record keyed by `code` and repair what it leaves behind.
///
/// Accessories the record pulled in are dropped. A non-core category whose
/// value came from the record is re-picked when the value is no longer valid
/// or needs its own activation; `code` itself is never re-picked.
pub fn remove_activation_and_update(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    code: &str,
) -> (OptionsState, ActivationTree) {
    let Some(record) = tree.get(code) else {
        warn!(code, "no activation recorded for code");
        return (options.clone(), tree.clone());
    };
    let activated = record.activated_codes();

    let mut next_tree = tree.clone();
    next_tree.remove_activation(code, true);
    let disabled = next_tree.disabled_codes();

    let mut next = options.clone();
    let mut to_update = Vec::new();
    for activated_code in &activated {
        let category = catalog.category_of(activated_code);
        if category.is_accessory_like() {
            next.remove_accessory(activated_code);
            continue;
        }
        if !category.is_non_core() || to_update.contains(&category) {
            continue;
        }
        let needs_activation = catalog
            .find_element(next.get(category))
            .is_some_and(Element::has_enable_codes);
        if is_available_or_standard(catalog, &next, activated_code, &disabled) && !needs_activation
        {
            continue;
        }
        to_update.push(category);
    }

    if to_update.is_empty() {
        return (next, next_tree);
    }

    warn!(code, categories = ?to_update, "correcting categories after removal");
    let (corrected, corrected_tree) =
        correct_category_values(catalog, &next, &to_update, &next_tree, &[code.to_string()], &[]);
    let changed = options.changed_categories(&corrected, &Category::NON_CORE);
    if changed.len() > to_update.len() {
        warn!(?changed, "more categories changed than expected");
    }
    (corrected, corrected_tree)
}
