//! Style matching for core changes, and OR-group reapplication for
//! non-core ones.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use carconf_catalog::{Catalog, StyleRecord};
use carconf_expr::{comprehend, evaluate, parse};
use carconf_model::{ActivationTree, Category, Channel, OptionsState, StyleKey};

use crate::availability::standard_or_first_available;
use crate::error::{EngineError, Result};
use crate::merge::activate;

/// Options formed for one compatible style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleCandidate {
    pub style: StyleKey,
    pub options: OptionsState,
    pub tree: ActivationTree,
    pub num_core_changes: usize,
    pub num_non_core_changes: usize,
    pub changed_core: Vec<Category>,
    pub changed_non_core: Vec<Category>,
}

/// Styles that could host `category = code`.
///
/// For a non-style category this is just the current style. Otherwise the
/// styles referencing `code` whose availability holds once `code` is
/// selected; failing that, with `market_fallback`, the referencing styles of
/// the market in effect; failing that, every referencing style.
pub fn find_compatible_styles<'c>(
    catalog: &'c Catalog,
    options: &OptionsState,
    category: Category,
    code: &str,
    market_fallback: bool,
) -> Vec<&'c StyleRecord> {
    if !category.is_style() {
        return catalog
            .style_record(&options.style_key())
            .into_iter()
            .collect();
    }

    let selected = options.clone().with(category, code).selected_codes();
    let referencing: Vec<&StyleRecord> = catalog
        .style_records()
        .iter()
        .filter(|style| style.references(code))
        .collect();

    let holding: Vec<&StyleRecord> = referencing
        .iter()
        .copied()
        .filter(|style| match evaluate(&style.available, &selected) {
            Ok(result) => result,
            Err(error) => {
                warn!(style = %style.key, %error, "malformed style availability");
                false
            }
        })
        .collect();
    if !holding.is_empty() {
        return holding;
    }

    if market_fallback {
        let market = if category == Category::Market {
            code
        } else {
            options.get(Category::Market)
        };
        let same_market: Vec<&StyleRecord> = referencing
            .iter()
            .copied()
            .filter(|style| style.key.parts().market == market)
            .collect();
        if !same_market.is_empty() {
            debug!(market, "falling back to same-market styles");
            return same_market;
        }
    }

    referencing
}

/// Build the options for `style` with `category = code` chosen.
///
/// Accessories are reset. The required codes of the style and its key parts
/// are applied, the chosen element's own enable codes are activated, and
/// color, leather and wheels are re-picked unless an activation pinned them.
pub fn form_options_using_style(
    catalog: &Catalog,
    options: &OptionsState,
    style: &StyleRecord,
    category: Category,
    code: &str,
) -> Result<(OptionsState, ActivationTree)> {
    let mut next = options.clone();

    match parse(&style.available) {
        Ok(expr) => {
            for required in comprehend(&expr).and {
                let owner = catalog.category_of(&required);
                if !owner.is_accessory_like() {
                    next.set(owner, required);
                }
            }
        }
        Err(error) => warn!(style = %style.key, %error, "malformed style availability"),
    }

    let parts = style.key.parts();
    next.set(Category::Market, parts.market);
    next.set(Category::Mmc, parts.mmc);
    next.set(Category::Trim, parts.trim);
    next.set(category, code);
    next.clear_accessories();

    let mut tree = ActivationTree::new();
    if let Some(element) = catalog
        .find_element(code)
        .filter(|element| element.has_enable_codes())
    {
        (next, tree) = activate(catalog, &next, &tree, element, &[])?;
    }

    let locked = tree.locked_categories(true).locked;
    let disabled = tree.disabled_codes();
    let mut pending = Vec::new();
    for non_core in Category::NON_CORE {
        if locked.contains_key(&non_core) {
            continue;
        }
        let picked = standard_or_first_available(catalog, &next, non_core, &disabled);
        next.set(non_core, picked.map_or("", |element| element.code.as_str()));
        pending.extend(picked.filter(|element| element.has_enable_codes()));
    }

    for element in pending {
        (next, tree) = activate(catalog, &next, &tree, element, &[])?;
    }

    Ok((next, tree))
}

/// Form every style and keep the candidates with the fewest core changes.
///
/// When no style can be formed the first formation error is returned, or
/// [`EngineError::NoCompatibleStyle`] when there was nothing to form.
pub fn rank_by_minimal_change(
    catalog: &Catalog,
    options: &OptionsState,
    styles: &[&StyleRecord],
    category: Category,
    code: &str,
) -> Result<IndexMap<StyleKey, StyleCandidate>> {
    let core: Vec<Category> = Category::STYLE
        .into_iter()
        .chain([Category::Mmc])
        .filter(|core| *core != category)
        .collect();

    let mut candidates = IndexMap::new();
    let mut first_error = None;

    for style in styles {
        match form_options_using_style(catalog, options, style, category, code) {
            Ok((formed, tree)) => {
                let changed_core = options.changed_categories(&formed, &core);
                let changed_non_core = options.changed_categories(&formed, &Category::NON_CORE);
                candidates.insert(
                    style.key.clone(),
                    StyleCandidate {
                        style: style.key.clone(),
                        options: formed,
                        tree,
                        num_core_changes: changed_core.len(),
                        num_non_core_changes: changed_non_core.len(),
                        changed_core,
                        changed_non_core,
                    },
                );
            }
            Err(error) => {
                warn!(style = %style.key, %error, "failed to form options for style");
                first_error.get_or_insert(error);
            }
        }
    }

    let Some(fewest) = candidates
        .values()
        .map(|candidate| candidate.num_core_changes)
        .min()
    else {
        return Err(first_error.unwrap_or_else(|| EngineError::NoCompatibleStyle {
            category,
            code: code.to_string(),
        }));
    };
    candidates.retain(|_, candidate| candidate.num_core_changes == fewest);
    Ok(candidates)
}

/// Base codes that locked `category` to `old_code` and also allow
/// `new_code`, mapped to the alternatives to skip when re-resolving them.
pub fn find_compatible_or_groups(
    tree: &ActivationTree,
    category: Category,
    old_code: &str,
    new_code: &str,
) -> IndexMap<String, Vec<String>> {
    let Some(channel) = Channel::ALL
        .into_iter()
        .find(|channel| channel.category() == Some(category))
    else {
        return IndexMap::new();
    };

    tree.records()
        .filter(|(_, record)| {
            record.locked_categories.get(&category).map(String::as_str) == Some(old_code)
        })
        .filter_map(|(_, record)| {
            let group = record.filtered_code_groups.get(&channel)?;
            if !group.or.iter().any(|code| code == new_code) {
                return None;
            }
            let skip: Vec<String> = group
                .or
                .iter()
                .filter(|code| *code != new_code)
                .cloned()
                .collect();
            Some((record.base.clone(), skip))
        })
        .collect()
}

/// How a reapplication went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapplyStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapplyOutcome {
    pub status: ReapplyStatus,
    pub options: OptionsState,
    pub tree: ActivationTree,
}

/// Re-resolve each base code with its alternatives skipped, chaining the
/// resulting options from one base to the next.
pub fn reapply_activations(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    reactivate: &IndexMap<String, Vec<String>>,
) -> ReapplyOutcome {
    let mut next = options.clone();
    let mut next_tree = tree.clone();
    let mut failures = 0;

    for (base, skip) in reactivate {
        let Some(element) = catalog.find_element(base) else {
            warn!(code = %base, "cannot reapply activation, element not found");
            failures += 1;
            continue;
        };
        match activate(catalog, &next, &next_tree, element, skip) {
            Ok((options, tree)) => {
                next = options;
                next_tree = tree;
            }
            Err(error) => {
                warn!(code = %base, %error, "cannot reapply activation");
                failures += 1;
            }
        }
    }

    let status = match failures {
        0 => ReapplyStatus::Success,
        n if n == reactivate.len() => ReapplyStatus::Failed,
        _ => ReapplyStatus::Partial,
    };
    ReapplyOutcome {
        status,
        options: next,
        tree: next_tree,
    }
}
