//! Standard and available checks against the current selection.

use indexmap::IndexSet;
use tracing::warn;

use carconf_catalog::Catalog;
use carconf_expr::evaluate;
use carconf_model::{ActivationTree, Category, Element, OptionsState};

/// Evaluate an optional expression. Absent is never true; malformed is
/// logged and treated as false.
fn holds(code: &str, expr: Option<&str>, selected: &[String]) -> bool {
    let Some(expr) = expr else {
        return false;
    };
    match evaluate(expr, selected) {
        Ok(result) => result,
        Err(error) => {
            warn!(code, expr, %error, "malformed expression, treating as false");
            false
        }
    }
}

pub fn is_standard(element: &Element, selected: &[String]) -> bool {
    holds(&element.code, element.standard.as_deref(), selected)
}

pub fn is_available(element: &Element, selected: &[String]) -> bool {
    holds(&element.code, element.available.as_deref(), selected)
}

/// Whether `code` exists, is not disabled and is standard or available.
pub fn is_available_or_standard(
    catalog: &Catalog,
    options: &OptionsState,
    code: &str,
    disabled: &IndexSet<String>,
) -> bool {
    let Some(element) = catalog.find_element(code) else {
        return false;
    };
    if disabled.contains(code) {
        return false;
    }
    let selected = options.selected_codes();
    is_standard(element, &selected) || is_available(element, &selected)
}

/// Elements of `category` that are standard or available and not disabled.
pub fn available_elements<'c>(
    catalog: &'c Catalog,
    options: &OptionsState,
    category: Category,
    disabled: &IndexSet<String>,
) -> Vec<&'c Element> {
    let selected = options.selected_codes();
    catalog
        .elements_of(category)
        .iter()
        .filter(|element| !disabled.contains(&element.code))
        .filter(|element| is_standard(element, &selected) || is_available(element, &selected))
        .collect()
}

/// The first standard element of `category`, else the first available one.
///
/// The current selection is considered first, so an unchanged value wins
/// when it qualifies. Codes in `excluded` are never picked.
pub fn standard_or_first_available<'c>(
    catalog: &'c Catalog,
    options: &OptionsState,
    category: Category,
    excluded: &IndexSet<String>,
) -> Option<&'c Element> {
    let elements = catalog.elements_of(category);
    let current = options.get(category);
    let selected = options.selected_codes();

    let ordered = elements
        .iter()
        .filter(|element| element.code == current)
        .chain(elements.iter().filter(|element| element.code != current));

    let mut first_available = None;
    for element in ordered {
        if excluded.contains(&element.code) {
            continue;
        }
        if is_standard(element, &selected) {
            return Some(element);
        }
        if first_available.is_none() && is_available(element, &selected) {
            first_available = Some(element);
        }
    }
    first_available
}

/// Non-core categories whose current value is disabled, unknown or neither
/// standard nor available. Categories the catalog does not offer are skipped.
pub fn invalid_non_core_categories(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
) -> Vec<Category> {
    let disabled = tree.disabled_codes();
    Category::NON_CORE
        .into_iter()
        .filter(|category| !catalog.elements_of(*category).is_empty())
        .filter(|category| {
            !is_available_or_standard(catalog, options, options.get(*category), &disabled)
        })
        .collect()
}

/// Codes of non-core elements that cannot be chosen right now.
pub fn unavailable_non_core(
    catalog: &Catalog,
    options: &OptionsState,
    disabled: &IndexSet<String>,
) -> Vec<String> {
    Category::NON_CORE
        .into_iter()
        .flat_map(|category| catalog.elements_of(category))
        .filter(|element| !is_available_or_standard(catalog, options, &element.code, disabled))
        .map(|element| element.code.clone())
        .collect()
}
