//! Table output for the `carconf` commands.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use carconf_catalog::Catalog;
use carconf_engine::availability::available_elements;
use carconf_engine::{BatchItem, Configuration, StyleCandidate, image_query};
use carconf_model::{Category, ReverseMap};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Selected values, accessories and standard parts, with where each came from.
pub fn configuration_table(configuration: &Configuration) -> Table {
    let reverse = configuration.tree.reverse_map(true);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Code"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut table);

    for (category, code) in configuration.options.values() {
        if code.is_empty() {
            continue;
        }
        table.add_row(vec![
            Cell::new(category),
            Cell::new(code),
            source_cell(&reverse, code, false),
        ]);
    }
    for code in configuration.options.active_accessories() {
        let standard = configuration
            .standard_accessories
            .iter()
            .any(|standard| standard == code);
        table.add_row(vec![
            Cell::new(Category::Accessories),
            Cell::new(code),
            source_cell(&reverse, code, standard),
        ]);
    }
    for code in &configuration.standard_parts {
        table.add_row(vec![
            Cell::new(Category::StandardPart),
            Cell::new(code),
            source_cell(&reverse, code, true),
        ]);
    }
    table
}

/// Every selectable category with its value, choices and unavailable codes.
pub fn categories_table(catalog: &Catalog, configuration: &Configuration) -> Table {
    let disabled = configuration.tree.disabled_codes();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Selected"),
        header_cell("Choices"),
        header_cell("Unavailable"),
    ]);
    apply_table_style(&mut table);

    let selectable = catalog
        .categories()
        .filter(|category| category.is_style() || category.is_non_core());
    for category in selectable {
        let choices: Vec<&str> =
            available_elements(catalog, &configuration.options, category, &disabled)
                .into_iter()
                .map(|element| element.code.as_str())
                .collect();
        let unavailable: Vec<&str> = catalog
            .elements_of(category)
            .iter()
            .map(|element| element.code.as_str())
            .filter(|code| !choices.contains(code))
            .collect();
        table.add_row(vec![
            Cell::new(category),
            Cell::new(configuration.options.get(category)).add_attribute(Attribute::Bold),
            Cell::new(choices.join(", ")),
            dim_cell(unavailable.join(", ")),
        ]);
    }

    if !catalog.accessory_groups().is_empty() {
        let hidden = configuration.hidden_codes();
        let choices: Vec<&str> = catalog
            .accessory_groups()
            .iter()
            .flat_map(|group| &group.elements)
            .map(|element| element.code.as_str())
            .filter(|code| !hidden.contains(code))
            .collect();
        table.add_row(vec![
            Cell::new(Category::Accessories),
            Cell::new(configuration.options.active_accessories().join(", "))
                .add_attribute(Attribute::Bold),
            Cell::new(choices.join(", ")),
            dim_cell(configuration.hidden_accessories.join(", ")),
        ]);
    }
    table
}

/// Which base codes activated and disabled each code.
pub fn explain_table(reverse: &ReverseMap) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Activated by"),
        header_cell("Disabled by"),
    ]);
    apply_table_style(&mut table);

    let mut codes: Vec<&String> = reverse.activated.keys().collect();
    codes.extend(
        reverse
            .disabled
            .keys()
            .filter(|code| !reverse.activated.contains_key(*code)),
    );
    for code in codes {
        let activated = joined(reverse.activated_by(code));
        let disabled = joined(reverse.disabled_by(code));
        table.add_row(vec![
            Cell::new(code),
            Cell::new(activated),
            Cell::new(disabled).fg(Color::Red),
        ]);
    }
    table
}

/// Tied style candidates, numbered for `--pick`.
pub fn candidates_table(candidates: &[StyleCandidate]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Style"),
        header_cell("Core changes"),
        header_cell("Other changes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for (index, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&candidate.style),
            Cell::new(categories(&candidate.changed_core)),
            Cell::new(categories(&candidate.changed_non_core)),
        ]);
    }
    table
}

pub fn batch_table(items: &[BatchItem], settings: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("File"),
        header_cell("Query"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for (index, item) in items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&item.file_stem),
            Cell::new(image_query(&item.code_list, &item.camera, settings)),
        ]);
    }
    table
}

fn source_cell(reverse: &ReverseMap, code: &str, standard: bool) -> Cell {
    if let Some(by) = reverse.activated_by(code) {
        return Cell::new(format!("via {}", joined(Some(by)))).fg(Color::Cyan);
    }
    if standard {
        return dim_cell("standard");
    }
    Cell::new("selected")
}

fn joined<'a>(codes: Option<impl IntoIterator<Item = &'a String>>) -> String {
    codes
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
