//! Tests for the configurator operations.

use carconf_catalog::Catalog;
use carconf_engine::{
    Configuration, Configurator, EngineError, SelectOutcome, activate, derive_standard_and_hidden,
};
use carconf_model::{Category, Channel};

fn catalog() -> Catalog {
    Catalog::from_json_str(include_str!("fixtures/showroom.json")).unwrap()
}

fn select(
    configurator: &Configurator<'_>,
    current: &Configuration,
    category: Category,
    code: &str,
) -> Configuration {
    configurator
        .select_option(current, category, code)
        .unwrap()
        .applied()
        .unwrap()
}

fn strings(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

#[test]
fn defaults_follow_default_list() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    assert_eq!(defaults.options.style_key().as_str(), "US-M3-T1");
    assert_eq!(defaults.options.get(Category::Color), "red");
    assert_eq!(defaults.options.get(Category::Wheels), "W1");
    assert!(defaults.tree.is_empty());
    assert_eq!(defaults.standard_parts, strings(&["SP1"]));
    assert!(defaults.standard_accessories.is_empty());
    assert_eq!(defaults.hidden_accessories, strings(&["TOW"]));
    assert_eq!(defaults.unavailable, strings(&["green", "L2", "W3"]));
    assert_eq!(configurator.reset_to_defaults(), defaults);
}

#[test]
fn reselecting_current_value_is_a_no_op() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    assert_eq!(select(&configurator, &defaults, Category::Color, "red"), defaults);
    assert_eq!(select(&configurator, &defaults, Category::Trim, "T1"), defaults);
}

#[test]
fn wheel_pins_color_and_reselect_keeps_wheel() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let with_wheel = select(&configurator, &defaults, Category::Wheels, "wheel_B");
    assert_eq!(with_wheel.options.get(Category::Wheels), "wheel_B");
    assert_eq!(with_wheel.options.get(Category::Color), "red");

    let locked = configurator.locked_categories(&with_wheel);
    assert_eq!(locked.locked.get(&Category::Color).unwrap(), "red");
    assert_eq!(
        locked.alternatives[&Category::Color],
        vec![strings(&["red", "blue"])]
    );

    let blue = select(&configurator, &with_wheel, Category::Color, "blue");
    assert_eq!(blue.options.get(Category::Color), "blue");
    assert_eq!(blue.options.get(Category::Wheels), "wheel_B");
    let record = blue.tree.get("wheel_B").unwrap();
    assert_eq!(record.locked_categories.get(&Category::Color).unwrap(), "blue");
    assert_eq!(blue.tree.len(), 1);
}

#[test]
fn color_outside_or_group_evicts_wheel() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();
    let with_wheel = select(&configurator, &defaults, Category::Wheels, "wheel_B");

    let green = select(&configurator, &with_wheel, Category::Color, "green");
    assert_eq!(green.options.get(Category::Color), "green");
    assert_eq!(green.options.get(Category::Wheels), "W1");
    assert!(green.tree.get("wheel_B").is_none());
    assert!(green.tree.get("green").is_some());
}

#[test]
fn unsatisfiable_trim_is_rejected() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let error = configurator
        .select_option(&defaults, Category::Trim, "T9")
        .unwrap_err();
    assert_eq!(
        error,
        EngineError::Unsatisfiable {
            code: "T9".to_string(),
            channel: Channel::Accessories,
        }
    );
    assert_eq!(defaults.options.get(Category::Trim), "T1");
}

#[test]
fn trim_change_brings_its_standard_equipment() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let touring = select(&configurator, &defaults, Category::Trim, "T2");
    assert_eq!(touring.options.style_key().as_str(), "US-M3-T2");
    assert_eq!(touring.standard_parts, strings(&["SP2"]));
    assert_eq!(touring.standard_accessories, strings(&["MATS"]));
    assert!(touring.options.is_accessory_selected("MATS"));
    assert!(touring.hidden_accessories.is_empty());
    assert!(touring.unavailable.is_empty());
}

#[test]
fn drivetrain_change_moves_to_compatible_style() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let outcome = configurator
        .select_option(&defaults, Category::Drivetrain, "AWD")
        .unwrap();
    let SelectOutcome::Applied(sport) = outcome else {
        panic!("expected a single candidate");
    };
    assert_eq!(sport.options.style_key().as_str(), "US-M5-T3");
    assert_eq!(sport.options.get(Category::Drivetrain), "AWD");
}

#[test]
fn code_without_style_is_rejected() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let error = configurator
        .select_option(&defaults, Category::BodyStyle, "COUPE")
        .unwrap_err();
    assert_eq!(
        error,
        EngineError::NoCompatibleStyle {
            category: Category::BodyStyle,
            code: "COUPE".to_string(),
        }
    );
}

#[test]
fn disabled_code_cannot_be_selected() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let sport = select(&configurator, &defaults, Category::Accessories, "SPORT");
    assert!(sport.options.is_accessory_selected("SPORT"));
    assert_eq!(sport.options.get(Category::Wheels), "W1");

    let error = configurator
        .select_option(&sport, Category::Color, "green")
        .unwrap_err();
    assert_eq!(
        error,
        EngineError::DisabledBy {
            code: "green".to_string(),
            by: strings(&["SPORT"]),
        }
    );
    assert_eq!(
        error.to_string(),
        "green is disabled by SPORT"
    );
}

#[test]
fn passively_activated_accessory_cannot_be_deselected() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let nav = select(&configurator, &defaults, Category::Accessories, "NAV");
    assert!(nav.options.is_accessory_selected("SCREEN"));

    let error = configurator.deselect_accessory(&nav, "SCREEN").unwrap_err();
    assert_eq!(
        error,
        EngineError::PassivelyActivated {
            code: "SCREEN".to_string(),
            by: strings(&["NAV"]),
        }
    );

    let without = configurator.deselect_accessory(&nav, "NAV").unwrap();
    assert!(!without.options.is_accessory_selected("NAV"));
    assert!(!without.options.is_accessory_selected("SCREEN"));
    assert!(without.tree.is_empty());
    assert_eq!(without, defaults);
}

#[test]
fn single_select_group_swaps_accessories() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let roof = select(&configurator, &defaults, Category::Accessories, "ROOF");
    assert!(roof.options.is_accessory_selected("ROOF"));
    assert!(!roof.options.is_accessory_selected("RAILS"));
    assert_eq!(roof.tree.attach_codes(), strings(&["RAILS", "BARS"]));

    let rack = select(&configurator, &roof, Category::Accessories, "RACK");
    assert!(rack.options.is_accessory_selected("RACK"));
    assert!(!rack.options.is_accessory_selected("ROOF"));
    assert!(rack.tree.attach_codes().is_empty());

    assert_eq!(select(&configurator, &rack, Category::Accessories, "RACK"), rack);
}

#[test]
fn hidden_accessory_is_switched_off() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let tow = select(&configurator, &defaults, Category::Accessories, "TOW");
    assert!(!tow.options.is_accessory_selected("TOW"));
    assert!(tow.tree.get("TOW").is_none());
    assert_eq!(tow.hidden_accessories, strings(&["TOW"]));
}

#[test]
fn invalid_requests_are_rejected() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    assert_eq!(
        configurator.deselect_accessory(&defaults, "red").unwrap_err(),
        EngineError::NotAnAccessory("red".to_string())
    );
    assert_eq!(
        configurator
            .select_option(&defaults, Category::Color, "purple")
            .unwrap_err(),
        EngineError::ElementNotFound("purple".to_string())
    );
    assert_eq!(
        configurator
            .select_option(&defaults, Category::Mmc, "M5")
            .unwrap_err(),
        EngineError::NotSelectable {
            category: Category::Mmc
        }
    );
}

#[test]
fn explain_lists_what_pulled_codes_in() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();
    let with_wheel = select(&configurator, &defaults, Category::Wheels, "wheel_B");

    let reverse = configurator.explain(&with_wheel);
    let by: Vec<&String> = reverse.activated_by("red").unwrap().iter().collect();
    assert_eq!(by, vec!["wheel_B"]);
    assert!(reverse.activated_by("wheel_B").is_none());
}

#[test]
fn derivation_is_a_fixed_point() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();
    let configurations = [
        select(&configurator, &defaults, Category::Trim, "T2"),
        select(&configurator, &defaults, Category::Wheels, "wheel_B"),
        select(&configurator, &defaults, Category::Accessories, "ROOF"),
        defaults,
    ];

    for configuration in configurations {
        let again =
            derive_standard_and_hidden(&catalog, &configuration.options, &configuration.tree, None);
        assert_eq!(again, configuration);
    }
}

const COMPACT: &str = r#"[
    {"category": "default", "elements": [
        {"category": "style", "code": "US-M3-T1"},
        {"category": "market", "code": "US"},
        {"category": "peg", "code": "T1"},
        {"category": "color", "code": "red"},
        {"category": "leather", "code": "L1"}
    ]},
    {"category": "market", "elements": [{"code": "US", "available": ""}]},
    {"category": "mmc", "elements": [{"code": "M3", "available": "T1"}]},
    {"category": "peg", "elements": [{"code": "T1", "available": ""}]},
    {"category": "style", "elements": [{"code": "US-M3-T1", "available": "US&T1"}]},
    {"category": "color", "elements": [
        {"code": "red", "available": ""},
        {"code": "blue", "available": ""}
    ]},
    {"category": "leather", "elements": [
        {"code": "L1", "available": "red"},
        {"code": "L2", "available": "", "enableCodes": {"color": "red"}},
        {"code": "L3", "available": ""}
    ]},
    {"category": "packaging and accessories", "elements": [
        {"code": "ACC", "available": "", "enableCodes": {"color": "blue"}},
        {"code": "ROOF", "available": "", "enableCodes": {"attach": "RAILS"}},
        {"code": "RAILS", "available": ""}
    ]}
]"#;

#[test]
fn correction_keeps_the_new_selection() {
    let catalog = Catalog::from_json_str(COMPACT).unwrap();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();
    assert_eq!(defaults.options.get(Category::Leather), "L1");

    let with_acc = select(&configurator, &defaults, Category::Accessories, "ACC");
    assert!(with_acc.options.is_accessory_selected("ACC"));
    assert!(with_acc.tree.get("ACC").is_some());
    assert_eq!(with_acc.options.get(Category::Color), "blue");
    // L2 would pull color back to red.
    assert_eq!(with_acc.options.get(Category::Leather), "L3");
    assert!(with_acc.tree.get("L2").is_none());
}

#[test]
fn attached_code_selected_on_its_own_is_kept() {
    let catalog = Catalog::from_json_str(COMPACT).unwrap();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let roof = select(&configurator, &defaults, Category::Accessories, "ROOF");
    assert_eq!(roof.tree.get("ROOF").unwrap().attach, strings(&["RAILS"]));
    assert!(!roof.options.is_accessory_selected("RAILS"));

    let rails = select(&configurator, &roof, Category::Accessories, "RAILS");
    assert!(rails.options.is_accessory_selected("ROOF"));
    assert!(rails.options.is_accessory_selected("RAILS"));
    assert!(rails.tree.get("RAILS").is_some());
}

mod properties {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    const SELECTIONS: &[(Category, &str)] = &[
        (Category::Trim, "T1"),
        (Category::Trim, "T2"),
        (Category::Trim, "T3"),
        (Category::Drivetrain, "AWD"),
        (Category::Color, "red"),
        (Category::Color, "blue"),
        (Category::Color, "green"),
        (Category::Leather, "L2"),
        (Category::Wheels, "W1"),
        (Category::Wheels, "wheel_B"),
        (Category::Wheels, "W3"),
        (Category::Accessories, "ROOF"),
        (Category::Accessories, "NAV"),
        (Category::Accessories, "SPORT"),
    ];

    fn walk(configurator: &Configurator<'_>, steps: &[usize]) -> Vec<Configuration> {
        let mut current = configurator.apply_defaults();
        let mut trail = vec![current.clone()];
        for step in steps {
            let (category, code) = SELECTIONS[*step];
            match configurator.select_option(&current, category, code) {
                Ok(SelectOutcome::Applied(next)) => current = next,
                Ok(SelectOutcome::Ambiguous(candidates)) => {
                    current = configurator.apply_candidate(&candidates[0]);
                }
                Err(_) => {}
            }
            trail.push(current.clone());
        }
        trail
    }

    /// Every value that needs an activation has one, and every lock in the
    /// tree is reflected in the options.
    fn check_provenance(catalog: &Catalog, current: &Configuration) -> Result<(), TestCaseError> {
        for (category, code) in current.options.values() {
            if code.is_empty() || category.is_accessory_like() {
                continue;
            }
            let needs_record = catalog
                .find_element(code)
                .is_some_and(|element| element.has_enable_codes());
            if needs_record {
                prop_assert!(
                    current.tree.records().any(|(_, record)| record.activates(code)),
                    "{} = {} has no activation record",
                    category,
                    code
                );
            }
        }
        for (_, record) in current.tree.records() {
            for (category, code) in &record.locked_categories {
                prop_assert_eq!(current.options.get(*category), code.as_str());
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn locks_agree_and_reselect_is_stable(
            steps in proptest::collection::vec(0..SELECTIONS.len(), 0..6)
        ) {
            let catalog = catalog();
            let configurator = Configurator::new(&catalog);
            let trail = walk(&configurator, &steps);

            for state in &trail {
                check_provenance(&catalog, state)?;
            }

            let current = trail.last().unwrap();
            let mut locks: HashMap<Category, &str> = HashMap::new();
            for (_, record) in current.tree.records() {
                for (category, code) in &record.locked_categories {
                    let first = *locks.entry(*category).or_insert(code.as_str());
                    prop_assert_eq!(first, code.as_str());
                }
            }

            for (category, code) in current.options.values() {
                if code.is_empty() || !(category.is_style() || category.is_non_core()) {
                    continue;
                }
                let again = configurator.select_option(current, category, code).unwrap();
                prop_assert_eq!(again, SelectOutcome::Applied(current.clone()));
            }
        }

        #[test]
        fn applying_a_selection_twice_matches_applying_it_once(
            steps in proptest::collection::vec(0..SELECTIONS.len(), 0..6)
        ) {
            let catalog = catalog();
            let configurator = Configurator::new(&catalog);
            let current = walk(&configurator, &steps).pop().unwrap();

            let targets = [
                (Category::Wheels, "wheel_B"),
                (Category::Accessories, "ROOF"),
                (Category::Accessories, "NAV"),
            ];
            for (category, code) in targets {
                if current.options.get(category) == code
                    || current.options.is_accessory_selected(code)
                {
                    continue;
                }
                let Ok(SelectOutcome::Applied(once)) =
                    configurator.select_option(&current, category, code)
                else {
                    continue;
                };
                let repeated = configurator.select_option(&current, category, code).unwrap();
                prop_assert_eq!(repeated, SelectOutcome::Applied(once.clone()));

                let element = catalog.find_element(code).unwrap();
                let (options, tree) = activate(&catalog, &once.options, &once.tree, element, &[])
                    .unwrap();
                let prioritized = (category == Category::Accessories).then_some(code);
                let twice = derive_standard_and_hidden(&catalog, &options, &tree, prioritized);
                prop_assert_eq!(twice, once);
            }
        }
    }
}
