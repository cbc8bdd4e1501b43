//! Data model for vehicle option configuration: catalog entries, the
//! selection state and the activation tree that explains it.

#![deny(unsafe_code)]

pub mod activation;
pub mod category;
pub mod config;
pub mod element;
pub mod error;
pub mod options;

pub use activation::{
    ActivationNode, ActivationRecord, ActivationTree, LockedCategories, OrCodeGroup, ReverseMap,
};
pub use category::{Category, Channel};
pub use config::{EngineOptions, StyleTieBreak};
pub use element::{
    AccessoryGroup, Camera, CameraKind, CatalogDocument, CatalogEntry, CategoryBlock, Element,
    ElementGroup, EnableCodes, EnableSpec, GroupMember, SubGroup,
};
pub use error::ModelError;
pub use options::{OptionsState, StyleKey, StyleParts, parse_assignment};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_serialize_with_catalog_names() {
        let mut options = OptionsState::new()
            .with(Category::Market, "US")
            .with(Category::Trim, "T1");
        options.select_accessory("ROOF");
        let json = serde_json::to_value(&options).expect("serialize options");
        assert_eq!(json["peg"], "T1");
        assert_eq!(json["packaging and accessories"]["ROOF"], true);
        let round: OptionsState = serde_json::from_value(json).expect("deserialize options");
        assert_eq!(round, options);
    }

    #[test]
    fn engine_options_fill_missing_fields() {
        let options: EngineOptions =
            serde_json::from_str(r#"{"style_tie_break":"first"}"#).expect("parse options");
        assert_eq!(options.style_tie_break, StyleTieBreak::First);
        assert!(options.reapply_or_groups);
    }
}
