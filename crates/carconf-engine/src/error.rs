use carconf_model::{Category, Channel};

/// Reasons an engine operation is rejected.
///
/// A rejected operation never changes the caller's configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{code} cannot be activated: no alternative of its {channel} codes can be satisfied")]
    Unsatisfiable { code: String, channel: Channel },

    #[error("element {0} not found in catalog")]
    ElementNotFound(String),

    #[error("{code} is disabled by {}", by.join(", "))]
    DisabledBy { code: String, by: Vec<String> },

    #[error("{code} cannot be deselected: activated by {}", by.join(", "))]
    PassivelyActivated { code: String, by: Vec<String> },

    #[error("no compatible style for {category} = {code}")]
    NoCompatibleStyle { category: Category, code: String },

    #[error("{0} is not an accessory")]
    NotAnAccessory(String),

    #[error("{category} values cannot be selected directly")]
    NotSelectable { category: Category },
}

pub type Result<T> = std::result::Result<T, EngineError>;
