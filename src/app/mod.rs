//! App descriptors and the label contract operators use to advertise them.
use std::collections::HashMap;

/// Label carrying the display name of an app.
pub const NAME_LABEL: &str = "sui.app.name";
/// Label carrying the URL an app is reachable at.
pub const URL_LABEL: &str = "sui.app.url";
/// Label carrying the icon identifier of an app.
pub const ICON_LABEL: &str = "sui.app.icon";

/// A discoverable application as published in the manifest.
///
/// Unset fields are empty strings; all three keys are always serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppDescriptor {
    pub name: String,
    pub url: String,
    pub icon: String,
}

impl AppDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: icon.into(),
        }
    }

    /// Returns `true` if none of the three fields carries a value.
    ///
    /// Empty descriptors are never published.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.url.is_empty() && self.icon.is_empty()
    }
}

/// Builds an [`AppDescriptor`] from a container's labels.
///
/// Only [`NAME_LABEL`], [`URL_LABEL`] and [`ICON_LABEL`] are read. A missing key
/// yields an empty field, values are taken verbatim.
///
/// # Examples
///
/// ```
/// # use std::collections::HashMap;
/// # use sui_discovery::app::{self, AppDescriptor};
/// let labels = HashMap::from([("sui.app.name".to_owned(), "Grafana".to_owned())]);
/// assert_eq!(app::extract(&labels), AppDescriptor::new("Grafana", "", ""));
/// ```
pub fn extract(labels: &HashMap<String, String>) -> AppDescriptor {
    AppDescriptor {
        name: label_value(labels, NAME_LABEL),
        url: label_value(labels, URL_LABEL),
        icon: label_value(labels, ICON_LABEL),
    }
}

fn label_value(labels: &HashMap<String, String>, key: &str) -> String {
    match labels.get(key) {
        Some(value) => {
            log::debug!("Container label {}: {}", key, value);
            value.clone()
        }
        None => String::new(),
    }
}
