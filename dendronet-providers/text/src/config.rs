//! JSON load manifests.
//!
//! A manifest names every resource of a network by path or URL together with
//! the labels and initial selections the viewer starts from. Field names are
//! camelCase. Only `matrices` and `threshold` are required.

use dendronet_core::{NetworkError, ThresholdKind};
use serde::Deserialize;

use crate::errors::LoadError;

/// Parsed load manifest.
///
/// # Examples
/// ```
/// use dendronet_providers_text::LoadConfig;
///
/// let config = LoadConfig::from_json(
///     r#"{ "matrices": ["w.txt"], "threshold": { "kind": "absolute", "params": [0.5] } }"#,
/// )
/// .expect("manifest is valid");
/// assert_eq!(config.num_clusters, 1);
/// assert!(!config.pruning);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoadConfig {
    /// Network name; defaults to the manifest's file stem when loaded from
    /// disk.
    #[serde(default)]
    pub name: Option<String>,
    /// Matrix locations.
    #[serde(default)]
    pub matrices: Option<Vec<String>>,
    /// One label per matrix; defaults to the locations.
    #[serde(default)]
    pub matrix_labels: Option<Vec<String>>,
    /// Linkage table location.
    #[serde(default)]
    pub linkage: Option<String>,
    /// Node-data array locations.
    #[serde(default)]
    pub node_data: Vec<String>,
    /// One label per node-data array.
    #[serde(default)]
    pub node_data_labels: Option<Vec<String>>,
    /// Node-name array locations.
    #[serde(default)]
    pub node_names: Vec<String>,
    /// One label per node-name array.
    #[serde(default)]
    pub node_name_labels: Option<Vec<String>>,
    /// Node-order array locations.
    #[serde(default)]
    pub node_orders: Vec<String>,
    /// One label per node-order array.
    #[serde(default)]
    pub node_order_labels: Option<Vec<String>>,
    /// Thumbnail base path.
    #[serde(default)]
    pub thumbnails: Option<String>,
    /// Threshold policy selection.
    #[serde(default)]
    pub threshold: Option<ThresholdConfig>,
    /// Matrix used for thresholding.
    #[serde(default)]
    pub threshold_idx: usize,
    /// Node-order array used for display.
    #[serde(default)]
    pub node_order_idx: Option<usize>,
    /// Node-name array used for display.
    #[serde(default)]
    pub node_name_idx: Option<usize>,
    /// Initial cluster count.
    #[serde(default = "default_num_clusters")]
    pub num_clusters: usize,
    /// Whether disconnected nodes start pruned.
    #[serde(default)]
    pub pruning: bool,
}

const fn default_num_clusters() -> usize {
    1
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            name: None,
            matrices: None,
            matrix_labels: None,
            linkage: None,
            node_data: Vec::new(),
            node_data_labels: None,
            node_names: Vec::new(),
            node_name_labels: None,
            node_orders: Vec::new(),
            node_order_labels: None,
            thumbnails: None,
            threshold: None,
            threshold_idx: 0,
            node_order_idx: None,
            node_name_idx: None,
            num_clusters: default_num_clusters(),
            pruning: false,
        }
    }
}

/// Threshold policy section of a manifest.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Bundled policy identifier, for example `absolute`.
    #[serde(with = "kind_name")]
    pub kind: ThresholdKind,
    /// Initial parameter values; the policy's defaults when absent.
    #[serde(default)]
    pub params: Option<Vec<f64>>,
    /// Parameter labels; the policy's labels when absent.
    #[serde(default)]
    pub param_labels: Option<Vec<String>>,
}

mod kind_name {
    use dendronet_core::ThresholdKind;
    use serde::{Deserialize, Deserializer, de::Error as _};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ThresholdKind, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

impl LoadConfig {
    /// Parses and validates a manifest.
    ///
    /// # Errors
    /// Returns [`LoadError::Manifest`] for malformed JSON and
    /// [`LoadError::Network`] when [`LoadConfig::validate`] fails.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks required fields and list lengths without touching any resource.
    ///
    /// # Errors
    /// Returns [`NetworkError::MissingRequiredField`] when `matrices` or
    /// `threshold` is absent and [`NetworkError::LengthMismatch`] when a label
    /// list does not pair up with its locations.
    pub fn validate(&self) -> Result<(), NetworkError> {
        let matrices = self
            .matrices
            .as_ref()
            .ok_or(NetworkError::MissingRequiredField { field: "matrices" })?;
        if self.threshold.is_none() {
            return Err(NetworkError::MissingRequiredField { field: "threshold" });
        }
        check_labels("matrix labels", matrices.len(), self.matrix_labels.as_deref())?;
        check_labels("node data labels", self.node_data.len(), self.node_data_labels.as_deref())?;
        check_labels("node name labels", self.node_names.len(), self.node_name_labels.as_deref())?;
        check_labels(
            "node order labels",
            self.node_orders.len(),
            self.node_order_labels.as_deref(),
        )
    }

    /// Returns the matrix locations, or an empty slice when absent.
    #[must_use]
    pub fn matrix_locations(&self) -> &[String] {
        self.matrices.as_deref().unwrap_or_default()
    }
}

fn check_labels(
    what: &'static str,
    expected: usize,
    labels: Option<&[String]>,
) -> Result<(), NetworkError> {
    match labels {
        Some(labels) if labels.len() != expected => Err(NetworkError::LengthMismatch {
            what,
            expected,
            actual: labels.len(),
        }),
        _ => Ok(()),
    }
}
