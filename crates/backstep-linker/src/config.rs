use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
struct RawFlow {
    name: Option<String>,
    // Outer `None`: no `actions` key. Inner `None`: `actions: ~`.
    #[serde(default, deserialize_with = "present")]
    actions: Option<Option<Vec<String>>>,
    #[serde(flatten)]
    extra: IndexMap<String, serde_yml::Value>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RawFlow {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.actions.is_none() && self.extra.is_empty()
    }
}

/// A validated flow: an ordered, non-empty list of step identifiers.
///
/// ```yaml
/// name: checkout
/// actions:
///   - reserve
///   - charge
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    name: Option<String>,
    actions: Vec<String>,
}

impl FlowConfig {
    /// Build a flow from identifiers directly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoActions` for an empty list and
    /// `ConfigError::BlankAction` for a blank identifier.
    pub fn new<I, S>(actions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        validate_actions(&actions)?;
        Ok(Self {
            name: None,
            actions,
        })
    }

    /// Parse and validate a YAML flow document.
    ///
    /// Top-level keys other than `name` and `actions` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Empty` for an empty document or mapping,
    /// `ConfigError::MissingActions` when there is no `actions` key,
    /// `ConfigError::NoActions` when `actions` is null or an empty list,
    /// `ConfigError::Yaml` for malformed YAML, and the errors of
    /// [`FlowConfig::new`] for an invalid action list.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Err(ConfigError::Empty);
        }

        let raw: Option<RawFlow> = serde_yml::from_str(content)?;
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(ConfigError::Empty),
        };

        for key in raw.extra.keys() {
            debug!(key = %key, "ignoring unknown flow key");
        }

        let actions = raw
            .actions
            .ok_or(ConfigError::MissingActions)?
            .ok_or(ConfigError::NoActions)?;
        validate_actions(&actions)?;

        Ok(Self {
            name: raw.name,
            actions,
        })
    }

    /// Read, parse and validate a flow file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise the
    /// errors of [`FlowConfig::parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded flow file");
        Self::parse(&content)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always `false`: a validated flow has at least one action.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn validate_actions(actions: &[String]) -> Result<(), ConfigError> {
    if actions.is_empty() {
        return Err(ConfigError::NoActions);
    }
    if let Some(index) = actions.iter().position(|id| id.trim().is_empty()) {
        return Err(ConfigError::BlankAction { index });
    }
    Ok(())
}
