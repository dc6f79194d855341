//! # Configuration
//!
//! Plain value types with `Default`s matching the stock product. Hosts and
//! peers take them at construction; nothing reads them from the environment.

use std::time::Duration;

use viewrpc::PROTOCOL_VERSION;

/// Labels given to the standard buttons a dialog or wizard creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonLabels {
    pub done: String,
    pub cancel: String,
    pub generate_script: String,
    pub next: String,
    pub previous: String,
}

impl Default for ButtonLabels {
    fn default() -> Self {
        Self {
            done: "Done".into(),
            cancel: "Cancel".into(),
            generate_script: "Generate script".into(),
            next: "Next".into(),
            previous: "Previous".into(),
        }
    }
}

/// View-type prefixes used to build model-view ids (`prefix + handle`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewTypes {
    pub dialog: String,
    pub tab: String,
    pub wizard_page: String,
    pub editor: String,
}

impl Default for ViewTypes {
    fn default() -> Self {
        Self {
            dialog: "modelViewDialog".into(),
            tab: "modelViewDialogTab".into(),
            wizard_page: "modelViewWizardPage".into(),
            editor: "modelViewEditor".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostConfig {
    pub labels: ButtonLabels,
    pub view_types: ViewTypes,
    /// Leading part of every synthesized background-operation id.
    pub operation_id_prefix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            labels: ButtonLabels::default(),
            view_types: ViewTypes::default(),
            operation_id_prefix: "OperationId".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerConfig {
    /// Used in the handshake and in logs.
    pub name: String,
    /// How long a caller waits for a reply before giving up.
    pub call_timeout: Duration,
    /// Version advertised in `Hello`.
    pub protocol_version: u32,
}

impl PeerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            name: "peer".into(),
            call_timeout: Duration::from_secs(30),
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_labels() {
        let config = HostConfig::default();
        assert_eq!(config.labels.done, "Done");
        assert_eq!(config.labels.previous, "Previous");
        assert_eq!(config.view_types.tab, "modelViewDialogTab");
        assert_eq!(config.operation_id_prefix, "OperationId");
    }

    #[test]
    fn test_peer_config_builder() {
        let config = PeerConfig::new("ext-host").with_call_timeout(Duration::from_millis(250));
        assert_eq!(config.name, "ext-host");
        assert_eq!(config.call_timeout, Duration::from_millis(250));
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
    }
}
