use std::{collections::BTreeMap, fmt::Display};

use crate::proto::envoy::{
    config::core::v3::Node, service::metrics::v3::stream_metrics_message::Identifier,
};

/// Resource attribute key for the Envoy node's cluster.
pub const CLUSTER_LABEL: &str = "cluster";
/// Resource attribute key for the Envoy node's id.
pub const NODE_ID_LABEL: &str = "node_id";

/// The identity of the proxy on the other end of a stream. These become the
/// resource attributes of every document produced for that stream.
///
/// Keys are unique and ordered, so rendering is deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdentityLabels(BTreeMap<String, String>);

impl IdentityLabels {
    /// Labels with no entries. A stream whose first message carries no
    /// identifier keeps these for its whole life.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Labels for an Envoy node. Empty node fields are left out.
    pub fn from_node(node: &Node) -> Self {
        let mut labels = BTreeMap::new();
        if !node.cluster.is_empty() {
            labels.insert(CLUSTER_LABEL.to_string(), node.cluster.clone());
        }
        if !node.id.is_empty() {
            labels.insert(NODE_ID_LABEL.to_string(), node.id.clone());
        }
        Self(labels)
    }

    /// Labels for a stream's identifier, which may be missing entirely.
    pub fn from_identifier(identifier: Option<&Identifier>) -> Self {
        identifier
            .and_then(|identifier| identifier.node.as_ref())
            .map(Self::from_node)
            .unwrap_or_default()
    }

    /// Look up one label
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate labels in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no labels
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for IdentityLabels
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Display for IdentityLabels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if 0 < i {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

/// Per-stream identity state. A stream starts `Unresolved` and moves to
/// `Resolved` on its first message; there is no way back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No message has been seen on the stream yet.
    #[default]
    Unresolved,
    /// Frozen labels from the stream's first message.
    Resolved(IdentityLabels),
}

impl Identity {
    /// Resolve from a message identifier if this is still unresolved, and
    /// return the frozen labels. Later identifiers are ignored.
    pub fn resolve(self, identifier: Option<&Identifier>) -> IdentityLabels {
        match self {
            Identity::Unresolved => IdentityLabels::from_identifier(identifier),
            Identity::Resolved(labels) => labels,
        }
    }

    /// The frozen labels, if the stream has resolved them yet.
    pub fn labels(&self) -> Option<&IdentityLabels> {
        match self {
            Identity::Unresolved => None,
            Identity::Resolved(labels) => Some(labels),
        }
    }
}
