//! In-memory container.

use std::collections::BTreeMap;

use super::{Container, Dataset, Scalar, ROOT};
use crate::util::{Error, Result};

/// One node of the tree: an optional dataset plus its attributes.
///
/// The root node carries attributes only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub dataset: Option<Dataset>,
    pub attributes: BTreeMap<String, Scalar>,
}

/// Node tree held entirely in memory, keyed by full path.
///
/// Built programmatically or decoded from a file backend. Closing it only
/// flips the open flag; later reads fail with [`Error::Closed`].
#[derive(Clone, Debug)]
pub struct MemoryContainer {
    name: String,
    nodes: BTreeMap<String, Node>,
    open: bool,
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new("<memory>")
    }
}

impl MemoryContainer {
    /// Create a container holding only an empty root node.
    pub fn new(name: impl Into<String>) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT.to_string(), Node::default());
        Self { name: name.into(), nodes, open: true }
    }

    /// Builder form of [`MemoryContainer::set_attribute`].
    pub fn with_attribute(mut self, path: &str, name: &str, value: impl Into<Scalar>) -> Self {
        self.set_attribute(path, name, value);
        self
    }

    /// Builder form of [`MemoryContainer::set_dataset`].
    pub fn with_dataset(mut self, path: &str, dataset: Dataset) -> Self {
        self.set_dataset(path, dataset);
        self
    }

    /// Set an attribute, creating the node if needed.
    pub fn set_attribute(&mut self, path: &str, name: &str, value: impl Into<Scalar>) {
        self.nodes
            .entry(path.to_string())
            .or_default()
            .attributes
            .insert(name.to_string(), value.into());
    }

    /// Set the dataset of a node, creating the node if needed.
    pub fn set_dataset(&mut self, path: &str, dataset: Dataset) {
        self.nodes.entry(path.to_string()).or_default().dataset = Some(dataset);
    }

    /// Remove a node with all its attributes.
    pub fn remove_node(&mut self, path: &str) -> Option<Node> {
        self.nodes.remove(path)
    }

    /// Remove a single attribute.
    pub fn remove_attribute(&mut self, path: &str, name: &str) -> Option<Scalar> {
        self.nodes.get_mut(path)?.attributes.remove(name)
    }

    /// Look up a node by path.
    pub fn node(&self, path: &str) -> Option<&Node> {
        self.nodes.get(path)
    }

    /// Iterate all nodes in path order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }
}

impl Container for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_dataset(&self, path: &str) -> Result<Dataset> {
        self.ensure_open()?;
        self.nodes
            .get(path)
            .and_then(|n| n.dataset.clone())
            .ok_or_else(|| Error::NodeMissing(path.to_string()))
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<Scalar> {
        self.ensure_open()?;
        self.nodes
            .get(path)
            .and_then(|n| n.attributes.get(name).cloned())
            .ok_or_else(|| Error::attribute_missing(path, name))
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
