//! Hierarchical topic navigator
//!
//! Walks the topic forest one level at a time. Choosing a root topic opens
//! its children; choosing a nested branch pushes its label onto the
//! breadcrumb path; choosing a leaf composes the path and the leaf text into
//! a single query and resets to the root forest.
//!
//! Only "back to root" is supported. The frame stack keeps child indices so
//! the full ancestry is known, but no one-level-up operation is exposed.

#[cfg(test)]
mod proptests;

use crate::topics::TopicNode;
use std::sync::Arc;
use thiserror::Error;

/// Separator between breadcrumb segments in a composed query
pub const PATH_SEPARATOR: &str = ": ";

/// Result of choosing a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A branch was opened; its children are now visible
    Expanded,
    /// A leaf was reached; this query should be submitted
    Submit(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No topic named {0:?} at this level")]
    UnknownTopic(String),
    #[error("Sub-topic selection is not active")]
    Inactive,
}

/// Point-in-time view of the navigator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorState {
    pub visible_level: Vec<TopicNode>,
    pub breadcrumb_path: Vec<String>,
    pub active: bool,
}

pub struct Navigator {
    roots: Arc<[TopicNode]>,
    /// Child index at each depth, starting with the chosen root
    frames: Vec<usize>,
    breadcrumb: Vec<String>,
}

impl Navigator {
    pub fn new(roots: impl Into<Arc<[TopicNode]>>) -> Self {
        Self {
            roots: roots.into(),
            frames: Vec::new(),
            breadcrumb: Vec::new(),
        }
    }

    pub fn roots(&self) -> &[TopicNode] {
        &self.roots
    }

    pub fn is_active(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn breadcrumb(&self) -> &[String] {
        &self.breadcrumb
    }

    /// Nodes the user can currently choose from
    pub fn visible_level(&self) -> &[TopicNode] {
        match self.current_node() {
            Some(node) => &node.children,
            None => &self.roots,
        }
    }

    pub fn state(&self) -> NavigatorState {
        NavigatorState {
            visible_level: self.visible_level().to_vec(),
            breadcrumb_path: self.breadcrumb.clone(),
            active: self.is_active(),
        }
    }

    /// Choose one of the root topics
    ///
    /// Always starts a fresh traversal, discarding any path in progress.
    pub fn select_main(&mut self, label: &str) -> Result<Selection, NavigationError> {
        let index = self
            .roots
            .iter()
            .position(|n| n.label == label)
            .ok_or_else(|| NavigationError::UnknownTopic(label.to_string()))?;
        let node = &self.roots[index];

        if node.is_leaf() {
            let query = node.leaf_text().to_string();
            self.reset();
            tracing::debug!(query = %query, "Root topic is a leaf");
            return Ok(Selection::Submit(query));
        }

        self.frames.clear();
        self.frames.push(index);
        self.breadcrumb.clear();
        tracing::debug!(topic = %label, "Opened root topic");
        Ok(Selection::Expanded)
    }

    /// Choose one of the currently visible sub-topics
    pub fn select_sub(&mut self, label: &str) -> Result<Selection, NavigationError> {
        if !self.is_active() {
            return Err(NavigationError::Inactive);
        }

        let index = self
            .visible_level()
            .iter()
            .position(|n| n.label == label)
            .ok_or_else(|| NavigationError::UnknownTopic(label.to_string()))?;
        let node = &self.visible_level()[index];

        if node.is_leaf() {
            let query = compose_query(&self.breadcrumb, node.leaf_text());
            self.reset();
            tracing::debug!(query = %query, "Composed leaf query");
            return Ok(Selection::Submit(query));
        }

        let label = node.label.clone();
        self.frames.push(index);
        self.breadcrumb.push(label);
        Ok(Selection::Expanded)
    }

    /// Return to the root forest. Returns false if already there.
    pub fn back(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.reset();
        true
    }

    /// The user typed a free-form query, bypassing the menu
    pub fn reset_on_free_text_entry(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.frames.clear();
        self.breadcrumb.clear();
    }

    fn current_node(&self) -> Option<&TopicNode> {
        let (&first, rest) = self.frames.split_first()?;
        let mut node = &self.roots[first];
        for &index in rest {
            node = &node.children[index];
        }
        Some(node)
    }
}

/// Join the breadcrumb path and the leaf text into a single query
pub fn compose_query(path: &[String], leaf_text: &str) -> String {
    if path.is_empty() {
        return leaf_text.to_string();
    }
    let mut query = path.join(PATH_SEPARATOR);
    query.push_str(PATH_SEPARATOR);
    query.push_str(leaf_text);
    query
}
