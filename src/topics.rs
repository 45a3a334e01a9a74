//! Guided-menu topic tree
//!
//! A static forest of labeled choices. Nodes with children are menus; only
//! childless nodes terminate navigation and produce a query.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// A single choice in the topic tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNode {
    pub label: String,
    /// Query text sent when this node is chosen as a leaf (defaults to `label`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TopicNode>,
}

impl TopicNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            query: None,
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<TopicNode>) -> Self {
        Self {
            label: label.into(),
            query: None,
            children,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Text this node contributes when selected as a leaf
    pub fn leaf_text(&self) -> &str {
        self.query.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Error)]
pub enum TopicLoadError {
    #[error("Failed to read topic file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid topic file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate sibling label: {0}")]
    DuplicateLabel(String),
    #[error("Topic catalog is empty")]
    Empty,
    #[error("Topic label is blank")]
    BlankLabel,
    #[error("Blank query on topic: {0}")]
    BlankQuery(String),
}

/// Check that labels are unique among siblings at every level, and that no
/// label or query is blank
pub fn validate(forest: &[TopicNode]) -> Result<(), TopicLoadError> {
    if forest.is_empty() {
        return Err(TopicLoadError::Empty);
    }
    validate_level(forest)
}

fn validate_level(level: &[TopicNode]) -> Result<(), TopicLoadError> {
    let mut seen = HashSet::new();
    for node in level {
        if node.label.trim().is_empty() {
            return Err(TopicLoadError::BlankLabel);
        }
        if node.query.as_deref().is_some_and(|q| q.trim().is_empty()) {
            return Err(TopicLoadError::BlankQuery(node.label.clone()));
        }
        if !seen.insert(node.label.as_str()) {
            return Err(TopicLoadError::DuplicateLabel(node.label.clone()));
        }
        if !node.children.is_empty() {
            validate_level(&node.children)?;
        }
    }
    Ok(())
}

/// Load a topic forest from a JSON file (an array of nodes)
pub fn load_from_file(path: &Path) -> Result<Vec<TopicNode>, TopicLoadError> {
    let content = std::fs::read_to_string(path)?;
    let forest: Vec<TopicNode> = serde_json::from_str(&content)?;
    validate(&forest)?;
    tracing::info!(path = %path.display(), roots = forest.len(), "Loaded topic catalog");
    Ok(forest)
}

/// Built-in helpdesk catalog
pub fn default_catalog() -> Vec<TopicNode> {
    use TopicNode as T;

    vec![
        T::branch(
            "Password Help",
            vec![
                T::leaf("I forgot my password"),
                T::branch(
                    "How to change password",
                    vec![
                        T::leaf("I am in office connected to Prodapt Network"),
                        T::leaf("I am working remotely"),
                    ],
                ),
                T::leaf("My password is expired"),
                T::leaf("Account Locked out"),
            ],
        ),
        T::branch(
            "Network Issues",
            vec![T::branch(
                "VPN connection error",
                vec![
                    T::leaf("\u{201c}Login failed\u{201c}"),
                    T::leaf(
                        "\u{201c}The VPN connection failed due to unsuccessful domain name resolution\u{201c}",
                    ),
                    T::leaf(
                        "\u{201c}Login denied your environment does not meet the access criteria defined by your administrator\u{201c}",
                    ),
                ],
            )],
        ),
        T::branch(
            "HelpDesk Ticket",
            vec![
                T::leaf("How to raise Helpdesk Ticket"),
                T::branch("What is the Ticket category ?", ticket_categories()),
            ],
        ),
        T::leaf("Software Help"),
        T::branch(
            "Hardware Issues",
            vec![T::branch(
                "Laptop Issue",
                vec![
                    T::branch(
                        "My laptop wont turn on",
                        vec![T::leaf("Surface"), T::leaf("Lenovo"), T::leaf("Other")],
                    ),
                    T::leaf("Keyboard issue"),
                ],
            )],
        ),
        T::leaf("Security Help"),
    ]
}

fn ticket_categories() -> Vec<TopicNode> {
    use TopicNode as T;

    vec![
        T::branch(
            "Software",
            vec![
                T::branch(
                    "Installation",
                    vec![
                        T::leaf("Licensed software"),
                        T::leaf("Opensource software"),
                        T::leaf("Install configured software"),
                        T::leaf("VoIP License"),
                    ],
                ),
                T::leaf("Upgrade"),
                T::leaf("Issues with software"),
            ],
        ),
        T::branch(
            "Hardware",
            vec![
                T::branch(
                    "Issues with Prodapt devices",
                    vec![
                        T::leaf("Laptop"),
                        T::leaf("Desktop"),
                        T::leaf("Printer"),
                        T::leaf("Headphones"),
                        T::leaf("Wireless Mouse"),
                        T::leaf("Monitor"),
                    ],
                ),
                T::branch("Hardware upgrade", vec![T::leaf("RAM "), T::leaf("SSD ")]),
                T::branch(
                    "Request for Peripherals",
                    vec![
                        T::leaf("Monitor"),
                        T::leaf("Keyboard"),
                        T::leaf("Mouse"),
                        T::leaf("Datacard"),
                        T::leaf("Headphones"),
                    ],
                ),
            ],
        ),
        T::branch(
            "Network",
            vec![
                T::branch(
                    "Network Issues",
                    vec![
                        T::leaf("Internet "),
                        T::leaf("VPN "),
                        T::leaf("WiFi "),
                        T::leaf("LAN "),
                    ],
                ),
                T::branch(
                    "Network Provisioning",
                    vec![T::leaf("Forti Token"), T::leaf("VPN"), T::leaf("WiFi/LAN")],
                ),
            ],
        ),
        T::branch(
            "Security and Permissions request",
            vec![
                T::leaf("Admin Rights"),
                T::leaf("USB Access"),
                T::leaf("DLP Exception"),
                T::leaf("VAPT Scan"),
            ],
        ),
    ]
}
