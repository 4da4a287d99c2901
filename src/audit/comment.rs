use std::collections::{BTreeMap, BTreeSet};

use super::mention::extract_mentions;

pub type CommentId = i64;

/// Id of the synthetic node every top-level comment hangs from.
pub const ROOT_ID: CommentId = 0;

/// A single comment in a pull request thread.
///
/// Children are held by id; the owning [`super::Thread`] resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    id: CommentId,
    creator_id: String,
    creator_display_name: String,
    mentions: BTreeMap<String, String>,
    children: BTreeSet<CommentId>,
}

impl CommentNode {
    /// Creates a node, parsing `body_html` for mentions.
    pub fn new(
        id: CommentId,
        body_html: &str,
        creator_id: impl Into<String>,
        creator_display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            creator_id: creator_id.into(),
            creator_display_name: creator_display_name.into(),
            mentions: extract_mentions(body_html),
            children: BTreeSet::new(),
        }
    }

    /// The synthetic root: sentinel id, no identity, no mentions.
    pub fn root() -> Self {
        Self::new(ROOT_ID, "", "", "")
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    pub fn creator_display_name(&self) -> &str {
        &self.creator_display_name
    }

    /// True for nodes without an author: the synthetic root, or comments
    /// whose account no longer exists.
    pub fn is_anonymous(&self) -> bool {
        self.creator_id.is_empty()
    }

    pub fn mentions(&self) -> &BTreeMap<String, String> {
        &self.mentions
    }

    pub fn children(&self) -> &BTreeSet<CommentId> {
        &self.children
    }

    /// Attaches a child by id. Adding the same id again is a no-op.
    pub fn add_child(&mut self, child_id: CommentId) {
        self.children.insert(child_id);
    }
}
