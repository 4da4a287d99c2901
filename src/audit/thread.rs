use std::collections::{HashMap, HashSet};

use super::comment::{CommentId, CommentNode, ROOT_ID};
use super::{AuditError, Result};
use crate::infra::bitbucket::CommentRecord;

/// A pull request's comments arranged as a tree under a synthetic root.
///
/// Nodes live in an arena keyed by comment id; the root is held separately so
/// a real comment can never shadow it.
#[derive(Debug, Clone)]
pub struct Thread {
    root: CommentNode,
    nodes: HashMap<CommentId, CommentNode>,
}

impl Thread {
    /// Builds a thread from a flat, unordered comment list.
    ///
    /// All nodes are created before any are linked, so replies may appear
    /// before their parent. When the same id occurs more than once the last
    /// record wins. A parent id missing from `records` means the upstream data
    /// is inconsistent and fails with [`AuditError::BrokenThreadReference`];
    /// replies whose parent chain loops back on itself fail with
    /// [`AuditError::ReplyCycle`].
    pub fn build(records: &[CommentRecord]) -> Result<Self> {
        let mut nodes = HashMap::with_capacity(records.len());
        let mut parents = HashMap::with_capacity(records.len());

        for record in records {
            nodes.insert(record.id, node_from_record(record));
            parents.insert(record.id, record.parent_id());
        }

        let mut root = CommentNode::root();
        for record in records {
            match parents.get(&record.id).copied().flatten() {
                Some(parent_id) => {
                    let parent = nodes.get_mut(&parent_id).ok_or(
                        AuditError::BrokenThreadReference {
                            comment_id: record.id,
                            parent_id,
                        },
                    )?;
                    parent.add_child(record.id);
                }
                None => root.add_child(record.id),
            }
        }

        if let Some(comment_id) = first_detached(&root, &nodes) {
            let parent_id = parents
                .get(&comment_id)
                .copied()
                .flatten()
                .unwrap_or(ROOT_ID);
            return Err(AuditError::ReplyCycle {
                comment_id,
                parent_id,
            });
        }

        Ok(Self { root, nodes })
    }

    pub fn root(&self) -> &CommentNode {
        &self.root
    }

    /// Looks up a real comment by id.
    pub fn get(&self, id: CommentId) -> Option<&CommentNode> {
        self.nodes.get(&id)
    }

    /// Direct replies to `node`.
    pub fn replies<'a>(&'a self, node: &'a CommentNode) -> impl Iterator<Item = &'a CommentNode> {
        node.children().iter().filter_map(|id| self.get(*id))
    }

    /// Number of real comments (the root is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Smallest comment id not reachable from the root, if any.
///
/// Every comment has exactly one parent, so an unreachable one sits on a
/// parent cycle or hangs below one.
fn first_detached(
    root: &CommentNode,
    nodes: &HashMap<CommentId, CommentNode>,
) -> Option<CommentId> {
    let mut seen = HashSet::with_capacity(nodes.len());
    let mut stack: Vec<CommentId> = root.children().iter().copied().collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = nodes.get(&id) {
            stack.extend(node.children().iter().copied());
        }
    }

    if seen.len() == nodes.len() {
        return None;
    }
    nodes.keys().copied().filter(|id| !seen.contains(id)).min()
}

fn node_from_record(record: &CommentRecord) -> CommentNode {
    let (creator_id, display_name) = record
        .user
        .as_ref()
        .map(|u| (u.account_id.as_str(), u.display_name.as_str()))
        .unwrap_or_default();
    // Deleted comments keep their place in the tree but their text is gone.
    let body = if record.deleted { "" } else { record.html() };
    CommentNode::new(record.id, body, creator_id, display_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::factories::{comment, reply};
    use rstest::rstest;

    fn child_ids(node: &CommentNode) -> Vec<CommentId> {
        node.children().iter().copied().collect()
    }

    #[test]
    fn test_empty_input_yields_bare_root() {
        let thread = Thread::build(&[]).unwrap();
        assert_eq!(thread.root().id(), ROOT_ID);
        assert!(thread.root().children().is_empty());
        assert!(thread.is_empty());
    }

    #[test]
    fn test_top_level_comments_hang_from_root() {
        let records = vec![
            comment(1, "u-1", "Ada", ""),
            comment(2, "u-2", "Grace", ""),
            comment(3, "u-1", "Ada", ""),
        ];
        let thread = Thread::build(&records).unwrap();

        assert_eq!(thread.root().children().len(), records.len());
        for id in [1, 2, 3] {
            assert!(thread.get(id).unwrap().children().is_empty());
        }
    }

    #[test]
    fn test_nested_replies() {
        let records = vec![
            comment(1, "u-1", "Ada", ""),
            reply(2, 1, "u-2", "Grace", ""),
            reply(3, 2, "u-1", "Ada", ""),
            reply(4, 1, "u-3", "Linus", ""),
        ];
        let thread = Thread::build(&records).unwrap();

        assert_eq!(child_ids(thread.root()), vec![1]);
        assert_eq!(child_ids(thread.get(1).unwrap()), vec![2, 4]);
        assert_eq!(child_ids(thread.get(2).unwrap()), vec![3]);
        assert_eq!(thread.len(), 4);
    }

    #[test]
    fn test_reply_listed_before_parent() {
        let records = vec![reply(2, 1, "u-2", "Grace", ""), comment(1, "u-1", "Ada", "")];
        let thread = Thread::build(&records).unwrap();

        assert_eq!(child_ids(thread.root()), vec![1]);
        assert_eq!(child_ids(thread.get(1).unwrap()), vec![2]);
    }

    #[test]
    fn test_missing_parent_is_broken_reference() {
        let records = vec![comment(1, "u-1", "Ada", ""), reply(2, 99, "u-2", "Grace", "")];
        let err = Thread::build(&records).unwrap_err();

        assert!(matches!(
            err,
            AuditError::BrokenThreadReference {
                comment_id: 2,
                parent_id: 99
            }
        ));
    }

    #[rstest]
    #[case::self_parent(vec![comment(1, "u-1", "Ada", ""), reply(2, 2, "u-2", "Grace", "")], 2, 2)]
    #[case::two_cycle(vec![reply(1, 2, "u-1", "Ada", ""), reply(2, 1, "u-2", "Grace", "")], 1, 2)]
    #[case::cycle_beside_valid_tree(
        vec![
            comment(1, "u-1", "Ada", ""),
            reply(2, 1, "u-2", "Grace", ""),
            reply(3, 4, "u-3", "Linus", ""),
            reply(4, 3, "u-4", "Ken", ""),
        ],
        3,
        4
    )]
    #[case::reply_below_cycle(
        vec![
            reply(5, 6, "u-1", "Ada", ""),
            reply(6, 5, "u-2", "Grace", ""),
            reply(7, 5, "u-3", "Linus", ""),
        ],
        5,
        6
    )]
    fn test_reply_cycle_is_rejected(
        #[case] records: Vec<CommentRecord>,
        #[case] comment_id: CommentId,
        #[case] parent_id: CommentId,
    ) {
        let err = Thread::build(&records).unwrap_err();
        assert_eq!(
            err,
            AuditError::ReplyCycle {
                comment_id,
                parent_id
            }
        );
    }

    #[test]
    fn test_duplicate_id_last_record_wins() {
        let records = vec![
            comment(1, "u-1", "Ada", ""),
            comment(2, "u-2", "Grace", ""),
            comment(2, "u-3", "Linus", ""),
        ];
        let thread = Thread::build(&records).unwrap();

        assert_eq!(child_ids(thread.root()), vec![1, 2]);
        assert_eq!(thread.get(2).unwrap().creator_id(), "u-3");
    }

    #[test]
    fn test_replies_resolves_children() {
        let records = vec![
            comment(1, "u-1", "Ada", ""),
            reply(2, 1, "u-2", "Grace", ""),
            reply(3, 1, "u-3", "Linus", ""),
        ];
        let thread = Thread::build(&records).unwrap();
        let parent = thread.get(1).unwrap();
        let authors: Vec<&str> = thread.replies(parent).map(|c| c.creator_id()).collect();
        assert_eq!(authors, vec!["u-2", "u-3"]);
    }

    #[test]
    fn test_deleted_comment_keeps_position_without_mentions() {
        let mut deleted = comment(
            1,
            "u-1",
            "Ada",
            r#"<span class="ap-mention" data-atlassian-id="u-2">@Grace</span>"#,
        );
        deleted.deleted = true;
        let records = vec![deleted, reply(2, 1, "u-3", "Linus", "")];
        let thread = Thread::build(&records).unwrap();

        let node = thread.get(1).unwrap();
        assert!(node.mentions().is_empty());
        assert_eq!(child_ids(node), vec![2]);
    }

    #[test]
    fn test_comment_without_user_is_anonymous() {
        let mut record = comment(1, "", "", "");
        record.user = None;
        let thread = Thread::build(&[record]).unwrap();
        assert!(thread.get(1).unwrap().is_anonymous());
    }
}
