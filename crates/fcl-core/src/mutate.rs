#![forbid(unsafe_code)]

//! Destructive tree mutations: exclude and merge-by-title.
//!
//! Both keep `total_samples + total_excluded` constant. Neither can be
//! undone within a session.

use std::collections::BTreeMap;

use tracing::info;

use crate::frame::{FrameId, FrameSet};

impl FrameSet {
    /// Remove frames (and their subtrees) from the tree.
    ///
    /// Each target's samples move to `total_excluded` and are subtracted from
    /// every ancestor. An ancestor left with zero samples is detached as well.
    /// Targets that are already excluded are ignored. Returns the number of
    /// samples removed.
    ///
    /// # Panics
    ///
    /// Panics if an ancestor reaches zero samples while still holding
    /// children, or would go negative. Either means the sample accounting was
    /// already corrupt.
    pub fn exclude(&mut self, targets: &[FrameId]) -> u64 {
        let mut removed = 0;
        for &target in targets {
            let samples = self.frame(target).samples;
            if samples == 0 {
                continue;
            }

            self.detach(target);
            self.arena[target.index()].samples = 0;
            self.total_samples -= samples;
            self.total_excluded += samples;
            removed += samples;

            let mut cursor = self.frame(target).parent;
            while let Some(ancestor) = cursor {
                let node = &mut self.arena[ancestor.index()];
                let Some(left) = node.samples.checked_sub(samples) else {
                    panic!(
                        "frame {:?} holds fewer samples than its excluded descendant ({} < {samples})",
                        node.title, node.samples
                    );
                };
                node.samples = left;
                if node.samples == 0 {
                    assert!(
                        node.children.is_empty(),
                        "frame {:?} has no samples left but still holds {} children",
                        node.title,
                        node.children.len()
                    );
                    self.detach(ancestor);
                }
                cursor = self.frame(ancestor).parent;
            }
        }
        info!(
            removed,
            remaining = self.total_samples,
            excluded = self.total_excluded,
            "frames excluded"
        );
        removed
    }

    /// Unlink a frame from its parent's children and from the root list.
    /// The frame keeps its own parent link.
    fn detach(&mut self, id: FrameId) {
        self.roots.retain(|&root| root != id);
        if let Some(parent) = self.frame(id).parent {
            self.arena[parent.index()]
                .children
                .retain(|&child| child != id);
        }
    }

    /// Merge every outermost occurrence of `title` into one synthetic root.
    ///
    /// Children that share a title across occurrences are summed into a
    /// single child, recursively. The synthetic root replaces the whole root
    /// list; everything not below an occurrence becomes excluded. Returns the
    /// new root, or `None` when no live frame carries the title (the tree is
    /// left untouched).
    pub fn merge_by_title(&mut self, title: &str) -> Option<FrameId> {
        let occurrences = self.find_outermost(title);
        if occurrences.is_empty() {
            return None;
        }

        let retired = self.live_frames();
        let root = self.merge_group(title, &occurrences, None);

        // Old frames are unreachable now; zero them so stale ids read as
        // excluded.
        for id in retired {
            self.arena[id.index()].samples = 0;
        }

        let kept = self.frame(root).samples;
        self.total_excluded += self.total_samples - kept;
        self.total_samples = kept;
        self.roots = vec![root];
        info!(
            title,
            occurrences = occurrences.len(),
            kept,
            excluded = self.total_excluded,
            "frames merged by title"
        );
        Some(root)
    }

    fn merge_group(&mut self, title: &str, sources: &[FrameId], parent: Option<FrameId>) -> FrameId {
        let samples = self.samples_of(sources);
        let id = self.push(title.to_owned(), samples, parent);

        let mut by_title: BTreeMap<String, Vec<FrameId>> = BTreeMap::new();
        for &source in sources {
            for &child in &self.frame(source).children {
                by_title
                    .entry(self.frame(child).title.clone())
                    .or_default()
                    .push(child);
            }
        }

        let children: Vec<FrameId> = by_title
            .into_iter()
            .map(|(child_title, group)| self.merge_group(&child_title, &group, Some(id)))
            .collect();
        self.arena[id.index()].children = children;
        id
    }
}

#[cfg(test)]
mod tests {
    use crate::frame::FrameSet;
    use crate::record::StackRecord;

    fn set(lines: &[(&str, u64)]) -> FrameSet {
        let records: Vec<StackRecord> = lines
            .iter()
            .map(|(path, count)| StackRecord::new(path.split(';'), *count))
            .collect();
        FrameSet::build(&records)
    }

    fn child(s: &FrameSet, parent: crate::FrameId, title: &str) -> crate::FrameId {
        *s.frame(parent)
            .children()
            .iter()
            .find(|&&c| s.frame(c).title() == title)
            .unwrap()
    }

    #[test]
    fn excluding_sole_leaf_removes_empty_parent() {
        let mut s = set(&[("root;mid;leaf", 5), ("root;other", 3)]);
        let root = s.roots()[0];
        let mid = child(&s, root, "mid");
        let leaf = child(&s, mid, "leaf");

        assert_eq!(s.exclude(&[leaf]), 5);
        assert_eq!(s.total_excluded(), 5);
        assert_eq!(s.total_samples(), 3);
        assert_eq!(s.frame(mid).samples(), 0);
        assert_eq!(s.frame(root).samples(), 3);
        assert_eq!(s.frame(root).children().len(), 1);
        assert_eq!(s.frame(s.frame(root).children()[0]).title(), "other");
    }

    #[test]
    fn descendants_of_excluded_frames_are_unreachable() {
        let mut s = set(&[("a;b;c", 2), ("a;d", 1)]);
        let a = s.roots()[0];
        let b = child(&s, a, "b");
        let c = child(&s, b, "c");
        assert!(s.is_reachable(c));
        s.exclude(&[b]);
        assert!(s.frame(c).is_live());
        assert!(!s.is_reachable(c));
        assert!(!s.is_reachable(b));
        assert!(s.is_reachable(a));
    }

    #[test]
    fn excluding_root_empties_tree() {
        let mut s = set(&[("a;b", 2), ("a;c", 2)]);
        let a = s.roots()[0];
        s.exclude(&[a]);
        assert!(s.is_empty());
        assert_eq!(s.total_samples(), 0);
        assert_eq!(s.total_excluded(), 4);
    }

    #[test]
    fn excluding_twice_is_a_noop() {
        let mut s = set(&[("a;b", 2), ("a;c", 2)]);
        let b = child(&s, s.roots()[0], "b");
        s.exclude(&[b]);
        assert_eq!(s.exclude(&[b]), 0);
        assert_eq!(s.total_excluded(), 2);
        assert_eq!(s.original_total(), 4);
    }

    #[test]
    fn exclusion_keeps_self_samples_on_parent() {
        let mut s = set(&[("a", 5), ("a;b", 10)]);
        let a = s.roots()[0];
        let b = child(&s, a, "b");
        s.exclude(&[b]);
        assert_eq!(s.frame(a).samples(), 5);
        assert_eq!(s.roots(), &[a]);
    }

    #[test]
    #[should_panic(expected = "still holds")]
    fn zero_samples_with_children_is_fatal() {
        let mut s = set(&[("a;b;c", 4), ("a;b;d", 1)]);
        let a = s.roots()[0];
        let b = child(&s, a, "b");
        let c = child(&s, b, "c");
        // Corrupt the accounting: `b` claims only `c`'s samples.
        s.arena[b.index()].samples = 4;
        s.arena[a.index()].samples = 5;
        s.exclude(&[c]);
    }

    #[test]
    fn merge_sums_occurrences_and_children() {
        let mut s = set(&[("a;b;c", 10), ("x;b;d", 5)]);
        let root = s.merge_by_title("b").unwrap();
        assert_eq!(s.roots(), &[root]);
        let merged = s.frame(root);
        assert_eq!(merged.title(), "b");
        assert_eq!(merged.samples(), 15);
        let kids: Vec<_> = merged
            .children()
            .iter()
            .map(|&c| (s.frame(c).title().to_owned(), s.frame(c).samples()))
            .collect();
        assert_eq!(kids, vec![("c".to_owned(), 10), ("d".to_owned(), 5)]);
        assert_eq!(s.total_samples(), 15);
        assert_eq!(s.total_excluded(), 0);
    }

    #[test]
    fn merge_excludes_unrelated_samples() {
        let mut s = set(&[("a;b;c", 10), ("x;b;d", 5), ("y;z", 7)]);
        s.merge_by_title("b").unwrap();
        assert_eq!(s.total_excluded(), 7);
        assert_eq!(s.original_total(), 22);
    }

    #[test]
    fn merge_combines_same_named_children() {
        let mut s = set(&[("a;b;c;e", 2), ("x;b;c;f", 3)]);
        let root = s.merge_by_title("b").unwrap();
        let c = s.frame(root).children()[0];
        assert_eq!(s.frame(root).children().len(), 1);
        assert_eq!(s.frame(c).samples(), 5);
        assert_eq!(s.frame(c).children().len(), 2);
        assert_eq!(s.frame(c).parent(), Some(root));
    }

    #[test]
    fn merge_retires_old_frames() {
        let mut s = set(&[("a;b", 1)]);
        let old_a = s.roots()[0];
        s.merge_by_title("b").unwrap();
        assert!(!s.frame(old_a).is_live());
    }

    #[test]
    fn merge_of_unknown_title_changes_nothing() {
        let mut s = set(&[("a;b", 1)]);
        assert!(s.merge_by_title("zzz").is_none());
        assert_eq!(s.total_samples(), 1);
        assert_eq!(s.roots().len(), 1);
    }
}
