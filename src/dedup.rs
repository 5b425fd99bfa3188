//! Corpus compaction: the pipeline's only mutating operation. Posts whose
//! trimmed body is byte-identical to an earlier-seen body are dropped from
//! the in-memory set and their source files deleted from disk. Callers must
//! feed posts in descending filename order (the pinned deterministic scan
//! order), which fixes which duplicate survives: always the first seen.
//!
//! Planning is separated from execution so deletion decisions are testable
//! without touching real files, and so a dry run can report what a real run
//! would delete.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::post::Post;

/// Whether to actually delete duplicate source files.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    DryRun,
    Delete,
}

/// The outcome of a compaction pass.
pub struct Compaction {
    /// Surviving posts, in input order.
    pub posts: Vec<Post>,

    /// Source paths of the duplicates, in input order.
    pub duplicates: Vec<PathBuf>,
}

/// Partitions `posts` into survivors and duplicates. Pure: no I/O.
pub fn plan(posts: Vec<Post>) -> Compaction {
    let mut seen: HashSet<String> = HashSet::new();
    let mut survivors = Vec::with_capacity(posts.len());
    let mut duplicates = Vec::new();
    for post in posts {
        if seen.insert(post.body.trim().to_owned()) {
            survivors.push(post);
        } else {
            duplicates.push(post.source_path);
        }
    }
    Compaction {
        posts: survivors,
        duplicates,
    }
}

/// Runs a compaction pass over `posts`. In [`Mode::Delete`] the duplicate
/// source files are removed from disk; a failed removal is logged and does
/// not abort the run (the duplicate is excluded from the build either way).
/// Idempotent: a second pass over the surviving corpus deletes nothing.
pub fn compact(posts: Vec<Post>, mode: Mode) -> Compaction {
    let compaction = plan(posts);
    for path in &compaction.duplicates {
        match mode {
            Mode::DryRun => println!("  would delete duplicate: {}", path.display()),
            Mode::Delete => {
                println!("  deleting duplicate: {}", path.display());
                if let Err(e) = fs::remove_file(path) {
                    eprintln!("  failed to delete `{}`: {}", path.display(), e);
                }
            }
        }
    }
    compaction
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    fn post(name: &str, body: &str) -> Post {
        Post::from_source(Path::new(name), Path::new(""), body)
    }

    #[test]
    fn test_first_seen_survives_descending_order() {
        // Scan order is descending by filename, so `-b` is seen first.
        let compaction = plan(vec![
            post("2026-02-01-b.md", "same content"),
            post("2026-02-01-a.md", "same content"),
        ]);
        assert_eq!(compaction.posts.len(), 1);
        assert_eq!(compaction.posts[0].id, "2026-02-01-b");
        assert_eq!(
            compaction.duplicates,
            vec![PathBuf::from("2026-02-01-a.md")]
        );
    }

    #[test]
    fn test_trimmed_comparison() {
        let compaction = plan(vec![post("b.md", "same\n"), post("a.md", "  same  ")]);
        assert_eq!(compaction.posts.len(), 1);
        assert_eq!(compaction.duplicates.len(), 1);
    }

    #[test]
    fn test_distinct_bodies_all_survive() {
        let compaction = plan(vec![post("b.md", "one"), post("a.md", "two")]);
        assert_eq!(compaction.posts.len(), 2);
        assert!(compaction.duplicates.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let first = plan(vec![post("b.md", "same"), post("a.md", "same")]);
        let second = plan(first.posts);
        assert!(second.duplicates.is_empty());
        assert_eq!(second.posts.len(), 1);
    }

    #[test]
    fn test_delete_mode_removes_files() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let keep = dir.path().join("2026-02-01-b.md");
        let drop = dir.path().join("2026-02-01-a.md");
        fs::write(&keep, "same content")?;
        fs::write(&drop, "same content")?;

        let posts = vec![
            Post::from_file(&keep, dir.path()).unwrap(),
            Post::from_file(&drop, dir.path()).unwrap(),
        ];
        let compaction = compact(posts, Mode::Delete);
        assert_eq!(compaction.duplicates, vec![drop.clone()]);
        assert!(keep.exists());
        assert!(!drop.exists());
        Ok(())
    }

    #[test]
    fn test_dry_run_leaves_files() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let keep = dir.path().join("b.md");
        let drop = dir.path().join("a.md");
        fs::write(&keep, "same")?;
        fs::write(&drop, "same")?;

        let posts = vec![
            Post::from_file(&keep, dir.path()).unwrap(),
            Post::from_file(&drop, dir.path()).unwrap(),
        ];
        let compaction = compact(posts, Mode::DryRun);
        assert_eq!(compaction.duplicates.len(), 1);
        assert!(keep.exists() && drop.exists());
        Ok(())
    }
}
