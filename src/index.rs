//! Aggregation over the parsed corpus: calendar-date groups, the tag
//! vocabulary, and the year/month/day archive counts. All of it is derived
//! fresh each run and never persisted.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::post::Post;

/// All posts sharing one calendar date, newest-first. The pagination unit.
pub struct DateGroup<'a> {
    pub date: NaiveDate,
    pub posts: Vec<&'a Post>,
}

/// The derived site-wide aggregates every page embeds.
pub struct SiteIndex<'a> {
    /// Date groups in descending date order.
    pub groups: Vec<DateGroup<'a>>,

    /// Tag vocabulary: case-insensitively unique, first-seen display case
    /// preserved, sorted case-insensitively.
    pub tags: Vec<String>,

    /// Post counts per year and month.
    pub archive: BTreeMap<i32, BTreeMap<u32, usize>>,

    /// `YYYY-MM` key to the sorted set of `YYYY-MM-DD` day strings with at
    /// least one post, serialized to JSON for client-side calendars.
    pub days: BTreeMap<String, BTreeSet<String>>,
}

impl<'a> SiteIndex<'a> {
    /// Builds the index from posts already sorted newest-first; group order
    /// and intra-group order both follow from that sort.
    pub fn build(posts: &'a [Post]) -> SiteIndex<'a> {
        let mut groups: Vec<DateGroup> = Vec::new();
        let mut tags: Vec<String> = Vec::new();
        let mut seen_tags: HashSet<String> = HashSet::new();
        let mut archive: BTreeMap<i32, BTreeMap<u32, usize>> = BTreeMap::new();
        let mut days: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for post in posts {
            let date = post.resolved.date();
            match groups.last_mut() {
                Some(group) if group.date == date => group.posts.push(post),
                _ => groups.push(DateGroup {
                    date,
                    posts: vec![post],
                }),
            }

            for tag in &post.tags {
                if seen_tags.insert(tag.to_lowercase()) {
                    tags.push(tag.clone());
                }
            }

            *archive
                .entry(date.year())
                .or_default()
                .entry(date.month())
                .or_default() += 1;
            days.entry(format!("{:04}-{:02}", date.year(), date.month()))
                .or_default()
                .insert(date.to_string());
        }

        tags.sort_by_key(|t| t.to_lowercase());
        SiteIndex {
            groups,
            tags,
            archive,
            days,
        }
    }

    /// Descending date keys, one per group.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.groups.iter().map(|g| g.date).collect()
    }

    /// The machine-readable day-set table embedded in every page.
    pub fn days_json(&self) -> String {
        // BTree ordering makes this deterministic; serializing a map of
        // string sets cannot fail.
        serde_json::to_string(&self.days).unwrap_or_default()
    }
}
