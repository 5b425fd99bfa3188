//! Conversions from pipeline types into [`gtmpl::Value`]s for templating.

use std::collections::HashMap;

use gtmpl::Value;

use crate::index::SiteIndex;
use crate::paginate::PaginationState;
use crate::theme::ThemeSummary;

impl From<&ThemeSummary> for Value {
    /// Converts a [`ThemeSummary`] into a [`Value`] for templating.
    fn from(theme: &ThemeSummary) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), theme.id.into());
        m.insert("name".to_owned(), theme.name.into());
        m.insert("description".to_owned(), theme.description.into());
        m.insert("count".to_owned(), Value::from(theme.count as u64));
        m.insert("tags_string".to_owned(), Value::from(theme.tags_string.clone()));
        Value::Object(m)
    }
}

impl From<&PaginationState> for Value {
    /// Converts a [`PaginationState`] into a [`Value`]. Slot ellipses map
    /// to [`Value::Nil`], which templates test with `if`.
    fn from(p: &PaginationState) -> Value {
        let option_to_value = |opt: &Option<String>| match opt {
            Some(s) => Value::from(s.clone()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("enabled".to_owned(), Value::from(p.enabled));
        m.insert("is_home".to_owned(), Value::from(p.is_home));
        m.insert("current_date".to_owned(), Value::from(p.current_date.clone()));
        m.insert("prev_date".to_owned(), option_to_value(&p.prev_date));
        m.insert("next_date".to_owned(), option_to_value(&p.next_date));
        m.insert(
            "all_dates".to_owned(),
            Value::Array(p.all_dates.iter().map(|d| Value::from(d.clone())).collect()),
        );
        m.insert("total_pages".to_owned(), Value::from(p.total_pages as u64));
        m.insert("current_idx".to_owned(), Value::from(p.current_idx as u64));
        m.insert(
            "slots".to_owned(),
            Value::Array(
                p.slots
                    .iter()
                    .map(|slot| match slot {
                        Some(n) => Value::from(*n as u64),
                        None => Value::Nil,
                    })
                    .collect(),
            ),
        );
        Value::Object(m)
    }
}

/// The tag vocabulary as a template array.
pub fn tags_value(index: &SiteIndex) -> Value {
    Value::Array(index.tags.iter().map(|t| Value::from(t.clone())).collect())
}

/// The year/month archive counts as nested objects keyed by `"2026"` /
/// `"02"` strings, matching what the sidebar template iterates over.
pub fn archive_value(index: &SiteIndex) -> Value {
    let mut years: HashMap<String, Value> = HashMap::new();
    for (year, months) in &index.archive {
        let mut month_counts: HashMap<String, Value> = HashMap::new();
        for (month, count) in months {
            month_counts.insert(format!("{:02}", month), Value::from(*count as u64));
        }
        years.insert(format!("{:04}", year), Value::Object(month_counts));
    }
    Value::Object(years)
}
