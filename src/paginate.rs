//! Date-sequence pagination. Every date group is one page; the slot list is
//! the row of page links shown under a list page, with `None` marking an
//! ellipsis between non-adjacent runs.

use chrono::NaiveDate;

/// Pagination context handed to the templates, covering both the date
/// navigation (prev/next) and the numbered slot row.
pub struct PaginationState {
    /// Whether the page participates in date navigation at all (detail
    /// pages don't).
    pub enabled: bool,
    pub is_home: bool,

    /// The date this page shows; a label on detail pages.
    pub current_date: String,
    pub prev_date: Option<String>,
    pub next_date: Option<String>,

    /// All date keys, descending.
    pub all_dates: Vec<String>,
    pub total_pages: usize,

    /// 1-based index into `all_dates`; 0 when navigation is disabled.
    pub current_idx: usize,

    /// The slot row; `None` is an ellipsis.
    pub slots: Vec<Option<usize>>,
}

impl PaginationState {
    /// State for the home page, which shows the most recent date group and
    /// therefore sits at index 1 of the full sequence.
    pub fn home(dates: &[NaiveDate]) -> PaginationState {
        PaginationState {
            enabled: true,
            is_home: true,
            current_date: String::new(),
            prev_date: date_key(dates, 1),
            next_date: None,
            all_dates: keys(dates),
            total_pages: dates.len(),
            current_idx: 1,
            slots: slots(1, dates.len()),
        }
    }

    /// State for the date page at 0-based position `i` of the descending
    /// sequence. "prev" is the next-older date, "next" the next-newer.
    pub fn date_page(dates: &[NaiveDate], i: usize) -> PaginationState {
        PaginationState {
            enabled: true,
            is_home: false,
            current_date: dates[i].to_string(),
            prev_date: date_key(dates, i + 1),
            next_date: if i > 0 { date_key(dates, i - 1) } else { None },
            all_dates: keys(dates),
            total_pages: dates.len(),
            current_idx: i + 1,
            slots: slots(i + 1, dates.len()),
        }
    }

    /// State for a post detail page: navigation disabled, sequence still
    /// exposed for the sidebar archive.
    pub fn detail(dates: &[NaiveDate]) -> PaginationState {
        PaginationState {
            enabled: false,
            is_home: false,
            current_date: String::from("Post Detail"),
            prev_date: None,
            next_date: None,
            all_dates: keys(dates),
            total_pages: dates.len(),
            current_idx: 0,
            slots: Vec::new(),
        }
    }
}

fn keys(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.to_string()).collect()
}

fn date_key(dates: &[NaiveDate], i: usize) -> Option<String> {
    dates.get(i).map(|d| d.to_string())
}

/// Computes the slot row for a 1-based `current` page out of `total`.
/// Totals of ten or fewer get every page and no ellipsis. Otherwise pages
/// 1-2 and the last two are always present; near the start the row runs
/// through page 6, near the end through the last six, and in the middle the
/// current page is flanked by its neighbors between two ellipses.
pub fn slots(current: usize, total: usize) -> Vec<Option<usize>> {
    if total <= 10 {
        return (1..=total).map(Some).collect();
    }

    let mut row: Vec<Option<usize>> = vec![Some(1), Some(2)];
    if current <= 5 {
        row.extend((3..=6).map(Some));
        row.push(None);
        row.extend([Some(total - 1), Some(total)]);
    } else if current >= total - 4 {
        row.push(None);
        row.extend((total - 5..=total).map(Some));
    } else {
        row.push(None);
        row.extend([Some(current - 1), Some(current), Some(current + 1)]);
        row.push(None);
        row.extend([Some(total - 1), Some(total)]);
    }

    // Collapse consecutive duplicates, including back-to-back ellipses.
    let mut collapsed: Vec<Option<usize>> = Vec::with_capacity(row.len());
    for slot in row {
        if collapsed.last() != Some(&slot) {
            collapsed.push(slot);
        }
    }
    collapsed
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_no_consecutive_duplicates(row: &[Option<usize>]) {
        for pair in row.windows(2) {
            assert_ne!(pair[0], pair[1], "duplicate slots in {:?}", row);
        }
    }

    #[test]
    fn test_small_totals_are_exhaustive() {
        for total in 0..=10 {
            let row = slots(1.min(total), total);
            assert_eq!(row, (1..=total).map(Some).collect::<Vec<_>>());
            assert!(!row.contains(&None));
        }
    }

    #[test]
    fn test_near_start() {
        assert_eq!(
            slots(1, 20),
            vec![
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                None,
                Some(19),
                Some(20)
            ]
        );
    }

    #[test]
    fn test_near_end() {
        assert_eq!(
            slots(18, 20),
            vec![
                Some(1),
                Some(2),
                None,
                Some(15),
                Some(16),
                Some(17),
                Some(18),
                Some(19),
                Some(20)
            ]
        );
    }

    #[test]
    fn test_middle() {
        assert_eq!(
            slots(10, 20),
            vec![
                Some(1),
                Some(2),
                None,
                Some(9),
                Some(10),
                Some(11),
                None,
                Some(19),
                Some(20)
            ]
        );
    }

    #[test]
    fn test_boundary_overlaps_collapse() {
        let row = slots(6, 11);
        assert_no_consecutive_duplicates(&row);
        // current = total - 4 merges the head and the last-six window.
        let row = slots(8, 12);
        assert_no_consecutive_duplicates(&row);
        assert_eq!(row.iter().filter(|s| s.is_none()).count(), 1);
    }

    #[test]
    fn test_never_consecutive_duplicates_anywhere() {
        for total in 11..40 {
            for current in 1..=total {
                assert_no_consecutive_duplicates(&slots(current, total));
            }
        }
    }
}
