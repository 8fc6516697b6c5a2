//! Derived watch-list statistics

use crate::types::WatchedEntry;

/// Aggregates over the watch-list, computed on read and never stored.
///
/// IMDb rating and runtime averages are rounded to one decimal; the user
/// rating average is kept unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WatchSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

/// Mean of the values, 0.0 for none
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl WatchSummary {
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            avg_imdb_rating: round1(mean(entries.iter().map(|e| e.imdb_rating))),
            avg_user_rating: mean(entries.iter().map(|e| f64::from(e.user_rating))),
            avg_runtime: round1(mean(entries.iter().map(|e| f64::from(e.runtime)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_averages_are_zero() {
        let summary = WatchSummary::from_entries(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.avg_imdb_rating, 0.0);
        assert_eq!(summary.avg_user_rating, 0.0);
        assert_eq!(summary.avg_runtime, 0.0);
        assert!(!summary.avg_user_rating.is_nan());
    }

    #[test]
    fn test_user_average_is_not_rounded() {
        let entries: Vec<WatchedEntry> = [7u8, 8, 8]
            .iter()
            .enumerate()
            .map(|(i, &user)| WatchedEntry {
                id: format!("tt{i}"),
                title: String::new(),
                poster_url: String::new(),
                imdb_rating: 7.0,
                runtime: 100,
                user_rating: user,
                rating_change_count: 1,
                added_at: 0,
            })
            .collect();

        let summary = WatchSummary::from_entries(&entries);
        assert_eq!(summary.avg_user_rating, 23.0 / 3.0);
        assert_eq!(summary.avg_imdb_rating, 7.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(8.65), 8.7);
        assert_eq!(round1(132.0), 132.0);
        assert_eq!(round1(7.04), 7.0);
    }
}
