//! Text rendering for the terminal front-end

use crate::storage::summary::WatchSummary;
use crate::types::{APP_TITLE, MovieDetail, SearchResult, WatchedEntry};
use colored::Colorize;
use std::io::Write;

/// One line per search result
pub fn format_result_label(result: &SearchResult) -> String {
    format!("{} {}", result.title, format!("({})", result.year).dimmed())
}

/// One line per watched movie
pub fn format_watched_label(entry: &WatchedEntry) -> String {
    format!(
        "{}  ⭐️ {}  🌟 {}  ⏳ {} min",
        entry.title,
        entry.imdb_rating,
        entry.user_rating,
        entry.runtime
    )
}

pub fn format_num_results(count: usize) -> String {
    format!("Found {} results", count.to_string().bold())
}

pub fn format_summary(summary: &WatchSummary) -> String {
    format!(
        "#️⃣ {} movies  ⭐️ {:.1}  🌟 {}  ⏳ {:.1} min",
        summary.count, summary.avg_imdb_rating, summary.avg_user_rating, summary.avg_runtime
    )
}

pub fn print_detail(detail: &MovieDetail) {
    println!();
    println!("{}", detail.title.bold());
    println!("{} • {}", detail.released, detail.runtime_text);
    println!("{}", detail.genre.dimmed());
    match detail.imdb_rating {
        Some(rating) => println!("⭐ {} IMDb rating", rating),
        None => println!("⭐ no IMDb rating"),
    }
    println!();
    if !detail.plot.is_empty() {
        println!("{}", detail.plot.italic());
    }
    println!("Starring {}", detail.actors);
    println!("Directed by {}", detail.director);
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "⛔".red(), message.red());
}

/// Apply the window title; None restores the default
pub fn set_window_title(title: Option<&str>) {
    print!("\x1b]0;{}\x07", title.unwrap_or(APP_TITLE));
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        colored::control::set_override(false);
        let summary = WatchSummary {
            count: 2,
            avg_imdb_rating: 8.7,
            avg_user_rating: 9.5,
            avg_runtime: 132.0,
        };
        assert_eq!(format_summary(&summary), "#️⃣ 2 movies  ⭐️ 8.7  🌟 9.5  ⏳ 132.0 min");
        assert_eq!(format_num_results(2), "Found 2 results");
    }
}
