//! popcorn - movie search and watch-list in your terminal
//!
//! Search the OMDb catalog, open a movie, rate it, keep a list of what you watched.

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tokio::sync::watch;

use popcorn::core::catalog::{CatalogClient, OmdbClient};
use popcorn::core::detail::{DetailController, DetailStatus};
use popcorn::core::keys::{FocusManager, Key, KeyBindingDispatcher};
use popcorn::core::search::{SearchController, SearchStatus};
use popcorn::storage::config;
use popcorn::storage::watchlist::WatchlistStore;
use popcorn::types::{AppState, MAX_RATING, MenuItem};
use popcorn::ui::dialoguer_selector::DialoguerSelector;
use popcorn::ui::focus::TerminalFocus;
use popcorn::ui::render;
use popcorn::utils::logging::init_logging;
use popcorn::utils::paths::{ensure_app_dirs, get_watchlist_path};

/// Search movies, rate what you watched, keep the list.
#[derive(Parser, Debug)]
#[command(name = "popcorn")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Initial search query
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Open on the watch-list
    #[arg(short, long)]
    watched: bool,

    /// Edit the configuration file
    #[arg(short, long)]
    edit: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Actions offered on an open movie
#[derive(Debug, Clone, Copy)]
enum DetailAction {
    Rate,
    Add,
    Back,
}

/// Wait until a published state stops loading
async fn settled<T: Clone>(rx: &mut watch::Receiver<T>, loading: impl Fn(&T) -> bool) -> anyhow::Result<T> {
    let state = rx.wait_for(|s| !loading(s)).await?;
    Ok(state.clone())
}

/// Determine initial state from CLI options
fn determine_initial_state(cli: &Cli) -> AppState {
    if cli.watched {
        return AppState::Watched;
    }
    if !cli.query.is_empty() {
        return AppState::Search;
    }
    AppState::Init
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    ensure_app_dirs().await?;

    // Handle --edit flag
    if cli.edit {
        let cfg = config::load_config().await?;
        config::edit_config(&cfg.editor).await?;
        return Ok(());
    }

    let cfg = config::load_config().await?;
    let client: Arc<dyn CatalogClient> = Arc::new(OmdbClient::from_config(&cfg)?);

    let mut store = WatchlistStore::new(get_watchlist_path());
    store.hydrate().await;

    let detail = DetailController::new(Arc::clone(&client));
    let search = SearchController::new(client, detail.clone());

    let focus = Arc::new(TerminalFocus::default());
    let keys = KeyBindingDispatcher::new();
    let _bindings = keys.install(focus.clone(), search.clone(), detail.clone());

    let selector = DialoguerSelector::new();
    let mut search_rx = search.subscribe();
    let mut detail_rx = detail.subscribe();

    let mut state = determine_initial_state(&cli);
    let mut initial_query = cli.query.join(" ");

    while state != AppState::Exit {
        match state {
            AppState::Init => {
                let menu_items = vec![
                    MenuItem { label: "🔍 Search movies".into(), value: AppState::Search },
                    MenuItem { label: "🍿 Movies you watched".into(), value: AppState::Watched },
                ];

                state = selector.select(&menu_items, "usePopcorn").unwrap_or(AppState::Exit);
                if state == AppState::Search {
                    // Same as pressing Enter outside the search box
                    keys.dispatch(Key::Enter);
                }
            }

            AppState::Search => {
                focus.focus_search();
                let prefill = if initial_query.is_empty() {
                    search.query()
                } else {
                    std::mem::take(&mut initial_query)
                };
                let input = selector.input("Search movies", &prefill)?;
                focus.blur();

                let query = input.trim();
                if query.is_empty() {
                    let _ = search.set_query("");
                    state = AppState::Init;
                    continue;
                }

                let _ = search.set_query(query);
                println!("{}", "Loading...".dimmed());
                let results = settled(&mut search_rx, |s| s.is_loading()).await?;

                match &results.status {
                    SearchStatus::Errored(message) => {
                        render::print_error(message);
                        continue;
                    }
                    _ => println!("{}", render::format_num_results(results.num_results())),
                }

                let menu_items: Vec<MenuItem<String>> = results
                    .results()
                    .iter()
                    .take(cfg.max_results_shown)
                    .map(|r| MenuItem {
                        label: render::format_result_label(r),
                        value: r.id.clone(),
                    })
                    .collect();

                match selector.select(&menu_items, "Select movie") {
                    Some(id) => {
                        let _ = detail.toggle(&id);
                        state = AppState::Detail;
                    }
                    None => state = AppState::Init,
                }
            }

            AppState::Detail => {
                let current = settled(&mut detail_rx, |s| s.is_loading()).await?;
                render::set_window_title(current.current_title().as_deref());

                let movie = match &current.status {
                    DetailStatus::Ready(movie) => movie.clone(),
                    DetailStatus::Errored(message) => {
                        render::print_error(message);
                        // Picking the same title again should retry, not toggle it shut
                        detail.close();
                        state = AppState::Search;
                        continue;
                    }
                    _ => {
                        state = AppState::Search;
                        continue;
                    }
                };

                render::print_detail(&movie);
                state = detail_screen(&selector, &keys, &detail, &mut store).await?;
                render::set_window_title(detail.snapshot().current_title().as_deref());
            }

            AppState::Watched => {
                let summary = store.summary();
                println!("{}", "Movies you watched".bold());
                println!("{}", render::format_summary(&summary));

                let menu_items: Vec<MenuItem<String>> = store
                    .all()
                    .iter()
                    .map(|e| MenuItem {
                        label: format!("❌ {}", render::format_watched_label(e)),
                        value: e.id.clone(),
                    })
                    .collect();

                if menu_items.is_empty() {
                    println!("{}", "Nothing watched yet.".yellow());
                    state = AppState::Init;
                    continue;
                }

                match selector.select(&menu_items, "Remove from list") {
                    Some(id) => store.remove(&id).await?,
                    None => state = AppState::Init,
                }
            }

            AppState::Exit => break,
        }
    }

    Ok(())
}

/// Rate/add loop on an open movie. Returns the next front-end state.
async fn detail_screen(
    selector: &DialoguerSelector,
    keys: &KeyBindingDispatcher,
    detail: &DetailController,
    store: &mut WatchlistStore,
) -> anyhow::Result<AppState> {
    if let Some(rating) = detail.watched_rating(store) {
        println!("You have rated this movie {} ⭐️", rating);
        let back = vec![MenuItem { label: "← Back".to_string(), value: () }];
        let _ = selector.select(&back, "");
        keys.dispatch(Key::Escape);
        return Ok(AppState::Search);
    }

    loop {
        let current = detail.snapshot();
        let mut actions = vec![MenuItem { label: "⭐ Rate".to_string(), value: DetailAction::Rate }];
        if current.can_add() {
            actions.push(MenuItem {
                label: format!("+ Add to list ({}⭐)", current.user_rating),
                value: DetailAction::Add,
            });
        }
        actions.push(MenuItem { label: "← Back".to_string(), value: DetailAction::Back });

        match selector.select(&actions, "What now?").unwrap_or(DetailAction::Back) {
            DetailAction::Rate => {
                let stars: Vec<MenuItem<u8>> = (1..=MAX_RATING)
                    .map(|n| MenuItem { label: "⭐".repeat(n as usize), value: n })
                    .collect();
                if let Some(rating) = selector.select(&stars, "Your rating") {
                    if let Err(e) = detail.rate(rating) {
                        render::print_error(&e.to_string());
                    }
                }
            }
            DetailAction::Add => match detail.add_to_watchlist(store).await {
                Ok(Some(entry)) => {
                    println!("{} {}", "Added:".green(), entry.title);
                    return Ok(AppState::Watched);
                }
                Ok(None) => {
                    println!("{}", "Already on your list.".yellow());
                    return Ok(AppState::Watched);
                }
                Err(e) => render::print_error(&e.to_string()),
            },
            DetailAction::Back => {
                keys.dispatch(Key::Escape);
                return Ok(AppState::Search);
            }
        }
    }
}
