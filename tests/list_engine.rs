//! Integration tests for the partner list engine: filter/sort properties and
//! per-page state surviving a restart through the preference store.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cmp::Ordering;

use retroflix::config::Config;
use retroflix::content::PartnerItem;
use retroflix::listing::{
    apply_filters_and_sort, apply_writes, compare_names, ListAction, ListRender, ListState,
    PageType, SortMethod, ViewMode,
};
use retroflix::preferences::{PreferenceManager, PreferenceStore};
use retroflix::storage::Database;

fn item(id: usize, name: &str) -> PartnerItem {
    PartnerItem {
        id: id.to_string(),
        name: name.to_string(),
        category: String::new(),
        logo_url: String::new(),
        link: String::new(),
        description: String::new(),
    }
}

fn items_from(names: &[String]) -> Vec<PartnerItem> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| item(i, name))
        .collect()
}

fn sort_strategy() -> impl Strategy<Value = SortMethod> {
    prop_oneof![Just(SortMethod::Az), Just(SortMethod::Za)]
}

// ============================================================================
// Filter & Sort Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_result_is_subset_matching_term(
        names in prop::collection::vec("[a-zA-Z ]{0,12}", 0..24),
        term in "[a-zA-Z]{0,3}",
        sort in sort_strategy(),
    ) {
        let items = items_from(&names);
        let visible = apply_filters_and_sort(&items, &term, sort);

        prop_assert!(visible.len() <= items.len());
        let needle = term.to_lowercase();
        for entry in &visible {
            prop_assert!(items.iter().any(|i| i.id == entry.id));
            prop_assert!(entry.name.to_lowercase().contains(&needle));
        }
        let expected = items
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(visible.len(), expected);
    }

    #[test]
    fn prop_result_is_ordered(
        names in prop::collection::vec("[a-zA-Z]{0,8}", 0..24),
        sort in sort_strategy(),
    ) {
        let items = items_from(&names);
        let visible = apply_filters_and_sort(&items, "", sort);

        for pair in visible.windows(2) {
            let ord = compare_names(&pair[0].name, &pair[1].name);
            match sort {
                SortMethod::Az => prop_assert_ne!(ord, Ordering::Greater),
                SortMethod::Za => prop_assert_ne!(ord, Ordering::Less),
            }
        }
    }

    #[test]
    fn prop_filter_and_sort_is_idempotent(
        names in prop::collection::vec("[a-zA-Z]{0,8}", 0..24),
        term in "[a-z]{0,2}",
        sort in sort_strategy(),
    ) {
        let items = items_from(&names);
        let once: Vec<PartnerItem> = apply_filters_and_sort(&items, &term, sort)
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<PartnerItem> = apply_filters_and_sort(&once, &term, sort)
            .into_iter()
            .cloned()
            .collect();
        prop_assert_eq!(once, twice);
    }
}

#[test]
fn test_za_reverses_az() {
    let items = items_from(&[
        "Zee TV".to_string(),
        "colors".to_string(),
        "Colors".to_string(),
        "Aaj Tak".to_string(),
    ]);

    let az: Vec<&str> = apply_filters_and_sort(&items, "", SortMethod::Az)
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    let mut za: Vec<&str> = apply_filters_and_sort(&items, "", SortMethod::Za)
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    za.reverse();

    assert_eq!(az, vec!["Aaj Tak", "Colors", "colors", "Zee TV"]);
    assert_eq!(az, za);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_list_state_survives_restart() {
    let db = Database::open(":memory:").await.unwrap();
    let config = Config::default();

    {
        let mut prefs = PreferenceManager::load(&config, &db).await.unwrap();
        let state = ListState::enter(PageType::Ott, &prefs);

        let (state, render, writes) = state.reduce(ListAction::SetSearch("net".to_string()));
        assert_eq!(render, ListRender::Rebuild);
        apply_writes(&mut prefs, &writes);

        let (state, _, writes) = state.reduce(ListAction::SetSort(SortMethod::Za));
        apply_writes(&mut prefs, &writes);

        let (_, _, writes) = state.reduce(ListAction::SetViewMode(ViewMode::Grid));
        apply_writes(&mut prefs, &writes);

        prefs.flush().await.unwrap();
    }

    let prefs = PreferenceManager::load(&config, &db).await.unwrap();
    let ott = ListState::enter(PageType::Ott, &prefs);
    assert_eq!(ott.search_term, "net");
    assert_eq!(ott.sort, SortMethod::Za);
    assert_eq!(ott.view_mode, ViewMode::Grid);

    // Search and sort are per page; the layout is shared
    let tv = ListState::enter(PageType::LiveTv, &prefs);
    assert_eq!(tv.search_term, "");
    assert_eq!(tv.sort, SortMethod::Az);
    assert_eq!(tv.view_mode, ViewMode::Grid);
    assert_eq!(prefs.get("viewPreference").as_deref(), Some("grid"));
}

#[test]
fn test_same_view_mode_writes_nothing() {
    let prefs = PreferenceManager::in_memory();
    let state = ListState::enter(PageType::LiveTv, &prefs);

    let (_, render, writes) = state.reduce(ListAction::SetViewMode(ViewMode::List));

    assert_eq!(render, ListRender::Unchanged);
    assert!(writes.is_empty());
}
