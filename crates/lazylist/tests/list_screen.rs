//! End-to-end tests of a list screen wired to in-memory collaborators.

mod common;

use std::time::Duration;

use lazylist::{
    Cursor, EventBus, FetchOutcome, ListConfig, ListEvent, ListItem, ListScreen, MediaKey, Page,
    SearchPhase, SearchQuery,
};

use common::{NameSearch, PrefixSigner, QueuedPages, id, item};

fn person(n: usize, name: &str, media: Option<&str>) -> ListItem {
    let item = item(&format!("u{n}")).with_display_name(name);
    match media {
        Some(key) => item.with_media(MediaKey::new(key).unwrap()),
        None => item,
    }
}

fn people() -> Vec<ListItem> {
    vec![
        person(1, "Dr. Asha Rao", Some("avatars/u1.png")),
        person(2, "Vikram Mehta", None),
        person(3, "Priya Nair", Some("broken/u3.png")),
        person(4, "Asha Kulkarni", Some("avatars/u4.png")),
    ]
}

fn screen() -> ListScreen<QueuedPages, NameSearch, PrefixSigner> {
    let pages = vec![
        Page::new(people()[..2].to_vec(), Some(Cursor::token("abc"))),
        Page::new(people()[2..].to_vec(), None),
    ];
    ListScreen::new(
        QueuedPages::new(pages),
        NameSearch::new(people()),
        PrefixSigner,
        &ListConfig::default(),
    )
    .unwrap()
}

// ============================================================================
// Paging and media
// ============================================================================

#[tokio::test]
async fn test_scroll_through_directory() {
    let screen = screen();

    let first = screen.load_more().await.unwrap();
    assert!(matches!(first, FetchOutcome::Fetched { added: 2, .. }));
    assert_eq!(screen.cache().cursor(), Some(Cursor::token("abc")));

    screen.load_more().await.unwrap();
    assert!(!screen.cache().has_more());
    assert_eq!(screen.rows().len(), 4);

    let visible: Vec<_> = screen.rows().iter().map(|r| r.item.id.clone()).collect();
    screen.on_viewable_items_changed(&visible).await;

    let rows = screen.rows();
    assert_eq!(
        rows[0].media.as_ref().and_then(|m| m.url()),
        Some("https://media.test/avatars/u1.png?token=t")
    );

    let Some(lazylist::ResolvedMedia::Placeholder(vikram)) = &rows[1].media else {
        panic!("expected placeholder for an item without media");
    };
    assert_eq!(vikram.initials, "VM");

    // A signing failure degrades to a placeholder.
    let Some(lazylist::ResolvedMedia::Placeholder(priya)) = &rows[2].media else {
        panic!("expected placeholder after signing failure");
    };
    assert_eq!(priya.initials, "PN");
}

// ============================================================================
// Search overlay
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_typing_a_search_replaces_then_restores_list() {
    let screen = screen();
    screen.load_more().await.unwrap();

    for prefix in ["a", "as", "ash", "asha"] {
        screen.search_input(SearchQuery::text(prefix));
        tokio::time::sleep(Duration::from_millis(80)).await;
    }
    assert_eq!(screen.overlay().phase(), SearchPhase::Debouncing);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let names: Vec<_> = screen
        .rows()
        .iter()
        .map(|r| r.item.fallback_name().to_string())
        .collect();
    assert_eq!(names, ["Dr. Asha Rao", "Asha Kulkarni"]);

    screen.search_input(SearchQuery::text(""));
    assert_eq!(screen.overlay().phase(), SearchPhase::Idle);
    assert_eq!(screen.rows().len(), 2);
}

// ============================================================================
// Realtime
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_realtime_patches_while_paging() {
    let screen = screen();
    let bus = EventBus::new();
    screen.attach_realtime(&bus).unwrap();
    screen.load_more().await.unwrap();

    bus.publish(ListEvent::Created(person(9, "New Member", None)));
    bus.publish(ListEvent::Updated(person(2, "Vikram M.", None)));
    bus.publish(ListEvent::Created(people()[2].clone()));
    tokio::time::sleep(Duration::from_millis(5)).await;

    // u3 arrived by realtime first; the next page must not duplicate it.
    screen.load_more().await.unwrap();

    let ids: Vec<_> = screen.rows().iter().map(|r| r.item.id.to_string()).collect();
    assert_eq!(ids, ["u3", "u9", "u1", "u2", "u4"]);
    assert_eq!(
        screen.cache().get(&id("u2")).unwrap().display_name.as_deref(),
        Some("Vikram M.")
    );

    bus.publish(ListEvent::Deleted(id("u9")));
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(screen.rows().len(), 4);
}
