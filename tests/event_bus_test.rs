//! Event bus wiring between the state store and the search manager, and
//! bus behaviour under concurrent publishers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use libris::config::LibraryConfig;
use libris::event_bus::{AppEvent, EventBus, EventName, HandlerError};
use libris::models::{Book, Category};
use libris::search::SearchManager;
use libris::state::{StateKey, StateStore};

fn books() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            category: "fiction".to_string(),
            ..Book::default()
        },
        Book {
            id: 2,
            title: "Cosmos".to_string(),
            author: "Carl Sagan".to_string(),
            category: "science".to_string(),
            ..Book::default()
        },
    ]
}

fn wired() -> (EventBus, StateStore, SearchManager) {
    let config = LibraryConfig::default();
    let bus = EventBus::new(config.bus.clone());
    let store = StateStore::new(bus.clone(), &config.performance);
    let search = SearchManager::new(bus.clone(), store.clone(), &config, None);
    search.initialize();
    (bus, store, search)
}

#[test]
fn test_loading_books_reindexes_search() {
    let (bus, store, _search) = wired();
    let counts = Arc::new(Mutex::new(None));
    let seen = counts.clone();
    bus.subscribe(EventName::CategoriesStatsUpdated, move |event| {
        if let AppEvent::CategoriesStatsUpdated { counts } = event {
            *seen.lock().unwrap() = Some(counts.clone());
        }
        Ok(())
    });

    store.set_books_data(books());

    let counts = counts.lock().unwrap().clone().expect("stats not published");
    assert_eq!(counts.get(&Category::Science), Some(&1));
    assert_eq!(counts.get(&Category::All), Some(&2));
    assert_eq!(store.filtered_books().len(), 2);
}

#[test]
fn test_query_event_drives_filtered_state() {
    let (bus, store, search) = wired();
    store.set_books_data(books());

    let changes = Arc::new(AtomicUsize::new(0));
    let c = changes.clone();
    let _sub = store.subscribe(&[StateKey::FilteredBooks], move |_, state| {
        c.fetch_add(1, Ordering::SeqCst);
        assert!(state.filtered_books.len() <= state.books.len());
        Ok(())
    });

    bus.publish(AppEvent::SearchQueryChanged {
        query: "sagan".to_string(),
        submit: true,
    });
    assert_eq!(store.search_term(), "sagan");
    assert_eq!(store.filtered_books()[0].id, 2);
    assert_eq!(search.history(), vec!["sagan"]);

    bus.publish(AppEvent::SearchQueryCleared);
    assert_eq!(store.filtered_books().len(), 2);
    assert_eq!(changes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failing_state_listener_is_isolated() {
    let (bus, store, _search) = wired();
    let _bad = store.subscribe(&[StateKey::Books], |_, _| Err(HandlerError::new("boom")));
    let loaded = Arc::new(AtomicUsize::new(0));
    let l = loaded.clone();
    bus.subscribe(EventName::BooksLoaded, move |_| {
        l.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    store.set_books_data(books());
    assert_eq!(loaded.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_publishers() {
    let bus = EventBus::default();
    let received = Arc::new(AtomicUsize::new(0));
    let r = received.clone();
    bus.subscribe(EventName::BooksFiltered, move |_| {
        r.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let bus = bus.clone();
            std::thread::spawn(move || {
                for n in 0..50 {
                    bus.publish(AppEvent::BooksFiltered {
                        count: n,
                        total: i,
                    });
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(received.load(Ordering::SeqCst), 400);
    assert_eq!(bus.stats().event_counts.get("books:filtered"), Some(&400));
}

#[tokio::test]
async fn test_wait_for_event_from_background_task() {
    let (bus, store, _search) = wired();
    let publisher = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        publisher.set_books_data(books());
    });

    let event = bus
        .wait_for(EventName::BooksFiltered, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(event, AppEvent::BooksFiltered { count: 2, total: 2 });
}
