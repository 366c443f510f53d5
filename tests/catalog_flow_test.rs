//! End-to-end tests: the catalog client running against a live server.

mod common;

use std::sync::Arc;

use common::{client_config, public_dir, sample_catalog, start_server, write_metadata};
use libris::adapters::{InMemoryStore, ReqwestHttpClient};
use libris::app::LibraryApp;
use libris::dom::{MemoryDocument, Selector};
use libris::event_bus::{AppEvent, EventName};
use libris::models::Category;
use libris::search::ExportFormat;
use libris::traits::Document;
use libris::ui::{DomEvent, LIBRARY_SECTION};

fn book_ids(books: &[libris::models::Book]) -> Vec<i64> {
    books.iter().map(|b| b.id).collect()
}

struct Harness {
    app: LibraryApp<ReqwestHttpClient>,
    document: Arc<MemoryDocument>,
    storage: Arc<InMemoryStore>,
}

async fn harness(addr: std::net::SocketAddr) -> Harness {
    let config = client_config(addr);
    let document = Arc::new(MemoryDocument::library_page(&config.dom));
    let storage = Arc::new(InMemoryStore::new());
    let app = LibraryApp::new(
        config,
        ReqwestHttpClient::new(),
        Some(storage.clone()),
        document.clone(),
    );
    app.start().await.expect("App failed to start");
    Harness {
        app,
        document,
        storage,
    }
}

#[tokio::test]
async fn test_catalog_renders_after_start() {
    let dir = public_dir(Some(&sample_catalog().to_string()));
    let (handle, addr) = start_server(dir.path()).await;
    let h = harness(addr).await;

    assert_eq!(h.app.store().books().len(), 6);
    let cards = h
        .document
        .body()
        .find_all(&Selector::parse("#booksGrid .book-card").unwrap());
    assert_eq!(cards.len(), 6);
    let total = h
        .document
        .body()
        .find(&Selector::parse("#totalBooksCount").unwrap())
        .unwrap();
    assert_eq!(total.text(), "6");

    h.app.shutdown();
    handle.abort();
}

#[tokio::test]
async fn test_search_and_category_filtering() {
    let dir = public_dir(Some(&sample_catalog().to_string()));
    let (handle, addr) = start_server(dir.path()).await;
    let h = harness(addr).await;
    let ui = h.app.ui();

    ui.handle_dom_event(DomEvent::CategoryClick {
        category: "science".to_string(),
    });
    assert_eq!(h.app.store().current_category(), Category::Science);
    assert_eq!(book_ids(&h.app.store().filtered_books()), vec![2, 3]);

    ui.handle_dom_event(DomEvent::SearchSubmit {
        value: "black holes".to_string(),
    });
    assert_eq!(book_ids(&h.app.store().filtered_books()), vec![3]);

    // Every result satisfies the active category
    assert!(h
        .app
        .store()
        .filtered_books()
        .iter()
        .all(|b| b.category == "science"));

    ui.handle_dom_event(DomEvent::SearchClear);
    ui.handle_dom_event(DomEvent::CategoryClick {
        category: "all".to_string(),
    });
    assert_eq!(h.app.store().filtered_books().len(), 6);

    // Unsupported categories are rejected and leave the view alone
    ui.handle_dom_event(DomEvent::CategoryClick {
        category: "poetry".to_string(),
    });
    assert_eq!(h.app.store().current_category(), Category::All);
    assert!(ui.toast_count() >= 1);

    assert_eq!(h.app.search().history(), vec!["black holes"]);
    assert!(h.storage.peek("searchHistory").is_some());

    h.app.shutdown();
    handle.abort();
}

#[tokio::test]
async fn test_modal_and_saved_books() {
    let dir = public_dir(Some(&sample_catalog().to_string()));
    let (handle, addr) = start_server(dir.path()).await;
    let h = harness(addr).await;
    let ui = h.app.ui();

    ui.handle_dom_event(DomEvent::BookClick { book_id: 2 });
    assert!(h.app.store().is_modal_open());
    assert_eq!(h.app.store().selected_book().map(|b| b.id), Some(2));

    ui.handle_dom_event(DomEvent::KeyDown {
        key: "Escape".to_string(),
    });
    assert!(!h.app.store().is_modal_open());
    assert!(h.app.store().selected_book().is_none());

    ui.handle_dom_event(DomEvent::SaveBookClick { book_id: 4 });
    ui.handle_dom_event(DomEvent::NavClick {
        section: LIBRARY_SECTION.to_string(),
    });
    assert_eq!(book_ids(&ui.visible_books()), vec![4]);
    assert_eq!(h.storage.peek("myLibrary").as_deref(), Some("[4]"));

    h.app.shutdown();
    handle.abort();
}

#[tokio::test]
async fn test_missing_metadata_then_retry() {
    let dir = public_dir(None);
    let (handle, addr) = start_server(dir.path()).await;
    let h = harness(addr).await;

    // 404 is not retryable, so the panel has no retry button
    assert!(h.app.store().has_error());
    assert!(h
        .document
        .body()
        .find(&Selector::parse("#booksGrid .error-panel").unwrap())
        .is_some());

    write_metadata(dir.path(), &sample_catalog().to_string());
    let bus = h.app.bus().clone();
    let waiter = tokio::spawn(async move {
        bus.wait_for(EventName::BooksLoaded, std::time::Duration::from_secs(5))
            .await
    });
    tokio::task::yield_now().await;
    h.app.bus().publish(AppEvent::FetchBooksRequested);

    let event = waiter.await.unwrap().unwrap();
    assert_eq!(event, AppEvent::BooksLoaded { count: 6 });
    assert!(!h.app.store().has_error());

    h.app.shutdown();
    handle.abort();
}

#[tokio::test]
async fn test_stats_similar_and_export() {
    let dir = public_dir(Some(&sample_catalog().to_string()));
    let (handle, addr) = start_server(dir.path()).await;
    let h = harness(addr).await;
    let search = h.app.search();

    let stats = search.stats();
    assert_eq!(stats.total_books, 6);
    assert_eq!(stats.category_counts.get(&Category::Science), Some(&2));
    assert_eq!(stats.rating.highest.map(|b| b.id), Some(6));
    assert_eq!(stats.pages.shortest.map(|b| b.id), Some(6));

    let similar = search.similar_books(2);
    assert!(similar.iter().all(|b| b.id != 2));
    assert_eq!(similar.first().map(|b| b.id), Some(3));

    let csv = search.export(ExportFormat::Csv).unwrap();
    assert!(csv.starts_with("ID,Title,Author,Category,Rating,Pages,Language"));
    assert_eq!(csv.lines().count(), 7);

    h.app.shutdown();
    handle.abort();
}
