//! Builds and updates page elements from state.
//!
//! Every function here takes the target element explicitly; looking
//! elements up is the controller's job.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::dom::{ElementHandle, Selector};
use crate::models::{Book, Category, Theme};
use crate::util::truncate_chars;

use super::library::{MyLibrary, Settings};
use super::toast::ToastQueue;

static CATEGORY_ITEM: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[data-category]").expect("Invalid category item selector")
});
static CATEGORY_COUNT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".category-count").expect("Invalid category count selector"));
static SECTION_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-section]").expect("Invalid section link selector"));
static SIMILAR_LIST: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".similar-books").expect("Invalid similar books selector"));

const CARD_DESCRIPTION_CHARS: usize = 120;

pub const ACTIVE_CLASS: &str = "active";
pub const OPEN_CLASS: &str = "open";

pub fn book_card(book: &Book, saved: bool, settings: &Settings) -> ElementHandle {
    let id = book.id.to_string();
    let mut card = ElementHandle::new("article")
        .with_class("book-card")
        .with_attr("data-book-id", &id)
        .with_child(
            ElementHandle::new("img")
                .with_class("book-cover")
                .with_attr("src", &book.cover)
                .with_attr("alt", &book.title),
        )
        .with_child(ElementHandle::new("h3").with_class("book-title").with_text(&book.title))
        .with_child(ElementHandle::new("p").with_class("book-author").with_text(&book.author))
        .with_child(
            ElementHandle::new("span")
                .with_class("book-category")
                .with_text(&book.category),
        )
        .with_child(
            ElementHandle::new("p")
                .with_class("book-description")
                .with_text(&truncate_chars(&book.description, CARD_DESCRIPTION_CHARS)),
        );

    if settings.show_ratings {
        card = card.with_child(
            ElementHandle::new("span")
                .with_class("book-rating")
                .with_text(&format!("★ {:.1}", book.rating)),
        );
    }

    let save = ElementHandle::new("button")
        .with_class("save-book")
        .with_attr("data-book-id", &id)
        .with_text(if saved { "Saved" } else { "Save" });
    if saved {
        save.add_class(ACTIVE_CLASS);
    }
    card.with_child(save)
}

/// Replace the grid's content with one card per book, or an empty-state
/// message.
pub fn render_books(grid: &ElementHandle, books: &[Book], library: &MyLibrary, settings: &Settings) {
    let cards: Vec<ElementHandle> = if books.is_empty() {
        vec![ElementHandle::new("div")
            .with_class("empty-state")
            .with_text("No books found")]
    } else {
        books
            .iter()
            .map(|b| book_card(b, library.contains(b.id), settings))
            .collect()
    };
    grid.replace_children(cards);
}

pub fn render_loading(screen: &ElementHandle, loading: bool) {
    screen.set_hidden(!loading);
}

pub fn render_total(counter: &ElementHandle, total: usize) {
    counter.set_text(&total.to_string());
}

/// Inline error panel, with a retry button when the failure is retryable.
pub fn render_error_panel(grid: &ElementHandle, message: &str, retryable: bool) {
    let mut panel = ElementHandle::new("div")
        .with_class("error-panel")
        .with_attr("role", "alert")
        .with_child(ElementHandle::new("p").with_class("error-message").with_text(message));
    if retryable {
        panel = panel.with_child(
            ElementHandle::new("button")
                .with_id("retryButton")
                .with_attr("data-action", "retry")
                .with_text("Try again"),
        );
    }
    grid.replace_children(vec![panel]);
}

/// Sidebar category list with counters. The active category is marked.
pub fn render_category_list(
    list: &ElementHandle,
    counts: &BTreeMap<Category, usize>,
    active: Category,
) {
    let items = Category::ALL
        .iter()
        .map(|category| {
            let item = ElementHandle::new("li")
                .with_class("category-item")
                .with_attr("data-category", category.as_str())
                .with_child(
                    ElementHandle::new("span")
                        .with_class("category-icon")
                        .with_text(category.icon()),
                )
                .with_child(
                    ElementHandle::new("span")
                        .with_class("category-name")
                        .with_text(category.label()),
                )
                .with_child(
                    ElementHandle::new("span")
                        .with_class("category-count")
                        .with_text(&counts.get(category).copied().unwrap_or(0).to_string()),
                );
            item.toggle_class(ACTIVE_CLASS, *category == active);
            item
        })
        .collect();
    list.replace_children(items);
}

/// Update counters in place; builds the list if it has no items yet.
pub fn render_category_counts(
    list: &ElementHandle,
    counts: &BTreeMap<Category, usize>,
    active: Category,
) {
    let items = list.find_all(&CATEGORY_ITEM);
    if items.is_empty() {
        render_category_list(list, counts, active);
        return;
    }
    for item in items {
        let Some(category) = item
            .attr("data-category")
            .and_then(|c| Category::parse(&c).ok())
        else {
            continue;
        };
        if let Some(counter) = item.find(&CATEGORY_COUNT) {
            counter.set_text(&counts.get(&category).copied().unwrap_or(0).to_string());
        }
    }
}

pub fn mark_active_category(list: &ElementHandle, active: Category) {
    for item in list.find_all(&CATEGORY_ITEM) {
        let is_active = item.attr("data-category").as_deref() == Some(active.as_str());
        item.toggle_class(ACTIVE_CLASS, is_active);
    }
}

pub fn mark_active_section(root: &ElementHandle, section: &str) {
    for link in root.find_all(&SECTION_LINK) {
        let is_active = link.attr("data-section").as_deref() == Some(section);
        link.toggle_class(ACTIVE_CLASS, is_active);
    }
}

/// Modal content fields, keyed like the element cache.
pub struct ModalFields {
    pub overlay: ElementHandle,
    pub title: ElementHandle,
    pub cover: ElementHandle,
    pub author: ElementHandle,
    pub category: ElementHandle,
    pub rating: ElementHandle,
    pub pages: ElementHandle,
    pub description: ElementHandle,
}

pub fn render_modal(fields: &ModalFields, book: &Book, similar: &[Book]) {
    fields.title.set_text(&book.title);
    fields.cover.set_attr("src", &book.cover);
    fields.cover.set_attr("alt", &book.title);
    fields.author.set_text(&book.author);
    fields.category.set_text(&book.category);
    fields.rating.set_text(&format!("★ {:.1}", book.rating));
    fields.pages.set_text(&format!("{} pages", book.pages));
    fields.description.set_text(&book.description);

    let list = match fields.overlay.find(&SIMILAR_LIST) {
        Some(list) => list,
        None => {
            let list = ElementHandle::new("ul").with_class("similar-books");
            fields.overlay.append_child(list.clone());
            list
        }
    };
    list.replace_children(
        similar
            .iter()
            .map(|b| {
                ElementHandle::new("li")
                    .with_class("similar-book")
                    .with_attr("data-book-id", &b.id.to_string())
                    .with_text(&format!("{} ({})", b.title, b.author))
            })
            .collect(),
    );

    fields.overlay.set_hidden(false);
    fields.overlay.add_class(OPEN_CLASS);
}

pub fn hide_modal(overlay: &ElementHandle) {
    overlay.remove_class(OPEN_CLASS);
    overlay.set_hidden(true);
}

pub fn render_sidebar(sidebar: &ElementHandle, open: bool) {
    sidebar.toggle_class(OPEN_CLASS, open);
}

pub fn apply_theme(body: &ElementHandle, icon: &ElementHandle, text: &ElementHandle, theme: Theme) {
    body.set_attr("data-theme", theme.as_str());
    let (toggle_icon, toggle_text) = theme.toggle_label();
    icon.set_text(toggle_icon);
    text.set_text(toggle_text);
}

pub fn render_toasts(container: &ElementHandle, queue: &ToastQueue) {
    container.replace_children(
        queue
            .toasts()
            .map(|toast| {
                ElementHandle::new("div")
                    .with_class("toast")
                    .with_class(&format!("toast-{}", toast.kind.as_str()))
                    .with_attr("data-toast-id", &toast.id.to_string())
                    .with_attr("role", "status")
                    .with_child(
                        ElementHandle::new("span")
                            .with_class("toast-icon")
                            .with_text(toast.icon()),
                    )
                    .with_child(
                        ElementHandle::new("span")
                            .with_class("toast-message")
                            .with_text(&toast.message),
                    )
            })
            .collect(),
    );
}

/// Replace the whole page with a static error screen and a reload button.
pub fn render_fatal_screen(body: &ElementHandle, message: &str) {
    let screen = ElementHandle::new("div")
        .with_id("fatalError")
        .with_class("fatal-error")
        .with_child(ElementHandle::new("h1").with_text("Something went wrong"))
        .with_child(ElementHandle::new("p").with_class("error-message").with_text(message))
        .with_child(
            ElementHandle::new("button")
                .with_id("fatalRetry")
                .with_attr("data-action", "reload")
                .with_text("Reload"),
        );
    body.replace_children(vec![screen]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::ToastKind;
    use crate::search::category_counts;
    use std::time::Duration;

    fn dune() -> Book {
        Book {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            category: "fiction".into(),
            rating: 4.5,
            pages: 412,
            ..Book::default()
        }
    }

    #[test]
    fn test_render_books_and_empty_state() {
        let grid = ElementHandle::new("div");
        render_books(&grid, &[dune()], &MyLibrary::new(), &Settings::default());
        let card = &grid.children()[0];
        assert_eq!(card.attr("data-book-id").as_deref(), Some("1"));
        assert!(card.find(&Selector::parse(".book-rating").unwrap()).is_some());

        render_books(&grid, &[], &MyLibrary::new(), &Settings::default());
        assert!(grid.children()[0].has_class("empty-state"));
    }

    #[test]
    fn test_hidden_ratings() {
        let settings = Settings {
            show_ratings: false,
            ..Settings::default()
        };
        let card = book_card(&dune(), false, &settings);
        assert!(card.find(&Selector::parse(".book-rating").unwrap()).is_none());
    }

    #[test]
    fn test_category_list_counts_and_active() {
        let list = ElementHandle::new("ul");
        let counts = category_counts(&[dune()]);
        render_category_list(&list, &counts, Category::All);
        assert_eq!(list.child_count(), Category::ALL.len());

        mark_active_category(&list, Category::Fiction);
        let active: Vec<String> = list
            .children()
            .iter()
            .filter(|i| i.has_class(ACTIVE_CLASS))
            .filter_map(|i| i.attr("data-category"))
            .collect();
        assert_eq!(active, vec!["fiction"]);

        let counts = category_counts(&[dune(), dune()]);
        render_category_counts(&list, &counts, Category::Fiction);
        let fiction = list
            .find(&Selector::parse("[data-category=fiction] .category-count").unwrap())
            .unwrap();
        assert_eq!(fiction.text(), "2");
    }

    #[test]
    fn test_error_panel_retry_button() {
        let grid = ElementHandle::new("div");
        render_error_panel(&grid, "Network down", true);
        assert!(grid.find(&Selector::parse("#retryButton").unwrap()).is_some());
        render_error_panel(&grid, "Bad data", false);
        assert!(grid.find(&Selector::parse("#retryButton").unwrap()).is_none());
    }

    #[test]
    fn test_toasts() {
        let container = ElementHandle::new("div");
        let mut queue = ToastQueue::new(5, Duration::from_secs(4));
        queue.push(ToastKind::Warning, "Careful");
        render_toasts(&container, &queue);
        assert!(container.children()[0].has_class("toast-warning"));
    }

    #[test]
    fn test_fatal_screen_replaces_body() {
        let body = ElementHandle::new("body").with_child(ElementHandle::new("div").with_id("app"));
        render_fatal_screen(&body, "boom");
        assert_eq!(body.child_count(), 1);
        assert_eq!(body.children()[0].id().as_deref(), Some("fatalError"));
    }
}
