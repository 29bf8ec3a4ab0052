use std::sync::Arc;

use tempfile::tempdir;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::*;
use crate::BookDraft;
use crate::BookFile;
use crate::Error;
use crate::ListenerRegistry;
use crate::ValidationError;

async fn test_catalog() -> (BookCatalog, TempDir) {
    let dir = tempdir().unwrap();
    let store = Arc::new(BookFile::open(dir.path().join("books.json")).await.unwrap());
    let catalog = BookCatalog::new(store, Arc::new(ListenerRegistry::new()));
    (catalog, dir)
}

fn draft(title: &str, author: &str, year: i32, genre: &str, isbn: &str) -> BookDraft {
    BookDraft {
        id: None,
        title: title.to_string(),
        author: author.to_string(),
        publication_year: year,
        genre: genre.to_string(),
        isbn: isbn.to_string(),
    }
}

async fn seed_five(catalog: &BookCatalog) {
    for d in [
        draft("Dune", "Frank Herbert", 1965, "Science Fiction", "isbn-1"),
        draft("The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy", "isbn-2"),
        draft("Neuromancer", "William Gibson", 1984, "Science Fiction", "isbn-3"),
        draft("The Silmarillion", "J.R.R. Tolkien", 1977, "Fantasy", "isbn-4"),
        draft("Hyperion", "Dan Simmons", 1989, "Science Fiction", "isbn-5"),
    ] {
        catalog.upsert(d).await.unwrap();
    }
}

#[tokio::test]
async fn create_then_list_returns_the_record_with_a_positive_id() {
    let (catalog, _dir) = test_catalog().await;

    let outcome = catalog
        .upsert(draft("Dune", "Frank Herbert", 1965, "Science Fiction", "isbn-1"))
        .await
        .unwrap();

    let created = match outcome {
        UpsertOutcome::Created(book) => book,
        other => panic!("expected Created, got {:?}", other),
    };
    assert_eq!(created.id, 1);

    let listed = catalog.list(ListQuery::default()).await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn ids_grow_from_the_current_maximum() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    catalog.delete(5).await.unwrap();
    let outcome = catalog
        .upsert(draft("Ubik", "Philip K. Dick", 1969, "Science Fiction", "isbn-6"))
        .await
        .unwrap();

    // max(1..4) + 1, not "next free slot"
    assert_eq!(outcome.book().id, 5);
}

#[tokio::test]
async fn isbn_match_updates_in_place_preserving_id_and_count() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let outcome = catalog
        .upsert(draft("Dune (Revised)", "Frank Herbert", 1966, "Classics", "isbn-1"))
        .await
        .unwrap();

    let updated = match outcome {
        UpsertOutcome::Updated(book) => book,
        other => panic!("expected Updated, got {:?}", other),
    };
    assert_eq!(updated.id, 1);
    assert_eq!(updated.title, "Dune (Revised)");
    assert_eq!(updated.genre, "Classics");

    let all = catalog.snapshot().await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0], updated);
}

#[tokio::test]
async fn composite_identity_match_updates_even_the_isbn() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let outcome = catalog
        .upsert(draft("The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy", "isbn-fresh"))
        .await
        .unwrap();

    let updated = match outcome {
        UpsertOutcome::Updated(book) => book,
        other => panic!("expected Updated, got {:?}", other),
    };
    assert_eq!(updated.id, 2);
    assert_eq!(updated.isbn, "isbn-fresh");
    assert_eq!(catalog.snapshot().await.unwrap().len(), 5);
}

#[tokio::test]
async fn first_match_in_collection_order_wins_when_both_keys_hit_different_records() {
    // The submitted ISBN matches record 1 while the composite identity
    // matches record 2; scan order picks record 1 and absorbs the collision
    // as an update. Documented first-match-wins semantics, not validation.
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let outcome = catalog
        .upsert(draft("The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy", "isbn-1"))
        .await
        .unwrap();

    let updated = match outcome {
        UpsertOutcome::Updated(book) => book,
        other => panic!("expected Updated, got {:?}", other),
    };
    assert_eq!(updated.id, 1);
    assert_eq!(updated.title, "The Hobbit");
    assert_eq!(catalog.snapshot().await.unwrap().len(), 5);
}

#[tokio::test]
async fn isbn_collision_against_another_record_is_absorbed_by_an_identity_match() {
    // The draft's ISBN belongs to record 3, but its composite identity hits
    // record 2 first in scan order. First-match-wins updates record 2 and
    // silently absorbs the collision, leaving two records sharing isbn-3.
    // This documents the combined-predicate edge rather than tightening it.
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let outcome = catalog
        .upsert(draft("The Hobbit", "J.R.R. Tolkien", 1937, "Fantasy", "isbn-3"))
        .await
        .unwrap();

    let updated = match outcome {
        UpsertOutcome::Updated(book) => book,
        other => panic!("expected Updated, got {:?}", other),
    };
    assert_eq!(updated.id, 2);
    assert_eq!(updated.isbn, "isbn-3");

    let all = catalog.snapshot().await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all.iter().filter(|b| b.isbn == "isbn-3").count(), 2);
}

#[test]
fn business_errors_carry_the_contract_messages() {
    assert_eq!(Error::DuplicateIsbn.to_string(), "ISBN must be unique");
    assert_eq!(Error::BookNotFound.to_string(), "Book not found");
}

#[tokio::test]
async fn year_bounds_are_enforced_before_the_store_is_touched() {
    let (catalog, _dir) = test_catalog().await;
    let now = crate::current_year();

    for bad_year in [1449, now + 1] {
        let result = catalog
            .upsert(draft("X", "Y", bad_year, "Z", "isbn-x"))
            .await;
        match result {
            Err(Error::Validation(ValidationError::YearOutOfRange { year })) => {
                assert_eq!(year, bad_year)
            }
            other => panic!("expected YearOutOfRange, got {:?}", other),
        }
    }
    assert!(catalog.snapshot().await.unwrap().is_empty());

    for good_year in [1450, now] {
        let isbn = format!("isbn-{}", good_year);
        catalog
            .upsert(draft("X", "Y", good_year, "Z", &isbn))
            .await
            .unwrap();
    }
    assert_eq!(catalog.snapshot().await.unwrap().len(), 2);
}

#[tokio::test]
async fn blank_field_fails_validation_without_mutation() {
    let (catalog, _dir) = test_catalog().await;

    let result = catalog.upsert(draft("  ", "Y", 2000, "Z", "isbn-x")).await;

    match result {
        Err(Error::Validation(ValidationError::FieldRequired { field: "title" })) => {}
        other => panic!("expected FieldRequired(title), got {:?}", other),
    }
    assert!(catalog.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_exactly_the_target_record() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let removed = catalog.delete(3).await.unwrap();
    assert_eq!(removed.title, "Neuromancer");

    let remaining = catalog.snapshot().await.unwrap();
    assert_eq!(remaining.len(), 4);
    assert!(remaining.iter().all(|b| b.id != 3));
}

#[tokio::test]
async fn delete_of_a_nonexistent_id_fails_with_not_found() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    match catalog.delete(42).await {
        Err(Error::BookNotFound) => {}
        other => panic!("expected BookNotFound, got {:?}", other),
    }
    assert_eq!(catalog.snapshot().await.unwrap().len(), 5);
}

#[tokio::test]
async fn genre_filter_is_case_insensitive_exact_match() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let fantasy = catalog
        .list(ListQuery::default().with_genre("fantasy"))
        .await
        .unwrap();

    assert_eq!(fantasy.len(), 2);
    assert!(fantasy.iter().all(|b| b.genre == "Fantasy"));
}

#[tokio::test]
async fn empty_filter_values_are_treated_as_no_filter() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let all = catalog
        .list(ListQuery::default().with_genre("").with_author(""))
        .await
        .unwrap();

    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn author_filter_is_case_insensitive_exact_match() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let tolkien = catalog
        .list(ListQuery::default().with_author("j.r.r. tolkien"))
        .await
        .unwrap();

    assert_eq!(tolkien.len(), 2);
    assert!(tolkien.iter().all(|b| b.author == "J.R.R. Tolkien"));
}

#[tokio::test]
async fn sort_by_publication_year_is_non_decreasing() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let sorted = catalog
        .list(ListQuery::default().sorted_by(SortField::PublicationYear))
        .await
        .unwrap();

    let years: Vec<i32> = sorted.iter().map(|b| b.publication_year).collect();
    assert_eq!(years, vec![1937, 1965, 1977, 1984, 1989]);
}

#[tokio::test]
async fn sort_by_title_is_lexical() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let sorted = catalog
        .list(ListQuery::default().sorted_by(SortField::Title))
        .await
        .unwrap();

    let titles: Vec<&str> = sorted.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Dune", "Hyperion", "Neuromancer", "The Hobbit", "The Silmarillion"]
    );
}

#[tokio::test]
async fn skip_and_limit_slice_the_sorted_sequence() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let page = catalog
        .list(
            ListQuery::default()
                .sorted_by(SortField::PublicationYear)
                .with_skip(2)
                .with_limit(2),
        )
        .await
        .unwrap();

    let years: Vec<i32> = page.iter().map(|b| b.publication_year).collect();
    assert_eq!(years, vec![1977, 1984]);
}

#[tokio::test]
async fn out_of_range_pagination_yields_fewer_or_zero_results() {
    let (catalog, _dir) = test_catalog().await;
    seed_five(&catalog).await;

    let tail = catalog
        .list(ListQuery::default().with_skip(4).with_limit(10))
        .await
        .unwrap();
    assert_eq!(tail.len(), 1);

    let past_end = catalog
        .list(ListQuery::default().with_skip(100))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn default_limit_caps_the_page_at_ten() {
    let (catalog, _dir) = test_catalog().await;
    for i in 0..12 {
        let isbn = format!("isbn-{}", i);
        let title = format!("Book {}", i);
        catalog
            .upsert(draft(&title, "A", 2000, "G", &isbn))
            .await
            .unwrap();
    }

    let listed = catalog.list(ListQuery::default()).await.unwrap();
    assert_eq!(listed.len(), 10);
}

#[tokio::test]
async fn every_mutation_broadcasts_a_snapshot_matching_list_all() {
    let dir = tempdir().unwrap();
    let store = Arc::new(BookFile::open(dir.path().join("books.json")).await.unwrap());
    let listeners = Arc::new(ListenerRegistry::new());
    let catalog = BookCatalog::new(store, listeners.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    listeners.register(tx);

    catalog
        .upsert(draft("Dune", "Frank Herbert", 1965, "Science Fiction", "isbn-1"))
        .await
        .unwrap();
    let after_create: Vec<crate::Book> =
        serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(after_create, catalog.snapshot().await.unwrap());

    catalog
        .upsert(draft("Dune", "Frank Herbert", 1965, "Classics", "isbn-1"))
        .await
        .unwrap();
    let after_update: Vec<crate::Book> =
        serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(after_update[0].genre, "Classics");

    catalog.delete(1).await.unwrap();
    let after_delete: Vec<crate::Book> =
        serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert!(after_delete.is_empty());
}

#[tokio::test]
async fn list_does_not_broadcast() {
    let dir = tempdir().unwrap();
    let store = Arc::new(BookFile::open(dir.path().join("books.json")).await.unwrap());
    let listeners = Arc::new(ListenerRegistry::new());
    let catalog = BookCatalog::new(store, listeners.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    listeners.register(tx);

    catalog.list(ListQuery::default()).await.unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_validation_does_not_broadcast() {
    let dir = tempdir().unwrap();
    let store = Arc::new(BookFile::open(dir.path().join("books.json")).await.unwrap());
    let listeners = Arc::new(ListenerRegistry::new());
    let catalog = BookCatalog::new(store, listeners.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    listeners.register(tx);

    let _ = catalog.upsert(draft("", "Y", 2000, "Z", "isbn-x")).await;

    assert!(rx.try_recv().is_err());
}
