//! HTTP routes.
//!
//! | Operation | Route                | Success                        |
//! |-----------|----------------------|--------------------------------|
//! | Upsert    | `POST /book`         | 201 created / 200 updated      |
//! | List      | `GET /books`         | 200 JSON array                 |
//! | Delete    | `DELETE /book/{id}`  | 200 with the removed record    |
//! | Subscribe | `GET /ws/books`      | WebSocket snapshot stream      |

use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use warp::http::StatusCode;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

use super::rejections::handle_rejection;
use super::rejections::reject;
use super::ws::listener_session;
use crate::Book;
use crate::BookCatalog;
use crate::BookDraft;
use crate::ListQuery;
use crate::UpsertOutcome;

#[derive(Serialize)]
struct BookReply {
    message: &'static str,
    book: Book,
}

/// Builds the complete route tree, rejection handling included.
pub fn routes(
    catalog: Arc<BookCatalog>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let upsert = warp::path!("book")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_catalog(catalog.clone()))
        .and_then(upsert_book);

    let list = warp::path!("books")
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(with_catalog(catalog.clone()))
        .and_then(list_books);

    let delete = warp::path!("book" / u64)
        .and(warp::delete())
        .and(with_catalog(catalog.clone()))
        .and_then(delete_book);

    let subscribe = warp::path!("ws" / "books")
        .and(warp::ws())
        .and(with_catalog(catalog))
        .map(|ws: warp::ws::Ws, catalog: Arc<BookCatalog>| {
            ws.on_upgrade(move |socket| listener_session(socket, catalog))
        });

    upsert
        .or(list)
        .or(delete)
        .or(subscribe)
        .recover(handle_rejection)
}

fn with_catalog(
    catalog: Arc<BookCatalog>,
) -> impl Filter<Extract = (Arc<BookCatalog>,), Error = Infallible> + Clone {
    warp::any().map(move || catalog.clone())
}

async fn upsert_book(
    draft: BookDraft,
    catalog: Arc<BookCatalog>,
) -> std::result::Result<impl Reply, Rejection> {
    match catalog.upsert(draft).await {
        Ok(UpsertOutcome::Created(book)) => Ok(warp::reply::with_status(
            warp::reply::json(&BookReply {
                message: "Book created",
                book,
            }),
            StatusCode::CREATED,
        )),
        Ok(UpsertOutcome::Updated(book)) => Ok(warp::reply::with_status(
            warp::reply::json(&BookReply {
                message: "Book updated",
                book,
            }),
            StatusCode::OK,
        )),
        Err(e) => Err(reject(e)),
    }
}

async fn list_books(
    query: ListQuery,
    catalog: Arc<BookCatalog>,
) -> std::result::Result<impl Reply, Rejection> {
    match catalog.list(query).await {
        Ok(books) => Ok(warp::reply::json(&books)),
        Err(e) => Err(reject(e)),
    }
}

async fn delete_book(
    book_id: u64,
    catalog: Arc<BookCatalog>,
) -> std::result::Result<impl Reply, Rejection> {
    match catalog.delete(book_id).await {
        Ok(book) => Ok(warp::reply::json(&BookReply {
            message: "Book deleted",
            book,
        })),
        Err(e) => Err(reject(e)),
    }
}
