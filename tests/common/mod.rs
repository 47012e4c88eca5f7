//! In-process stand-in for the CMS backend.
//!
//! Behaviour worth knowing when writing tests against it:
//! - admin routes require `Authorization: Bearer test-token`
//! - creating a post with a blank title is rejected with field details
//! - creating a post titled `no id` answers 2xx without an `_id`
//! - creating a post titled `unpopulated` answers with raw reference ids
//!   for `author` and `categories`
//! - uploading a file named `huge.jpg` is rejected with `file too large`
//! - updating post `missing` answers 404
//! - fetching post slug `nope` answers 404 with a plain-text body

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub route: String,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Seen>>>);

impl Recorder {
    fn push(&self, route: impl Into<String>, body: Value) {
        self.0.lock().unwrap().push(Seen {
            route: route.into(),
            body,
        });
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.0.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<String> {
        self.seen().into_iter().map(|s| s.route).collect()
    }

    pub fn last(&self, route: &str) -> Option<Value> {
        self.seen()
            .into_iter()
            .rev()
            .find(|s| s.route == route)
            .map(|s| s.body)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "error": "Not authorized, token failed" })),
    )
        .into_response()
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn post_json(id: &str, title: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "author": { "firstName": "Ada", "lastName": "Obi" },
        "status": "draft"
    })
}

async fn create_post(State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push("POST /admin/blog/posts", body.clone());
    let title = body["title"].as_str().unwrap_or_default();
    if title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Validation failed",
                "details": [{ "field": "title", "message": "required", "value": "" }]
            })),
        )
            .into_response();
    }
    if title == "unpopulated" {
        let mut post = post_json("post_9", title);
        post["author"] = json!("64ab12");
        post["categories"] = json!(["cat_1"]);
        return (StatusCode::CREATED, Json(json!({ "success": true, "data": post })))
            .into_response();
    }
    if title == "no id" {
        return (StatusCode::CREATED, Json(json!({ "success": true, "data": { "title": title } })))
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": post_json("post_123", title) })),
    )
        .into_response()
}

async fn update_post(
    State(rec): State<Recorder>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push(format!("PUT /admin/blog/posts/{id}"), body.clone());
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Blog post not found" })),
        )
            .into_response();
    }
    let mut post = post_json(&id, "Updated");
    if let Some(url) = body.get("featuredImage") {
        post["featuredImage"] = url.clone();
    }
    ok(post)
}

async fn delete_post(State(rec): State<Recorder>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push(format!("DELETE /admin/blog/posts/{id}"), Value::Null);
    Json(json!({ "success": true, "message": "Blog post deleted successfully" })).into_response()
}

async fn list_admin_posts(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push("GET /admin/blog/posts", json!(query));
    ok(json!({
        "posts": [post_json("post_1", "Draft one"), post_json("post_2", "Draft two")],
        "pagination": {
            "currentPage": 1, "totalPages": 1, "totalPosts": 2,
            "hasNextPage": false, "hasPrevPage": false, "limit": 10
        }
    }))
}

async fn upload_image(State(rec): State<Recorder>, headers: HeaderMap, body: Bytes) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let text = String::from_utf8_lossy(&body).to_string();
    rec.push("POST /upload/image", Value::String(text.clone()));
    if text.contains("filename=\"huge.jpg\"") {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({ "success": false, "error": "file too large" })),
        )
            .into_response();
    }
    let mut files = Vec::new();
    for name in ["cover.jpg", "second.png"] {
        if text.contains(&format!("name=\"images\"; filename=\"{name}\"")) {
            files.push(json!({
                "url": format!("https://cdn.example.com/blog/{name}"),
                "publicId": format!("blog/{name}"),
                "filename": name
            }));
        }
    }
    ok(json!({ "files": files }))
}

async fn list_files(State(rec): State<Recorder>, headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push("GET /upload/files", json!(query));
    ok(json!({
        "files": [{ "url": "https://cdn.example.com/blog/cover.jpg", "publicId": "blog/cover.jpg" }],
        "pagination": { "currentPage": 1, "totalPages": 1 }
    }))
}

async fn delete_file(State(rec): State<Recorder>, Path(public_id): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push("DELETE /upload/{public_id}", Value::String(public_id));
    Json(json!({ "success": true, "data": { "message": "File deleted" } })).into_response()
}

async fn featured_image(
    State(rec): State<Recorder>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push(format!("PUT /upload/blog/{id}/featured-image"), body.clone());
    let mut post = post_json(&id, "Featured");
    post["featuredImage"] = body["imageUrl"].clone();
    ok(post)
}

async fn create_category(State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push("POST /admin/blog/categories", body.clone());
    let name = body["name"].as_str().unwrap_or_default();
    ok(json!({
        "_id": "cat_1",
        "name": name,
        "slug": name.to_lowercase(),
        "color": body["color"],
        "createdAt": "2024-05-01T10:00:00.000Z"
    }))
}

async fn update_category(
    State(rec): State<Recorder>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push(format!("PUT /admin/blog/categories/{id}"), body.clone());
    ok(json!({ "_id": id, "name": body["name"], "slug": "renamed", "color": "#3B82F6" }))
}

async fn delete_category(State(rec): State<Recorder>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push(format!("DELETE /admin/blog/categories/{id}"), Value::Null);
    Json(json!({ "success": true, "message": "Category deleted" })).into_response()
}

async fn public_posts(State(rec): State<Recorder>, Query(query): Query<HashMap<String, String>>) -> Response {
    rec.push("GET /blog/posts", json!(query));
    ok(json!({
        "posts": [post_json("post_1", "Buying in Ikoyi")],
        "pagination": { "page": 1, "totalPages": 4 }
    }))
}

async fn public_post(State(rec): State<Recorder>, Path(slug): Path<String>) -> Response {
    rec.push(format!("GET /blog/posts/{slug}"), Value::Null);
    if slug == "nope" {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    let mut post = post_json("post_1", "Buying in Ikoyi");
    post["content"] = json!("<p>Full article</p>");
    ok(post)
}

async fn posts_by_category(
    State(rec): State<Recorder>,
    Path(slug): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    rec.push(format!("GET /blog/posts/category/{slug}"), json!(query));
    ok(json!({ "posts": [], "pagination": { "page": 2, "totalPages": 2 } }))
}

async fn public_categories() -> Response {
    ok(json!([
        { "_id": "cat_1", "name": "Market", "slug": "market", "color": "#3B82F6", "createdAt": "2024-01-01" },
        { "_id": "cat_2", "name": "Legal", "slug": "legal", "color": "#10B981", "createdAt": "2024-01-02" }
    ]))
}

async fn dashboard_stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({
        "blog": { "total": 12, "published": 9, "draft": 3 },
        "submissions": { "total": 20, "new": 4 },
        "newsletter": { "total": 150, "active": 142 }
    }))
}

async fn submissions(State(rec): State<Recorder>, headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    rec.push("GET /admin/submissions", json!(query));
    ok(json!({
        "submissions": [{
            "_id": "sub_1", "name": "Tunde", "email": "tunde@example.com",
            "subject": "Viewing", "message": "Is the Lekki flat still available?",
            "status": "new", "assignedTo": null, "createdAt": "2024-05-01T10:00:00Z"
        }],
        "pagination": {
            "currentPage": 2, "totalPages": 3, "totalSubmissions": 21,
            "hasNextPage": true, "hasPrevPage": true, "limit": 10
        }
    }))
}

async fn subscribers(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({
        "subscribers": [{ "_id": "n_1", "email": "a@b.co", "isActive": true }],
        "pagination": { "currentPage": 1, "totalPages": 1, "totalSubscribers": 1 }
    }))
}

async fn newsletter(State(rec): State<Recorder>, Json(body): Json<Value>) -> Response {
    rec.push("POST /newsletter/subscribe", body.clone());
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "message": "Email already subscribed" })),
        )
            .into_response();
    }
    Json(json!({ "success": true, "data": { "email": body["email"] } })).into_response()
}

async fn contact(State(rec): State<Recorder>, Json(body): Json<Value>) -> Response {
    rec.push("POST /contact/submit", body);
    Json(json!({ "success": true, "message": "Message received", "data": { "id": "sub_9" } }))
        .into_response()
}

pub fn router(recorder: Recorder) -> Router {
    Router::new()
        .route("/api/admin/blog/posts", post(create_post).get(list_admin_posts))
        .route("/api/admin/blog/posts/{id}", put(update_post).delete(delete_post))
        .route("/api/admin/blog/categories", post(create_category))
        .route(
            "/api/admin/blog/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/api/admin/dashboard/stats", get(dashboard_stats))
        .route("/api/admin/submissions", get(submissions))
        .route("/api/admin/subscribers", get(subscribers))
        .route("/api/upload/image", post(upload_image))
        .route("/api/upload/files", get(list_files))
        .route("/api/upload/{public_id}", axum::routing::delete(delete_file))
        .route("/api/upload/blog/{id}/featured-image", put(featured_image))
        .route("/api/blog/posts", get(public_posts))
        .route("/api/blog/posts/{slug}", get(public_post))
        .route("/api/blog/posts/category/{slug}", get(posts_by_category))
        .route("/api/blog/categories", get(public_categories))
        .route("/api/newsletter/subscribe", post(newsletter))
        .route("/api/contact/submit", post(contact))
        .with_state(recorder)
}

/// Binds the backend to an ephemeral port and returns its base URL.
pub async fn spawn_backend() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = router(recorder.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), recorder)
}
