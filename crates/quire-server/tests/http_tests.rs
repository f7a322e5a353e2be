//! Integration tests for the `Quire` HTTP surface.
//!
//! These tests drive the real router in-process with `oneshot`, against a
//! temporary document directory and users file. The session cookie is
//! carried between requests by hand, the way a browser would.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use tempfile::TempDir;
use tower::ServiceExt;

use quire_core::credentials::{UsersFile, hash_password};
use quire_server::app::{build_router, build_state};
use quire_server::config::ServerConfig;
use quire_server::middleware::SESSION_COOKIE;

const PASSWORD: &str = "secret";

/// A running app plus a one-client cookie jar.
struct Client {
    app: Router,
    docs: PathBuf,
    users: PathBuf,
    cookie: Option<String>,
    _dir: TempDir,
}

impl Client {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("data");
        let users = dir.path().join("users.json");

        let hash = hash_password(PASSWORD).unwrap();
        UsersFile::new(&users).upsert("admin", &hash).await.unwrap();

        let docs_var = docs.display().to_string();
        let users_var = users.display().to_string();
        let config = ServerConfig::from_lookup(|key| match key {
            "QUIRE_DATA_DIR" => Some(docs_var.clone()),
            "QUIRE_USERS_FILE" => Some(users_var.clone()),
            _ => None,
        });

        let state = build_state(&config).await.unwrap();
        Self {
            app: build_router(state),
            docs,
            users,
            cookie: None,
            _dir: dir,
        }
    }

    fn write_doc(&self, name: &str, content: &str) {
        std::fs::write(self.docs.join(name), content).unwrap();
    }

    fn read_doc(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.docs.join(name)).ok()
    }

    async fn send(&mut self, mut req: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            req.headers_mut()
                .insert(header::COOKIE, format!("{SESSION_COOKIE}={cookie}").parse().unwrap());
        }

        let resp = self.app.clone().oneshot(req).await.unwrap();

        for value in resp.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let Some(pair) = value.split(';').next() else {
                continue;
            };
            if let Some(id) = pair.strip_prefix(&format!("{SESSION_COOKIE}=")) {
                self.cookie = (!id.is_empty()).then(|| id.to_owned());
            }
        }
        resp
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    async fn post(&mut self, uri: &str, form: &str) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        self.send(req).await
    }

    async fn post_raw(&mut self, uri: &str) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    async fn sign_in(&mut self) {
        let resp = self
            .post("/users/new", &format!("username=admin&password={PASSWORD}"))
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        // Consume the welcome flash.
        self.get("/").await;
    }
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
}

fn content_type(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .expect("response without content type")
        .to_str()
        .unwrap()
}

// ── Index ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_index_lists_documents_when_signed_in() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "");
    client.write_doc("changes.txt", "");
    client.sign_in().await;

    let resp = client.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("about.md"));
    assert!(body.contains("changes.txt"));
    assert!(body.contains("New Document"));
}

#[tokio::test]
async fn test_index_hides_names_when_signed_out() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "");

    let resp = client.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(!body.contains("about.md"));
    assert!(body.contains("/users/signin"));
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let mut client = Client::new().await;
    let resp = client.get("/").await;
    let headers = resp.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
}

// ── Viewing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_plain_text_served_verbatim() {
    let mut client = Client::new().await;
    client.write_doc("history.txt", "1993 - Yukihiro Matsumoto dreams up Ruby.\n<b>raw</b>");
    client.sign_in().await;

    let resp = client.get("/history.txt").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "text/plain");
    assert_eq!(
        body_text(resp).await,
        "1993 - Yukihiro Matsumoto dreams up Ruby.\n<b>raw</b>"
    );
}

#[tokio::test]
async fn test_markdown_rendered_as_html() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "# Ruby is...");
    client.sign_in().await;

    let resp = client.get("/about.md").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "text/html");
    assert!(body_text(resp).await.contains("<h1>Ruby is...</h1>"));
}

#[tokio::test]
async fn test_missing_document_flashes_once() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.get("/notafile.ext").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("notafile.ext does not exist."));

    let body = body_text(client.get("/").await).await;
    assert!(!body.contains("notafile.ext does not exist."));
}

#[tokio::test]
async fn test_unsupported_type_flashes_error() {
    let mut client = Client::new().await;
    client.write_doc("photo.png", "not really a png");
    client.sign_in().await;

    let resp = client.get("/photo.png").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("photo.png cannot be displayed."));
}

#[tokio::test]
async fn test_traversal_names_are_not_found() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.get("/..%2Fusers.json").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let body = body_text(client.get("/").await).await;
    assert!(body.contains("../users.json does not exist."));
    assert!(!body.contains("$argon2"));
}

#[tokio::test]
async fn test_viewing_requires_sign_in() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "# Secret");

    let resp = client.get("/about.md").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You must be signed in to do that."));
    assert!(!body.contains("Secret"));
}

// ── Editing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_edit_form_shows_current_content() {
    let mut client = Client::new().await;
    client.write_doc("changes.txt", "old <content>");
    client.sign_in().await;

    let resp = client.get("/changes.txt/edit").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<textarea"));
    assert!(body.contains("old &lt;content&gt;"));
    assert!(body.contains(r#"action="/changes.txt/edit""#));
}

#[tokio::test]
async fn test_edit_form_requires_sign_in() {
    let mut client = Client::new().await;
    client.write_doc("changes.txt", "private notes");

    let resp = client.get("/changes.txt/edit").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(!body_text(resp).await.contains("private notes"));

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You must be signed in to do that."));
    assert!(!body.contains("private notes"));
}

#[tokio::test]
async fn test_edit_form_missing_document() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.get("/ghost.txt/edit").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("ghost.txt does not exist."));
}

#[tokio::test]
async fn test_update_replaces_content() {
    let mut client = Client::new().await;
    client.write_doc("changes.txt", "old");
    client.sign_in().await;

    for _ in 0..2 {
        let resp = client
            .post("/changes.txt/edit", "new_contents=new+content")
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        assert_eq!(client.read_doc("changes.txt").unwrap(), "new content");
    }

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("changes.txt has been updated."));

    let resp = client.get("/changes.txt").await;
    assert_eq!(body_text(resp).await, "new content");
}

#[tokio::test]
async fn test_update_without_form_body_requires_sign_in() {
    let mut client = Client::new().await;
    client.write_doc("changes.txt", "old");

    let resp = client.post_raw("/changes.txt/edit").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(client.read_doc("changes.txt").unwrap(), "old");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You must be signed in to do that."));
}

#[tokio::test]
async fn test_update_without_form_body_is_bad_request() {
    let mut client = Client::new().await;
    client.write_doc("changes.txt", "old");
    client.sign_in().await;

    let resp = client.post_raw("/changes.txt/edit").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(client.read_doc("changes.txt").unwrap(), "old");
}

#[tokio::test]
async fn test_update_missing_document_does_not_create_it() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.post("/ghost.txt/edit", "new_contents=boo").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(client.read_doc("ghost.txt").is_none());

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("ghost.txt does not exist."));
}

#[tokio::test]
async fn test_update_requires_sign_in() {
    let mut client = Client::new().await;
    client.write_doc("changes.txt", "old");

    let resp = client.post("/changes.txt/edit", "new_contents=new").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(client.read_doc("changes.txt").unwrap(), "old");
}

// ── Creating ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_new_document_form() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.get("/new").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(r#"name="new_document""#));
    assert!(body.contains(r#"type="submit""#));
}

#[tokio::test]
async fn test_new_form_requires_sign_in() {
    let mut client = Client::new().await;

    let resp = client.get("/new").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You must be signed in to do that."));
}

#[tokio::test]
async fn test_create_document() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.post("/new", "new_document=test.txt").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(client.read_doc("test.txt").unwrap(), "");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("test.txt was created."));
    assert!(body.contains(r#"href="/test.txt""#));
}

#[tokio::test]
async fn test_create_without_name() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.post("/new", "new_document=+++").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/new");

    let body = body_text(client.get("/new").await).await;
    assert!(body.contains("A name is required."));
}

#[tokio::test]
async fn test_create_existing_keeps_content() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "keep me");
    client.sign_in().await;

    let resp = client.post("/new", "new_document=about.md").await;
    assert_eq!(location(&resp), "/new");
    assert_eq!(client.read_doc("about.md").unwrap(), "keep me");

    let body = body_text(client.get("/new").await).await;
    assert!(body.contains("about.md already exists."));
}

#[tokio::test]
async fn test_create_rejects_path_names() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.post("/new", "new_document=..%2Fevil.txt").await;
    assert_eq!(location(&resp), "/new");
    assert!(!client.docs.parent().unwrap().join("evil.txt").exists());

    let body = body_text(client.get("/new").await).await;
    assert!(body.contains("../evil.txt is not a valid document name."));
}

#[tokio::test]
async fn test_create_requires_sign_in() {
    let mut client = Client::new().await;

    let resp = client.post("/new", "new_document=test.txt").await;
    assert_eq!(location(&resp), "/");
    assert!(client.read_doc("test.txt").is_none());
}

#[tokio::test]
async fn test_create_without_form_body_requires_sign_in() {
    let mut client = Client::new().await;

    let resp = client.post_raw("/new").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You must be signed in to do that."));
}

// ── Deleting ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_document() {
    let mut client = Client::new().await;
    client.write_doc("test.txt", "");
    client.sign_in().await;

    let resp = client.post("/test.txt/delete", "").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(client.read_doc("test.txt").is_none());

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("test.txt was deleted."));
    assert!(!body.contains(r#"href="/test.txt""#));
}

#[tokio::test]
async fn test_delete_missing_document_is_silent() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let resp = client.post("/ghost.txt/delete", "").await;
    assert_eq!(location(&resp), "/");
    let body = body_text(client.get("/").await).await;
    assert!(!body.contains("was deleted."));
}

#[tokio::test]
async fn test_delete_requires_sign_in() {
    let mut client = Client::new().await;
    client.write_doc("test.txt", "");

    let resp = client.post("/test.txt/delete", "").await;
    assert_eq!(location(&resp), "/");
    assert!(client.read_doc("test.txt").is_some());

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You must be signed in to do that."));
}

// ── Signing in and out ───────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_form() {
    let mut client = Client::new().await;
    let resp = client.get("/users/signin").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(r#"name="username""#));
    assert!(body.contains(r#"type="password""#));
}

#[tokio::test]
async fn test_sign_in_success() {
    let mut client = Client::new().await;

    let resp = client
        .post("/users/new", &format!("username=admin&password={PASSWORD}"))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(SESSION_COOKIE));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("Welcome!"));
    assert!(body.contains("Signed in as admin."));
}

#[tokio::test]
async fn test_sign_in_bad_credentials() {
    let mut client = Client::new().await;

    let resp = client.post("/users/new", "username=admin&password=wrong").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(resp).await;
    assert!(body.contains("Invalid credentials."));
    assert!(body.contains(r#"value="admin""#));

    let body = body_text(client.get("/").await).await;
    assert!(!body.contains("Signed in as"));
}

#[tokio::test]
async fn test_sign_in_unknown_user() {
    let mut client = Client::new().await;

    let resp = client
        .post("/users/new", &format!("username=mallory&password={PASSWORD}"))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains(r#"value="mallory""#));
}

#[tokio::test]
async fn test_sign_in_non_admin_user_rejected() {
    let mut client = Client::new().await;
    let hash = hash_password("billspw").unwrap();
    UsersFile::new(&client.users).upsert("bill", &hash).await.unwrap();

    let resp = client.post("/users/new", "username=bill&password=billspw").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains("Invalid credentials."));

    let body = body_text(client.get("/").await).await;
    assert!(!body.contains("Signed in as"));
}

#[tokio::test]
async fn test_sign_out() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "");
    client.sign_in().await;

    let resp = client.post("/users/signout", "").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("You have been signed out."));
    assert!(!body.contains("about.md"));
    assert!(body.contains("/users/signin"));
}

#[tokio::test]
async fn test_forged_session_cookie_is_ignored() {
    let mut client = Client::new().await;
    client.write_doc("about.md", "");
    client.cookie = Some("not-a-real-session".to_owned());

    let body = body_text(client.get("/").await).await;
    assert!(!body.contains("about.md"));
}
