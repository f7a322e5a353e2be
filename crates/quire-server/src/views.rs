//! Inline HTML views.
//!
//! Every page goes through [`page`], which renders the pending flash message
//! and the sign-in / sign-out control. All user-supplied text is escaped
//! here; only rendered markdown is inserted as-is.

use axum::http::StatusCode;
use quire_core::session::{Flash, FlashKind};

/// Wrap `body` in the site layout.
///
/// `signed_in_as` is `Some` only when the viewer passed the auth gate.
pub fn page(title: &str, flash: Option<&Flash>, signed_in_as: Option<&str>, body: &str) -> String {
    let flash_html = flash.map_or_else(String::new, |flash| {
        let class = match flash.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        };
        format!(
            r#"<p class="flash {class}">{}</p>"#,
            escape(&flash.message)
        )
    });

    let account_html = match signed_in_as {
        Some(user) => format!(
            r#"<form class="inline" method="post" action="/users/signout">
        <span>Signed in as {}.</span>
        <button type="submit">Sign Out</button>
      </form>"#,
            escape(user)
        ),
        None => r#"<a href="/users/signin">Sign In</a>"#.to_owned(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} - Quire</title>
  <style>{CSS}</style>
</head>
<body>
  <header>
    <a class="brand" href="/">Quire</a>
    <nav>
      {account_html}
    </nav>
  </header>
  <main>
    {flash_html}
    {body}
  </main>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Body of the index page. `names` is `None` for viewers who are not signed in.
pub fn index(names: Option<&[String]>) -> String {
    let Some(names) = names else {
        return r#"<p>Please <a href="/users/signin">sign in</a> to see your documents.</p>"#
            .to_owned();
    };

    let mut html = String::from("<h1>Documents</h1>\n<ul class=\"documents\">\n");
    if names.is_empty() {
        html.push_str("  <li class=\"empty\">No documents yet.</li>\n");
    }
    for name in names {
        let href = urlencoding::encode(name);
        let label = escape(name);
        html.push_str(&format!(
            r#"  <li>
    <a href="/{href}">{label}</a>
    <a class="action" href="/{href}/edit">edit</a>
    <form class="inline" method="post" action="/{href}/delete">
      <button type="submit">delete</button>
    </form>
  </li>
"#
        ));
    }
    html.push_str("</ul>\n<p><a href=\"/new\">New Document</a></p>");
    html
}

/// Body of the new-document form.
pub fn new_document() -> String {
    r#"<h1>New Document</h1>
<form method="post" action="/new">
  <label for="new_document">Add a new document:</label>
  <input id="new_document" name="new_document" type="text" autofocus>
  <button type="submit">Create</button>
</form>"#
        .to_owned()
}

/// Body of the edit form for `name`, pre-filled with `content`.
pub fn edit_document(name: &str, content: &str) -> String {
    format!(
        r#"<h1>Edit content of {label}</h1>
<form method="post" action="/{href}/edit">
  <textarea name="new_contents" rows="20" cols="80">{content}</textarea>
  <button type="submit">Save Changes</button>
</form>"#,
        label = escape(name),
        href = urlencoding::encode(name),
        content = escape(content),
    )
}

/// Body of the sign-in form, with `username` pre-filled.
pub fn sign_in(username: &str) -> String {
    format!(
        r#"<h1>Sign In</h1>
<form method="post" action="/users/new">
  <label for="username">Username</label>
  <input id="username" name="username" type="text" value="{}" autofocus>
  <label for="password">Password</label>
  <input id="password" name="password" type="password">
  <button type="submit">Sign In</button>
</form>"#,
        escape(username)
    )
}

/// A stand-alone failure page.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    page(
        title,
        None,
        None,
        &format!(
            r#"<h1>{}</h1>
<p>{}</p>
<p><a href="/">Back to documents</a></p>"#,
            escape(title),
            escape(message)
        ),
    )
}

/// Escape HTML special characters.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const CSS: &str = r"
body{font-family:-apple-system,'Segoe UI',sans-serif;max-width:760px;margin:0 auto;padding:0 16px;color:#222;line-height:1.6}
header{display:flex;justify-content:space-between;align-items:center;border-bottom:1px solid #ddd;padding:12px 0}
.brand{font-weight:700;font-size:20px;color:#222;text-decoration:none}
.flash{padding:8px 12px;border-radius:4px}
.flash.success{background:#e6f4ea;color:#1e4620}
.flash.error{background:#fdecea;color:#611a15}
.documents li{margin:4px 0}
.action{margin-left:8px;font-size:14px}
form.inline{display:inline}
textarea{width:100%;font-family:monospace}
label{display:block;margin-top:8px}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_html_specials() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
    }

    #[test]
    fn page_renders_flash_escaped() {
        let flash = Flash {
            kind: FlashKind::Error,
            message: "<script>.txt does not exist.".to_owned(),
        };
        let html = page("Documents", Some(&flash), None, "");
        assert!(html.contains(r#"class="flash error""#));
        assert!(html.contains("&lt;script&gt;.txt does not exist."));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn page_shows_sign_out_only_when_signed_in() {
        let html = page("Documents", None, Some("admin"), "");
        assert!(html.contains("Signed in as admin."));
        assert!(html.contains("/users/signout"));

        let html = page("Documents", None, None, "");
        assert!(html.contains(r#"href="/users/signin""#));
        assert!(!html.contains("/users/signout"));
    }

    #[test]
    fn index_hides_names_when_signed_out() {
        let html = index(None);
        assert!(html.contains("sign in"));
        assert!(!html.contains("<ul"));
    }

    #[test]
    fn index_links_are_percent_encoded() {
        let names = vec!["my notes.md".to_owned()];
        let html = index(Some(&names));
        assert!(html.contains(r#"href="/my%20notes.md""#));
        assert!(html.contains(r#"action="/my%20notes.md/delete""#));
        assert!(html.contains(">my notes.md</a>"));
    }

    #[test]
    fn edit_form_escapes_content() {
        let html = edit_document("a.md", "</textarea><b>");
        assert!(html.contains("&lt;/textarea&gt;&lt;b&gt;</textarea>"));
    }

    #[test]
    fn sign_in_preserves_username() {
        let html = sign_in("ad\"min");
        assert!(html.contains(r#"value="ad&quot;min""#));
    }
}
