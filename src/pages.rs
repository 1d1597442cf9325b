//! Server-rendered pages.

use crate::upload::ALLOWED_EXTENSIONS;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f4f6f8; color: #222; }
nav { background: #1f3a5f; padding: 0.8rem 1.5rem; }
nav a { color: #fff; margin-right: 1.2rem; text-decoration: none; }
main { max-width: 40rem; margin: 2rem auto; background: #fff; padding: 2rem; border-radius: 6px; }
.flash.error { background: #fde2e1; color: #8a1c1c; padding: 0.6rem 1rem; border-radius: 4px; }
.prediction { font-size: 1.5rem; font-weight: bold; margin-top: 1.5rem; }
"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/upload">Upload</a><a href="/aboutus">About us</a></nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn home() -> String {
    layout(
        "Brain Tumour Screening",
        r#"<h1>Brain Tumour Screening</h1>
<p>Upload an MRI scan and a pretrained classifier will tell you whether it sees signs of a tumour.</p>
<p><a href="/upload">Upload a scan</a></p>"#,
    )
}

pub fn about() -> String {
    layout(
        "About us",
        r#"<h1>About us</h1>
<p>This tool runs uploaded scans through a small convolutional network trained to detect tumours in MRI images.
It is a demonstration and not a medical device.</p>"#,
    )
}

/// Upload form, with any error messages above it and the verdict below it.
pub fn upload(prediction: Option<&str>, messages: &[String]) -> String {
    let mut body = String::from("<h1>Upload a scan</h1>\n");

    for message in messages {
        body.push_str(&format!(
            "<p class=\"flash error\">{}</p>\n",
            escape(message)
        ));
    }

    let accept = ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");
    body.push_str(&format!(
        r#"<form method="post" action="/upload" enctype="multipart/form-data">
<input type="file" name="file" accept="{accept}">
<button type="submit">Predict</button>
</form>
"#
    ));

    if let Some(prediction) = prediction {
        body.push_str(&format!(
            "<p class=\"prediction\">Prediction: {}</p>\n",
            escape(prediction)
        ));
    }

    layout("Upload", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn upload_page_has_form() {
        let page = upload(None, &[]);
        assert!(page.contains(r#"enctype="multipart/form-data""#));
        assert!(page.contains(r#"name="file""#));
        assert!(page.contains(r#"accept=".png,.jpg,.jpeg,.gif""#));
        assert!(!page.contains("Prediction:"));
        assert!(!page.contains("flash error"));
    }

    #[test]
    fn upload_page_shows_prediction_and_messages() {
        let page = upload(Some("Tumour Found"), &["bad <file>".to_string()]);
        assert!(page.contains("Prediction: Tumour Found"));
        assert!(page.contains("bad &lt;file&gt;"));
    }

    #[test]
    fn static_pages_link_each_other() {
        for page in [home(), about()] {
            assert!(page.contains(r#"href="/upload""#));
            assert!(page.contains(r#"href="/aboutus""#));
        }
    }
}
