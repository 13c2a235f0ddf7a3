use axum::response::Html;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>PDF Form Filler</title>
</head>
<body>
  <h2>PDF Form Filler</h2>
  <form action="/fill-form" enctype="multipart/form-data" method="post">
    <label>Questions PDF: <input type="file" name="questions_pdf" accept="application/pdf" /></label><br/><br/>
    <label>Data PDF: <input type="file" name="data_pdf" accept="application/pdf" /></label><br/><br/>
    <input type="submit" value="Fill Form"/>
  </form>
</body>
</html>
"#;

/// Render the upload page.
pub fn render_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Render an error fragment; `message` is HTML-escaped.
pub fn render_error(message: &str) -> Html<String> {
    Html(format!(
        "<div class=\"error\"><p>Error: {}</p><p><a href=\"/\">Back</a></p></div>",
        html_escape::encode_text(message)
    ))
}
