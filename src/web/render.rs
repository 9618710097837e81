//! HTML rendering
//!
//! Pages are small enough to build with `format!`. Every value that comes from
//! the user or from the analysis service goes through [`escape_html`].

use crate::core::{AnalysisOutcome, ValidationStatus};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 20px; background: #f4f6f8; }
.main { flex: 1; padding: 20px 40px; }
.header-title { text-align: center; color: #1f77b4; margin-bottom: 8px; }
.subtitle { text-align: center; color: gray; margin-bottom: 30px; }
.columns { display: flex; gap: 40px; }
.columns > div { flex: 1; }
.columns img { max-width: 100%; border-radius: 8px; }
.success-box { padding: 15px; border-radius: 8px; background-color: #d4edda; border-left: 4px solid #28a745; margin: 10px 0; }
.error-box { padding: 15px; border-radius: 8px; background-color: #f8d7da; border-left: 4px solid #dc3545; margin: 10px 0; }
.info-card { padding: 15px; border-radius: 8px; background-color: #e7f3ff; border-left: 4px solid #0066cc; margin: 10px 0; }
.warning-box { padding: 10px; border-radius: 8px; background-color: #fff3cd; border-left: 4px solid #ffc107; }
.validation-valid { color: #28a745; font-weight: bold; }
.validation-invalid { color: #dc3545; font-weight: bold; }
.advisory { color: gray; font-size: 0.85em; }
"#;

/// Escape text for use in HTML content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(debug: bool, content: &str) -> String {
    let debug_banner = if debug {
        r#"<p class="warning-box">Debug mode enabled</p>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Cardscan - Credit Card Analysis</title>
<style>{STYLE}</style>
</head>
<body>
<div class="layout">
<aside class="sidebar">
<h3>Information</h3>
<p><strong>How to use:</strong></p>
<ol>
<li>Upload a credit card image</li>
<li>The image is analyzed automatically</li>
<li>The extracted fields are validated</li>
</ol>
<p><strong>Supported formats:</strong> PNG, JPG, JPEG</p>
<p><strong>Note:</strong> images are processed with Azure Document Intelligence.</p>
{debug_banner}
</aside>
<main class="main">
<h1 class="header-title">Credit Card Document Analysis</h1>
<p class="subtitle">Credit card analysis with Azure Document Intelligence</p>
<hr>
{content}
</main>
</div>
</body>
</html>
"#
    )
}

fn upload_form() -> &'static str {
    r#"<h2>Upload a credit card</h2>
<form action="/analyze" method="post" enctype="multipart/form-data">
<label for="card">Select a credit card image</label><br>
<input type="file" id="card" name="card" accept=".png,.jpg,.jpeg,image/png,image/jpeg" required>
<button type="submit">Analyze</button>
</form>"#
}

/// Landing page with the upload form
pub fn index_page(debug: bool) -> String {
    layout(debug, upload_form())
}

/// Error box above the upload form
pub fn error_page(debug: bool, message: &str) -> String {
    let content = format!(
        r#"<div class="error-box">✗ {}</div>
{}"#,
        escape_html(message),
        upload_form()
    );
    layout(debug, &content)
}

/// Uploaded image next to the validation checklist
pub fn result_page(debug: bool, file_name: &str, outcome: &AnalysisOutcome) -> String {
    let mut content = String::new();

    content.push_str(&format!(
        r#"<div class="success-box">✓ File <strong>{}</strong> uploaded successfully!</div>"#,
        escape_html(file_name)
    ));
    content.push_str(r#"<div class="columns"><div><h2>Card image</h2>"#);
    content.push_str(&format!(
        r#"<img src="{}" alt="Uploaded credit card">"#,
        escape_html(&outcome.asset.url)
    ));
    if !outcome.asset.is_signed() {
        content.push_str(r#"<p class="advisory">Served from a direct blob URL.</p>"#);
    }
    content.push_str("</div><div><h2>Field validation</h2>");
    content.push_str(&validation_section(outcome));
    content.push_str("</div></div><hr>");
    content.push_str(upload_form());

    layout(debug, &content)
}

fn validation_section(outcome: &AnalysisOutcome) -> String {
    let report = &outcome.report;

    if outcome.fields.is_empty() {
        return r#"<div class="error-box"><strong>✗ No card information detected.</strong><br>Please check the image quality and try again.</div>"#
            .to_string();
    }

    let mut html = format!(
        r#"<div class="info-card">Fields detected: {}/{}</div>"#,
        report.detected_count(),
        report.total_count()
    );

    for check in &report.checks {
        let kind = if check.required {
            ""
        } else {
            r#" <span class="advisory">(advisory)</span>"#
        };
        if check.is_valid {
            html.push_str(&format!(
                r#"<p><span class="validation-valid">✓ {}</span>{}: {}</p>"#,
                check.field.display_name(),
                kind,
                escape_html(check.value.as_deref().unwrap_or_default())
            ));
        } else {
            html.push_str(&format!(
                r#"<p><span class="validation-invalid">✗ {}</span>{}: Not detected</p>"#,
                check.field.display_name(),
                kind
            ));
        }
    }

    html.push_str("<hr>");
    if report.is_fully_detected() {
        html.push_str(
            r#"<div class="success-box"><strong>✓ Card validated successfully!</strong></div>"#,
        );
    } else {
        html.push_str(&format!(
            r#"<div class="info-card"><strong>⚠ Card partially validated.</strong> {}/{} fields detected.</div>"#,
            report.detected_count(),
            report.total_count()
        ));
    }

    match report.status {
        ValidationStatus::Valid => {
            html.push_str(r#"<p>Status: <span class="validation-valid">valid</span></p>"#);
        }
        ValidationStatus::Invalid => {
            let missing: Vec<&str> = report
                .missing_required()
                .iter()
                .map(|f| f.display_name())
                .collect();
            html.push_str(&format!(
                r#"<p>Status: <span class="validation-invalid">invalid</span> (missing: {})</p>"#,
                missing.join(", ")
            ));
        }
    }

    html
}
