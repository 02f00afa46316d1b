//! HTML report output format.
//!
//! Generates a self-contained HTML page listing every vendor's latest
//! finding. The same page is served by the web UI at `/badnews`.

use super::FindingsPage;
use crate::model::Finding;
use anyhow::Result;

/// Generate and print HTML report output
pub fn print_html(page: &FindingsPage) -> Result<()> {
    let html = generate_html_string(page);
    println!("{}", html);
    Ok(())
}

/// Generate HTML as a string (for file output and the web UI)
pub fn generate_html_string(page: &FindingsPage) -> String {
    let found_count = page.findings.values().filter(|f| f.is_found()).count();
    let failed_count = page
        .findings
        .values()
        .filter(|f| matches!(f, Finding::Failed { .. }))
        .count();

    let mut html = String::new();

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Vendor News Report - {}</title>
    <style>
        :root {{
            --bg-color: #1a1a2e;
            --card-bg: #16213e;
            --text-color: #eee;
            --text-muted: #888;
            --border-color: #0f3460;
            --found: #dc3545;
            --failed: #fd7e14;
            --empty: #28a745;
            --accent: #0f3460;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-color);
            color: var(--text-color);
            line-height: 1.6;
            padding: 2rem;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border-color);
        }}
        h1 {{ font-size: 1.75rem; font-weight: 600; }}
        .timestamp {{ color: var(--text-muted); font-size: 0.9rem; }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat-card {{
            background: var(--card-bg);
            padding: 1.25rem;
            border-radius: 8px;
            border: 1px solid var(--border-color);
        }}
        .stat-value {{ font-size: 2rem; font-weight: 700; }}
        .stat-label {{ color: var(--text-muted); font-size: 0.85rem; }}
        section {{ margin-bottom: 2rem; }}
        h2 {{
            font-size: 1.25rem;
            margin-bottom: 1rem;
            padding-bottom: 0.5rem;
            border-bottom: 1px solid var(--border-color);
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            background: var(--card-bg);
            border-radius: 8px;
            overflow: hidden;
        }}
        th, td {{
            padding: 0.75rem 1rem;
            text-align: left;
            vertical-align: top;
            border-bottom: 1px solid var(--border-color);
        }}
        th {{ background: var(--accent); font-weight: 600; }}
        .status {{ padding: 0.25rem 0.5rem; border-radius: 4px; font-size: 0.75rem; font-weight: 600; }}
        .status-found {{ background: var(--found); color: white; }}
        .status-failed {{ background: var(--failed); color: white; }}
        .status-empty {{ background: var(--empty); color: white; }}
        pre {{ white-space: pre-wrap; word-break: break-all; max-height: 20rem; overflow: auto; font-size: 0.8rem; }}
        .muted {{ color: var(--text-muted); }}
        .empty {{ text-align: center; padding: 2rem; color: var(--text-muted); }}
        footer {{ text-align: center; color: var(--text-muted); font-size: 0.8rem; margin-top: 2rem; padding-top: 1rem; border-top: 1px solid var(--border-color); }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Vendor News Report</h1>
            <span class="timestamp">Last checked: {}</span>
        </header>
"#,
        page.generated_at.format("%Y-%m-%d"),
        page.timestamp()
    ));

    html.push_str(&format!(
        r#"        <div class="stats">
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Vendors</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">With Results</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Failed Searches</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">API Usage Count</div>
            </div>
        </div>
"#,
        page.findings.len(),
        found_count,
        failed_count,
        page.usage_count
    ));

    html.push_str(
        r#"        <section>
            <h2>Findings</h2>
"#,
    );

    if page.findings.is_empty() {
        html.push_str(
            r#"            <div class="empty">No findings yet. Trigger a scan to populate this page.</div>
"#,
        );
    } else {
        html.push_str(
            r#"            <table>
                <thead>
                    <tr>
                        <th>Vendor</th>
                        <th>Status</th>
                        <th>Result</th>
                    </tr>
                </thead>
                <tbody>
"#,
        );

        for (vendor, finding) in &page.findings {
            let (class, label, cell) = match finding {
                Finding::Found { body } => (
                    "status-found",
                    "FOUND",
                    format!("<pre>{}</pre>", html_escape(body)),
                ),
                Finding::NoResults => (
                    "status-empty",
                    "NO RESULTS",
                    html_escape(finding.display_text()),
                ),
                Finding::Failed { reason } => (
                    "status-failed",
                    "FAILED",
                    format!(
                        r#"{} <span class="muted">({})</span>"#,
                        html_escape(finding.display_text()),
                        html_escape(reason)
                    ),
                ),
            };

            html.push_str(&format!(
                r#"                    <tr>
                        <td>{}</td>
                        <td><span class="status {}">{}</span></td>
                        <td>{}</td>
                    </tr>
"#,
                html_escape(vendor),
                class,
                label,
                cell
            ));
        }

        html.push_str(
            r#"                </tbody>
            </table>
"#,
        );
    }

    html.push_str("        </section>\n");

    html.push_str(
        r#"        <footer>
            Generated by vendorwatch
        </footer>
    </div>
</body>
</html>
"#,
    );

    html
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
