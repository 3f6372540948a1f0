// src/server/dashboard.rs
//
// Read-only HTML view of the attempt log. The log is never pruned, so this
// page grows without bound over the life of the process; known limitation.

use crate::server::guard::{AttemptLogEntry, TIMESTAMP_FORMAT};

const PAGE_HEAD: &str = r#"<html>
<head>
    <title>Smart Lock Dashboard</title>
    <style>
        body { font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px; }
        h1 { color: #333; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { border: 1px solid #ccc; padding: 10px; text-align: left; }
        th { background-color: #eee; }
        tr:nth-child(even) { background-color: #fafafa; }
        .note { color: red; font-weight: bold; }
    </style>
</head>
<body>
    <h1>Smart Lock Attempt Log</h1>
    <table>
        <tr>
            <th>Timestamp</th>
            <th>Status</th>
            <th>Code</th>
            <th>Note</th>
        </tr>
"#;

const PAGE_TAIL: &str = "    </table>\n</body>\n</html>\n";

/// Render the full log as an HTML table, oldest entries first.
pub fn render(log: &[AttemptLogEntry]) -> String {
    let mut page = String::with_capacity(PAGE_HEAD.len() + PAGE_TAIL.len() + log.len() * 128);
    page.push_str(PAGE_HEAD);

    for entry in log {
        let row = format!(
            "        <tr>\n            <td>{}</td>\n            <td>{}</td>\n            <td>{}</td>\n            <td class=\"note\">{}</td>\n        </tr>\n",
            entry.timestamp.format(TIMESTAMP_FORMAT),
            escape_html(&entry.status),
            escape_html(&entry.code),
            escape_html(&entry.note),
        );
        page.push_str(&row);
    }

    page.push_str(PAGE_TAIL);
    page
}

// Status, code, and note all echo caller-supplied strings.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
