use serde_json::Value;

use crate::contract::{Detail, ResultEntry, SearchResult};
use crate::selection::{Selection, GROUP_NAME};

pub const NO_MATCHES_MESSAGE: &str = "No matching results found.";
pub const PLACEHOLDER_TEXT: &str = "No data to display. Select a file and enter keywords to search.";

const PLACEHOLDER_IMAGE: &str =
    "https://img.freepik.com/free-vector/flat-design-no-data-illustration_23-2150527124.jpg?w=740";
const MISSING_CELL: &str = "-";
const COLUMN_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRow {
    Data {
        key: String,
        page: String,
        kind: String,
        detail: String,
    },
    NoData {
        key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub file_name: String,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn headers(&self) -> [&str; COLUMN_COUNT] {
        ["Key", "Page No", "Type", self.file_name.as_str()]
    }
}

/// Contents of the results area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    /// Empty-state illustration shown at startup and after rejected input.
    Placeholder,
    /// A request is in flight; earlier results are gone.
    Cleared,
    NoMatches,
    Table(ResultTable),
    Error(String),
}

pub fn render_results(result: Option<&SearchResult>, file_name: &str) -> ResultsView {
    let Some(result) = result.filter(|result| !result.is_empty()) else {
        return ResultsView::NoMatches;
    };

    let mut rows = Vec::new();
    for group in result.groups() {
        match group.entries.as_deref() {
            Some(entries) if !entries.is_empty() => {
                rows.extend(entries.iter().map(|entry| data_row(&group.key, entry)));
            }
            _ => rows.push(ResultRow::NoData {
                key: group.key.clone(),
            }),
        }
    }

    ResultsView::Table(ResultTable {
        file_name: file_name.to_string(),
        rows,
    })
}

fn data_row(key: &str, entry: &ResultEntry) -> ResultRow {
    ResultRow::Data {
        key: key.to_string(),
        page: cell_text(entry.identifier()),
        kind: entry.type_tag().to_uppercase(),
        detail: detail_text(entry.detail()),
    }
}

fn detail_text(detail: &Detail) -> String {
    match detail {
        Detail::List(values) => values.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        Detail::Scalar(value) => cell_text(value),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => MISSING_CELL.to_string(),
        other => plain_text(other),
    }
}

/// Text the way a browser template prints a JSON value: whole floats lose their
/// fraction, nested arrays join with "," and nulls inside them print as nothing.
fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number_text(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(plain_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(number: &serde_json::Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e21 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

impl ResultsView {
    pub fn to_html(&self) -> String {
        match self {
            Self::Placeholder => format!(
                "<div class=\"noDataMessage\"><img src=\"{PLACEHOLDER_IMAGE}\" alt=\"No Data Available\" style=\"max-width: 100%; height: auto;\"></div>"
            ),
            Self::Cleared => String::new(),
            Self::NoMatches => NO_MATCHES_MESSAGE.to_string(),
            Self::Error(reason) => format!("<p>Error fetching data: {}</p>", escape_html(reason)),
            Self::Table(table) => table_html(table),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Placeholder => PLACEHOLDER_TEXT.to_string(),
            Self::Cleared => String::new(),
            Self::NoMatches => NO_MATCHES_MESSAGE.to_string(),
            Self::Error(reason) => format!("Error fetching data: {reason}"),
            Self::Table(table) => table_text(table),
        }
    }
}

fn table_html(table: &ResultTable) -> String {
    let mut html = String::from("<table class='resultTable' border='1'><thead><tr>");
    for header in table.headers() {
        html.push_str(&format!(
            "<th class='resultTableHead'>{}</th>",
            escape_html(header)
        ));
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        match row {
            ResultRow::Data {
                key,
                page,
                kind,
                detail,
            } => {
                html.push_str("<tr>");
                for cell in [key, page, kind, detail] {
                    html.push_str(&format!("<td>{}</td>", escape_html(cell)));
                }
                html.push_str("</tr>");
            }
            ResultRow::NoData { key } => html.push_str(&format!(
                "<tr class=\"noData\"><td colspan='{COLUMN_COUNT}'>No data available for:<span class=\"noDataValue\"> {} </span></td></tr>",
                escape_html(key)
            )),
        }
    }

    html.push_str("</tbody></table>");
    html
}

fn table_text(table: &ResultTable) -> String {
    let headers = table.headers();
    let mut widths = headers.map(|header| header.chars().count());
    for row in &table.rows {
        if let ResultRow::Data {
            key,
            page,
            kind,
            detail,
        } = row
        {
            for (width, cell) in widths.iter_mut().zip([key, page, kind, detail]) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut lines = vec![text_line(&headers, &widths)];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &table.rows {
        match row {
            ResultRow::Data {
                key,
                page,
                kind,
                detail,
            } => lines.push(text_line(
                &[key.as_str(), page.as_str(), kind.as_str(), detail.as_str()],
                &widths,
            )),
            ResultRow::NoData { key } => lines.push(format!("No data available for: {key}")),
        }
    }
    lines.join("\n")
}

fn text_line(cells: &[&str; COLUMN_COUNT], widths: &[usize; COLUMN_COUNT]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub fn selection_html(selection: &Selection) -> String {
    let mut html = String::new();
    for (index, entry) in selection.entries().iter().enumerate() {
        let id = escape_html(&entry.id);
        let checked = if selection.checked_index() == Some(index) {
            " checked"
        } else {
            ""
        };
        html.push_str(&format!(
            "<input type=\"radio\" id=\"{id}\" name=\"{GROUP_NAME}\" class=\"filesRadio\"{checked}><label for=\"{id}\" class=\"filesLabel\">{}</label>",
            escape_html(&entry.label)
        ));
    }
    html
}

pub fn selection_text(selection: &Selection) -> String {
    if selection.entries().is_empty() {
        return "(no files)".to_string();
    }

    selection
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if selection.checked_index() == Some(index) {
                "(*)"
            } else {
                "( )"
            };
            format!("{marker} {}. {}", index + 1, entry.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
