//! Document composition
//!
//! Two mutually exclusive bodies:
//! - **table**: per record a spacer row, then one title/value row per view
//!   field; shading alternates by record, not by field
//! - **question/answer**: per record a heading for every field whose name
//!   contains "title" and a paragraph for every other field
//!
//! [`wrap`] puts either body into the minimal HTML envelope a word processor
//! opens as a document.

use crate::format::{ValueFormatter, raw_text};
use crate::types::{ExportResult, FieldDescriptor, SelectedRow, ViewFieldOrder};

/// Empty row separating consecutive records in table layout
pub const SPACER_ROW: &str = "<tr style=\"height:30px\"></tr>";

const SHADED_BACKGROUND: &str = "#f3f3f3";
const PLAIN_BACKGROUND: &str = "#ffffff";
const SHADED_BORDER: &str = "1px solid #ffffff";
const PLAIN_BORDER: &str = "1px solid #bcb7b7";

/// Accumulates table markup record by record
struct TableWriter {
    html: String,
    shaded: bool,
}

impl TableWriter {
    fn new() -> Self {
        Self {
            html: String::from("<table>"),
            shaded: false,
        }
    }

    /// Start the record at `index`; even records are shaded
    fn begin_record(&mut self, index: usize) {
        self.html.push_str(SPACER_ROW);
        self.shaded = index % 2 == 0;
    }

    fn row(&mut self, title: &str, value: &str) {
        let (background, border) = if self.shaded {
            (SHADED_BACKGROUND, SHADED_BORDER)
        } else {
            (PLAIN_BACKGROUND, PLAIN_BORDER)
        };
        self.html
            .push_str(&format!("<tr style=\"background-color:{}\">", background));
        self.html.push_str(&format!(
            "<td style=\"width:30%; border:{};\">{}</td>",
            border, title
        ));
        self.html.push_str(&format!(
            "<td style=\"width:70%;border:{};\">{}</td>",
            border, value
        ));
        self.html.push_str("</tr>");
    }

    fn finish(mut self) -> String {
        self.html.push_str("</table>");
        self.html
    }
}

/// Table body: one title/value row per field, in `fields` order, per record
pub fn compose_table(
    fields: &[FieldDescriptor],
    export: &ExportResult,
    formatter: &ValueFormatter,
) -> String {
    let mut table = TableWriter::new();
    for (index, record) in export.items.iter().enumerate() {
        table.begin_record(index);
        for field in fields {
            table.row(&field.display_title, &formatter.format(field, record));
        }
    }
    table.finish()
}

/// Question/answer body
///
/// Fields whose internal name contains "title" (any case) become `<h3>`
/// headings, all others `<p>` paragraphs. Values are the records' raw values.
pub fn compose_qna(view_fields: &ViewFieldOrder, export: &ExportResult) -> String {
    let mut html = String::new();
    for record in &export.items {
        for name in view_fields {
            let value = raw_text(record, name);
            if name.to_lowercase().contains("title") {
                html.push_str(&format!("<h3>{}</h3>", value));
            } else {
                html.push_str(&format!("<p>{}</p>", value));
            }
        }
    }
    html
}

/// Table body for rows the host already has selected
pub fn compose_selection(rows: &[SelectedRow], formatter: &ValueFormatter) -> String {
    let mut table = TableWriter::new();
    for (index, row) in rows.iter().enumerate() {
        table.begin_record(index);
        for cell in &row.cells {
            table.row(
                &cell.field.display_name,
                &formatter.format_selected(&cell.field, &cell.value),
            );
        }
    }
    table.finish()
}

/// Complete document: envelope with `title` and a centered heading around `body`
pub fn wrap(title: &str, body: &str) -> String {
    format!(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
         xmlns:w='urn:schemas-microsoft-com:office:word' \
         xmlns='http://www.w3.org/TR/REC-html40'>\
         <head><meta charset='utf-8'><title>{title}</title></head><body>\
         <h1><center>{title}</center></h1><hr></hr>\
         <div id=\"source-html\">{body}</div>\
         </body></html>"
    )
}
