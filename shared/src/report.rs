//! HTML rendering of the reorder report

use crate::models::FlaggedItem;

const CELL_STYLE: &str = "border: 1px solid #dddddd; text-align: left; padding: 8px;";

const COLUMNS: [&str; 6] = [
    "Item Code",
    "Item Name",
    "Item Group",
    "Current Stock",
    "Reorder Level",
    "Safety Stock",
];

/// Escape text for inclusion in HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
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

/// Format a stock quantity without a trailing `.0` for whole numbers
fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Render the flagged items as an HTML table, grouped by category.
///
/// Rows are sorted by category; items of the same category keep their
/// input order. Reorder level and safety stock are rounded to whole units.
pub fn render_reorder_report(items: &[FlaggedItem], item_link_base: &str) -> String {
    let mut sorted: Vec<&FlaggedItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.category.cmp(&b.category));

    let mut html = String::new();
    html.push_str("<p>The following items have reached their reorder level:</p>\n");
    html.push_str("<table style='border-collapse: collapse; width: 100%;'>\n<tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th style='{}'>{}</th>", CELL_STYLE, column));
    }
    html.push_str("</tr>\n");

    for item in sorted {
        let url = format!("{}{}", item_link_base, item.item_code);
        let cells = [
            format!(
                "<a href='{}'>{}</a>",
                escape_html(&url),
                escape_html(&item.item_code)
            ),
            escape_html(&item.item_name),
            escape_html(&item.category),
            format_quantity(item.current_stock),
            format!("{:.0}", item.reorder_point.round()),
            format!("{:.0}", item.safety_stock.round()),
        ];
        html.push_str("<tr>");
        for cell in cells {
            html.push_str(&format!("<td style='{}'>{}</td>", CELL_STYLE, cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>");
    html
}
