//! Transactions page rendering
//!
//! Endpoints:
//! - page_transactions: Main page with envelope selector and table
//! - htmx_transactions_table: Current table fragment
//!
//! Everything the host draws comes from a [`ViewSnapshot`]; the render
//! functions never look at view state directly.

use crate::AppState;
use budgetview_core::projector::RenderPlan;
use budgetview_core::{
    CellValue, Envelope, HeaderCell, PaginationPlan, SortDirection, Tone, ViewSnapshot,
};
use budgetview_utils::{escape_html, format_number};

const VIEW_TARGET: &str = "hx-target='#transactions-view' hx-swap='outerHTML'";

/// Transactions page - envelope selector plus the live table
pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let envelopes = state.store.envelopes(&state.config.source.user_id).await;
    let snapshot = state.view.snapshot();

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
            {}
        </div>
        {}"#,
        render_envelope_select(&envelopes, snapshot.envelope.as_deref()),
        render_view(&snapshot)
    );

    axum::response::Html(crate::page_response(&headers, "Transactions", &inner_content))
}

/// HTMX: table fragment for the current snapshot
pub async fn htmx_transactions_table(
    state: axum::extract::State<AppState>,
) -> axum::response::Html<String> {
    axum::response::Html(render_view(&state.view.snapshot()))
}

pub fn render_envelope_select(envelopes: &[Envelope], current: Option<&str>) -> String {
    let mut options = format!(
        "<option value='' {}>Select envelope</option>",
        if current.is_none() { "selected" } else { "" }
    );
    for envelope in envelopes {
        let name = escape_html(&envelope.name);
        options.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            name,
            if current == Some(envelope.name.as_str()) { "selected" } else { "" },
            name
        ));
    }
    format!(
        r#"<select name='envelope' hx-post='/transactions/envelope' hx-trigger='change' {}
            class='px-4 py-2 border rounded-lg'>{}</select>"#,
        VIEW_TARGET, options
    )
}

/// Whole view fragment: filter form, table and pagination
pub fn render_view(snapshot: &ViewSnapshot) -> String {
    // While a fetch is still running, poll until it settles
    let poll = if snapshot.pending {
        "hx-get='/transactions/table' hx-trigger='load delay:500ms' hx-swap='outerHTML'"
    } else {
        ""
    };

    let filter = if snapshot.filtering {
        render_filter_form(snapshot)
    } else {
        String::new()
    };
    let pagination = snapshot
        .pagination
        .as_ref()
        .map(render_pagination)
        .unwrap_or_default();

    format!(
        r#"<div id='transactions-view' class='bg-white rounded-xl shadow-sm p-6' {}>
            {}
            <table class='w-full text-sm'>
                <thead><tr class='border-b'>{}</tr></thead>
                <tbody>{}</tbody>
            </table>
            {}
        </div>"#,
        poll,
        filter,
        render_header(&snapshot.header),
        render_body(&snapshot.body, snapshot.header.len()),
        pagination
    )
}

pub fn render_header(cells: &[HeaderCell]) -> String {
    cells
        .iter()
        .map(|cell| {
            if !cell.sortable {
                return format!("<th class='text-left py-2 px-3'>{}</th>", cell.label);
            }
            let arrow = match (cell.active, cell.direction) {
                (false, _) => "",
                (true, SortDirection::Asc) => " ▲",
                (true, SortDirection::Desc) => " ▼",
            };
            format!(
                r#"<th class='text-left py-2 px-3'><button hx-post='/transactions/sort/{}' {}
                    class='font-semibold hover:text-indigo-600'>{}{}</button></th>"#,
                cell.id, VIEW_TARGET, cell.label, arrow
            )
        })
        .collect()
}

pub fn render_body(plan: &RenderPlan, columns: usize) -> String {
    let span = columns.max(1);
    match plan {
        RenderPlan::Loading { columns } => {
            let cells: String = RenderPlan::loading_cells(*columns)
                .iter()
                .map(|cell| format!("<td class='py-2 px-3 text-gray-500'>{}</td>", escape_html(cell.label())))
                .collect();
            format!("<tr class='htmx-loading'>{}</tr>", cells)
        }
        RenderPlan::Empty { message } => format!(
            "<tr><td colspan='{}' class='py-8 text-center text-gray-500'>{}</td></tr>",
            span,
            escape_html(message)
        ),
        RenderPlan::Error { message } => format!(
            "<tr><td colspan='{}' class='py-8 text-center text-red-600'>{}</td></tr>",
            span,
            escape_html(message)
        ),
        RenderPlan::Rows { rows } => rows
            .iter()
            .map(|row| {
                let cells: String = row.cells.iter().map(render_cell).collect();
                format!(
                    r#"<tr hx-post='/transactions/select/{}' {} class='border-b cursor-pointer {}'>{}</tr>"#,
                    escape_html(&urlencoding::encode(&row.id)),
                    VIEW_TARGET,
                    if row.selected { "bg-indigo-50" } else { "hover:bg-gray-50" },
                    cells
                )
            })
            .collect(),
    }
}

fn render_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text { text } => format!("<td class='py-2 px-3'>{}</td>", escape_html(text)),
        CellValue::Badge { label, tone } => {
            let color = match tone {
                Tone::Success => "bg-green-100 text-green-700",
                Tone::Error => "bg-red-100 text-red-700",
            };
            format!(
                "<td class='py-2 px-3'><span class='px-2 py-0.5 rounded-full text-xs {}'>{}</span></td>",
                color,
                escape_html(label)
            )
        }
    }
}

pub fn render_pagination(plan: &PaginationPlan) -> String {
    let offset = (plan.page_index as u64).saturating_mul(plan.page_size as u64);
    let from = if plan.total == 0 { 0 } else { offset + 1 };
    let to = (offset + plan.page_size as u64).min(plan.total);

    let options: String = plan
        .options
        .iter()
        .map(|size| {
            format!(
                "<option value='{}' {}>{}</option>",
                size,
                if *size == plan.page_size { "selected" } else { "" },
                size
            )
        })
        .collect();

    format!(
        r#"<div class='mt-4 flex items-center justify-end gap-4 text-sm text-gray-600'>
            <label>Rows per page:
                <select name='page_size' hx-post='/transactions/page-size' hx-trigger='change' {}
                    class='ml-1 px-2 py-1 border rounded'>{}</select>
            </label>
            <span>{}-{} of {}</span>
            {}{}{}{}
        </div>"#,
        VIEW_TARGET,
        options,
        from,
        to,
        format_number(plan.total),
        render_page_button(0, plan.can_go_back, "First page", "&laquo;"),
        render_page_button(plan.page_index.saturating_sub(1), plan.can_go_back, "Previous page", "&lt;"),
        render_page_button(plan.page_index + 1, plan.can_go_forward, "Next page", "&gt;"),
        render_page_button(plan.last_page_index, plan.can_go_forward, "Last page", "&raquo;")
    )
}

fn render_page_button(page_index: usize, enabled: bool, title: &str, symbol: &str) -> String {
    format!(
        r#"<button hx-post='/transactions/page' hx-vals='{{"page_index": {}}}' {} title='{}' {}
                class='px-3 py-1 border rounded hover:bg-gray-100 disabled:opacity-50'>{}</button>"#,
        page_index,
        VIEW_TARGET,
        title,
        if enabled { "" } else { "disabled" },
        symbol
    )
}

pub fn render_filter_form(snapshot: &ViewSnapshot) -> String {
    let date = snapshot
        .filter
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let categories = escape_html(&snapshot.filter.categories.join(", "));
    let kind = snapshot.filter.kind.map(|k| k.to_string()).unwrap_or_default();

    let type_options: String = [("", "Any type"), ("income", "Income"), ("outgoing", "Outgoing")]
        .iter()
        .map(|(value, label)| {
            format!(
                "<option value='{}' {}>{}</option>",
                value,
                if *value == kind { "selected" } else { "" },
                label
            )
        })
        .collect();

    format!(
        r#"<form hx-post='/transactions/filter' {} class='flex flex-wrap items-end gap-3 mb-4'>
            <input type='date' name='date' value='{}' class='px-3 py-2 border rounded-lg'>
            <input type='text' name='categories' value='{}' placeholder='Categories, comma separated'
                class='px-3 py-2 border rounded-lg w-64'>
            <select name='type' class='px-3 py-2 border rounded-lg'>{}</select>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Filter</button>
            <button type='button' hx-post='/transactions/filter/reset' {}
                class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200'>Reset</button>
        </form>"#,
        VIEW_TARGET, date, categories, type_options, VIEW_TARGET
    )
}
