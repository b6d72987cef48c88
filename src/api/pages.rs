use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::AppState;
use crate::format::{dates, format_won, words_for};
use crate::models::{sort_records, InvoiceRecord, Selection, SortField, SortOrder, SortState};
use crate::service::renderer::escape_html;

pub const EMPTY_PREVIEW_MESSAGE: &str = "미리보기할 계약을 선택해주세요.";
pub const EMPTY_PRINT_MESSAGE: &str = "인보이스를 생성할 계약을 선택해주세요.";
const LOAD_FAILED_MESSAGE: &str = "데이터를 불러오는데 실패했습니다.";

const PAGE_STYLE: &str = r#"
  body { margin: 0; font-family: 'Malgun Gothic', 'Apple SD Gothic Neo', sans-serif; background: #faf5ff; color: #0f172a; }
  main { max-width: 1280px; margin: 0 auto; padding: 48px 24px; }
  .card { background: #ffffff; border: 1px solid #f3e8ff; border-radius: 12px; box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.1); }
  .card-header { display: flex; justify-content: space-between; align-items: center; padding: 24px; }
  .card-header h1 { font-size: 24px; margin: 0; }
  .muted { color: #64748b; font-size: 14px; }
  .actions button, .actions a { font-size: 16px; padding: 10px 18px; border-radius: 8px; margin-left: 8px; cursor: pointer; text-decoration: none; }
  .primary { background: #7c3aed; color: #ffffff; border: none; }
  .outline { background: transparent; color: #7c3aed; border: 1px solid #7c3aed; }
  table.records { width: 100%; border-collapse: collapse; }
  table.records th { text-align: left; padding: 12px; background: #faf5ff; font-weight: 600; }
  table.records th button.sort { background: none; border: none; padding: 0; font: inherit; color: inherit; cursor: pointer; }
  table.records td { padding: 12px; border-top: 1px solid #f1f5f9; }
  table.records tr.row { cursor: pointer; }
  .amount { font-weight: 600; color: #7c3aed; }
  .words { font-size: 12px; color: #64748b; font-weight: normal; margin-left: 8px; white-space: nowrap; }
  .alert { margin: 0 0 16px; padding: 12px 16px; border-radius: 8px; background: #fef2f2; color: #991b1b; }
  .preview-page { margin: 0 auto 12px; width: 794px; box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1); border-radius: 8px; overflow: hidden; }
  .page-label { text-align: center; margin: 24px 0 8px; }
"#;

/// Records page query: sort state, the carried selection and a select-all request.
///
/// The table form resubmits itself here with `current_sort`/`current_order`,
/// in which case `sort` names the clicked column. Plain links pass `sort` and
/// `order` directly. Unknown values fall back to the defaults.
#[derive(Debug, Default)]
struct TableQuery {
    sort: SortState,
    selection: Selection,
    toggle_all: bool,
}

impl TableQuery {
    fn from_fields(fields: &[(String, String)]) -> Self {
        let clicked = field_value(fields, "sort").and_then(SortField::parse);

        let sort = match field_value(fields, "current_sort") {
            Some(current) => {
                let current = SortState {
                    field: SortField::parse(current).unwrap_or_default(),
                    order: field_value(fields, "current_order")
                        .and_then(SortOrder::parse)
                        .unwrap_or_default(),
                };
                clicked.map_or(current, |field| current.toggle(field))
            }
            None => SortState {
                field: clicked.unwrap_or_default(),
                order: field_value(fields, "order")
                    .and_then(SortOrder::parse)
                    .unwrap_or_default(),
            },
        };

        Self {
            sort,
            selection: selected_ids(fields),
            toggle_all: field_value(fields, "toggle_all").is_some(),
        }
    }
}

fn field_value<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn selected_ids(fields: &[(String, String)]) -> Selection {
    Selection::from_ids(
        fields
            .iter()
            .filter(|(key, _)| key == "id")
            .map(|(_, value)| value.clone()),
    )
}

/// Minimal HTML document around `body`.
pub fn document_shell(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8" />
<title>{title}</title>
<style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        style = PAGE_STYLE,
        body = body,
    )
}

/// Records table with sorting and selection
pub async fn records_page(
    State(state): State<AppState>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Html<String> {
    let TableQuery {
        sort,
        mut selection,
        toggle_all,
    } = TableQuery::from_fields(&fields);

    let (mut records, alert) = match state.records.fetch_records().await {
        Ok(records) => (records, None),
        Err(e) => {
            tracing::error!(error = %e, "error fetching records");
            (Vec::new(), Some(format!("{} {}", LOAD_FAILED_MESSAGE, e)))
        }
    };
    sort_records(&mut records, sort);
    if toggle_all {
        selection.toggle_all(records.iter().map(|r| r.id.as_str()));
    }

    Html(render_records_page(&records, sort, &selection, alert.as_deref()))
}

fn render_records_page(
    records: &[InvoiceRecord],
    sort: SortState,
    selection: &Selection,
    alert: Option<&str>,
) -> String {
    let alert_html = alert
        .map(|msg| format!(r#"<div class="alert" role="alert">{}</div>"#, escape_html(msg)))
        .unwrap_or_default();

    let headers: String = SortField::ALL
        .iter()
        .map(|&field| {
            let arrow = if sort.field == field {
                format!(" <span>{}</span>", sort.order.arrow())
            } else {
                String::new()
            };
            format!(
                r#"<th><button type="submit" class="sort" formaction="/" formmethod="get" name="sort" value="{}">{}{}</button></th>"#,
                field.as_str(),
                field.label(),
                arrow
            )
        })
        .collect();

    let rows: String = if records.is_empty() {
        r#"<tr><td colspan="7" class="muted" style="text-align: center; padding: 32px;">등록된 계약이 없습니다.</td></tr>"#
            .to_string()
    } else {
        records
            .iter()
            .map(|r| render_row(r, selection.is_selected(&r.id)))
            .collect()
    };

    let selected = selection.count_in(records);
    let all_checked = if !records.is_empty() && selected == records.len() {
        " checked"
    } else {
        ""
    };

    let body = format!(
        r#"<main>
{alert_html}<form id="invoice-form" method="post" action="/invoices" class="card">
  <input type="hidden" name="current_sort" value="{current_sort}" />
  <input type="hidden" name="current_order" value="{current_order}" />
  <div class="card-header">
    <div>
      <h1>미소 인보이스 생성기</h1>
      <div class="muted"><span id="selected-count">{selected}</span>개 선택됨 · 총 {total}개 계약</div>
    </div>
    <div class="actions">
      <button type="submit" name="action" value="preview" class="outline">미리보기</button>
      <button type="submit" name="action" value="print" class="primary">PDF 다운로드</button>
    </div>
  </div>
  <table class="records">
    <thead>
      <tr><th><input type="checkbox" id="select-all" aria-label="Select all"{all_checked} /><button type="submit" id="toggle-all" name="toggle_all" value="1" formaction="/" formmethod="get" hidden></button></th>{headers}</tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</form>
</main>
<script>{script}</script>"#,
        alert_html = alert_html,
        current_sort = sort.field.as_str(),
        current_order = sort.order.as_str(),
        selected = selected,
        total = records.len(),
        all_checked = all_checked,
        headers = headers,
        rows = rows,
        script = SELECTION_SCRIPT,
    );

    document_shell("미소 인보이스 생성기", &body)
}

fn render_row(record: &InvoiceRecord, checked: bool) -> String {
    let words = words_for(record.amount);
    let words_html = if words.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="words">{}</span>"#, words)
    };

    format!(
        r#"      <tr class="row">
        <td><input type="checkbox" name="id" value="{id}" aria-label="Select {company}"{checked} /></td>
        <td>{company}</td>
        <td>{description}</td>
        <td class="amount">{amount}{words}</td>
        <td>{contact_name}</td>
        <td>{contact_email}</td>
        <td>{issue_date}</td>
      </tr>
"#,
        id = escape_html(&record.id),
        checked = if checked { " checked" } else { "" },
        company = escape_html(&record.company),
        description = dash_if_empty(&record.description),
        amount = format_won(record.amount),
        words = words_html,
        contact_name = escape_html(&record.contact_name),
        contact_email = escape_html(&record.contact_email),
        issue_date = dash_if_empty(&record.issue_date),
    )
}

fn dash_if_empty(text: &str) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        escape_html(text)
    }
}

/// Row clicks and the selected counter; select-all resubmits the table.
const SELECTION_SCRIPT: &str = r#"
(function () {
  var form = document.getElementById("invoice-form");
  var boxes = Array.prototype.slice.call(document.querySelectorAll('input[name="id"]'));
  var count = document.getElementById("selected-count");
  function refresh() {
    count.textContent = boxes.filter(function (b) { return b.checked; }).length;
  }
  document.getElementById("select-all").addEventListener("change", function () {
    form.requestSubmit(document.getElementById("toggle-all"));
  });
  boxes.forEach(function (b) {
    b.addEventListener("change", refresh);
    b.closest("tr").addEventListener("click", function (e) {
      if (e.target !== b) { b.checked = !b.checked; refresh(); }
    });
  });
  refresh();
})();
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvoiceAction {
    Preview,
    Print,
}

/// Selected ids and the requested action from the table form.
fn parse_action_form(fields: &[(String, String)]) -> (Selection, InvoiceAction) {
    let action = match field_value(fields, "action") {
        Some("print") => InvoiceAction::Print,
        _ => InvoiceAction::Preview,
    };
    (selected_ids(fields), action)
}

/// Preview or print the records selected in the table
pub async fn invoice_action(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let (selection, action) = parse_action_form(&fields);
    let empty_message = match action {
        InvoiceAction::Preview => EMPTY_PREVIEW_MESSAGE,
        InvoiceAction::Print => EMPTY_PRINT_MESSAGE,
    };
    if selection.is_empty() {
        return message_page(StatusCode::BAD_REQUEST, empty_message);
    }

    let records = match state.records.fetch_records().await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "error fetching records for invoices");
            return message_page(
                StatusCode::BAD_GATEWAY,
                &format!("{} {}", LOAD_FAILED_MESSAGE, e),
            );
        }
    };

    let selected = selection.pick(&records);
    if selected.is_empty() {
        return message_page(StatusCode::BAD_REQUEST, empty_message);
    }

    match action {
        InvoiceAction::Preview => {
            let sort = TableQuery::from_fields(&fields).sort;
            Html(render_preview_page(&state, &selected, sort)).into_response()
        }
        InvoiceAction::Print => match state.exporter.export(&selected, dates::today()) {
            Ok(staged) => Redirect::to(&staged.url).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "invoice generation failed");
                message_page(StatusCode::BAD_REQUEST, "인보이스 생성 중 오류가 발생했습니다.")
            }
        },
    }
}

fn render_preview_page(state: &AppState, records: &[InvoiceRecord], sort: SortState) -> String {
    let total = records.len();
    let pages: String = state
        .renderer
        .render_all(records, dates::today())
        .into_iter()
        .enumerate()
        .map(|(idx, page)| {
            format!(
                r#"<div class="page-label muted">{} / {}</div>
<div class="preview-page">{}</div>
"#,
                idx + 1,
                total,
                page
            )
        })
        .collect();

    let hidden_ids: String = records
        .iter()
        .map(|r| format!(r#"<input type="hidden" name="id" value="{}" />"#, escape_html(&r.id)))
        .collect();

    let body = format!(
        r#"<main>
<form method="post" action="/invoices" class="card">
  <div class="card-header">
    <div>
      <h1>인보이스 미리보기</h1>
      <div class="muted">총 {total}개의 인보이스</div>
    </div>
    <div class="actions">
      {hidden_ids}<input type="hidden" name="current_sort" value="{current_sort}" />
      <input type="hidden" name="current_order" value="{current_order}" />
      <button type="submit" formaction="/" formmethod="get" class="outline">취소</button>
      <button type="submit" name="action" value="print" class="primary">PDF 다운로드</button>
    </div>
  </div>
</form>
{pages}</main>"#,
        total = total,
        hidden_ids = hidden_ids,
        current_sort = sort.field.as_str(),
        current_order = sort.order.as_str(),
        pages = pages,
    );

    document_shell("인보이스 미리보기", &body)
}

fn message_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        r#"<main><div class="alert" role="alert">{}</div><a href="/">목록으로 돌아가기</a></main>"#,
        escape_html(message)
    );
    (status, Html(document_shell("미소 인보이스 생성기", &body))).into_response()
}
