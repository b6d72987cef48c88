use chrono::NaiveDate;

use crate::config::IssuerProfile;
use crate::format::{derive_dates, format_won, words_for};
use crate::models::InvoiceRecord;

/// A4 at 96 DPI.
pub const PAGE_WIDTH_PX: u32 = 794;
pub const PAGE_HEIGHT_PX: u32 = 1123;

/// Page metadata plus the date used when a record has no issue date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub page_number: usize,
    pub total_pages: usize,
    pub today: NaiveDate,
}

/// Renders fixed-layout invoice pages for one issuer.
#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    issuer: IssuerProfile,
}

impl InvoiceRenderer {
    pub fn new(issuer: IssuerProfile) -> Self {
        Self { issuer }
    }

    /// One invoice page as an HTML fragment. Output depends only on the arguments.
    pub fn render(&self, record: &InvoiceRecord, ctx: &RenderContext) -> String {
        let dates = derive_dates(Some(record.issue_date.as_str()), ctx.today);
        let amount = format_won(record.amount);
        let words = words_for(record.amount);
        let words_html = if words.is_empty() {
            String::new()
        } else {
            format!(
                r#"<div style="font-size: 13px; color: #666666; margin-top: 4px;">({})</div>"#,
                words
            )
        };
        let description = if record.description.is_empty() {
            &self.issuer.default_item
        } else {
            &record.description
        };

        format!(
            r#"<div class="invoice-page" id="invoice-{id}" data-page="{page}" data-total-pages="{total}" style="width: {width}px; min-height: {height}px; padding: 60px; margin: 0 auto; box-sizing: border-box; font-family: 'Malgun Gothic', 'Apple SD Gothic Neo', sans-serif; display: flex; flex-direction: column; background: #ffffff; color: #000000; page-break-after: always;">
  <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 50px;">
    <h1 style="font-size: 36px; font-weight: bold; margin: 0;">Invoice</h1>
    <img src="{logo}" alt="MISO" style="width: 80px; height: 27px; object-fit: contain;" />
  </div>
  <div style="margin-bottom: 40px; font-size: 13px; line-height: 1.8;">
    <div style="margin-bottom: 4px;"><span style="font-weight: 600; display: inline-block; width: 120px;">발행일</span><span>{issue_date}</span></div>
    <div><span style="font-weight: 600; display: inline-block; width: 120px;">결제 기한</span><span>{due_date}</span></div>
  </div>
  <div style="display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 50px;">
    <div style="flex: 1; font-size: 13px; line-height: 1.8;">
      <div style="font-weight: 600; margin-bottom: 8px;">발행자</div>
      <div style="font-weight: 600; margin-bottom: 8px;">{issuer_name}</div>
      <div>{issuer_address}</div>
    </div>
    <div style="flex: 1; text-align: right; font-size: 13px; line-height: 1.8;">
      <div style="font-weight: 600; margin-bottom: 8px;">수신자</div>
      <div>{company}</div>
      <div>{contact_name}</div>
      <div>{contact_email}</div>
    </div>
  </div>
  <div style="margin-bottom: 20px;">
    <div style="font-size: 32px; font-weight: bold;">{amount}</div>
    {words_html}
  </div>
  <div style="margin-bottom: 30px; font-size: 13px;"><span style="font-weight: 600; margin-right: 8px;">입금계좌</span>{bank}</div>
  <table style="width: 100%; border-collapse: collapse; margin-bottom: 40px;">
    <thead>
      <tr style="border-bottom: 1px solid #000000;">
        <th style="text-align: left; padding: 12px 0; font-size: 13px; font-weight: 600;">설명</th>
        <th style="text-align: right; padding: 12px 0; font-size: 13px; font-weight: 600; width: 120px;">금액</th>
      </tr>
    </thead>
    <tbody>
      <tr>
        <td style="padding: 16px 0; font-size: 13px;">{description}</td>
        <td style="text-align: right; padding: 16px 0; font-size: 13px;">{amount}</td>
      </tr>
    </tbody>
  </table>
  <div style="margin-left: auto; width: 300px; margin-bottom: 60px;">
    <div style="display: flex; justify-content: space-between; padding: 12px 0; font-size: 13px; border-bottom: 1px solid #E5E5E5;"><span>총액</span><span>{amount}</span></div>
    <div style="display: flex; justify-content: space-between; padding: 12px 0; font-size: 14px; font-weight: bold;"><span>최종 결제 금액</span><span>{amount}</span></div>
  </div>
  <div style="margin-top: auto; font-size: 12px; color: #666666;">{inquiry}</div>
</div>
"#,
            id = escape_html(&record.id),
            page = ctx.page_number,
            total = ctx.total_pages,
            width = PAGE_WIDTH_PX,
            height = PAGE_HEIGHT_PX,
            logo = escape_html(&self.issuer.logo_url),
            issue_date = dates.issue_date_display(),
            due_date = dates.due_date_display(),
            issuer_name = escape_html(&self.issuer.name),
            issuer_address = escape_html(&self.issuer.address),
            company = escape_html(&record.company),
            contact_name = escape_html(&record.contact_name),
            contact_email = escape_html(&record.contact_email),
            amount = amount,
            words_html = words_html,
            bank = escape_html(&self.issuer.bank),
            description = escape_html(description),
            inquiry = escape_html(&self.issuer.inquiry_note),
        )
    }

    /// Renders every record in order, numbering pages from 1.
    pub fn render_all(&self, records: &[InvoiceRecord], today: NaiveDate) -> Vec<String> {
        let total_pages = records.len();
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let ctx = RenderContext {
                    page_number: idx + 1,
                    total_pages,
                    today,
                };
                self.render(record, &ctx)
            })
            .collect()
    }
}

/// Escapes text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
