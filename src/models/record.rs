use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

/// Canonical invoice record, one per upstream contract row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceRecord {
    pub id: String,
    pub company: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
    pub contact_name: String,
    pub contact_email: String,
    /// `YYYY.MM.DD`, empty means "today".
    pub issue_date: String,
    pub description: String,
}

/// Whole amounts go out as JSON integers (`0`, not `0.0`).
fn serialize_amount<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.fract() == 0.0 && *amount >= 0.0 && *amount < u64::MAX as f64 {
        serializer.serialize_u64(*amount as u64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

/// Sortable columns of the records table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Company,
    Amount,
    ContactName,
    ContactEmail,
    IssueDate,
    Description,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Company,
        SortField::Description,
        SortField::Amount,
        SortField::ContactName,
        SortField::ContactEmail,
        SortField::IssueDate,
    ];

    /// Query value to field; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Company => "company",
            SortField::Amount => "amount",
            SortField::ContactName => "contactName",
            SortField::ContactEmail => "contactEmail",
            SortField::IssueDate => "issueDate",
            SortField::Description => "description",
        }
    }

    /// Column header label.
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Company => "회사명",
            SortField::Amount => "최종금액",
            SortField::ContactName => "담당자",
            SortField::ContactEmail => "담당자 이메일",
            SortField::IssueDate => "발행일",
            SortField::Description => "설명",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

/// Current sort column and direction of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    /// State after clicking `field`: the active column flips, any other starts ascending.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                order: self.order.flipped(),
            }
        } else {
            Self {
                field,
                order: SortOrder::Asc,
            }
        }
    }
}

fn compare_by(a: &InvoiceRecord, b: &InvoiceRecord, field: SortField) -> Ordering {
    match field {
        SortField::Company => collate(&a.company, &b.company),
        SortField::Amount => a.amount.total_cmp(&b.amount),
        SortField::ContactName => collate(&a.contact_name, &b.contact_name),
        SortField::ContactEmail => collate(&a.contact_email, &b.contact_email),
        SortField::IssueDate => collate(&a.issue_date, &b.issue_date),
        SortField::Description => collate(&a.description, &b.description),
    }
}

/// Case-insensitive text order; on a tie lowercase sorts first (`apple`, `Apple`, `Banana`).
fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// Stable sort; equal keys keep their fetch order in both directions.
pub fn sort_records(records: &mut [InvoiceRecord], sort: SortState) {
    records.sort_by(|a, b| {
        let ord = compare_by(a, b, sort.field);
        match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
