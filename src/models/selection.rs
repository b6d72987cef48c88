use indexmap::IndexSet;

use super::InvoiceRecord;

/// Selected record ids, kept apart from the records themselves.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Clears when every visible id is already selected, otherwise selects them all.
    pub fn toggle_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: Vec<&str> = visible.into_iter().collect();
        if !visible.is_empty() && visible.iter().all(|id| self.ids.contains(*id)) {
            self.ids.clear();
        } else {
            self.ids.clear();
            self.ids.extend(visible.into_iter().map(str::to_string));
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// How many of `records` are selected; ids from an older fetch are ignored.
    pub fn count_in(&self, records: &[InvoiceRecord]) -> usize {
        records.iter().filter(|r| self.is_selected(&r.id)).count()
    }

    /// Selected records in record order, not in click order.
    pub fn pick(&self, records: &[InvoiceRecord]) -> Vec<InvoiceRecord> {
        records
            .iter()
            .filter(|r| self.ids.contains(r.id.as_str()))
            .cloned()
            .collect()
    }
}
