pub mod amount;
pub mod dates;

pub use amount::{amount_in_words, format_won, words_for, AMOUNT_WORDS_CEILING};
pub use dates::{derive_dates, format_long_date, InvoiceDates};
