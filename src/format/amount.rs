/// Myriad suffixes, indexed by base-10000 chunk position.
const MYRIAD_UNITS: [&str; 4] = ["", "만", "억", "조"];

/// Positional words inside one four-digit chunk (ones, tens, hundreds, thousands).
const CHUNK_UNITS: [&str; 4] = ["", "십", "백", "천"];

const DIGITS: [&str; 10] = ["", "일", "이", "삼", "사", "오", "육", "칠", "팔", "구"];

const CURRENCY_UNIT: &str = "원";

/// First amount that no longer fits in the 만/억/조 scale table.
pub const AMOUNT_WORDS_CEILING: u64 = 10_000_000_000_000_000;

/// Converts an amount to its Korean monetary phrase, e.g. `40000` -> `사만원`.
///
/// Zero has no phrase and yields an empty string. Amounts at or above
/// [`AMOUNT_WORDS_CEILING`] also yield an empty string instead of wrapping.
pub fn amount_in_words(n: u64) -> String {
    if n == 0 || n >= AMOUNT_WORDS_CEILING {
        return String::new();
    }

    // base-10000 chunks, least significant first
    let mut chunks = Vec::with_capacity(MYRIAD_UNITS.len());
    let mut rest = n;
    while rest > 0 {
        chunks.push((rest % 10_000) as usize);
        rest /= 10_000;
    }

    let mut result = String::new();
    for (idx, &chunk) in chunks.iter().enumerate().rev() {
        if chunk == 0 {
            continue;
        }
        result.push_str(&chunk_in_words(chunk));
        result.push_str(MYRIAD_UNITS[idx]);
    }

    result.push_str(CURRENCY_UNIT);
    result
}

/// Renders a value in `1..=9999`; `일` is dropped before 십/백/천.
fn chunk_in_words(chunk: usize) -> String {
    let digits = [chunk / 1000, (chunk % 1000) / 100, (chunk % 100) / 10, chunk % 10];

    let mut out = String::new();
    for (i, &digit) in digits.iter().enumerate() {
        if digit == 0 {
            continue;
        }
        let position = 3 - i;
        if digit == 1 && position > 0 {
            out.push_str(CHUNK_UNITS[position]);
        } else {
            out.push_str(DIGITS[digit]);
            out.push_str(CHUNK_UNITS[position]);
        }
    }
    out
}

/// Words for a display amount; fractions are truncated, invalid amounts yield "".
pub fn words_for(amount: f64) -> String {
    if !amount.is_finite() || amount < 1.0 {
        return String::new();
    }
    // saturating cast; anything past the ceiling renders as ""
    amount_in_words(amount.trunc() as u64)
}

/// Formats an amount the way the ko-KR number format does, then appends `원`.
///
/// `1234567` -> `1,234,567원`, `0` -> `0원`. Up to three fraction digits are kept.
/// The integer digits are the shortest round-trip digits, so `1e20` prints as
/// `100,000,000,000,000,000,000원`.
pub fn format_won(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let magnitude = amount.abs();

    let mut int_part = magnitude.trunc();
    let mut frac_part = (magnitude.fract() * 1000.0).round() as u64;
    if frac_part == 1000 {
        int_part += 1.0;
        frac_part = 0;
    }

    let mut out = String::new();
    if amount < 0.0 && (int_part > 0.0 || frac_part > 0) {
        out.push('-');
    }
    // Display never switches to exponent notation for f64
    out.push_str(&group_thousands(&int_part.to_string()));

    if frac_part > 0 {
        let frac = format!("{:03}", frac_part);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }

    out.push_str(CURRENCY_UNIT);
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
