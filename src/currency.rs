//! Indonesian Rupiah formatting for amounts and amount inputs.
//!
//! Amounts are shown without fraction digits, with `.` as the thousands separator and a
//! non-breaking space after the `Rp` prefix, e.g. `Rp 50.000`.

const PREFIX: &str = "Rp\u{a0}";
const INVALID: &str = "Rp0";

/// Formats `value` as Rupiah; non-finite values yield `Rp0`.
pub fn format_currency(value: f64) -> String {
	if !value.is_finite() {
		return INVALID.into();
	}

	// Half away from zero.
	let rounded = value.abs().round();
	let digits = group_thousands(rounded as u64);

	if value.is_sign_negative() && rounded > 0. {
		format!("-{PREFIX}{digits}")
	} else {
		format!("{PREFIX}{digits}")
	}
}

/// Formats a decimal amount string such as `"150000.00"`; unparseable text yields `Rp0`.
pub fn format_currency_str(amount: &str) -> String {
	parse_amount(amount).map(format_currency).unwrap_or_else(|| INVALID.into())
}

/// Parses the leading decimal number of `text`, ignoring leading whitespace and any trailing
/// garbage. Returns `None` when `text` does not start with a number.
pub fn parse_amount(text: &str) -> Option<f64> {
	let text = text.trim_start();
	let bytes = text.as_bytes();
	let mut end = 0;

	if matches!(bytes.first(), Some(b'+' | b'-')) {
		end += 1;
	}

	let int_start = end;

	end += count_digits(&bytes[end..]);

	let mut mantissa_digits = end - int_start;

	if bytes.get(end) == Some(&b'.') {
		let fraction = count_digits(&bytes[end + 1..]);

		if fraction > 0 || mantissa_digits > 0 {
			end += 1 + fraction;
			mantissa_digits += fraction;
		}
	}
	if mantissa_digits == 0 {
		return None;
	}
	if matches!(bytes.get(end), Some(b'e' | b'E')) {
		let mut exp_end = end + 1;

		if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
			exp_end += 1;
		}

		let exp_digits = count_digits(&bytes[exp_end..]);

		if exp_digits > 0 {
			end = exp_end + exp_digits;
		}
	}

	text[..end].parse().ok()
}

/// Keeps only the digits of `text`; empty or overflowing input yields 0.
pub fn parse_currency_input(text: &str) -> u64 {
	let digits = text.chars().filter(char::is_ascii_digit).collect::<String>();

	digits.parse().unwrap_or(0)
}

/// Formats an input value with thousands separators and no prefix; 0 yields an empty string.
pub fn format_currency_input(value: u64) -> String {
	if value == 0 { String::new() } else { group_thousands(value) }
}

/// Compact axis label: `1.5M`, `250K`, or the plain value below one thousand.
pub fn format_compact(value: f64) -> String {
	if value >= 1_000_000. {
		let tenths = round_half_up(value / 100_000.);

		format!("{}.{}M", tenths / 10, tenths % 10)
	} else if value >= 1_000. {
		format!("{}K", round_half_up(value / 1_000.))
	} else {
		value.to_string()
	}
}

fn group_thousands(value: u64) -> String {
	let digits = value.to_string();
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

	for (i, digit) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push('.');
		}

		grouped.push(digit);
	}

	grouped
}

fn count_digits(bytes: &[u8]) -> usize {
	bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn round_half_up(value: f64) -> i64 {
	(value + 0.5).floor() as i64
}
