//! String formatting utilities.
//!
//! Hex prefix handling, short ids for log fields, and conversion between raw
//! token amounts and human readable decimal strings.

use alloy::primitives::U256;

/// Shortens an id or hash for log output: first 8 characters then "..".
///
/// Counts characters, not bytes, so relay-supplied text never splits a
/// multi-byte character.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Adds a "0x" prefix unless one (of either case) is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a leading "0x" or "0X".
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Renders a raw on-chain amount with its decimal point, trimming trailing
/// zeros ("1500000" with 6 decimals is "1.5").
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
	let digits = amount.to_string();
	if decimals == 0 {
		return digits;
	}

	let places = decimals as usize;
	let (integer_part, fraction) = if digits.len() <= places {
		("0".to_string(), format!("{:0>width$}", digits, width = places))
	} else {
		let split = digits.len() - places;
		(digits[..split].to_string(), digits[split..].to_string())
	};

	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, fraction)
	}
}

/// Parses a human readable amount ("1.5") into the token's smallest unit.
///
/// Fails on more fractional digits than the token has decimals, on anything
/// that is not a plain decimal number, and on overflow.
pub fn parse_token_amount(value: &str, decimals: u8) -> Result<U256, String> {
	let value = value.trim();
	let (integer_part, fraction) = match value.split_once('.') {
		Some((integer_part, fraction)) => (integer_part, fraction),
		None => (value, ""),
	};

	if integer_part.is_empty() && fraction.is_empty() {
		return Err(format!("Invalid amount '{}'", value));
	}
	if !integer_part
		.chars()
		.chain(fraction.chars())
		.all(|c| c.is_ascii_digit())
	{
		return Err(format!("Invalid amount '{}'", value));
	}
	if fraction.len() > decimals as usize {
		return Err(format!(
			"Amount '{}' has more than {} decimal places",
			value, decimals
		));
	}

	let digits = format!(
		"{}{:0<width$}",
		integer_part,
		fraction,
		width = decimals as usize
	);
	let digits = digits.trim_start_matches('0');
	if digits.is_empty() {
		return Ok(U256::ZERO);
	}
	U256::from_str_radix(digits, 10).map_err(|e| format!("Invalid amount '{}': {}", value, e))
}
