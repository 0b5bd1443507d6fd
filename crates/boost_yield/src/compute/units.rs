//! Raw reward units to display units.

/// Whole display units, remainder dropped.
pub fn whole_units(amount: u64, decimals: u8) -> u64 {
    match 10u64.checked_pow(u32::from(decimals)) {
        Some(divisor) => amount / divisor,
        None => 0,
    }
}

/// Exact decimal rendering, e.g. `format_units(150_000, 5) == "1.5"`.
pub fn format_units(amount: u64, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}
