//! Pure display formatting. Every function here is deterministic and
//! locale-independent: the same float always yields the same bytes.

/// Severity bucket for the visual intensity indicator. Has no effect on
/// scheduling.
pub fn gas_level(gwei: f64) -> u8 {
    if gwei < 1.0 {
        1
    } else if gwei < 10.0 {
        2
    } else if gwei < 30.0 {
        3
    } else if gwei < 100.0 {
        4
    } else {
        5
    }
}

/// Precision follows magnitude so small fees stay legible and large ones
/// stay compact: 3 fractional digits below 1 gwei, 2 below 10, none above.
pub fn format_gas(gwei: f64) -> String {
    if gwei < 1.0 {
        format!("{:.3}", gwei)
    } else if gwei < 10.0 {
        format!("{:.2}", gwei)
    } else {
        format!("{:.0}", gwei)
    }
}

/// Currency-style formatting: leading `$`, comma thousands separators,
/// `decimals` fractional digits (the deployment picks 0 or 2).
pub fn format_price(usd: f64, decimals: u8) -> String {
    let rounded = format!("{:.*}", decimals as usize, usd);
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rounded.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    grouped.push('$');
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}
