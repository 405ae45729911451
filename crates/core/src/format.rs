//! Display formatting for prices, magnitudes and percentages.
//!
//! Pure functions, no state. Unknown values (`None`, NaN, infinities) render
//! as an em dash so the UI never shows a made-up 0.

/// Placeholder for an unknown value.
pub const UNKNOWN: &str = "—";

const SUFFIXES: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Insert `,` thousands separators into a plain decimal string such as
/// `"-1234567.89"`.
pub fn group_thousands(plain: &str) -> String {
    let (sign, rest) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Fixed-precision number with thousands separators: `1234.5` → `"1,234.50"`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return UNKNOWN.to_string();
    }
    let plain = format!("{value:.decimals$}");
    // no "-0.00"
    let plain = if plain.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        plain.trim_start_matches('-').to_string()
    } else {
        plain
    };
    group_thousands(&plain)
}

/// Abbreviated magnitude: `1_234_000_000` → `"1.23B"`, `45_600` → `"45.60K"`,
/// `999.5` → `"999.50"`. Values past the largest suffix keep grouping
/// (`"1,234.00B"`).
pub fn format_large_number(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return UNKNOWN.to_string();
    };
    let abs = v.abs();

    for (i, (unit, suffix)) in SUFFIXES.iter().enumerate() {
        if abs >= *unit {
            let scaled = v / unit;
            // 999_999 would print as "1000.00K"; promote to the next unit.
            if i > 0 && (scaled.abs() * 100.0).round() / 100.0 >= 1000.0 {
                let (bigger, bigger_suffix) = SUFFIXES[i - 1];
                return format!("{}{bigger_suffix}", format_number(v / bigger, 2));
            }
            return format!("{}{suffix}", format_number(scaled, 2));
        }
    }
    format_number(v, 2)
}

/// Number of decimals used for a unit price: cents for prices of at least 1,
/// more digits the smaller the price gets.
pub fn price_decimals(price: f64) -> usize {
    let abs = price.abs();
    if abs == 0.0 || abs >= 1.0 {
        2
    } else if abs >= 0.01 {
        4
    } else if abs >= 0.000_1 {
        6
    } else {
        8
    }
}

/// Currency prefix for a CoinGecko `vs_currency` code.
pub fn currency_symbol(vs_currency: &str) -> String {
    match vs_currency.to_lowercase().as_str() {
        "usd" => "$".to_string(),
        "eur" => "€".to_string(),
        "gbp" => "£".to_string(),
        "jpy" | "cny" => "¥".to_string(),
        "inr" => "₹".to_string(),
        "btc" => "₿".to_string(),
        other => format!("{} ", other.to_uppercase()),
    }
}

/// Unit price with variable precision: `"$67,123.45"`, `"$0.5123"`,
/// `"$0.00001234"`.
pub fn format_price(value: Option<f64>, vs_currency: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(p) => format!(
            "{}{}",
            currency_symbol(vs_currency),
            format_number(p, price_decimals(p))
        ),
        None => UNKNOWN.to_string(),
    }
}

/// Monetary total, always two decimals: `"$1,234.50"`.
pub fn format_money(value: Option<f64>, vs_currency: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{}{}", currency_symbol(vs_currency), format_number(v, 2)),
        None => UNKNOWN.to_string(),
    }
}

/// Signed percentage: `"+1.23%"`, `"-0.50%"`, `"—"` when unknown.
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => {
            let rounded = format!("{:.2}", v.abs());
            if rounded == "0.00" {
                "0.00%".to_string()
            } else if v > 0.0 {
                format!("+{rounded}%")
            } else {
                format!("-{rounded}%")
            }
        }
        None => UNKNOWN.to_string(),
    }
}

/// Holding quantity: up to 8 decimals with trailing zeros trimmed,
/// `0.50000000` → `"0.5"`, `1200` → `"1,200"`.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return UNKNOWN.to_string();
    }
    let plain = format!("{amount:.8}");
    let trimmed = plain.trim_end_matches('0').trim_end_matches('.');
    group_thousands(trimmed)
}
