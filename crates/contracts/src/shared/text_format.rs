//! Text helpers shared by filter titles, chart labels and table cells.

/// Turns an identifier into a human title.
///
/// Handles camel case (`LaunchTime` -> `Launch Time`), acronyms
/// (`InstanceID` -> `Instance ID`) and snake/kebab case
/// (`ebs_volumes` -> `Ebs Volumes`).
pub fn camel_to_title(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            continue;
        }

        if i > 0 && c.is_uppercase() && !out.is_empty() && !out.ends_with(' ') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }

        if out.is_empty() || out.ends_with(' ') {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out.trim_end().to_string()
}

/// Formats a number with `,` thousands separators and a fixed number of decimals.
///
/// ```
/// use contracts::shared::text_format::format_number_with_decimals;
/// assert_eq!(format_number_with_decimals(1234.567, 2), "1,234.57");
/// ```
pub fn format_number_with_decimals(value: f64, decimals: u8) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.*}", decimals as usize, value);

    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // "-0.00" reads badly in a money column
    let sign = if grouped.chars().all(|c| c == '0') && decimal_part.map_or(true, |d| d.chars().all(|c| c == '0')) {
        ""
    } else {
        sign
    };

    match decimal_part {
        Some(d) => format!("{}{}.{}", sign, grouped, d),
        None => format!("{}{}", sign, grouped),
    }
}

/// Money with 2 decimals: `$1,234.50`.
pub fn format_money(value: f64) -> String {
    format_money_with_decimals(value, 2)
}

/// Money with an explicit precision, used for hourly prices (`$0.125`).
pub fn format_money_with_decimals(value: f64, decimals: u8) -> String {
    let number = format_number_with_decimals(value, decimals);
    match number.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", number),
    }
}
