//! Formatação de valores para o relatório. Sem localização: separador de
//! milhar `,` e separador decimal `.`.

/// Texto exibido para valores não finitos
pub const NOT_AVAILABLE: &str = "n/a";

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `1234.567` → `"$1,234.57"`; negativos como `"$-1,234.57"`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };

    format!("${}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// `6.333` → `"6.33%"`. O valor não é multiplicado por 100.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value)
}

/// Número com duas casas decimais
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}", value)
}
