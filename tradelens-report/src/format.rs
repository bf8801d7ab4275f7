//! Value formatting shared by the report, the CLI and the TUI.

/// Placeholder for statistics that do not apply (e.g. no trades).
pub const NOT_APPLICABLE: &str = "N/A";

pub fn money(value: f64) -> String {
    format!("${value:.2}")
}

pub fn optional_money(value: Option<f64>) -> String {
    or_not_applicable(value, money)
}

/// `value` rendered with `render`, or [`NOT_APPLICABLE`].
pub fn or_not_applicable<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}
