//! Text helpers shared by the renderers: escaping, number grouping, links.

use reqwest::Url;

pub const POSITIVE_COLOR: &str = "#10b981";
pub const NEGATIVE_COLOR: &str = "#ef4444";

/// Base used only to let `Url` encode relative links.
const LINK_BASE: &str = "http://localhost/";

/// Encode `<`, `>`, `&`, `"` and `'` so text can be embedded in markup.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Site-relative link with one query-encoded parameter, e.g.
/// `query_link("/bot.html", "id", "a b")` gives `/bot.html?id=a+b`.
pub fn query_link(path: &str, key: &str, value: &str) -> String {
    let mut url = match Url::parse(LINK_BASE).and_then(|base| base.join(path)) {
        Ok(url) => url,
        Err(_) => return escape_html(path),
    };
    url.query_pairs_mut().append_pair(key, value);
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

pub fn bot_link(bot_id: &str) -> String {
    query_link("/bot.html", "id", bot_id)
}

pub fn symbol_link(symbol: &str) -> String {
    query_link("/chart.html", "symbol", symbol)
}

/// `value` with `decimals` fraction digits and comma thousands separators
/// (`-1234.5` → `-1,234.50`). Values that round to zero carry no sign.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    let len = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `$1,234.56`
pub fn money(value: f64) -> String {
    format!("${}", group_thousands(value, 2))
}

/// `+$1,234.56` for non-negative values, `$-1,234.56` otherwise: the sign of a
/// negative amount comes from the number itself.
pub fn signed_money(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{}", money(value))
}

/// `+1.23%` / `-1.23%`
pub fn signed_percent(value: f64, decimals: usize) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{:.*}%", decimals, value)
}

pub fn gain_class(value: f64) -> &'static str {
    if value >= 0.0 {
        "positive"
    } else {
        "negative"
    }
}

pub fn gain_color(value: f64) -> &'static str {
    if value >= 0.0 {
        POSITIVE_COLOR
    } else {
        NEGATIVE_COLOR
    }
}
