//! The per-request summary and the pure functions that render it.

use std::fmt;
use std::time::Duration;

use console::Color;
use http::{Method, StatusCode};

/// How a request ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The response was written in full.
    Normal,
    /// The chain returned an error.
    Error,
    /// The client went away before the response was written.
    ClientClosed,
}

impl Outcome {
    /// Arrow printed in front of the console summary line.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Normal => "-->",
            Self::Error => "xxx",
            Self::ClientClosed => "-x-",
        }
    }
}

/// One request, summarised once it is over.
#[derive(Clone, Debug)]
pub struct LogRecord {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub elapsed: Duration,
    /// Bytes sent, or `None` when unknown.
    pub length: Option<u64>,
    pub outcome: Outcome,
}

impl LogRecord {
    pub fn time(&self) -> String {
        format_elapsed(self.elapsed)
    }

    pub fn length_display(&self) -> String {
        format_length(self.status, self.length)
    }
}

/// `METHOD URL STATUS TIME LENGTH`, the single-line form handed to writers.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.time(),
            self.length_display(),
        )
    }
}

/// Console color for a status code, by hundreds.
pub fn status_color(status: StatusCode) -> Option<Color> {
    match status.as_u16() / 100 {
        0 | 4 => Some(Color::Yellow),
        1 | 2 => Some(Color::Green),
        3 => Some(Color::Cyan),
        5 => Some(Color::Red),
        7 => Some(Color::Magenta),
        _ => None,
    }
}

/// Bodiless statuses print nothing, unknown lengths print `-`.
pub fn format_length(status: StatusCode, length: Option<u64>) -> String {
    match (status.as_u16(), length) {
        (204 | 205 | 304, _) => String::new(),
        (_, None) => "-".to_owned(),
        (_, Some(n)) => humanize_bytes(n),
    }
}

/// Milliseconds below ten seconds, whole seconds from there on.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 10_000 {
        format!("{ms}ms")
    } else {
        format!("{}s", thousands((ms + 500) / 1000))
    }
}

const UNITS: [(u64, &str); 5] = [
    (1 << 50, "pb"),
    (1 << 40, "tb"),
    (1 << 30, "gb"),
    (1 << 20, "mb"),
    (1 << 10, "kb"),
];

/// Binary-prefixed byte count with at most two decimals: `11b`, `1.17kb`, `3mb`.
pub fn humanize_bytes(n: u64) -> String {
    let Some(&(scale, unit)) = UNITS.iter().find(|(scale, _)| n >= *scale) else {
        return format!("{n}b");
    };
    let mut value = format!("{:.2}", n as f64 / scale as f64);
    let trimmed = value.trim_end_matches('0').trim_end_matches('.').len();
    value.truncate(trimmed);
    format!("{value}{unit}")
}

/// Inserts `,` between groups of three digits.
fn thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_switches_to_seconds_at_ten_thousand_ms() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0ms");
        assert_eq!(format_elapsed(Duration::from_millis(9_999)), "9999ms");
        assert_eq!(format_elapsed(Duration::from_millis(10_000)), "10s");
        assert_eq!(format_elapsed(Duration::from_millis(10_499)), "10s");
        assert_eq!(format_elapsed(Duration::from_millis(10_500)), "11s");
    }

    #[test]
    fn long_requests_get_thousands_separators() {
        assert_eq!(format_elapsed(Duration::from_secs(12_345)), "12,345s");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn bytes_are_humanized_like_the_bytes_package() {
        assert_eq!(humanize_bytes(0), "0b");
        assert_eq!(humanize_bytes(11), "11b");
        assert_eq!(humanize_bytes(1023), "1023b");
        assert_eq!(humanize_bytes(1024), "1kb");
        assert_eq!(humanize_bytes(1200), "1.17kb");
        assert_eq!(humanize_bytes(1536), "1.5kb");
        assert_eq!(humanize_bytes(3 * 1024 * 1024), "3mb");
        assert_eq!(humanize_bytes(1 << 40), "1tb");
    }

    #[test]
    fn bodiless_statuses_never_show_a_length() {
        for code in [204, 205, 304] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(format_length(status, Some(512)), "");
            assert_eq!(format_length(status, None), "");
        }
        assert_eq!(format_length(StatusCode::OK, None), "-");
        assert_eq!(format_length(StatusCode::OK, Some(11)), "11b");
    }

    #[test]
    fn status_colors_follow_the_hundreds_digit() {
        let color = |code| status_color(StatusCode::from_u16(code).unwrap());
        assert_eq!(color(101), Some(Color::Green));
        assert_eq!(color(200), Some(Color::Green));
        assert_eq!(color(302), Some(Color::Cyan));
        assert_eq!(color(404), Some(Color::Yellow));
        assert_eq!(color(503), Some(Color::Red));
        assert_eq!(color(600), None);
        assert_eq!(color(999), None);
    }

    #[test]
    fn record_renders_as_one_line() {
        let record = LogRecord {
            method: Method::GET,
            url: "/hello".to_owned(),
            status: StatusCode::OK,
            elapsed: Duration::from_millis(3),
            length: Some(11),
            outcome: Outcome::Normal,
        };
        assert_eq!(record.to_string(), "GET /hello 200 3ms 11b");
    }
}
