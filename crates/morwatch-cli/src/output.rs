//! Rendering and human formatting helpers.

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// One command's result: a JSON document plus its text rendering.
#[derive(Debug)]
pub struct CommandOutput {
    pub json: Value,
    pub text: String,
}

impl CommandOutput {
    pub fn new(json: Value, text: impl Into<String>) -> Self {
        Self {
            json,
            text: text.into(),
        }
    }
}

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => println!("{}", output.text),
        OutputFormat::Json if pretty => {
            println!("{}", serde_json::to_string_pretty(&output.json)?);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&output.json)?),
    }
    Ok(())
}

/// Fixed-precision number with a dash placeholder for absent values.
pub fn format_number(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.digits$}"),
        _ => "-".to_owned(),
    }
}

/// Fold seconds into `1d 2h 3m` style, falling back to raw seconds.
pub fn format_uptime(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s > 0.0) else {
        return "Unknown".to_owned();
    };
    let total = seconds as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if parts.is_empty() {
        parts.push(format!("{total}s"));
    }
    parts.join(" ")
}

/// Shorten a wallet address to `0xabcd…wxyz`.
pub fn format_address(address: Option<&str>) -> String {
    format_address_with(address, 4)
}

pub fn format_address_with(address: Option<&str>, chars: usize) -> String {
    let Some(address) = address.filter(|a| !a.is_empty()) else {
        return "Unknown".to_owned();
    };
    if address.len() <= chars * 2 {
        return address.to_owned();
    }
    let head: String = address.chars().take(chars + 2).collect();
    let tail: String = address
        .chars()
        .rev()
        .take(chars)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_with_placeholder_for_absent() {
        assert_eq!(format_number(Some(2.5), 2), "2.50");
        assert_eq!(format_number(Some(f64::NAN), 2), "-");
        assert_eq!(format_number(None, 2), "-");
    }

    #[test]
    fn uptime_folds_into_day_hour_minute_parts() {
        assert_eq!(format_uptime(Some(90_061.0)), "1d 1h 1m");
        assert_eq!(format_uptime(Some(3_660.0)), "1h 1m");
        assert_eq!(format_uptime(Some(42.0)), "42s");
        assert_eq!(format_uptime(Some(0.0)), "Unknown");
        assert_eq!(format_uptime(None), "Unknown");
    }

    #[test]
    fn addresses_shorten_in_the_middle() {
        assert_eq!(
            format_address(Some("0x1234567890abcdef1234567890abcdef12345678")),
            "0x1234…5678"
        );
        assert_eq!(format_address(Some("0xabcd")), "0xabcd");
        assert_eq!(format_address(None), "Unknown");
    }
}
