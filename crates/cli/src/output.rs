//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use insight_engine::{Severity, SizingAction};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a rounded table from a list of rows, or a placeholder when empty
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format a dollar amount
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format an optional numeric evidence field; absent data stays visible as
/// a dash rather than a fake zero
pub fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Color an anomaly severity label
pub fn color_severity(severity: Severity) -> String {
    match severity {
        Severity::Normal => "NORMAL".green().to_string(),
        Severity::Warning => "WARNING".yellow().to_string(),
        Severity::Critical => "CRITICAL".red().bold().to_string(),
    }
}

/// Color a sizing action label
pub fn color_action(action: SizingAction) -> String {
    match action {
        SizingAction::Upsize => "UPSIZE".red().to_string(),
        SizingAction::Downsize => "DOWNSIZE".yellow().to_string(),
        SizingAction::SuspendOrDrop => "SUSPEND_OR_DROP".yellow().bold().to_string(),
        SizingAction::Optimal => "OPTIMAL".green().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.00Ki");
        assert_eq!(format_bytes(10 * 1024 * 1024 * 1024), "10.00Gi");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "$1234.50");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(2.5)), "2.50");
        assert_eq!(format_optional(None), "-");
    }
}
