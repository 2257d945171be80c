//! Report formatting utilities for terminal output

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if !pct.is_finite() {
        return "0%".to_string();
    }
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Progress bar for a percentage; anything past 100% renders full
pub fn format_bar(pct: f64, width: usize) -> String {
    if !pct.is_finite() || pct <= 0.0 {
        return "░".repeat(width);
    }

    let filled = ((pct.min(100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}
