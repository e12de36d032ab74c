use owo_colors::OwoColorize;
use scanwise_core::{AnalysisResult, Rating};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Scanwise".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Score how scannable a document is\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print the score, colored by rating band
pub fn print_score(result: &AnalysisResult) {
    let rating = Rating::from_score(result.score);
    let score = format!("{}/100 ({})", result.score, rating.label());
    let score = match rating {
        Rating::Excellent => score.bright_green().to_string(),
        Rating::Good => score.green().to_string(),
        Rating::Fair => score.bright_yellow().to_string(),
        Rating::Poor => score.bright_red().to_string(),
    };

    eprintln!("  {} {}", "Score:".dimmed(), score.bold());
    eprintln!(
        "  {} {}  {} {}",
        "Text blocks:".dimmed(),
        result.total_text_blocks.to_string().bright_white(),
        "Anchors:".dimmed(),
        result.total_anchors_raw.to_string().bright_white()
    );
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: std::time::Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
