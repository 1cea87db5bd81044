use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Prints `data` as pretty JSON in `--json` mode, otherwise hands it to `render_table`.
pub fn output<T: Serialize + ?Sized>(json_mode: bool, data: &T, render_table: impl FnOnce(&T)) {
    if !json_mode {
        return render_table(data);
    }
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{json}"),
        Err(e) => error(&format!("Failed to serialize dashboard data: {e}")),
    }
}

pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Prints `table` followed by a "N <noun> found." footer.
pub fn table_with_count(table: &Table, count: usize, noun: &str) {
    println!("{table}");
    println!("\n{}", count_line(count, noun));
}

/// `noun` is singular; repositories pluralize as the count requires.
pub fn count_line(count: usize, noun: &str) -> String {
    let noun = match (count, noun.strip_suffix('y')) {
        (1, _) => noun.to_string(),
        (_, Some(stem)) => format!("{stem}ies"),
        (_, None) => format!("{noun}s"),
    };
    format!("{count} {noun} found.")
}

pub fn section_header(title: &str) {
    let underline = "─".repeat(title.chars().count());
    println!("\n{}\n{}", title.cyan().bold(), underline.cyan());
}

pub fn success(msg: &str) {
    println!("{} {msg}", "✓".green().bold());
}

pub fn warn(msg: &str) {
    eprintln!("{} {msg}", "warning:".yellow().bold());
}

pub fn error(msg: &str) {
    eprintln!("{} {msg}", "error:".red().bold());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_line_pluralizes() {
        assert_eq!(count_line(1, "unmirrored repository"), "1 unmirrored repository found.");
        assert_eq!(count_line(3, "active repository"), "3 active repositories found.");
        assert_eq!(count_line(0, "stale run"), "0 stale runs found.");
    }
}
