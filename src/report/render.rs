//! Plain-text tables and bar charts for the terminal

use std::fmt::Write;

use super::dedup::Respondent;
use super::tabulate::Summary;
use crate::model::language_label;

/// Presentation settings passed into every render call
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Width of the longest bar in characters
    pub bar_width: usize,
    pub bar_char: char,
    pub show_percent: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bar_width: 30,
            bar_char: '█',
            show_percent: true,
        }
    }
}

/// Rows of (label, count) as an aligned bar chart
pub fn render_bars(rows: &[(String, usize)], total: usize, options: &RenderOptions) -> String {
    let mut out = String::new();
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0);

    for (label, count) in rows {
        let bar_len = if max == 0 { 0 } else { count * options.bar_width / max };
        let bar: String = std::iter::repeat(options.bar_char).take(bar_len).collect();
        let pad = label_width - label.chars().count();

        let _ = write!(out, "  {}{} {:>4} {}", label, " ".repeat(pad), count, bar);
        if options.show_percent && total > 0 {
            let _ = write!(out, " ({:.1}%)", *count as f64 * 100.0 / total as f64);
        }
        out.push('\n');
    }
    out
}

pub fn render_summary(summary: &Summary, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Respondents: {}", summary.respondents);

    for tally in &summary.questions {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", tally.question);
        let rows: Vec<(String, usize)> = tally.counts.iter().map(|c| (c.label.clone(), c.count)).collect();
        out.push_str(&render_bars(&rows, tally.total, options));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Languages");
    let rows: Vec<(String, usize)> = summary
        .languages
        .iter()
        .map(|l| {
            let label = if l.known { format!("{} ({})", l.label, l.code) } else { l.label.clone() };
            (label, l.count)
        })
        .collect();
    out.push_str(&render_bars(&rows, summary.respondents, options));

    out
}

/// One line per respondent: timestamp, language, name, answers
pub fn render_respondents(respondents: &[Respondent]) -> String {
    let mut out = String::new();
    let name_width = respondents
        .iter()
        .map(|r| r.record.player_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("player_name".len());

    let _ = writeln!(
        out,
        "{:<24} {:<16} {:<w$} Q2 Q3 Q4 rows",
        "timestamp",
        "language",
        "player_name",
        w = name_width
    );
    for r in respondents {
        let record = &r.record;
        let name_pad = name_width - record.player_name.chars().count();
        let _ = writeln!(
            out,
            "{:<24} {:<16} {}{} {:<2} {:<2} {:<2} {}",
            record.timestamp,
            language_label(&record.language.to_lowercase()),
            record.player_name,
            " ".repeat(name_pad),
            record.q2_time,
            record.q3_time,
            record.q4_day,
            r.submissions
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tabulate::summarize;
    use crate::report::{dedup::latest_per_player, read_records};

    #[test]
    fn test_bars_scale_to_largest() {
        let rows = vec![("A".to_string(), 4), ("Bee".to_string(), 2), ("C".to_string(), 0)];
        let options = RenderOptions {
            bar_width: 8,
            bar_char: '#',
            show_percent: false,
        };
        let text = render_bars(&rows, 6, &options);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  A      4 ########");
        assert_eq!(lines[1], "  Bee    2 ####");
        assert_eq!(lines[2], "  C      0 ");
    }

    #[test]
    fn test_percent_suffix() {
        let rows = vec![("A".to_string(), 1)];
        let text = render_bars(&rows, 4, &RenderOptions::default());
        assert!(text.trim_end().ends_with("(25.0%)"));
    }

    #[test]
    fn test_summary_sections() {
        let csv = "timestamp,language,player_name,Q2_time,Q3_time,Q4_day\n\
                   2025-01-01T00:00:00Z,en,Alice,A,B,A. Monday\n\
                   2025-01-01T00:00:00Z,xx,Bob,B,C,H\n";
        let respondents = latest_per_player(&read_records(csv).unwrap());
        let text = render_summary(&summarize(&respondents), &RenderOptions::default());
        assert!(text.starts_with("Respondents: 2\n"));
        assert!(text.contains("Q4_day\n"));
        assert!(text.contains("English (en)"));
        assert!(text.contains("Other (xx)"));

        let table = render_respondents(&respondents);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("Alice"));
    }
}
