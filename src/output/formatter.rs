use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use owo_colors::{AnsiColors, OwoColorize};
use terminal_size::{terminal_size, Width};

use crate::compatibility::{CompatibilityLevel, TeamReport};
use crate::reference::{Category, Question};
use crate::scoring::{Assessment, CategoryScores, TypeResult, SCALE_LABELS, SCORE_MIN};
use crate::storage::{HistoryEntry, StorageInfo};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a category average with one decimal.
/// If incomplete is true, appends asterisk to indicate a provisional score
pub fn format_score(score: f64, incomplete: bool) -> String {
    if incomplete {
        format!("{:.1}*", score)
    } else {
        format!("{:.1}", score)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn level_color(level: CompatibilityLevel) -> AnsiColors {
    match level {
        CompatibilityLevel::Excellent => AnsiColors::Green,
        CompatibilityLevel::Good => AnsiColors::Cyan,
        CompatibilityLevel::Fair => AnsiColors::Yellow,
        CompatibilityLevel::Caution => AnsiColors::Magenta,
        CompatibilityLevel::NeedsWork => AnsiColors::Red,
    }
}

/// Format all questions as one line each: index, answer, category, text.
/// Unanswered questions show "-" in the answer column.
pub fn format_question_list(assessment: &Assessment, use_colors: bool) -> String {
    let term_width = get_terminal_width();

    // " 1. [6] interaction  " prefix
    let fixed_width = 3 + 1 + 3 + 2 + 11 + 2;

    assessment
        .reference()
        .questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let index_str = format!("{:>2}.", idx + 1);
            let answer = assessment
                .response(question.id)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            let answer_str = format!("[{}]", answer);
            let category = format!("{:<11}", question.category.as_str());

            let text = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_text(&question.text, width - fixed_width)
                }
                Some(_) => truncate_text(&question.text, 20),
                None => question.text.clone(),
            };

            if use_colors {
                let answer_str = if assessment.response(question.id).is_some() {
                    answer_str.green().to_string()
                } else {
                    answer_str.dimmed().to_string()
                };
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    answer_str,
                    category.cyan(),
                    text
                )
            } else {
                format!("{} {}  {}  {}", index_str, answer_str, category, text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one question with the answer scale, as shown by `next`
pub fn format_question_prompt(
    question: &Question,
    index: usize,
    total: usize,
    use_colors: bool,
) -> String {
    let header = format!("Question {}/{} (id {})", index + 1, total, question.id);
    let factor = format!("{} / {}", question.upper_factor, question.lower_factor);

    let scale = SCALE_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| format!("  {} {}", i as u8 + SCORE_MIN, label))
        .collect::<Vec<_>>()
        .join("\n");

    if use_colors {
        format!(
            "{}  {}\n\n{}\n\n{}",
            header.bold(),
            factor.dimmed(),
            question.text,
            scale
        )
    } else {
        format!("{}  {}\n\n{}\n\n{}", header, factor, question.text, scale)
    }
}

fn format_category_lines(scores: &CategoryScores, incomplete: bool, use_colors: bool) -> String {
    Category::ALL
        .iter()
        .map(|&category| {
            let label = format!("{:<20}", category.label());
            let score = format_score(scores.get(category), incomplete);
            if use_colors {
                format!("  {}{}", label, score.bold())
            } else {
                format!("  {}{}", label, score)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Progress summary for `status`: answered count and provisional scores
pub fn format_progress(assessment: &Assessment, use_colors: bool) -> String {
    let answered = assessment.answered_count();
    let total = assessment.total_questions();
    let incomplete = !assessment.is_complete();

    let progress = format!("Answered {}/{}", answered, total);
    let mut lines = vec![if use_colors {
        progress.bold().to_string()
    } else {
        progress
    }];

    lines.push(format_category_lines(
        &assessment.category_scores(),
        incomplete,
        use_colors,
    ));

    if incomplete {
        lines.push("* in progress: unanswered questions count as zero".to_string());
        if let Some(next) = assessment.next_unanswered() {
            if let Some(question) = assessment.question(next) {
                lines.push(format!("Next: question id {}", question.id));
            }
        }
    } else {
        lines.push("Complete. Run `lead-type result` to see your type.".to_string());
    }

    lines.join("\n")
}

/// Full typology result: code, name, scores, lower factors, strengths, cautions
pub fn format_type_result(result: &TypeResult, use_colors: bool) -> String {
    let record = &result.record;
    let mut lines = Vec::new();

    if use_colors {
        lines.push(format!(
            "{}  {} ({})",
            result.code.as_str().bold().green(),
            record.name.bold(),
            record.subtitle.italic()
        ));
    } else {
        lines.push(format!(
            "{}  {} ({})",
            result.code, record.name, record.subtitle
        ));
    }

    if !record.description.is_empty() {
        lines.push(String::new());
        lines.push(record.description.clone());
    }

    lines.push(String::new());
    lines.push("Scores:".to_string());
    lines.push(format_category_lines(&result.category_scores, false, use_colors));

    if !result.lower_factor_scores.is_empty() {
        lines.push(String::new());
        lines.push("Factors:".to_string());
        for factor in &result.lower_factor_scores {
            let label = format!("{:<24}", factor.label);
            if use_colors {
                lines.push(format!(
                    "  {}{:.1}  {}",
                    label,
                    factor.average,
                    factor.upper_factor.dimmed()
                ));
            } else {
                lines.push(format!(
                    "  {}{:.1}  {}",
                    label, factor.average, factor.upper_factor
                ));
            }
        }
    }

    for (title, items) in [("Strengths:", &record.strengths), ("Cautions:", &record.cautions)] {
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.to_string());
        for item in items {
            lines.push(format!("  - {}", item));
        }
    }

    lines.join("\n")
}

/// Team compatibility report: one block per member, overall score, advice
pub fn format_team_report(report: &TeamReport, use_colors: bool) -> String {
    if report.members.is_empty() {
        return "No team members selected.".to_string();
    }

    let mut lines = Vec::new();

    for member in &report.members {
        let c = &member.compatibility;
        let who = format!("{} ({})", member.follower.member_name, member.follower.name);
        let score = format!("{:>3} {}", c.score, c.level);

        if use_colors {
            lines.push(format!(
                "{}  {}",
                who.bold(),
                score.color(level_color(c.level))
            ));
        } else {
            lines.push(format!("{}  {}", who, score));
        }
        lines.push(format!("  + {}", c.strength));
        lines.push(format!("  ! {}", c.caution));
    }

    lines.push(String::new());
    let overall = format!("Overall: {} {}", report.overall_score, report.overall_level);
    if use_colors {
        lines.push(overall.color(level_color(report.overall_level)).bold().to_string());
    } else {
        lines.push(overall);
    }

    for rec in &report.recommendations {
        lines.push(format!("  - {}", rec));
    }

    lines.join("\n")
}

/// List past results, most recent first, with remaining lifetime
pub fn format_history(
    entries: &[HistoryEntry],
    info: StorageInfo,
    now: DateTime<Utc>,
    use_colors: bool,
) -> String {
    let usage = format!("Storage used: {:.1} KB", info.used_kb());

    if entries.is_empty() {
        return format!("No saved results.\n{}", usage);
    }

    let mut lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            let date = entry.completed_at.format("%Y-%m-%d %H:%M").to_string();
            let summary = format!(
                "{} {}",
                entry.leadership_type.code, entry.leadership_type.name
            );
            let remaining = entry.format_remaining_at(now);

            if use_colors {
                format!(
                    "{}  {}  {}  {}",
                    entry.id.dimmed(),
                    date,
                    summary.bold(),
                    remaining.dimmed()
                )
            } else {
                format!("{}  {}  {}  {}", entry.id, date, summary, remaining)
            }
        })
        .collect();

    lines.push(usage);
    lines.join("\n")
}

/// One stored result in detail
pub fn format_history_entry(entry: &HistoryEntry, now: DateTime<Utc>, use_colors: bool) -> String {
    let summary = &entry.leadership_type;
    let mut lines = Vec::new();

    if use_colors {
        lines.push(format!(
            "{}  {} ({})",
            summary.code.as_str().bold().green(),
            summary.name.bold(),
            summary.subtitle.italic()
        ));
    } else {
        lines.push(format!(
            "{}  {} ({})",
            summary.code, summary.name, summary.subtitle
        ));
    }

    lines.push(format!(
        "Completed {} ({})",
        entry.completed_at.format("%Y-%m-%d %H:%M"),
        entry.format_remaining_at(now)
    ));
    lines.push(format_category_lines(&entry.scores, false, use_colors));

    if !entry.selected_followers.is_empty() {
        lines.push("Team:".to_string());
        for follower in &entry.selected_followers {
            lines.push(format!("  - {} ({})", follower.member_name, follower.name));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::team_report;
    use crate::reference::{ReferenceData, TypeCode};
    use crate::scoring::ScoringConfig;
    use crate::storage::LeadershipSummary;
    use chrono::Duration;
    use std::sync::Arc;
    use uuid::Uuid;

    fn assessment() -> Assessment {
        let data = Arc::new(ReferenceData::builtin().unwrap());
        Assessment::new(data, &ScoringConfig::default())
    }

    fn completed(score: i64) -> Assessment {
        let mut a = assessment();
        let ids: Vec<u32> = a.reference().questions.iter().map(|q| q.id).collect();
        for id in ids {
            a.record_response(id, score).unwrap();
        }
        a
    }

    fn history_entry(now: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            completed_at: now,
            leadership_type: LeadershipSummary {
                code: TypeCode::Lhl,
                name: "Relational Supporter".to_string(),
                subtitle: "Empathetic Leader".to_string(),
            },
            scores: CategoryScores {
                sharing: 3.0,
                interaction: 5.0,
                growth: 2.5,
            },
            selected_followers: vec![],
            expires_at: now + Duration::days(30),
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(4.5, false), "4.5");
        assert_eq!(format_score(4.0, false), "4.0");
        assert_eq!(format_score(2.26, true), "2.3*");
    }

    #[test]
    fn test_truncate_text_short() {
        assert_eq!(truncate_text("Short", 10), "Short");
    }

    #[test]
    fn test_truncate_text_long() {
        assert_eq!(truncate_text("I share information openly", 10), "I share...");
    }

    #[test]
    fn test_truncate_text_unicode() {
        assert_eq!(truncate_text("정보를 공유한다", 5), "정보...");
    }

    #[test]
    fn test_question_list_marks_answers() {
        let mut a = assessment();
        a.record_response(1, 5).unwrap();

        let output = format_question_list(&a, false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 18);
        assert!(lines[0].starts_with(" 1. [5]  sharing"));
        assert!(lines[1].starts_with(" 2. [-]"));
    }

    #[test]
    fn test_question_prompt_lists_scale() {
        let a = assessment();
        let q = a.question(0).unwrap();
        let output = format_question_prompt(q, 0, 18, false);
        assert!(output.starts_with("Question 1/18 (id 1)"));
        assert!(output.contains(&q.text));
        assert!(output.contains("  1 Strongly disagree"));
        assert!(output.contains("  6 Strongly agree"));
    }

    #[test]
    fn test_progress_marks_partial_scores() {
        let mut a = assessment();
        a.record_response(1, 6).unwrap();
        let output = format_progress(&a, false);
        assert!(output.starts_with("Answered 1/18"));
        assert!(output.contains("1.0*"));
        assert!(output.contains("Next: question id 2"));

        let output = format_progress(&completed(5), false);
        assert!(output.contains("5.0"));
        assert!(!output.contains('*'));
        assert!(output.contains("Complete."));
    }

    #[test]
    fn test_type_result_sections() {
        let result = completed(6).determine_type();
        let output = format_type_result(&result, false);
        assert!(output.starts_with("HHH  "));
        assert!(output.contains("Scores:"));
        assert!(output.contains("Factors:"));
        assert!(output.contains("Strengths:"));
        assert!(output.contains("Cautions:"));
    }

    #[test]
    fn test_team_report_output() {
        let data = ReferenceData::builtin().unwrap();
        let members = vec![
            data.followers.select("driver", "Ana").unwrap(),
            data.followers.select("follower", "Ben").unwrap(),
        ];
        let report = team_report(&data, TypeCode::Lll, &members);
        let output = format_team_report(&report, false);
        assert!(output.contains("Ana ("));
        assert!(output.contains("Ben ("));
        assert!(output.contains("Overall: "));

        let empty = team_report(&data, TypeCode::Lll, &[]);
        assert_eq!(format_team_report(&empty, false), "No team members selected.");
    }

    #[test]
    fn test_history_output() {
        let now = Utc::now();
        let info = StorageInfo { used_bytes: 2048 };

        let empty = format_history(&[], info, now, false);
        assert_eq!(empty, "No saved results.\nStorage used: 2.0 KB");

        let entry = history_entry(now);
        let output = format_history(std::slice::from_ref(&entry), info, now, false);
        assert!(output.contains(&entry.id.to_string()));
        assert!(output.contains("LHL Relational Supporter"));
        assert!(output.contains("30d left"));

        let detail = format_history_entry(&entry, now, false);
        assert!(detail.starts_with("LHL  Relational Supporter (Empathetic Leader)"));
        assert!(!detail.contains("Team:"));
    }
}
