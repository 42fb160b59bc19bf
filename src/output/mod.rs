pub mod formatter;

pub use formatter::{
    format_history, format_history_entry, format_progress, format_question_list,
    format_question_prompt, format_score, format_team_report, format_type_result,
    should_use_colors,
};
