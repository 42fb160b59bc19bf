use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use lead_type::compatibility::team_report;
use lead_type::config::{self, Config};
use lead_type::output;
use lead_type::radar::RadarGeometry;
use lead_type::reference::{FollowerSelection, ReferenceData, TypeCode};
use lead_type::scoring::Assessment;
use lead_type::storage::{self, CacheStore, SessionStore};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
        /// Also export the bundled reference data to this directory
        #[arg(long, value_name = "DIR")]
        export_data: Option<PathBuf>,
    },
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that run against the loaded config and the saved session
#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Show progress and provisional scores (default if no subcommand)
    Status,
    /// List every question with the recorded answer
    Questions,
    /// Show the next unanswered question
    Next,
    /// Record an answer (1-6) for a question
    Answer {
        /// Question id, as shown by `questions` or `next`
        id: u32,
        /// Answer on the 1-6 scale
        score: String,
    },
    /// Classify a completed assessment and save it to history
    Result {
        /// Team member as follower-type:name (repeatable)
        #[arg(long = "team", value_name = "ID:NAME")]
        team: Vec<String>,
        /// Write the radar chart as SVG to this path
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Do not save the result to history
        #[arg(long)]
        no_save: bool,
    },
    /// Team compatibility for the most recent saved result
    Team {
        /// Team members as follower-type:name
        #[arg(required = true, value_name = "ID:NAME")]
        members: Vec<String>,
        /// Leadership code to analyze instead of the latest result (e.g. HLH)
        #[arg(long)]
        code: Option<String>,
    },
    /// List saved results
    History,
    /// Show one saved result
    Show {
        /// Result id, as shown by `history`
        id: String,
    },
    /// Discard the in-progress assessment
    Reset,
    /// Delete every stored session, result and preference
    ClearData,
}

#[derive(Parser, Debug)]
#[command(name = "lead-type")]
#[command(about = "Leadership style self-assessment and team compatibility", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lead-type/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "lead_type=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli
        .command
        .unwrap_or(Commands::Session(SessionCommand::Status));
    let config_path = cli.config.map(PathBuf::from);

    let command = match command {
        Commands::Init { force, export_data } => {
            std::process::exit(run_init(config_path, force, export_data.as_deref()));
        }
        Commands::Session(command) => command,
    };

    // Load config
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let reference = match config::load_reference_data(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Reference data error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut store = match storage::open_disk_store(&config.storage()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Storage config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = output::should_use_colors();
    record_visit(&mut store);

    let mut assessment = restore_assessment(reference, &config, &mut store);

    let code = match run(command, &mut assessment, &mut store, use_colors) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_USAGE
        }
    };

    std::process::exit(code);
}

fn run_init(config_path: Option<PathBuf>, force: bool, export_data: Option<&Path>) -> i32 {
    match config::write_default_config(config_path, force) {
        Ok(path) => println!("Config written to {}", path.display()),
        Err(e) => {
            eprintln!("Init failed: {:#}", e);
            return EXIT_CONFIG;
        }
    }

    if let Some(dir) = export_data {
        match config::export_reference_data(dir, force) {
            Ok(files) => {
                for file in files {
                    println!("Exported {}", file.display());
                }
                println!("Set `data_dir: {}` in the config to use it.", dir.display());
            }
            Err(e) => {
                eprintln!("Export failed: {:#}", e);
                return EXIT_CONFIG;
            }
        }
    }

    EXIT_SUCCESS
}

/// Print the one-time welcome and stamp the visit
fn record_visit(store: &mut SessionStore<CacheStore>) {
    let mut prefs = store.preferences();
    if !prefs.has_seen_welcome {
        eprintln!("Welcome to lead-type. Run `lead-type next` to start the assessment.");
        prefs.has_seen_welcome = true;
    }
    prefs.last_visit_at = Utc::now();
    store.save_preferences(&prefs);
}

/// Rebuild the assessment from the saved session, if any
fn restore_assessment(
    reference: Arc<ReferenceData>,
    config: &Config,
    store: &mut SessionStore<CacheStore>,
) -> Assessment {
    let mut assessment = Assessment::new(reference, &config.scoring());

    if let Some(session) = store.restore() {
        let dropped = assessment.restore_responses(&session.responses);
        if dropped > 0 {
            warn!("Dropped {} saved answers that no longer match the questions", dropped);
        }
        assessment.go_to(session.current_question_index);
        debug!(
            "Resumed session {} ({}/{} answered)",
            session.id,
            assessment.answered_count(),
            assessment.total_questions()
        );
    }

    assessment
}

fn parse_team(reference: &ReferenceData, members: &[String]) -> anyhow::Result<Vec<FollowerSelection>> {
    members
        .iter()
        .map(|member| {
            reference
                .followers
                .parse_selection(member)
                .map_err(|e| anyhow::anyhow!("Invalid team member '{}': {}", member, e))
        })
        .collect()
}

fn run(
    command: SessionCommand,
    assessment: &mut Assessment,
    store: &mut SessionStore<CacheStore>,
    use_colors: bool,
) -> anyhow::Result<i32> {
    match command {
        SessionCommand::Status => {
            println!("{}", output::format_progress(assessment, use_colors));
        }
        SessionCommand::Questions => {
            println!("{}", output::format_question_list(assessment, use_colors));
        }
        SessionCommand::Next => match assessment.next_unanswered() {
            Some(index) => {
                if let Some(question) = assessment.question(index) {
                    println!(
                        "{}",
                        output::format_question_prompt(
                            question,
                            index,
                            assessment.total_questions(),
                            use_colors
                        )
                    );
                }
            }
            None => println!("All questions answered. Run `lead-type result` to see your type."),
        },
        SessionCommand::Answer { id, score } => {
            if let Err(e) = assessment.record_response(id, score.as_str()) {
                eprintln!("Answer not recorded: {}", e);
                return Ok(EXIT_USAGE);
            }

            let next = assessment
                .next_unanswered()
                .unwrap_or_else(|| assessment.current_index());
            assessment.go_to(next);
            store.checkpoint(assessment.responses(), next, assessment.is_complete());

            println!(
                "Recorded {} for question {} ({}/{} answered)",
                score.trim(),
                id,
                assessment.answered_count(),
                assessment.total_questions()
            );
        }
        SessionCommand::Result { team, svg, no_save } => {
            if !assessment.is_complete() {
                eprintln!(
                    "Assessment incomplete: {}/{} answered. Run `lead-type next` to continue.",
                    assessment.answered_count(),
                    assessment.total_questions()
                );
                return Ok(EXIT_USAGE);
            }

            let selections = parse_team(assessment.reference(), &team)?;
            let result = assessment.determine_type();
            println!("{}", output::format_type_result(&result, use_colors));

            if !selections.is_empty() {
                let report = team_report(assessment.reference(), result.code, &selections);
                println!();
                println!("{}", output::format_team_report(&report, use_colors));
            }

            if let Some(path) = svg {
                let chart = RadarGeometry::default().render_svg(&result.category_scores);
                config::write_file_atomic(&path, chart.as_bytes())?;
                println!();
                println!("Radar chart written to {}", path.display());
            }

            if !no_save {
                match store.finalize(&result, &selections) {
                    Some(id) => {
                        println!();
                        println!("Saved as {}", id);
                    }
                    None => warn!("Result could not be saved"),
                }
                assessment.reset();
            }
        }
        SessionCommand::Team { members, code } => {
            let code = match code {
                Some(code) => code.parse::<TypeCode>()?,
                None => match store.history().first() {
                    Some(entry) => entry.leadership_type.code,
                    None => {
                        eprintln!("No saved result. Complete the assessment or pass --code.");
                        return Ok(EXIT_USAGE);
                    }
                },
            };

            let selections = parse_team(assessment.reference(), &members)?;
            let report = team_report(assessment.reference(), code, &selections);
            println!("{}", output::format_team_report(&report, use_colors));
        }
        SessionCommand::History => {
            let entries = store.history();
            println!(
                "{}",
                output::format_history(&entries, store.storage_info(), Utc::now(), use_colors)
            );
        }
        SessionCommand::Show { id } => {
            let id = Uuid::parse_str(id.trim())
                .map_err(|e| anyhow::anyhow!("Invalid result id '{}': {}", id, e))?;
            match store.get_result(id) {
                Some(entry) => println!(
                    "{}",
                    output::format_history_entry(&entry, Utc::now(), use_colors)
                ),
                None => {
                    eprintln!("No saved result with id {}", id);
                    return Ok(EXIT_USAGE);
                }
            }
        }
        SessionCommand::Reset => {
            store.clear();
            assessment.reset();
            println!("Session cleared.");
        }
        SessionCommand::ClearData => {
            store.clear_all_data();
            assessment.reset();
            println!("All stored data cleared.");
        }
    }

    Ok(EXIT_SUCCESS)
}
