mod config;
mod logging;

use permit_core::catalog::category_by_id;
use permit_core::Clock;
use services::AppServices;
use tracing::info;

use config::{Args, Command, prepare_sqlite_file, print_usage};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let env = |key: &str| std::env::var(key).ok();
    let args = Args::parse(std::env::args().skip(1), env).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    logging::init_tracing(args.log_format);

    // Open + migrate SQLite in the binary glue; library crates never touch the filesystem.
    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::new_sqlite(&args.db_url, Clock::default_clock(), args.calendar).await?;
    info!(db = %args.db_url, "storage ready");

    let progress = app.progress();
    match args.command {
        Command::Stats => {
            let stats = progress.get_overall_stats().await;
            println!("answered:     {}", stats.total_questions_answered);
            println!("correct:      {}", stats.total_correct);
            println!("accuracy:     {}%", stats.accuracy);
            println!("tests:        {} ({} passed)", stats.tests_completed, stats.tests_passed);
            println!("study streak: {} day(s)", stats.study_streak);
            println!("readiness:    {}%", progress.get_exam_readiness().await);
        }
        Command::Readiness => match progress.get_readiness_factors().await {
            None => println!("readiness: 0% (no practice yet)"),
            Some(factors) => {
                println!("readiness:         {}%", factors.score());
                println!("accuracy:          {:.2}", factors.accuracy);
                println!("category coverage: {:.2}", factors.category_coverage);
                println!("recent tests:      {:.2}", factors.avg_recent_test_score);
                println!("missed factor:     {:.2}", factors.missed_penalty_factor);
            }
        },
        Command::History => {
            let history = progress.get_test_history().await;
            if history.is_empty() {
                println!("no tests taken yet");
            }
            let exams = app.exams();
            for test in history.iter().rev() {
                let verdict = if test.passed { "PASS" } else { "FAIL" };
                println!(
                    "{} {} {}/{} {} {}s",
                    test.completed_at.format("%Y-%m-%d %H:%M"),
                    test.state_code,
                    test.score,
                    test.total_questions,
                    verdict,
                    test.time_taken_seconds,
                );
                for score in exams.category_breakdown(test) {
                    let name = category_by_id(score.category_id.as_str())
                        .map_or(score.category_id.as_str(), |c| c.name);
                    println!("    {name}: {}/{} ({}%)", score.correct, score.total, score.percent);
                }
            }
        }
        Command::Missed => {
            for item in app.review_lists().missed().await {
                println!(
                    "[{}] {} (streak {})",
                    item.category_name,
                    item.question_text,
                    item.correct_streak.unwrap_or(0)
                );
            }
        }
        Command::Bookmarks => {
            for item in app.review_lists().bookmarked().await {
                println!("[{}] {}", item.category_name, item.question_text);
            }
        }
        Command::Reset => {
            progress.clear_all_data().await?;
            println!("all progress cleared");
        }
        Command::Help => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
