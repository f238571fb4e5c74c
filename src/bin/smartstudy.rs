// File: ./src/bin/smartstudy.rs
use anyhow::{Context, Result};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use smartstudy::cli::{self, Command};
use smartstudy::client::{AiSettings, LazyAiClient, TextGenerator};
use smartstudy::config::Config;
use smartstudy::context::{AppContext, StandardContext};
use smartstudy::model::quiz::generate_quiz;
use smartstudy::model::{Difficulty, PlanEntry, parser};
use smartstudy::planner::Planner;
use smartstudy::storage::{PlanStorage, SavedPlan};
use std::env;
use std::fs::OpenOptions;
use std::str::FromStr;

const BINARY_NAME: &str = "smartstudy";

fn init_logging(ctx: &dyn AppContext, config: &Config, verbose: bool) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = ctx.get_log_path()
        && let Ok(file) = OpenOptions::new().create(true).append(true).open(&path)
    {
        loggers.push(WriteLogger::new(config.log_level_filter(), log_config, file));
    }
    // Only fails if a logger is already installed.
    let _ = CombinedLogger::init(loggers);
}

fn print_plan(entries: &[PlanEntry]) {
    println!("Study plan ({} entries)", entries.len());
    for entry in entries {
        println!();
        println!(
            "{}  {:<10}  {}",
            entry.date.format("%Y-%m-%d"),
            entry.event_type.to_string(),
            entry.title
        );
        for line in entry.notes_text().lines() {
            println!("    {}", line);
        }
    }
}

fn print_entries(entries: &[PlanEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        print_plan(entries);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match cli::parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run '{} --help' for usage.", BINARY_NAME);
            std::process::exit(2);
        }
    };

    if args.command == Command::Help {
        cli::print_help(BINARY_NAME);
        return Ok(());
    }

    let ctx = StandardContext::new(args.root.clone());
    let config = Config::load_or_default(&ctx)?;
    init_logging(&ctx, &config, args.verbose);

    match args.command {
        Command::Plan {
            request,
            today,
            grade,
            offline,
            json,
            save,
        } => {
            let today = today.unwrap_or_else(parser::today);
            let grade = grade.as_deref().or(config.grade());
            let use_ai = !offline && config.ai_guides_enabled;
            if use_ai && config.api_key().is_empty() {
                log::warn!("No AI API key configured; the service may reject guide requests");
            }

            let mut ai = LazyAiClient::new(AiSettings::from_config(&config));
            let entries = {
                let generator: Option<&dyn TextGenerator> = if use_ai { Some(&ai) } else { None };
                Planner::new(generator)
                    .with_concurrency(config.enrichment_concurrency)
                    .with_grade(grade)
                    .plan(&request, today)
                    .await
            };
            ai.shutdown();

            print_entries(&entries, json)?;
            if save {
                PlanStorage::save(&ctx, &SavedPlan::new(request, today, entries))?;
                eprintln!("Plan saved to {}", ctx.get_plan_path()?.display());
            }
        }
        Command::Show { json } => match PlanStorage::load(&ctx)? {
            Some(plan) => {
                if !json {
                    println!("Request: {}", plan.request);
                    println!("Generated on: {}", plan.generated_on);
                    println!();
                }
                print_entries(&plan.entries, json)?;
            }
            None => println!("No saved plan. Run '{} plan \"...\" --save' first.", BINARY_NAME),
        },
        Command::Export { output } => {
            let plan = PlanStorage::load(&ctx)?.ok_or_else(|| {
                anyhow::anyhow!("No saved plan to export. Run '{} plan \"...\" --save' first.", BINARY_NAME)
            })?;
            let ics = PlanStorage::to_ics_string(&plan.entries);
            match output {
                Some(path) => {
                    PlanStorage::atomic_write(&path, ics)
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                    eprintln!("Exported {} entries to {}", plan.entries.len(), path.display());
                }
                None => println!("{}", ics),
            }
        }
        Command::Quiz {
            topic,
            count,
            difficulty,
            json,
        } => {
            let difficulty = Difficulty::from_str(&difficulty).map_err(|_| {
                anyhow::anyhow!("Unknown difficulty '{}', use easy, medium or hard", difficulty)
            })?;
            let mut ai = LazyAiClient::new(AiSettings::from_config(&config));
            let result = generate_quiz(&ai, &topic, count, difficulty, config.grade()).await;
            ai.shutdown();
            let questions = result.context("Quiz generation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&questions)?);
            } else {
                for (i, q) in questions.iter().enumerate() {
                    println!("{}. {}", i + 1, q.question);
                    for (j, option) in q.options.iter().enumerate() {
                        println!("   {}) {}", (b'A' + j as u8) as char, option);
                    }
                    println!(
                        "   Answer: {} - {}",
                        (b'A' + q.correct_answer as u8) as char,
                        q.explanation
                    );
                    println!();
                }
            }
        }
        Command::ConfigPath => println!("{}", Config::get_path_string(&ctx)?),
        Command::Help => cli::print_help(BINARY_NAME),
    }
    Ok(())
}
