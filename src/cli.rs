// File: ./src/cli.rs
//! Shared command-line interface logic: argument parsing and help text.
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Plan {
        request: String,
        today: Option<NaiveDate>,
        grade: Option<String>,
        offline: bool,
        json: bool,
        save: bool,
    },
    Show {
        json: bool,
    },
    Export {
        output: Option<PathBuf>,
    },
    Quiz {
        topic: String,
        count: usize,
        difficulty: String,
        json: bool,
    },
    ConfigPath,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("Missing value for {}", flag))
}

/// Parses arguments (without the binary name).
pub fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut root = None;
    let mut verbose = false;
    let mut positional: Vec<String> = Vec::new();
    let mut today = None;
    let mut grade = None;
    let mut offline = false;
    let mut json = false;
    let mut save = false;
    let mut output = None;
    let mut count = 5;
    let mut difficulty = "medium".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                return Ok(Args {
                    root,
                    verbose,
                    command: Command::Help,
                });
            }
            "-r" | "--root" => root = Some(PathBuf::from(take_value(args, &mut i, "--root")?)),
            "-v" | "--verbose" => verbose = true,
            "--today" => {
                let raw = take_value(args, &mut i, "--today")?;
                today = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid --today date '{}', expected YYYY-MM-DD", raw))?,
                );
            }
            "--grade" => grade = Some(take_value(args, &mut i, "--grade")?),
            "--offline" => offline = true,
            "--json" => json = true,
            "--save" => save = true,
            "-o" | "--output" => output = Some(PathBuf::from(take_value(args, &mut i, "--output")?)),
            "-n" | "--count" => {
                let raw = take_value(args, &mut i, "--count")?;
                count = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=20).contains(n))
                    .ok_or_else(|| format!("Invalid --count '{}', expected 1-20", raw))?;
            }
            "-d" | "--difficulty" => difficulty = take_value(args, &mut i, "--difficulty")?,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option '{}'", flag));
            }
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("plan") => {
            let request = positional.collect::<Vec<_>>().join(" ");
            if request.trim().is_empty() {
                return Err("plan needs a request, e.g. smartstudy plan \"physics exam after 3 days\"".to_string());
            }
            Command::Plan {
                request,
                today,
                grade,
                offline,
                json,
                save,
            }
        }
        Some("show") => Command::Show { json },
        Some("export") => Command::Export { output },
        Some("quiz") => {
            let topic = positional.collect::<Vec<_>>().join(" ");
            if topic.trim().is_empty() {
                return Err("quiz needs a topic, e.g. smartstudy quiz \"photosynthesis\"".to_string());
            }
            Command::Quiz {
                topic,
                count,
                difficulty,
                json,
            }
        }
        Some("config") => Command::ConfigPath,
        Some(other) => return Err(format!("Unknown command '{}'", other)),
    };

    Ok(Args {
        root,
        verbose,
        command,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "SmartStudy v{} - study plans and practice quizzes from plain English",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} plan \"<request>\" [--today YYYY-MM-DD] [--grade G] [--offline] [--json] [--save]", binary_name);
    println!("    {} show [--json]", binary_name);
    println!("    {} export [--output plan.ics]", binary_name);
    println!("    {} quiz \"<topic>\" [--count N] [--difficulty easy|medium|hard] [--json]", binary_name);
    println!("    {} config", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Log debug output to stderr.");
    println!("    --offline             Skip the AI service and use built-in study guides.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("REQUEST SYNTAX:");
    println!("    Subjects          mathematics/maths/math, physics, chemistry, biology,");
    println!("                      english, history, geography, aptitude");
    println!("    Kinds             exam/test, assignment/homework/project (else revision)");
    println!("    Dates             after 3 days, in five days, tomorrow, next week, in 2 weeks");
    println!();
    println!("EXAMPLES:");
    println!("    {} plan \"physics exam after 3 days, chemistry assignment after 5 days\"", binary_name);
    println!("    {} plan \"study for my aptitude test in 2 days\" --save", binary_name);
    println!("    {} export > plan.ics", binary_name);
    println!("    {} quiz \"newton's laws\" --count 3 --difficulty hard", binary_name);
    println!();
    println!("CONFIG:");
    println!("    config.toml keys: ai_endpoint, ai_model, ai_api_key, ai_timeout_secs,");
    println!("    ai_temperature, ai_guides_enabled, enrichment_concurrency, default_grade,");
    println!("    log_level. SMARTSTUDY_API_KEY overrides ai_api_key.");
}
