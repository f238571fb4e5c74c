// File: ./tests/cli_args.rs
use chrono::NaiveDate;
use smartstudy::cli::{Command, parse_args};
use std::path::PathBuf;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_plan_joins_words() {
    let parsed = parse_args(&args(&[
        "plan", "physics", "exam", "after", "3", "days", "--today", "2024-01-01", "--offline",
    ]))
    .unwrap();

    assert_eq!(
        parsed.command,
        Command::Plan {
            request: "physics exam after 3 days".to_string(),
            today: NaiveDate::from_ymd_opt(2024, 1, 1),
            grade: None,
            offline: true,
            json: false,
            save: false,
        }
    );
    assert!(!parsed.verbose);
    assert_eq!(parsed.root, None);
}

#[test]
fn test_global_flags() {
    let parsed = parse_args(&args(&["-v", "--root", "/tmp/ss", "show", "--json"])).unwrap();
    assert!(parsed.verbose);
    assert_eq!(parsed.root, Some(PathBuf::from("/tmp/ss")));
    assert_eq!(parsed.command, Command::Show { json: true });
}

#[test]
fn test_quiz_options() {
    let parsed = parse_args(&args(&["quiz", "newton's laws", "-n", "3", "-d", "hard"])).unwrap();
    assert_eq!(
        parsed.command,
        Command::Quiz {
            topic: "newton's laws".to_string(),
            count: 3,
            difficulty: "hard".to_string(),
            json: false,
        }
    );

    let defaults = parse_args(&args(&["quiz", "cells"])).unwrap();
    assert!(matches!(
        defaults.command,
        Command::Quiz { count: 5, ref difficulty, .. } if difficulty == "medium"
    ));
}

#[test]
fn test_help_anywhere() {
    assert_eq!(parse_args(&[]).unwrap().command, Command::Help);
    assert_eq!(parse_args(&args(&["help"])).unwrap().command, Command::Help);
    assert_eq!(
        parse_args(&args(&["plan", "maths", "--help"])).unwrap().command,
        Command::Help
    );
}

#[test]
fn test_export_and_config() {
    assert_eq!(
        parse_args(&args(&["export", "-o", "plan.ics"])).unwrap().command,
        Command::Export {
            output: Some(PathBuf::from("plan.ics"))
        }
    );
    assert_eq!(
        parse_args(&args(&["config"])).unwrap().command,
        Command::ConfigPath
    );
}

#[test]
fn test_errors() {
    assert!(parse_args(&args(&["plan"])).is_err());
    assert!(parse_args(&args(&["quiz"])).is_err());
    assert!(parse_args(&args(&["frobnicate"])).is_err());
    assert!(parse_args(&args(&["plan", "x", "--bogus"])).is_err());
    assert!(parse_args(&args(&["plan", "x", "--today", "tomorrow"])).is_err());
    assert!(parse_args(&args(&["plan", "x", "--today"])).is_err());
    assert!(parse_args(&args(&["quiz", "x", "--count", "0"])).is_err());
    assert!(parse_args(&args(&["quiz", "x", "--count", "21"])).is_err());
}
