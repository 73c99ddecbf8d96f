//! End-to-end tests for the query engine.
//!
//! Each test goes through the full public surface: parse a query string,
//! then evaluate it against in-memory todos with a fixed reference date.

use chrono::NaiveDate;
use todo_query_rs::{QueryError, QueryEvaluator, QueryParser, Todo};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn matches(query: &str, todo: &Todo) -> bool {
    let ast = QueryParser::parse(query).expect("query should parse");
    QueryEvaluator::new(&ast, today()).matches(todo)
}

/// A small fixture list exercising every field the grammar can touch.
fn fixture_todos() -> Vec<Todo> {
    vec![
        Todo {
            desc: "Buy milk and bread".to_string(),
            create_date: Some(date(2023, 1, 10)),
            priority: Some('A'),
            contexts: ["errands".to_string()].into(),
            projects: ["groceries".to_string()].into(),
            metadata: [("est".to_string(), "10".to_string())].into(),
            ..Todo::default()
        },
        Todo {
            desc: "File the quarterly report".to_string(),
            done: true,
            create_date: Some(date(2023, 1, 20)),
            done_date: Some(date(2024, 6, 13)),
            priority: Some('C'),
            contexts: ["work".to_string()].into(),
            metadata: [("est".to_string(), "3".to_string())].into(),
            ..Todo::default()
        },
        Todo {
            desc: "Dream up a vacation".to_string(),
            tags: ["someday".to_string()].into(),
            ..Todo::default()
        },
    ]
}

// ==================== Core Behavior ====================

#[test]
fn test_e2e_empty_query_matches_every_todo() {
    let todos = fixture_todos();
    let ast = QueryParser::parse("").unwrap();
    let evaluator = QueryEvaluator::new(&ast, today());
    assert_eq!(evaluator.select(&todos).len(), todos.len());
}

#[test]
fn test_e2e_done_atoms_mirror_done_flag() {
    for todo in fixture_todos() {
        assert_eq!(matches("x", &todo), todo.done);
        assert_eq!(matches("o", &todo), !todo.done);
    }
}

#[test]
fn test_e2e_context_membership_and_negation() {
    for todo in fixture_todos() {
        let in_work = todo.contexts.contains("work");
        assert_eq!(matches("@work", &todo), in_work);
        assert_eq!(matches("!@work", &todo), !in_work);
    }
}

#[test]
fn test_e2e_priority_ranges_are_inclusive() {
    for todo in fixture_todos() {
        let expected = matches!(todo.priority, Some('A'..='C'));
        assert_eq!(matches("(A-C)", &todo), expected, "todo {:?}", todo.desc);
        // A list of a single letter plus a degenerate range behaves the same.
        assert_eq!(matches("(A,B-C)", &todo), expected);
    }
}

#[test]
fn test_e2e_desc_containment() {
    let todos = fixture_todos();
    assert!(matches("\"buy milk\"", &todos[0]));
    assert!(matches("'QUARTERLY'", &todos[1]));
    assert!(!matches("\"buy milk\"", &todos[1]));

    // Case-sensitive form requires the exact casing.
    assert!(matches("c\"Buy\"", &todos[0]));
    assert!(!matches("c\"buy\"", &todos[0]));
}

#[test]
fn test_e2e_and_or_composition() {
    let work_todo = &fixture_todos()[1];
    assert!(matches("@work | @errands", work_todo));
    assert!(matches("@work x", work_todo));
    assert!(!matches("@work @errands", work_todo));
    assert!(!matches("@home | @errands", work_todo));
}

#[test]
fn test_e2e_create_date_window() {
    let todos = fixture_todos();
    for todo in &todos {
        let expected = todo
            .create_date
            .is_some_and(|d| date(2023, 1, 1) <= d && d <= date(2023, 1, 31));
        assert_eq!(matches("^2023-01-01:2023-01-31", todo), expected);
    }
}

#[test]
fn test_e2e_done_date_relative_window() {
    let todos = fixture_todos();
    // Done within the last week, relative to the fixed reference date.
    assert!(matches("$-1w:0d", &todos[1]));
    assert!(!matches("$-1w:0d", &todos[0]));
}

#[test]
fn test_e2e_metatag_numeric_comparison() {
    let todos = fixture_todos();
    assert!(matches("est=10", &todos[0]));
    // "10" sorts before "5" lexicographically; the engine must compare
    // integer values numerically.
    assert!(matches("est>5", &todos[0]));
    assert!(!matches("est>5", &todos[1]));
    assert!(matches("est<=3", &todos[1]));
    assert!(!matches("est>5", &todos[2]));
}

#[test]
fn test_e2e_reparse_yields_identical_ast() {
    let source = "(@home | @work) !#someday (A-C) est>=3 c'Call' ^-1m:0d | x";
    assert_eq!(
        QueryParser::parse(source).unwrap(),
        QueryParser::parse(source).unwrap()
    );
}

// ==================== Malformed Input ====================

#[test]
fn test_e2e_malformed_queries_fail_cleanly() {
    assert!(QueryParser::parse("(A-)").is_err());
    assert!(matches!(
        QueryParser::parse("(unterminated"),
        Err(QueryError::UnclosedParenthesis { .. })
    ));
    assert!(matches!(
        QueryParser::parse("\"no closing quote"),
        Err(QueryError::UnterminatedQuote { .. })
    ));
}

// ==================== Larger Workflow ====================

#[test]
fn test_e2e_select_runs_a_daily_review() {
    let todos = fixture_todos();

    // Open todos that are either prioritised or tagged for someday.
    let ast = QueryParser::parse("o (A-Z) | o #someday").unwrap();
    let evaluator = QueryEvaluator::new(&ast, today());
    let selected = evaluator.select(&todos);

    let descs: Vec<&str> = selected.iter().map(|t| t.desc.as_str()).collect();
    assert_eq!(descs, vec!["Buy milk and bread", "Dream up a vacation"]);
}

#[test]
fn test_e2e_same_ast_with_different_reference_dates() {
    let ast = QueryParser::parse("$0d").unwrap();
    let todo = &fixture_todos()[1];

    let on_done_day = QueryEvaluator::new(&ast, date(2024, 6, 13));
    let day_after = QueryEvaluator::new(&ast, date(2024, 6, 14));
    assert!(on_done_day.matches(todo));
    assert!(!day_after.matches(todo));
}
