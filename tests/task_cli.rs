mod support;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

use support::{daybook_cmd, json_output, TestDir};

const DAY: &str = "2024-05-01";

fn add(dir: &TestDir, title: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let output = daybook_cmd(dir)
        .args(["--json", "task", "add", title, "--date", DAY])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    json_output(&output)
}

fn list_day(dir: &TestDir) -> Result<Value, Box<dyn std::error::Error>> {
    let output = daybook_cmd(dir)
        .args(["--json", "task", "list", "--date", DAY])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    json_output(&output)
}

fn titles_and_orders(list: &Value) -> Vec<(String, u64)> {
    list["data"]["tasks"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .map(|task| {
                    (
                        task["title"].as_str().unwrap_or_default().to_string(),
                        task["order"].as_u64().unwrap_or(u64::MAX),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cmd(dir: &TestDir) -> Command {
    daybook_cmd(dir)
}

#[test]
fn add_and_list_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let first = add(&dir, "Buy milk")?;
    add(&dir, "Walk dog")?;

    assert_eq!(first["command"], "task add");
    assert_eq!(first["data"]["task"]["id"], 1);
    assert_eq!(first["data"]["task"]["order"], 0);
    assert_eq!(first["data"]["task"]["category"], "General");

    let list = list_day(&dir)?;
    assert_eq!(list["data"]["total"], 2);
    assert_eq!(
        titles_and_orders(&list),
        [("Buy milk".to_string(), 0), ("Walk dog".to_string(), 1)]
    );

    cmd(&dir)
        .args(["task", "list", "--date", DAY])
        .assert()
        .success()
        .stdout(contains("0. #1 [ ] all day Buy milk (medium, General)"))
        .stdout(contains("1. #2 [ ] all day Walk dog"));
    Ok(())
}

#[test]
fn mv_reorders_and_renumbers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    for title in ["A", "B", "C", "D"] {
        add(&dir, title)?;
    }

    cmd(&dir)
        .args(["task", "mv", "0", "2", "--date", DAY])
        .assert()
        .success()
        .stdout(contains("Moved task 0 -> 2"));

    let list = list_day(&dir)?;
    let expected: Vec<(String, u64)> = [("B", 0), ("C", 1), ("A", 2), ("D", 3)]
        .iter()
        .map(|(title, order)| (title.to_string(), *order))
        .collect();
    assert_eq!(titles_and_orders(&list), expected);

    cmd(&dir)
        .args(["task", "mv", "0", "9", "--date", DAY])
        .assert()
        .code(2)
        .stderr(contains("cannot move 0 -> 9"));
    Ok(())
}

#[test]
fn rm_leaves_gap_until_next_move() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    for title in ["A", "B", "C"] {
        add(&dir, title)?;
    }

    cmd(&dir).args(["task", "rm", "2"]).assert().success();
    let list = list_day(&dir)?;
    assert_eq!(
        titles_and_orders(&list),
        [("A".to_string(), 0), ("C".to_string(), 2)]
    );

    cmd(&dir)
        .args(["task", "mv", "1", "0", "--date", DAY])
        .assert()
        .success();
    let list = list_day(&dir)?;
    assert_eq!(
        titles_and_orders(&list),
        [("C".to_string(), 0), ("A".to_string(), 1)]
    );

    cmd(&dir)
        .args(["task", "rm", "2"])
        .assert()
        .code(2)
        .stderr(contains("Task not found: 2"));
    Ok(())
}

#[test]
fn edit_and_done_update_fields() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    add(&dir, "Draft report")?;

    cmd(&dir)
        .args([
            "task", "edit", "1", "--title", "Final report", "--priority", "high", "--time", "09:30",
        ])
        .assert()
        .success()
        .stdout(contains("Final report"));
    cmd(&dir).args(["task", "done", "1"]).assert().success();

    let list = list_day(&dir)?;
    let task = &list["data"]["tasks"][0];
    assert_eq!(task["title"], "Final report");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["completed"], true);
    assert_eq!(task["due"], "2024-05-01T09:30:00");

    cmd(&dir)
        .args(["task", "edit", "1", "--title", " "])
        .assert()
        .code(2);
    cmd(&dir).args(["task", "edit", "1"]).assert().code(2);
    Ok(())
}

#[test]
fn edit_to_another_day_appends_there() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    add(&dir, "Stay")?;
    add(&dir, "Go")?;
    cmd(&dir)
        .args(["task", "add", "Already there", "--date", "2024-05-02"])
        .assert()
        .success();

    cmd(&dir)
        .args(["task", "edit", "2", "--date", "2024-05-02"])
        .assert()
        .success();

    let output = cmd(&dir)
        .args(["--json", "task", "list", "--from", "2024-05-02", "--to", "2024-05-02"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let list = json_output(&output)?;
    assert_eq!(
        titles_and_orders(&list),
        [("Already there".to_string(), 0), ("Go".to_string(), 1)]
    );
    Ok(())
}

#[test]
fn events_are_written_as_jsonl() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let events = dir.path().join("events.jsonl");
    let events = events.to_str().ok_or("non-utf8 path")?;

    for title in ["A", "B"] {
        cmd(&dir)
            .args(["--events", events, "task", "add", title, "--date", DAY])
            .assert()
            .success();
    }
    cmd(&dir)
        .args(["--events", events, "task", "mv", "1", "0", "--date", DAY])
        .assert()
        .success();
    cmd(&dir)
        .args(["--events", events, "task", "rm", "1"])
        .assert()
        .success();

    let lines = dir.read_events("events.jsonl")?;
    let kinds: Vec<&str> = lines
        .iter()
        .map(|event| event["event"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        kinds,
        ["task_created", "task_created", "tasks_reordered", "task_deleted"]
    );
    assert!(lines
        .iter()
        .all(|event| event["schema_version"] == "daybook.event.v1"));
    assert_eq!(lines[0]["data"]["title"], "A");
    assert_eq!(lines[3]["data"]["id"], 1);
    Ok(())
}

#[test]
fn events_on_stdout_replace_regular_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let output = cmd(&dir)
        .args(["--json", "--events", "-", "task", "add", "Only events", "--date", DAY])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let event: Value = serde_json::from_str(lines[0])?;
    assert_eq!(event["event"], "task_created");
    Ok(())
}

#[test]
fn list_all_spans_days() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    cmd(&dir)
        .args(["task", "add", "Later", "--date", "2024-05-03"])
        .assert()
        .success();
    add(&dir, "Sooner")?;

    cmd(&dir)
        .args(["task", "list", "--all"])
        .assert()
        .success()
        .stdout(contains("2024-05-01 #2 [ ] all day Sooner"))
        .stdout(contains("2024-05-03 #1 [ ] all day Later"));
    Ok(())
}
