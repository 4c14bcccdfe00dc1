//! End-to-end checks of the task repository on the file backend

use std::fs;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use pt_core::storage::KvStore;
use pt_core::task::{TaskDraft, TaskRepository, TaskStatus, TASKS_KEY};
use serde_json::Value;
use tempfile::TempDir;

fn open(temp: &TempDir) -> TaskRepository {
    TaskRepository::new(Arc::new(KvStore::open(temp.path())))
}

#[test]
fn test_tasks_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let due = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let created = {
        let repo = open(&temp);
        let task = repo
            .create(
                TaskDraft::new("Renew passport")
                    .with_description("Bring two photos")
                    .with_due_date(due),
            )
            .unwrap();
        repo.update_status(&task.id, TaskStatus::Done).unwrap();
        task
    };

    let repo = open(&temp);
    let tasks = repo.list_all();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, created.id);
    assert_eq!(tasks[0].description, "Bring two photos");
    assert_eq!(tasks[0].due_date, due);
    assert_eq!(tasks[0].status, TaskStatus::Done);
}

#[test]
fn test_persisted_layout() {
    let temp = TempDir::new().unwrap();
    let repo = open(&temp);
    let due = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    repo.create(TaskDraft::new("Buy milk").with_due_date(due))
        .unwrap();

    let raw = fs::read_to_string(temp.path().join(format!("{TASKS_KEY}.json"))).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];

    assert_eq!(record["title"], "Buy milk");
    assert_eq!(record["status"], "todo");
    assert_eq!(record["dueDate"], "2024-01-01T00:00:00.000Z");
    assert!(record["startDate"].is_string());
    assert!(record["endDate"].is_string());
    assert_eq!(record["attachments"], Value::Array(Vec::new()));
}

#[test]
fn test_reads_records_written_by_older_clients() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tasks.json"),
        r#"[{"id":"1700000000000","title":"Legacy","dueDate":"2023-11-14T22:13:20.000Z",
             "startDate":"2023-11-14","endDate":"2023-11-15T00:00:00.000Z",
             "attachments":{"name":"a.png","uri":"content://a","type":"image/png","size":3}}]"#,
    )
    .unwrap();

    let repo = open(&temp);
    let task = repo.get("1700000000000").unwrap();
    assert_eq!(task.description, "");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.attachments.len(), 1);

    // A rewrite keeps the record and normalizes it
    repo.update_status(&task.id, TaskStatus::Done).unwrap();
    let raw = fs::read_to_string(temp.path().join("tasks.json")).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["startDate"], "2023-11-14T00:00:00.000Z");
    assert_eq!(value[0]["attachments"][0]["size"], 3);
}

#[test]
fn test_corrupted_file_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("tasks.json"), "[{\"id\": ").unwrap();

    let repo = open(&temp);
    assert!(repo.list_all().is_empty());
}

#[test]
fn test_list_view_refreshes_from_notifications() {
    let temp = TempDir::new().unwrap();
    let repo = open(&temp);
    let view: Arc<Mutex<Vec<String>>> = Arc::default();

    let source = repo.clone();
    let rendered = Arc::clone(&view);
    let subscription = repo.subscribe_to_changes(move || {
        *rendered.lock().unwrap() = source.list_all().into_iter().map(|t| t.title).collect();
    });

    let first = repo.create(TaskDraft::new("First")).unwrap();
    repo.create(TaskDraft::new("Second")).unwrap();
    assert_eq!(*view.lock().unwrap(), vec!["First", "Second"]);

    repo.delete(&first.id).unwrap();
    assert_eq!(*view.lock().unwrap(), vec!["Second"]);

    subscription.cancel();
    repo.create(TaskDraft::new("Third")).unwrap();
    assert_eq!(*view.lock().unwrap(), vec!["Second"]);
}

#[test]
fn test_two_repositories_share_one_store() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(KvStore::open(temp.path()));
    let editor = TaskRepository::new(Arc::clone(&store));
    let list = TaskRepository::new(store);
    let refreshed = Arc::new(Mutex::new(0));

    let counter = Arc::clone(&refreshed);
    let _subscription = list.subscribe_to_changes(move || *counter.lock().unwrap() += 1);

    editor.create(TaskDraft::new("Shared")).unwrap();

    assert_eq!(*refreshed.lock().unwrap(), 1);
    assert_eq!(list.list_all().len(), 1);
}

#[test]
fn test_bad_record_does_not_hide_or_erase_its_siblings() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tasks.json");
    let stored = serde_json::json!([
        {
            "id": "1000", "title": "Readable", "description": "",
            "dueDate": "2024-01-01", "startDate": "2024-01-01", "endDate": "2024-01-01",
            "status": "todo", "attachments": []
        },
        { "id": "1001", "title": 42, "dueDate": "not a date" },
        {
            "id": "1002", "title": "Waiting on review", "description": "",
            "dueDate": "2024-01-02", "startDate": "2024-01-02", "endDate": "2024-01-02",
            "status": "blocked", "attachments": [], "priority": "high"
        }
    ]);
    fs::write(&path, stored.to_string()).unwrap();

    let repo = open(&temp);
    let ids: Vec<String> = repo.list_all().into_iter().map(|task| task.id).collect();
    assert_eq!(ids, ["1000", "1002"]);
    assert_eq!(
        repo.get("1002").unwrap().status,
        TaskStatus::Other("blocked".to_string())
    );

    let created = repo.create(TaskDraft::new("Fresh")).unwrap();
    repo.update_status("1000", TaskStatus::Done).unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let records = raw.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["status"], "done");
    assert_eq!(records[1], stored[1]);
    assert_eq!(records[2]["status"], "blocked");
    assert_eq!(records[2]["priority"], "high");
    assert_eq!(records[3]["id"], Value::from(created.id));
}
