mod support;

use chrono::Utc;
use daybook::error::StoreError;
use daybook::lock::{lock_path_for, FileLock};
use daybook::store::{FileStore, HolidayStore, TaskStore};
use daybook::task::{Holiday, NewTask, Task, TaskId};

use support::{day, TestDir};

fn draft(title: &str, date: chrono::NaiveDate, order: u32) -> Task {
    NewTask::on_day(title, date).into_task(order, Utc::now())
}

#[tokio::test]
async fn tasks_survive_reopening() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let date = day(2024, 7, 1);

    let store = FileStore::new(dir.store_path());
    let first = store.insert(&draft("first", date, 0)).await?;
    let second = store.insert(&draft("second", date, 1)).await?;
    assert_eq!((first, second), (TaskId(1), TaskId(2)));

    let reopened = FileStore::new(dir.store_path());
    let tasks = reopened.query_by_date(date).await?;
    let titles: Vec<&str> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, ["first", "second"]);
    assert_eq!(reopened.insert(&draft("third", date, 2)).await?, TaskId(3));
    Ok(())
}

#[tokio::test]
async fn queries_sort_by_day_then_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let store = FileStore::new(dir.store_path());
    store.insert(&draft("b2", day(2024, 7, 2), 1)).await?;
    store.insert(&draft("a1", day(2024, 7, 1), 1)).await?;
    store.insert(&draft("b1", day(2024, 7, 2), 0)).await?;
    store.insert(&draft("a0", day(2024, 7, 1), 0)).await?;
    store.insert(&draft("c0", day(2024, 7, 9), 0)).await?;

    let range = store.query_range(day(2024, 7, 1), day(2024, 7, 2)).await?;
    let titles: Vec<&str> = range.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, ["a0", "a1", "b1", "b2"]);
    assert_eq!(store.query_all().await?.len(), 5);
    assert_eq!(store.count_for_date(day(2024, 7, 2)).await?, 2);
    Ok(())
}

#[tokio::test]
async fn contract_errors() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let store = FileStore::new(dir.store_path());
    let id = store.insert(&draft("x", day(2024, 7, 1), 0)).await?;

    let mut persisted = draft("x", day(2024, 7, 1), 0);
    persisted.id = Some(id);
    assert!(matches!(
        store.insert(&persisted).await,
        Err(StoreError::AlreadyPersisted(existing)) if existing == id
    ));

    let mut ghost = persisted.clone();
    ghost.id = Some(TaskId(99));
    assert!(matches!(
        store.update(&ghost).await,
        Err(StoreError::NotFound(TaskId(99)))
    ));
    assert!(matches!(
        store.update(&draft("y", day(2024, 7, 1), 0)).await,
        Err(StoreError::MissingId)
    ));

    store.delete(TaskId(99)).await?;
    store.delete(id).await?;
    store.delete(id).await?;
    assert!(store.query_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_file_is_an_empty_store() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_file("store.json", "")?;
    let store = FileStore::new(dir.store_path());
    assert!(store.query_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn foreign_schema_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_file(
        "store.json",
        r#"{"schema_version":"daybook.store.v0","next_task_id":1,"next_holiday_id":1}"#,
    )?;
    let store = FileStore::new(dir.store_path());
    assert!(matches!(
        store.query_all().await,
        Err(StoreError::Schema { found, .. }) if found == "daybook.store.v0"
    ));
    Ok(())
}

#[tokio::test]
async fn held_lock_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let store = FileStore::new(dir.store_path()).with_lock_timeout(50);
    let _held = FileLock::acquire(lock_path_for(store.path()), 1000)?;

    assert!(matches!(
        store.insert(&draft("blocked", day(2024, 7, 1), 0)).await,
        Err(StoreError::LockFailed(_))
    ));
    Ok(())
}

#[tokio::test]
async fn holidays_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let store = FileStore::new(dir.store_path());
    let new_year = store
        .insert_holiday(&Holiday::custom("New Year", day(2025, 1, 1)))
        .await?;
    store
        .insert_holiday(&Holiday::custom("Christmas", day(2024, 12, 25)))
        .await?;

    let all = store.holidays().await?;
    let names: Vec<&str> = all.iter().map(|holiday| holiday.name.as_str()).collect();
    assert_eq!(names, ["Christmas", "New Year"]);
    assert_eq!(store.holidays_for_date(day(2025, 1, 1)).await?.len(), 1);

    store.delete_holiday(new_year).await?;
    assert!(store.holidays_for_date(day(2025, 1, 1)).await?.is_empty());
    Ok(())
}
