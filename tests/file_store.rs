use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use karma::config::Config;
use karma::field_update::FieldUpdate;
use karma::lock::lock_path_for;
use karma::persistence::{
    CreateProjectRequest, CreateTaskRequest, CreateWorkspaceRequest, FileStore, ListQuery,
    PersistencePort, SortKey, TaskFilter, UpdateTaskRequest,
};
use karma::seed;
use karma::storage::{Collection, Storage};
use karma::Error;

fn store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path().to_path_buf(), &Config::default());
    (dir, store)
}

fn workspace_with_project(store: &FileStore) -> (String, String) {
    let workspace = store
        .create_workspace(CreateWorkspaceRequest::with_perspective_names(
            "Errands",
            ["Inbox", "Next"].map(String::from),
        ))
        .expect("workspace");
    let project = store
        .create_project(
            &workspace.id,
            CreateProjectRequest {
                name: "Shopping".to_string(),
                icon: None,
                order: None,
            },
        )
        .expect("project");
    (workspace.id, project.id)
}

fn new_task(workspace: &str, project: &str, title: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        title: title.to_string(),
        description: Some("from the list".to_string()),
        project_id: project.to_string(),
        perspective_id: Some("inbox".to_string()),
        workspace_id: workspace.to_string(),
    }
}

#[test]
fn data_survives_reopening_the_store() {
    let (dir, store) = store();
    let (ws, project) = workspace_with_project(&store);
    let task = store.create_task(new_task(&ws, &project, "Buy milk")).expect("task");
    drop(store);

    let reopened = FileStore::open(dir.path().to_path_buf(), &Config::default());
    let loaded = reopened.get_task(&ws, &task.id).expect("task");
    assert_eq!(loaded, task);

    let config = reopened.load_workspace_config(&ws).expect("config");
    assert_eq!(config.name(), "Errands");
    assert_eq!(config.default_perspective().map(|p| p.id.as_str()), Some("inbox"));
    assert_eq!(config.default_project().map(|p| p.id.as_str()), Some("shopping"));
}

#[test]
fn update_keeps_or_clears_description() {
    let (_dir, store) = store();
    let (ws, project) = workspace_with_project(&store);
    let task = store.create_task(new_task(&ws, &project, "Buy milk")).expect("task");

    let kept = store
        .update_task(
            &ws,
            &task.id,
            UpdateTaskRequest {
                title: Some("Buy oat milk".to_string()),
                ..UpdateTaskRequest::default()
            },
        )
        .expect("update");
    assert_eq!(kept.description.as_deref(), Some("from the list"));
    assert!(kept.updated_at >= task.updated_at);

    let cleared = store
        .update_task(
            &ws,
            &task.id,
            UpdateTaskRequest {
                description: FieldUpdate::Clear,
                perspective_id: FieldUpdate::Clear,
                ..UpdateTaskRequest::default()
            },
        )
        .expect("update");
    assert_eq!(cleared.title, "Buy oat milk");
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.perspective_id, None);
}

#[test]
fn missing_ids_are_not_found() {
    let (_dir, store) = store();
    let (ws, _project) = workspace_with_project(&store);

    assert!(matches!(store.get_task(&ws, "nope"), Err(Error::NotFound { .. })));
    assert!(matches!(store.delete_project(&ws, "nope"), Err(Error::NotFound { .. })));
    assert!(matches!(store.toggle_task(&ws, "nope"), Err(Error::NotFound { .. })));
    assert!(matches!(store.list_tasks("nope", None), Err(Error::NotFound { .. })));
}

#[test]
fn query_sorts_and_filters_seeded_tasks() {
    let (_dir, store) = store();
    seed::seed(&store, &Config::default().workspace.perspectives).expect("seed");

    let page = store
        .query_tasks(&ListQuery {
            filter: Some(TaskFilter {
                workspace_id: Some("work".to_string()),
                completed: Some(false),
                ..TaskFilter::default()
            }),
            sort: vec!["-title".parse::<SortKey>().expect("sort")],
            page: None,
            page_size: None,
        })
        .expect("query");
    let titles: Vec<&str> = page.items.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Team meeting", "Organize files", "Complete project proposal"]);
    assert_eq!(page.total_pages, 1);

    let err = store
        .query_tasks(&ListQuery {
            page: Some(0),
            ..ListQuery::default()
        })
        .expect_err("page 0");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn concurrent_writers_do_not_lose_tasks() {
    let (dir, store) = store();
    let (ws, project) = workspace_with_project(&store);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let data_dir = dir.path().to_path_buf();
            let ws = ws.clone();
            let project = project.clone();
            thread::spawn(move || {
                let store = FileStore::open(data_dir, &Config::default());
                for n in 0..10 {
                    store
                        .create_task(new_task(&ws, &project, &format!("task {worker}-{n}")))
                        .expect("create");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker");
    }

    let tasks = store.list_tasks(&ws, None).expect("tasks");
    assert_eq!(tasks.len(), 40);
    let mut orders: Vec<i64> = tasks.iter().map(|task| task.order).collect();
    orders.sort_unstable();
    assert_eq!(orders, (1..=40).collect::<Vec<_>>());
}

#[test]
fn writers_stay_exclusive_while_a_collection_is_removed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = Storage::new(dir.path().to_path_buf(), "karma-tasks", 5000);
    let path = storage.collection_file("errands", Collection::Tasks);
    let holders = Arc::new(AtomicUsize::new(0));
    let max_holders = Arc::new(AtomicUsize::new(0));

    let first = storage.lock_collection(&path).expect("lock");
    let remover = {
        let storage = storage.clone();
        let path = path.clone();
        thread::spawn(move || storage.remove_collection(&path))
    };
    let writers: Vec<_> = (1..=4u64)
        .map(|n| {
            let storage = storage.clone();
            let path = path.clone();
            let holders = Arc::clone(&holders);
            let max_holders = Arc::clone(&max_holders);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20 * n));
                storage.update_collection(&path, |tasks: &mut Vec<u64>| {
                    let now = holders.fetch_add(1, Ordering::SeqCst) + 1;
                    max_holders.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    tasks.push(n);
                    holders.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(150));
    drop(first);
    remover.join().expect("remover").expect("remove");
    for writer in writers {
        writer.join().expect("writer").expect("write");
    }

    assert_eq!(max_holders.load(Ordering::SeqCst), 1);
    assert!(lock_path_for(&path).exists());
}

#[test]
fn deleting_a_workspace_mid_write_leaves_no_orphaned_tasks() {
    let (dir, store) = store();
    let (ws, project) = workspace_with_project(&store);

    let writers: Vec<_> = (0..3)
        .map(|worker| {
            let data_dir = dir.path().to_path_buf();
            let ws = ws.clone();
            let project = project.clone();
            thread::spawn(move || {
                let store = FileStore::open(data_dir, &Config::default());
                for n in 0..20 {
                    match store.create_task(new_task(&ws, &project, &format!("task {worker}-{n}"))) {
                        Ok(_) => {}
                        Err(Error::NotFound { .. }) => break,
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                }
            })
        })
        .collect();
    thread::sleep(Duration::from_millis(20));
    store.delete_workspace(&ws).expect("delete");
    for writer in writers {
        writer.join().expect("writer");
    }

    for collection in Collection::ALL {
        assert!(!store.storage().collection_file(&ws, collection).exists());
    }
    let again = store
        .create_workspace(CreateWorkspaceRequest::with_perspective_names(
            "Errands",
            ["Inbox"].map(String::from),
        ))
        .expect("recreate");
    assert_eq!(again.id, ws);
    assert!(store.list_tasks(&ws, None).expect("tasks").is_empty());
    assert!(store.list_projects(&ws).expect("projects").is_empty());
    let perspectives: Vec<String> = store
        .list_perspectives(&ws)
        .expect("perspectives")
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(perspectives, vec!["inbox".to_string()]);
}

#[test]
fn failed_workspace_delete_keeps_the_record() {
    let (_dir, store) = store();
    let (ws, project) = workspace_with_project(&store);
    store.create_task(new_task(&ws, &project, "milk")).expect("task");

    let tasks_path = store.storage().collection_file(&ws, Collection::Tasks);
    std::fs::remove_file(&tasks_path).expect("remove tasks file");
    std::fs::create_dir(&tasks_path).expect("block tasks path");

    assert!(store.delete_workspace(&ws).is_err());
    assert!(store.get_workspace(&ws).is_ok());

    std::fs::remove_dir(&tasks_path).expect("unblock");
    store.delete_workspace(&ws).expect("retry");
    assert!(matches!(
        store.get_workspace(&ws),
        Err(Error::NotFound { .. })
    ));
}
