mod support;

use predicates::str::contains;
use support::DataDir;

#[test]
fn task_new_without_projects_fails_with_precondition() {
    let data = DataDir::new();
    data.karma().args(["ws", "new", "Errands"]).assert().success();

    data.karma()
        .args(["task", "new", "Buy milk"])
        .assert()
        .code(3)
        .stderr(contains("No default project"))
        .stderr(contains("create a project before adding tasks"))
        .stderr(contains("karma project new"));
}

#[test]
fn task_new_error_as_json() {
    let data = DataDir::new();
    data.karma().args(["ws", "new", "Errands"]).assert().success();

    let output = data
        .karma()
        .args(["--json", "task", "new", "Buy milk"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(3));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "task new");
    assert_eq!(envelope["error"]["code"], 3);
    assert_eq!(envelope["error"]["kind"], "precondition_failed");
    assert_eq!(envelope["error"]["details"]["workspace_id"], "errands");
}

#[test]
fn task_new_uses_view_defaults() {
    let data = DataDir::new();
    data.karma().args(["ws", "new", "Errands"]).assert().success();
    data.karma().args(["project", "new", "Shopping"]).assert().success();
    data.karma().args(["project", "new", "Garden"]).assert().success();

    let created = data.json(&["task", "new", "Buy milk"]);
    let task = &created["data"]["task"];
    assert_eq!(task["project_id"], "shopping");
    assert_eq!(task["perspective_id"], "inbox");
    assert_eq!(task["workspace_id"], "errands");
    assert_eq!(task["completed"], false);
    assert_eq!(task["order"], 1);

    let created = data.json(&["task", "new", "Weed beds", "--project", "garden"]);
    assert_eq!(created["data"]["task"]["project_id"], "garden");
    assert_eq!(created["data"]["task"]["perspective_id"], "inbox");

    let created = data.json(&[
        "task",
        "new",
        "Plant tulips",
        "--view",
        "perspective",
        "--perspective",
        "someday",
        "--project",
        "garden",
    ]);
    assert_eq!(created["data"]["task"]["perspective_id"], "someday");
    assert_eq!(created["data"]["task"]["order"], 2);
}

#[test]
fn task_new_rejects_unknown_project() {
    let data = DataDir::seeded();
    data.karma()
        .args(["task", "new", "Lost", "--project", "nowhere"])
        .assert()
        .code(2)
        .stderr(contains("Project not found: nowhere"));
}

#[test]
fn edit_toggle_and_remove_by_prefix() {
    let data = DataDir::new();
    data.karma().args(["ws", "new", "Errands"]).assert().success();
    data.karma().args(["project", "new", "Shopping"]).assert().success();

    let created = data.json(&["task", "new", "Buy milk", "--description", "2 litres"]);
    let id = created["data"]["task"]["id"].as_str().expect("id").to_string();
    let prefix = &id[..8];

    let edited = data.json(&["task", "edit", prefix, "--title", "Buy oat milk", "--clear-description"]);
    assert_eq!(edited["data"]["task"]["id"], id.as_str());
    assert_eq!(edited["data"]["task"]["title"], "Buy oat milk");
    assert!(edited["data"]["task"].get("description").map_or(true, |d| d.is_null()));

    let toggled = data.json(&["task", "toggle", prefix]);
    assert_eq!(toggled["data"]["task"]["completed"], true);

    data.karma()
        .args(["task", "toggle", prefix])
        .assert()
        .success()
        .stdout(contains("Task reopened"));

    data.karma().args(["task", "rm", prefix]).assert().success();
    data.karma()
        .args(["task", "show", id.as_str()])
        .assert()
        .code(2)
        .stderr(contains("Task not found"));
}

#[test]
fn edit_without_changes_is_rejected() {
    let data = DataDir::seeded();
    let list = data.json(&["task", "ls"]);
    let id = list["data"]["items"][0]["id"].as_str().expect("id").to_string();

    data.karma()
        .args(["task", "edit", id.as_str()])
        .assert()
        .code(2)
        .stderr(contains("nothing to change"));
}

#[test]
fn task_ls_filters_sorts_and_pages() {
    let data = DataDir::seeded();

    let all = data.json(&["task", "ls"]);
    assert_eq!(all["data"]["total"], 8);
    assert_eq!(all["data"]["page"], 1);

    let done = data.json(&["task", "ls", "--done"]);
    assert_eq!(done["data"]["total"], 1);
    assert_eq!(done["data"]["items"][0]["title"], "Read book");

    let home = data.json(&["task", "ls", "--project", "home-life", "--sort", "title"]);
    let titles: Vec<&str> = home["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|task| task["title"].as_str().expect("title"))
        .collect();
    assert_eq!(
        titles,
        vec!["Buy groceries", "Call insurance company", "Clean workspace", "Review monthly budget"]
    );

    let search = data.json(&["task", "ls", "--search", "BUDGET"]);
    assert_eq!(search["data"]["total"], 1);

    let paged = data.json(&["task", "ls", "--page-size", "3", "--page", "3"]);
    assert_eq!(paged["data"]["total_pages"], 3);
    assert_eq!(paged["data"]["items"].as_array().expect("items").len(), 2);

    let everywhere = data.json(&["task", "ls", "--all-workspaces"]);
    assert_eq!(everywhere["data"]["total"], 13);
}

#[test]
fn task_ls_rejects_bad_sort_key() {
    let data = DataDir::seeded();
    data.karma()
        .args(["task", "ls", "--sort", "priority"])
        .assert()
        .code(2);
}
