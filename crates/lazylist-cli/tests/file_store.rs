//! CLI integration tests against a local file store.

mod common;

use std::thread::sleep;
use std::time::Duration;

use common::{Sandbox, json_lines};

fn seed_users(sandbox: &Sandbox, n: usize) {
    for i in 0..n {
        let payload = format!(r#"{{"id": "u{:02}", "name": "User {}"}}"#, i, i);
        sandbox.run_success(&["put", &payload]);
    }
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_put_reports_created_then_updated() {
    let sandbox = Sandbox::new();

    let out = sandbox.run_success(&["put", r#"{"id": "u1", "name": "Asha"}"#]);
    assert!(out.contains("created u1"));

    let out = sandbox.run_success(&["put", r#"{"id": "u1", "name": "Asha Menon"}"#]);
    assert!(out.contains("updated u1"));
}

#[test]
fn test_put_rejects_payload_without_id() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["put", r#"{"name": "nobody"}"#]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to store item"), "stderr: {}", stderr);
}

#[test]
fn test_delete_missing_item_fails() {
    let sandbox = Sandbox::new();
    seed_users(&sandbox, 1);

    assert!(sandbox.run_success(&["delete", "u00"]).contains("deleted u00"));

    let output = sandbox.run(&["delete", "u00"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

// ============================================================================
// Paging
// ============================================================================

#[test]
fn test_page_walks_the_store() {
    let sandbox = Sandbox::new();
    seed_users(&sandbox, 5);

    let output = sandbox.run(&["page", "--limit", "2", "--pages", "2"]);
    assert!(output.status.success());

    let items = json_lines(&String::from_utf8_lossy(&output.stdout));
    let ids: Vec<_> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
    // Fast local responses grow the second request past 2.
    assert_eq!(ids, ["u00", "u01", "u02", "u03", "u04"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PAGE 1 requested 2, received 2, 2 new"), "stderr: {}", stderr);
    assert!(stderr.contains("No more pages."));
}

#[test]
fn test_page_resumes_from_cursor() {
    let sandbox = Sandbox::new();
    seed_users(&sandbox, 4);

    let output = sandbox.run(&["page", "--limit", "2"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(r#"Next cursor: "u01""#), "stderr: {}", stderr);

    let stdout = sandbox.run_success(&["page", "--limit", "2", "--cursor", "u01"]);
    let ids: Vec<_> = json_lines(&stdout)
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["u02", "u03"]);
}

#[test]
fn test_page_without_source_explains_setup() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_without_source(&["page"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No source configured"));
}

// ============================================================================
// Search, media, avatars
// ============================================================================

#[test]
fn test_search_with_filter() {
    let sandbox = Sandbox::new();
    sandbox.run_success(&["put", r#"{"id": "1", "name": "Cardiology Meetup", "city": "Pune"}"#]);
    sandbox.run_success(&["put", r#"{"id": "2", "name": "Cardio Workshop", "city": "Delhi"}"#]);

    let stdout = sandbox.run_success(&["search", "cardio"]);
    assert_eq!(json_lines(&stdout).len(), 2);

    let stdout = sandbox.run_success(&["search", "cardio", "--filter", "city=Pune"]);
    let hits = json_lines(&stdout);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "1");

    let output = sandbox.run(&["search", "oncology"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No results."));
}

#[test]
fn test_resolve_urls_and_placeholders() {
    let sandbox = Sandbox::new();
    let image = sandbox.path("u1.png");
    std::fs::write(&image, b"png").unwrap();

    sandbox.run_success(&[
        "put",
        r#"{"id": "u1", "name": "Asha Menon", "fileKey": "avatars/u1.png"}"#,
        "--media-file",
        image.to_str().unwrap(),
    ]);
    sandbox.run_success(&["put", r#"{"id": "u2", "name": "Dr. Vikram Rao"}"#]);
    sandbox.run_success(&["put", r#"{"id": "u3", "name": "Lost Key", "fileKey": "gone.png"}"#]);

    let stdout = sandbox.run_success(&["resolve", "u1", "u2", "u3", "--json"]);
    let mut lines = json_lines(&stdout);
    lines.sort_by_key(|l| l["id"].as_str().unwrap().to_string());

    let url = lines[0]["media"]["url"].as_str().unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.contains("/media/avatars/u1.png?expires="));
    assert_eq!(lines[1]["media"]["placeholder"]["initials"], "VR");
    assert_eq!(lines[2]["media"]["placeholder"]["initials"], "LK");
}

#[test]
fn test_avatar_is_deterministic() {
    let sandbox = Sandbox::new();
    let first = sandbox.run_success(&["avatar", "Asha Menon", "--json"]);
    let second = sandbox.run_success(&["avatar", "Asha Menon", "--json"]);

    assert_eq!(first, second);
    let placeholder: serde_json::Value = serde_json::from_str(first.trim()).unwrap();
    assert_eq!(placeholder["initials"], "AM");
}

// ============================================================================
// Profile
// ============================================================================

#[test]
fn test_profile_set_show_clear() {
    let sandbox = Sandbox::new();

    let out = sandbox.run_success(&[
        "profile",
        "set",
        "--source",
        "https://api.example.com/dev",
        "--command",
        "getJobs",
        "--id-field",
        "post_id",
        "--token",
        "secret",
    ]);
    assert!(out.contains("Profile saved"));

    let shown: serde_json::Value =
        serde_json::from_str(&sandbox.run_success(&["profile", "show", "--json"])).unwrap();
    assert_eq!(shown["source"], "https://api.example.com/dev");
    assert_eq!(shown["command"], "getJobs");
    assert_eq!(shown["schema"]["id_field"], "post_id");
    assert_eq!(shown["token"], "<redacted>");

    assert!(sandbox.run_success(&["profile", "clear"]).contains("Profile cleared"));
    let shown: serde_json::Value =
        serde_json::from_str(&sandbox.run_success(&["profile", "show", "--json"])).unwrap();
    assert!(shown["source"].is_null());
}

#[test]
fn test_profile_rejects_invalid_source() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["profile", "set", "--source", "not a url"]);
    assert!(!output.status.success());
}

// ============================================================================
// Realtime
// ============================================================================

#[test]
fn test_watch_prints_patches() {
    let sandbox = Sandbox::new();
    seed_users(&sandbox, 2);

    let watcher = sandbox.spawn(&["watch", "--json", "--count", "2", "--for-secs", "20"]);
    sleep(Duration::from_secs(2));

    sandbox.run_success(&["put", r#"{"id": "u09", "name": "Late Joiner"}"#]);
    sandbox.run_success(&["delete", "u00"]);

    let output = watcher.wait_with_output().unwrap();
    assert!(output.status.success());

    let patches = json_lines(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(patches.len(), 2, "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(patches[0]["type"], "created");
    assert_eq!(patches[0]["id"], "u09");
    assert_eq!(patches[0]["len"], 3);
    assert_eq!(patches[1]["type"], "deleted");
    assert_eq!(patches[1]["len"], 2);
}
