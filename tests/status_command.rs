#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `status` command.

mod common;

use std::os::unix::fs::symlink;

use common::*;
use hidedot::commands;
use hidedot::resources::status::{LinkStatus, to_json};

const CONFIG: &str = r#"
[[section]]
[section.link]
"~/.ok" = "ok"
"~/.missing" = "missing"
"~/.broken" = "gone"
"~/.elsewhere" = "ok"
"~/.file" = "ok"
"#;

fn fixture() -> IntegrationTestContext {
    let t = TestContextBuilder::new()
        .with_config(CONFIG)
        .with_source("ok", "")
        .with_source("other", "")
        .with_home_file(".file", "")
        .build();
    let home = t.home();
    symlink(t.dotfiles().join("ok"), home.join(".ok")).unwrap();
    symlink(t.dotfiles().join("gone"), home.join(".broken")).unwrap();
    symlink(t.dotfiles().join("other"), home.join(".elsewhere")).unwrap();
    t
}

/// Every declaration gets a status, worst first.
#[test]
fn reports_each_state_sorted_by_severity() {
    let t = fixture();
    let (setup, _) = t.setup(&["status"]);

    let reports = commands::status::collect(&setup);
    let statuses: Vec<LinkStatus> = reports.iter().map(|r| r.status).collect();

    assert_eq!(
        statuses,
        vec![
            LinkStatus::NotSymlink,
            LinkStatus::Mismatch,
            LinkStatus::Broken,
            LinkStatus::Missing,
            LinkStatus::Ok,
        ]
    );
    assert_eq!(reports[0].target, t.home().join(".file"));
    assert_eq!(
        reports[1].message.as_deref(),
        Some(
            format!(
                "Points to {} instead of {}",
                t.dotfiles().join("other").display(),
                t.dotfiles().join("ok").display()
            )
            .as_str()
        )
    );
}

/// Status is read-only.
#[test]
fn status_changes_nothing() {
    let t = fixture();
    let (setup, log) = t.setup(&["status"]);

    commands::status::collect(&setup);

    assert!(t.home().join(".missing").symlink_metadata().is_err());
    assert!(std::fs::read_link(t.home().join(".elsewhere")).is_ok());
    assert!(t.calls().is_empty());
    assert!(log.at(hidedot::logging::Level::Warn).is_empty());
}

/// The JSON form carries statuses and counts.
#[test]
fn json_report_counts_problems() {
    let t = fixture();
    let (setup, _) = t.setup(&["status", "--json"]);

    let json: serde_json::Value =
        serde_json::from_str(&to_json(&commands::status::collect(&setup)).unwrap()).unwrap();

    assert_eq!(json["ok"], 1);
    assert_eq!(json["problems"], 4);
    assert_eq!(json["links"][0]["status"], "NOT_SYMLINK");
    assert_eq!(json["links"][4]["status"], "OK");
}

/// After `link`, every link reports OK.
#[test]
fn link_then_status_is_clean() {
    let t = TestContextBuilder::new()
        .with_config("[[section]]\n[section.link]\n\"~/.a\" = \"a\"\n\"~/.config/b\" = \"b\"\n")
        .with_source("a", "")
        .with_source("b", "")
        .build();
    let (setup, _) = t.setup(&[]);
    commands::link::run(&setup);

    let (setup, _) = t.setup(&["status"]);
    let reports = commands::status::collect(&setup);

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.status == LinkStatus::Ok));
}
