//! End-to-end command tests against in-memory remotes.

mod support;

use envsync_core::commands::{
    DeployCommand, DeployOptions, DownloadCommand, DownloadOptions, ListCommand, OpenCommand,
    RemoveCommand, RemoveOptions,
};
use envsync_core::prelude::*;
use support::{MockRemotes, Workspace};

fn arbiter_error(err: &anyhow::Error) -> &ArbiterError {
    err.downcast_ref::<ArbiterError>()
        .expect("error should be an ArbiterError")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_pushes_and_records_manifest() {
    let workspace = Workspace::new(&["development"]);
    workspace.write_file("development", "layout/theme.liquid", "theme");
    workspace.write_file("development", "assets/app.js", "js");
    let notify = workspace.root().join("notify").join("synced");

    let remotes = MockRemotes::new();
    let options = workspace.options().with_notify_file(&notify);
    let mut arbiter = remotes.resolve(options).await.unwrap();

    let report = DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap();
    assert_eq!(report.change_count(), 2);
    assert_eq!(
        remotes.keys("development"),
        vec!["assets/app.js", "layout/theme.liquid"]
    );
    assert!(notify.exists());

    let manifest = Manifest::load(workspace.root()).unwrap();
    assert!(manifest.path().exists());
    assert!(
        manifest
            .recorded_version("layout/theme.liquid", "development")
            .is_some()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_removes_remote_only_assets_once_seen() {
    let workspace = Workspace::new(&["development"]);
    workspace.write_file("development", "a.liquid", "A");

    let remotes = MockRemotes::new();
    remotes.seed("development", "stale.liquid", "old");

    // Pull first so the remote asset is known locally
    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    DownloadCommand::execute(&mut arbiter, &DownloadOptions::new())
        .await
        .unwrap();
    std::fs::remove_file(workspace.root().join("development").join("stale.liquid")).unwrap();

    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let report = DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap();
    assert_eq!(report.environments[0].removed, vec!["stale.liquid"]);
    assert_eq!(remotes.keys("development"), vec!["a.liquid"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_against_unseen_remote_needs_no_delete_or_force() {
    let workspace = Workspace::new(&["development"]);
    workspace.write_file("development", "a.liquid", "A");

    let remotes = MockRemotes::new();
    remotes.seed("development", "unseen.liquid", "remote");

    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let err = DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(arbiter_error(&err), ArbiterError::PreflightConflict(_)));
    assert_eq!(remotes.keys("development"), vec!["unseen.liquid"]);

    DeployCommand::execute(&mut arbiter, &DeployOptions::new().with_no_delete(true))
        .await
        .unwrap();
    assert_eq!(remotes.keys("development"), vec!["a.liquid", "unseen.liquid"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_blocks_on_remote_edit_until_forced() {
    let workspace = Workspace::new(&["development"]);
    workspace.write_file("development", "a.liquid", "mine");

    let remotes = MockRemotes::new();
    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap();

    remotes.seed("development", "a.liquid", "edited in the admin");
    workspace.write_file("development", "a.liquid", "mine, again");

    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let err = DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap_err();
    match arbiter_error(&err) {
        ArbiterError::PreflightConflict(diff) => assert_eq!(diff.updated, vec!["a.liquid"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        remotes.contents("development", "a.liquid").as_deref(),
        Some("edited in the admin")
    );

    let mut forced = remotes
        .resolve(workspace.options().with_force(true))
        .await
        .unwrap();
    DeployCommand::execute(&mut forced, &DeployOptions::new())
        .await
        .unwrap();
    assert_eq!(
        remotes.contents("development", "a.liquid").as_deref(),
        Some("mine, again")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_failure_in_one_environment_does_not_stop_others() {
    let workspace = Workspace::new(&["alpha", "beta"]);
    workspace.write_file("alpha", "a.liquid", "A");
    workspace.write_file("beta", "b.liquid", "B");

    let remotes = MockRemotes::new();
    remotes.fail_pushes("alpha");

    let options = workspace.options().with_all_environments(true);
    let mut arbiter = remotes.resolve(options).await.unwrap();
    let err = DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap_err();

    match arbiter_error(&err) {
        ArbiterError::Handler(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].environment, "alpha");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(remotes.keys("beta"), vec!["b.liquid"]);

    let manifest = Manifest::load(workspace.root()).unwrap();
    assert!(manifest.recorded_version("b.liquid", "beta").is_some());
    assert!(manifest.recorded_version("a.liquid", "alpha").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_named_files_only() {
    let workspace = Workspace::new(&["development"]);
    workspace.write_file("development", "a.liquid", "A");
    workspace.write_file("development", "b.liquid", "B");

    let remotes = MockRemotes::new();
    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    DeployCommand::execute(&mut arbiter, &DeployOptions::new().with_files(["b.liquid"]))
        .await
        .unwrap();
    assert_eq!(remotes.keys("development"), vec!["b.liquid"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn download_writes_files_and_records_versions() {
    let workspace = Workspace::new(&["development"]);
    let remotes = MockRemotes::new();
    remotes.seed("development", "templates/index.liquid", "index");
    remotes.seed("development", "config/settings.json", "{}");

    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let report = DownloadCommand::execute(&mut arbiter, &DownloadOptions::new())
        .await
        .unwrap();

    assert_eq!(report.environments[0].1.len(), 2);
    assert_eq!(
        workspace.read_file("development", "templates/index.liquid").as_deref(),
        Some("index")
    );
    let manifest = Manifest::load(workspace.root()).unwrap();
    assert!(
        manifest
            .recorded_version("config/settings.json", "development")
            .is_some()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn download_named_missing_asset_fails() {
    let workspace = Workspace::new(&["development"]);
    let remotes = MockRemotes::new();

    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let err = DownloadCommand::execute(
        &mut arbiter,
        &DownloadOptions::new().with_files(["ghost.liquid"]),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("ghost.liquid"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remove_requires_files() {
    let workspace = Workspace::new(&["development"]);
    let remotes = MockRemotes::new();

    let mut arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let err = RemoveCommand::execute(&mut arbiter, &RemoveOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No files specified"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remove_deletes_from_every_environment() {
    let workspace = Workspace::new(&["alpha", "beta"]);
    workspace.write_file("alpha", "x.liquid", "X");
    workspace.write_file("beta", "x.liquid", "X");

    let remotes = MockRemotes::new();
    let options = workspace.options().with_all_environments(true);
    let mut arbiter = remotes.resolve(options.clone()).await.unwrap();
    DeployCommand::execute(&mut arbiter, &DeployOptions::new())
        .await
        .unwrap();

    let mut arbiter = remotes.resolve(options).await.unwrap();
    let report = RemoveCommand::execute(&mut arbiter, &RemoveOptions::new(["x.liquid"]))
        .await
        .unwrap();
    assert_eq!(report.environments.len(), 2);
    assert!(remotes.keys("alpha").is_empty());
    assert!(remotes.keys("beta").is_empty());

    let manifest = Manifest::load(workspace.root()).unwrap();
    assert!(manifest.recorded_version("x.liquid", "alpha").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn list_reports_sorted_assets_per_environment() {
    let workspace = Workspace::new(&["alpha", "beta"]);
    let remotes = MockRemotes::new();
    remotes.seed("alpha", "z.liquid", "z");
    remotes.seed("alpha", "a.liquid", "a");

    let options = workspace.options().with_all_environments(true);
    let arbiter = remotes.resolve(options).await.unwrap();
    let report = ListCommand::execute(&arbiter).await.unwrap();

    let (environment, assets) = &report.environments[0];
    assert_eq!(environment, "alpha");
    let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys, vec!["a.liquid", "z.liquid"]);
    assert!(report.environments[1].1.is_empty());
}

#[tokio::test]
async fn open_needs_exactly_one_environment() {
    let workspace = Workspace::new(&["development", "production"]);
    let remotes = MockRemotes::new();

    let arbiter = remotes.resolve(workspace.options()).await.unwrap();
    let (environment, endpoint) = OpenCommand::execute(&arbiter).await.unwrap();
    assert_eq!(environment, "development");
    assert_eq!(endpoint.as_str(), "https://development.example.test/api");

    let options = workspace.options().with_all_environments(true);
    let arbiter = remotes.resolve(options).await.unwrap();
    let err = OpenCommand::execute(&arbiter).await.unwrap_err();
    assert!(matches!(
        arbiter_error(&err),
        ArbiterError::SingleEnvironmentViolation
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deploy_reports_conflicts_in_environment_order() {
    let workspace = Workspace::new(&["alpha", "beta", "gamma"]);
    let remotes = MockRemotes::new();
    for environment in ["alpha", "beta", "gamma"] {
        workspace.write_file(environment, "a.liquid", "A");
        remotes.seed(environment, "unseen.liquid", "remote");
    }

    for _ in 0..5 {
        let options = workspace.options().with_all_environments(true);
        let mut arbiter = remotes.resolve(options).await.unwrap();
        let err = DeployCommand::execute(&mut arbiter, &DeployOptions::new())
            .await
            .unwrap_err();
        match arbiter_error(&err) {
            ArbiterError::PreflightConflict(diff) => assert_eq!(diff.environment, "alpha"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
