use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary invocation isolated to a per-test database and an absent
/// config file, so user-level settings never leak in.
fn copydesk(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("copydesk").unwrap();
    cmd.env("COPYDESK_DB_PATH", tmp.path().join("copydesk.db"));
    cmd.env("COPYDESK_CONFIG", tmp.path().join("missing-config.toml"));
    cmd
}

fn first_line(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .next()
        .expect("command printed nothing")
        .to_string()
}

fn new_document(tmp: &TempDir, text: &str) -> String {
    let output = copydesk(tmp)
        .args(["doc", "new", "Draft", "--text", text])
        .output()
        .unwrap();
    assert!(output.status.success());
    first_line(&output.stdout)
}

fn new_suggestion(tmp: &TempDir, doc_id: &str, proposed: &str) -> String {
    let proposal = tmp.path().join("proposal.txt");
    fs::write(&proposal, proposed).unwrap();
    let output = copydesk(tmp)
        .args(["suggest", doc_id, "--proposed"])
        .arg(&proposal)
        .output()
        .unwrap();
    assert!(output.status.success());
    first_line(&output.stdout)
}

#[test]
fn full_review_cycle_merges_the_proposal() {
    let tmp = TempDir::new().unwrap();
    let doc_id = new_document(&tmp, "The cat sat on the mat.");

    let proposal = tmp.path().join("proposal.txt");
    fs::write(&proposal, "The dog sat on the mat quickly.").unwrap();
    let output = copydesk(&tmp)
        .args(["suggest", &doc_id, "--proposed"])
        .arg(&proposal)
        .args(["--instruction", "make it livelier"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let suggestion_id = first_line(&output.stdout);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 change group(s): 2 pending"));
    assert!(stdout.contains("The [-cat-]{+dog+} sat on the mat{+ quickly+}."));

    copydesk(&tmp)
        .args(["review", &suggestion_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1. [pending] replace \"cat\" with \"dog\" at 4..7",
        ))
        .stdout(predicate::str::contains(
            "2. [pending] insert \" quickly\" at 22..22",
        ));

    copydesk(&tmp)
        .args(["accept", &suggestion_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("merged suggestion"))
        .stdout(predicate::str::contains("revision 1"));

    copydesk(&tmp)
        .args(["doc", "show", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("The dog sat on the mat quickly."));
}

#[test]
fn group_level_decisions_steer_the_merge() {
    let tmp = TempDir::new().unwrap();
    let doc_id = new_document(&tmp, "The cat sat on the mat.");
    let suggestion_id = new_suggestion(&tmp, &doc_id, "The dog sat on the mat quickly.");

    copydesk(&tmp)
        .args(["reject", &suggestion_id, "--group", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected group 1"));

    copydesk(&tmp)
        .args(["accept", &suggestion_id, "--group", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("preview with accepted groups applied:"))
        .stdout(predicate::str::contains("The cat sat on the mat quickly."));

    // Nothing is written until the merge.
    copydesk(&tmp)
        .args(["doc", "show", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("The cat sat on the mat."));

    copydesk(&tmp)
        .args(["accept", &suggestion_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 group(s) accepted"));

    copydesk(&tmp)
        .args(["doc", "show", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("The cat sat on the mat quickly."));
}

#[test]
fn rejecting_a_suggestion_leaves_the_document() {
    let tmp = TempDir::new().unwrap();
    let doc_id = new_document(&tmp, "The cat sat on the mat.");
    let suggestion_id = new_suggestion(&tmp, &doc_id, "The dog sat on the mat.");

    copydesk(&tmp)
        .args(["reject", &suggestion_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("document unchanged"));

    copydesk(&tmp)
        .args(["doc", "show", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("The cat sat on the mat."));
}

#[test]
fn change_ledger_cycle_approves_an_insertion() {
    let tmp = TempDir::new().unwrap();
    let doc_id = new_document(&tmp, "ABCDE");

    let output = copydesk(&tmp)
        .args([
            "change", "submit", &doc_id, "--kind", "insertion", "--start", "2", "--text", "X",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let change_id = first_line(&output.stdout);
    assert!(
        String::from_utf8_lossy(&output.stdout)
            .contains("recorded insertion change at 2..2 (pending approval)")
    );

    copydesk(&tmp)
        .args(["change", "approve", &change_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("revision 1"));

    copydesk(&tmp)
        .args(["doc", "show", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("ABXCDE"));

    copydesk(&tmp)
        .args(["change", "list", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("[approved]"));
}

#[test]
fn stale_suggestion_reports_an_error() {
    let tmp = TempDir::new().unwrap();
    let doc_id = new_document(&tmp, "The cat sat on the mat.");
    let suggestion_id = new_suggestion(&tmp, &doc_id, "The dog sat on the mat.");

    copydesk(&tmp)
        .args(["doc", "edit", &doc_id, "--text", "Something else entirely."])
        .assert()
        .success();

    copydesk(&tmp)
        .args(["accept", &suggestion_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of date"));
}

#[test]
fn missing_ids_fail_cleanly() {
    let tmp = TempDir::new().unwrap();

    copydesk(&tmp)
        .args(["doc", "show", "no-such-doc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    copydesk(&tmp)
        .args(["review", "no-such-suggestion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn removing_a_document_takes_its_history_along() {
    let tmp = TempDir::new().unwrap();
    let doc_id = new_document(&tmp, "The cat sat on the mat.");
    let suggestion_id = new_suggestion(&tmp, &doc_id, "The dog sat on the mat.");

    copydesk(&tmp)
        .args(["doc", "rm", &doc_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted document"));

    copydesk(&tmp)
        .args(["review", &suggestion_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
