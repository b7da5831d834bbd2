use assert_cmd::Command;
use std::path::Path;

pub fn diary_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mood-diary").unwrap();
    cmd.env_remove("MOOD_DIARY_STORAGE");
    cmd.env_remove("MOOD_DIARY_LOG");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--storage")
        .arg(dir.join("diary.json"))
        .arg("--log-file")
        .arg(dir.join("diary.log"));
    cmd
}
