use model_fetch_core::command::{quote, CommandOutput, CommandRunner};
use model_fetch_core::config::ToolsConfig;
use model_fetch_core::fs_utils::format_size;
use model_fetch_core::{download_model, DownloadError, ModelDownloader, SourceType};
use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: Mutex<()> = Mutex::new(());

fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

const HASH: &str = "'3f786850e387550fdab836ed7e6dc881de23001b'";

struct Call {
    command: String,
    cwd: PathBuf,
}

/// Stands in for git and azcopy by writing files where they would.
struct FakeRunner {
    clone_exit: i32,
    log_exit: i32,
    copy_exit: i32,
    files: Vec<(&'static str, usize)>,
    calls: RefCell<Vec<Call>>,
}

impl FakeRunner {
    fn new() -> Self {
        Self {
            clone_exit: 0,
            log_exit: 0,
            copy_exit: 0,
            files: vec![("config.json", 100), ("weights/model.bin", 200), ("tokenizer.json", 300)],
            calls: RefCell::new(Vec::new()),
        }
    }

    fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.command.clone()).collect()
    }

    fn write_files(&self, dir: &Path) {
        for (name, len) in &self.files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, vec![7u8; *len]).unwrap();
        }
    }
}

fn last_arg(command: &str) -> PathBuf {
    let words = shlex::split(command).unwrap();
    PathBuf::from(words.last().unwrap())
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &str) -> model_fetch_core::Result<CommandOutput> {
        self.calls.borrow_mut().push(Call {
            command: command.to_string(),
            cwd: env::current_dir().unwrap(),
        });

        if command.starts_with("git clone") {
            let target = last_arg(command);
            let git_dir = target.join(".git");
            fs::create_dir_all(git_dir.join("objects/pack")).unwrap();
            fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();

            if self.clone_exit != 0 {
                return Ok(CommandOutput {
                    exit_code: self.clone_exit,
                    output: "fatal: early EOF".to_string(),
                });
            }

            let pack = git_dir.join("objects/pack/pack-1.pack");
            fs::write(&pack, vec![0u8; 4096]).unwrap();
            let mut perms = fs::metadata(&pack).unwrap().permissions();
            perms.set_readonly(true);
            fs::set_permissions(&pack, perms).unwrap();

            self.write_files(&target);
            Ok(CommandOutput {
                exit_code: 0,
                output: "Cloning into 'model'...".to_string(),
            })
        } else if command.starts_with("git log") {
            Ok(CommandOutput {
                exit_code: self.log_exit,
                output: if self.log_exit == 0 {
                    HASH.to_string()
                } else {
                    "fatal: not a git repository".to_string()
                },
            })
        } else if command.starts_with("azcopy cp") {
            if self.copy_exit == 0 {
                self.write_files(&last_arg(command));
            }
            Ok(CommandOutput {
                exit_code: self.copy_exit,
                output: "Final Job Status: Completed".to_string(),
            })
        } else {
            panic!("unexpected command: {command}");
        }
    }
}

fn setup() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("model");
    (dir, target)
}

fn downloader(runner: FakeRunner) -> ModelDownloader<FakeRunner> {
    ModelDownloader::with_runner(runner, ToolsConfig::default())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    a.canonicalize().unwrap() == b.canonicalize().unwrap()
}

#[test]
fn git_download_reports_all_metadata_and_drops_history() {
    let _lock = cwd_lock();
    let before = env::current_dir().unwrap();
    let (_tmp, target) = setup();
    let downloader = downloader(FakeRunner::new());

    let metadata = downloader
        .download(SourceType::Git, "https://github.com/org/bert.git", &target)
        .unwrap();

    let value = serde_json::to_value(&metadata).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 3);
    for key in ["download_time_utc", "commit_hash", "model_size"] {
        assert!(object.contains_key(key), "missing {key}");
    }

    // Quotes from the format string are kept as git printed them
    assert_eq!(metadata.commit_hash.as_deref(), Some(HASH));
    // Size excludes the removed .git directory
    assert_eq!(metadata.model_size, format_size(600));
    assert_eq!(metadata.model_size, "600.00 B");

    assert!(!target.join(".git").exists());
    assert!(target.join("weights/model.bin").exists());
    assert_eq!(env::current_dir().unwrap(), before);
}

#[test]
fn git_commands_and_working_directory() {
    let _lock = cwd_lock();
    let before = env::current_dir().unwrap();
    let (_tmp, target) = setup();
    let downloader = downloader(FakeRunner::new());

    downloader
        .download(SourceType::Git, "https://github.com/org/bert.git", &target)
        .unwrap();

    let calls = downloader.runner().calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].command,
        format!(
            "git clone --depth=1 {} {}",
            quote("https://github.com/org/bert.git").unwrap(),
            quote(&target.to_string_lossy()).unwrap()
        )
    );
    assert_eq!(calls[0].cwd, before);
    assert_eq!(calls[1].command, "git log --oneline -n 1 --pretty=tformat:'%H'");
    assert!(same_dir(&calls[1].cwd, &target));
}

#[test]
fn failed_clone_leaves_partial_directory() {
    let _lock = cwd_lock();
    let (_tmp, target) = setup();
    let mut runner = FakeRunner::new();
    runner.clone_exit = 128;
    let downloader = downloader(runner);

    let err = downloader
        .download(SourceType::Git, "https://github.com/org/missing.git", &target)
        .unwrap_err();

    match err {
        DownloadError::DownloadFailed { message, output } => {
            assert!(message.contains("https://github.com/org/missing.git"));
            assert_eq!(output, "fatal: early EOF");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(downloader.runner().commands().len(), 1);
    assert!(target.join(".git/HEAD").exists());
}

#[test]
fn failed_commit_query_restores_working_directory() {
    let _lock = cwd_lock();
    let before = env::current_dir().unwrap();
    let (_tmp, target) = setup();
    let mut runner = FakeRunner::new();
    runner.log_exit = 1;
    let downloader = downloader(runner);

    let err = downloader
        .download(SourceType::Git, "https://github.com/org/bert.git", &target)
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::DownloadFailed { ref output, .. } if output == "fatal: not a git repository"
    ));
    assert_eq!(env::current_dir().unwrap(), before);
    assert!(target.join(".git").exists());
}

#[test]
fn blob_download_reports_time_and_size_only() {
    let (_tmp, target) = setup();
    let downloader = downloader(FakeRunner::new());

    let metadata = downloader
        .download(
            SourceType::AzureBlob,
            "https://acct.blob.core.windows.net/models/bert/*",
            &target,
        )
        .unwrap();

    let value = serde_json::to_value(&metadata).unwrap();
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["download_time_utc", "model_size"]);
    assert_eq!(metadata.model_size, "600.00 B");
    assert_eq!(
        downloader.runner().commands(),
        vec![format!(
            "azcopy cp --recursive=true {} {}",
            quote("https://acct.blob.core.windows.net/models/bert/*").unwrap(),
            quote(&target.to_string_lossy()).unwrap()
        )]
    );
}

#[test]
fn blob_copy_failure_carries_tool_output() {
    let (_tmp, target) = setup();
    let mut runner = FakeRunner::new();
    runner.copy_exit = 1;
    let downloader = downloader(runner);

    let err = downloader
        .download(SourceType::AzureBlob, "https://acct.blob.core.windows.net/x", &target)
        .unwrap_err();

    assert!(matches!(err, DownloadError::DownloadFailed { .. }));
    assert!(err.to_string().contains("Failed to download model files with URL"));
    assert!(err.to_string().contains("Final Job Status: Completed"));
}

#[test]
fn blob_copy_trusts_zero_exit_status() {
    // AzCopy may exit 0 without copying anything; that is reported as success
    let (_tmp, target) = setup();
    fs::create_dir_all(&target).unwrap();
    let mut runner = FakeRunner::new();
    runner.files.clear();
    let downloader = downloader(runner);

    let metadata = downloader
        .download(SourceType::AzureBlob, "https://acct.blob.core.windows.net/empty", &target)
        .unwrap();

    assert_eq!(metadata.model_size, "0.00 B");
    assert_eq!(metadata.commit_hash, None);
}

#[test]
fn unsupported_source_runs_nothing() {
    let (_tmp, target) = setup();
    let downloader = downloader(FakeRunner::new());

    let err = downloader
        .download(SourceType::Local, "/mnt/models/bert", &target)
        .unwrap_err();

    assert!(matches!(err, DownloadError::UnsupportedSource(_)));
    assert!(downloader.runner().commands().is_empty());
    assert!(!target.exists());

    let err = "hf".parse::<SourceType>().unwrap_err();
    assert!(matches!(err, DownloadError::UnsupportedSource(_)));
}

#[cfg(unix)]
fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(unix)]
#[test]
fn clones_a_real_local_repository() {
    if !git_available() {
        eprintln!("git not found on PATH, skipping");
        return;
    }

    let _lock = cwd_lock();
    let tmp = tempfile::tempdir().unwrap();
    let origin = tmp.path().join("origin");
    fs::create_dir_all(&origin).unwrap();
    fs::write(origin.join("model.bin"), vec![1u8; 2048]).unwrap();

    let git = |args: &[&str]| {
        let status = std::process::Command::new("git")
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(&origin)
            .status()
            .unwrap();
        assert!(status.success());
    };
    git(&["init", "-q"]);
    git(&["add", "."]);
    git(&["commit", "-q", "-m", "init"]);

    let uri = format!("file://{}", origin.display());
    let target = tmp.path().join("clone $HOME `echo x`");
    let metadata = download_model(SourceType::Git, &uri, &target).unwrap();

    let hash = metadata.commit_hash.unwrap();
    assert_eq!(hash.trim_matches('\'').len(), 40);
    assert_eq!(metadata.model_size, "2.00 KB");
    assert!(!target.join(".git").exists());
}

#[cfg(unix)]
#[test]
fn blob_copy_through_the_shell_keeps_target_path_intact() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().unwrap();

    // Stand-in for azcopy: `cp --recursive=true <uri> <dir>`
    let script = tmp.path().join("fake-azcopy");
    fs::write(
        &script,
        "#!/bin/sh\nmkdir -p \"$4\"\nprintf %s \"$3\" > \"$4/uri.txt\"\nhead -c 2048 /dev/zero > \"$4/weights.bin\"\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let tools = ToolsConfig {
        azcopy: script.to_string_lossy().into_owned(),
        ..ToolsConfig::default()
    };
    let downloader = ModelDownloader::from_config(&model_fetch_core::Config {
        tools,
        ..Default::default()
    });

    let target = tmp.path().join("model$USER `echo x` \"q\" back\\slash");
    let uri = "https://acct.blob.core.windows.net/models/bert/*?sv=1&sig=a$b";
    let metadata = downloader
        .download(SourceType::AzureBlob, uri, &target)
        .unwrap();

    assert!(target.join("weights.bin").exists());
    assert_eq!(fs::read_to_string(target.join("uri.txt")).unwrap(), uri);
    // uri.txt plus 2048 bytes of weights
    assert_eq!(metadata.model_size, format_size(2048 + uri.len() as u64));
    assert_eq!(metadata.commit_hash, None);
}
