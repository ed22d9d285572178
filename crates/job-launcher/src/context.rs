//! Execution context for a diagnosis job.
//!
//! The job enters the host's namespaces through PID 1, drops to the service
//! account and runs the configured script inside a login shell. Everything
//! is assembled as discrete argv elements; the only shell-interpreted
//! fragment is produced by [`inner_command`].

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::identifier::SafeIdentifier;

/// Fixed privilege policy for launched jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// Namespace-entry tool.
    pub entry_program: PathBuf,
    pub target_pid: u32,
    pub uid: u32,
    pub gid: u32,
    pub user: String,
    pub home: PathBuf,
    pub shell: String,
    pub working_dir: PathBuf,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            entry_program: PathBuf::from("nsenter"),
            target_pid: 1,
            uid: 100001,
            gid: 1003,
            user: "pbls_dev".to_string(),
            home: PathBuf::from("/home/pbls_dev"),
            shell: "bash".to_string(),
            working_dir: PathBuf::from(
                "/pbls_data/projects/dataclinic-diagnosis-engine/diagnosis",
            ),
        }
    }
}

/// Fully resolved description of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Overrides applied on top of the inherited environment.
    pub env: BTreeMap<String, OsString>,
    pub target_pid: u32,
    pub uid: u32,
    pub gid: u32,
    /// Host-side directory the job runs in. Applied inside the host mount
    /// namespace by the command string, never on the service side.
    pub working_dir: PathBuf,
    pub script_path: PathBuf,
    pub identifier: SafeIdentifier,
}

impl ExecutionContext {
    /// Human-readable rendering for operational logs.
    pub fn command_line(&self) -> String {
        let mut s = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            s.push(' ');
            let arg = arg.to_string_lossy();
            if arg.contains(' ') || arg.contains('"') || arg.contains('\'') {
                s.push_str(&shell_quote(&arg));
            } else {
                s.push_str(&arg);
            }
        }
        s
    }
}

pub fn build(
    identifier: SafeIdentifier,
    script_path: &Path,
    policy: &ExecutionPolicy,
) -> ExecutionContext {
    let mut args: Vec<OsString> = vec![
        "-t".into(),
        policy.target_pid.to_string().into(),
        // mount, UTS, IPC, network, PID
        "-m".into(),
        "-u".into(),
        "-i".into(),
        "-n".into(),
        "-p".into(),
        "--setuid".into(),
        policy.uid.to_string().into(),
        "--setgid".into(),
        policy.gid.to_string().into(),
    ];
    args.push(policy.shell.clone().into());
    args.push("-l".into());
    args.push("-c".into());
    args.push(inner_command(&policy.working_dir, script_path, &identifier).into());

    let mut env = BTreeMap::new();
    env.insert("HOME".to_string(), policy.home.clone().into_os_string());
    env.insert("USER".to_string(), OsString::from(&policy.user));

    ExecutionContext {
        program: policy.entry_program.clone(),
        args,
        env,
        target_pid: policy.target_pid,
        uid: policy.uid,
        gid: policy.gid,
        working_dir: policy.working_dir.clone(),
        script_path: script_path.to_path_buf(),
        identifier,
    }
}

/// The `bash -c` payload: `cd <workdir> && bash <script> <dataset>`.
///
/// Workdir and script come from trusted configuration and are single-quoted.
/// The identifier is placed verbatim; its grammar contains no character the
/// shell treats specially, so it always forms exactly one word.
pub fn inner_command(working_dir: &Path, script_path: &Path, identifier: &SafeIdentifier) -> String {
    debug_assert!(identifier
        .as_str()
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
    format!(
        "cd {} && bash {} {}",
        shell_quote(&working_dir.to_string_lossy()),
        shell_quote(&script_path.to_string_lossy()),
        identifier.as_str()
    )
}

/// Quotes `arg` for POSIX shells, leaving plain words untouched.
fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if arg
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/' | b':' | b'='))
    {
        return arg.to_string();
    }
    let escaped = arg.replace('\'', "'\\''");
    format!("'{}'", escaped)
}
