use crate::constants::launcher;
use crate::services::validation::ValidatedCommand;
use crate::utils::shell::join_args;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFamily {
    Windows,
    Unix,
}

impl HostFamily {
    pub fn current() -> Self {
        if cfg!(windows) {
            HostFamily::Windows
        } else {
            HostFamily::Unix
        }
    }

    pub fn library_path(self) -> &'static str {
        match self {
            HostFamily::Windows => launcher::WINDOWS_LIBRARY_PATH,
            HostFamily::Unix => launcher::UNIX_LIBRARY_PATH,
        }
    }

    pub fn classpath(self) -> &'static str {
        match self {
            HostFamily::Windows => launcher::WINDOWS_CLASSPATH,
            HostFamily::Unix => launcher::UNIX_CLASSPATH,
        }
    }
}

/// How the external program is launched; everything before the action token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub program: String,
    pub native_access_flags: Vec<String>,
    pub library_path: String,
    pub classpath: String,
    pub entry_point: String,
}

impl LauncherConfig {
    pub fn for_host(host: HostFamily) -> Self {
        Self {
            program: launcher::PROGRAM.to_string(),
            native_access_flags: launcher::NATIVE_ACCESS_FLAGS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            library_path: host.library_path().to_string(),
            classpath: host.classpath().to_string(),
            entry_point: launcher::ENTRY_POINT.to_string(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::for_host(HostFamily::current())
    }
}

/// A fully built process invocation. Arguments are handed to the OS as a
/// vector; no shell ever parses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
}

impl Invocation {
    /// Shell-quoted rendering for diagnostics and logs.
    pub fn display(&self) -> String {
        join_args(
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str)),
        )
    }
}

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    launcher: LauncherConfig,
    work_dir: PathBuf,
}

impl CommandBuilder {
    pub fn new(launcher: LauncherConfig, work_dir: impl AsRef<Path>) -> Self {
        Self {
            launcher,
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    pub fn build(&self, command: &ValidatedCommand) -> Invocation {
        let launcher = &self.launcher;
        let mut args =
            Vec::with_capacity(launcher.native_access_flags.len() + 5 + command.values().len());
        args.extend(launcher.native_access_flags.iter().cloned());
        args.push(format!("{}{}", launcher::LIBRARY_PATH_PROPERTY, launcher.library_path));
        args.push(launcher::CLASSPATH_FLAG.to_string());
        args.push(launcher.classpath.clone());
        args.push(launcher.entry_point.clone());
        args.push(command.action().to_string());
        args.extend(command.values().iter().cloned());
        Invocation {
            program: launcher.program.clone(),
            args,
            work_dir: self.work_dir.clone(),
        }
    }
}
