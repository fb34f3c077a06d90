//! Input resolution: raw action inputs + [`ExecutionContext`] → one validated [`Command`].
//!
//! Validation runs in a fixed order. Static input errors (mode, conclusion, missing
//! body source, mode-specific required inputs, empty body) are reported before
//! anything that depends on the execution context (repository, issue number, SHA).

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::context::ExecutionContext;
use crate::contract::{Conclusion, RepoRef};
use crate::error::InputError;

/// Which kind of feedback a run posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Comment,
    Check,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Comment => "comment",
            Mode::Check => "check",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(Mode::Comment),
            "check" => Ok(Mode::Check),
            other => Err(InputError::UnsupportedMode(other.to_owned())),
        }
    }
}

/// Inputs exactly as supplied by the caller. Values are trimmed and blank ones count
/// as absent.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub token: Option<String>,
    pub file: Option<PathBuf>,
    pub message: Option<String>,
    pub mode: Option<String>,
    pub prefix: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub conclusion: Option<String>,
    pub annotations: Option<PathBuf>,
}

/// Check-run fields, all validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub conclusion: Conclusion,
    pub annotations: Option<PathBuf>,
    pub sha: String,
}

/// Mode-specific part of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Comment { prefix: String, issue_number: u64 },
    Check(CheckTarget),
}

/// The immutable, fully validated description of one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    pub token: String,
    pub repository: RepoRef,
    /// Final body. In comment mode it already starts with the marker prefix.
    pub body: String,
    pub target: Target,
}

impl Command {
    pub fn mode(&self) -> Mode {
        match self.target {
            Target::Comment { .. } => Mode::Comment,
            Target::Check(_) => Mode::Check,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("body", &self.body)
            .field("target", &self.target)
            .finish()
    }
}

/// Prepends `prefix` and a newline to `body`, unless `body` already starts with it.
pub fn add_prefix(body: &str, prefix: &str) -> String {
    if prefix.is_empty() || body.starts_with(prefix) {
        body.to_owned()
    } else {
        format!("{prefix}\n{body}")
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn present_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value
        .map(|p| match p.to_str() {
            Some(s) => PathBuf::from(s.trim()),
            None => p,
        })
        .filter(|p| !p.as_os_str().is_empty())
}

/// Inputs that passed every check not depending on the execution context.
///
/// Produced by [`validate`]; [`Validated::bind`] finishes resolution against a context.
#[derive(Clone, PartialEq, Eq)]
pub struct Validated {
    token: String,
    mode: Mode,
    body: String,
    prefix: Option<String>,
    check: Option<(String, String, String, Conclusion)>,
    annotations: Option<PathBuf>,
}

impl Validated {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Resolves repository, SHA and issue number from `context` into a [`Command`].
    pub fn bind(self, context: &ExecutionContext) -> Result<Command, InputError> {
        let repository = context.repository.clone();
        let issue_number = context.issue_number;
        let sha = context
            .pull_request_head_sha
            .clone()
            .or_else(|| context.sha.clone());

        if self.mode == Mode::Check && context.pull_request_head_sha.is_none() {
            warn!("[INPUTS] No commit sha found in pull_request context. Falling back to head sha.");
        }

        debug!(
            repository = ?repository,
            sha = ?sha,
            issue_number = ?issue_number,
            "[INPUTS] Context info"
        );

        let repository = repository.ok_or(InputError::MissingRepository)?;

        let target = match self.check {
            Some((name, title, summary, conclusion)) => {
                let sha = sha.ok_or(InputError::MissingSha)?;
                Target::Check(CheckTarget {
                    name,
                    title,
                    summary,
                    conclusion,
                    annotations: self.annotations,
                    sha,
                })
            }
            None => {
                let issue_number = issue_number.ok_or(InputError::MissingIssueNumber)?;
                Target::Comment {
                    prefix: self.prefix.unwrap_or_default(),
                    issue_number,
                }
            }
        };

        Ok(Command {
            token: self.token,
            repository,
            body: self.body,
            target,
        })
    }
}

impl fmt::Debug for Validated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validated")
            .field("token", &"<redacted>")
            .field("mode", &self.mode)
            .field("body", &self.body)
            .field("prefix", &self.prefix)
            .field("check", &self.check)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Runs every check on `raw` that does not need the execution context, and builds
/// the body. Inputs are trimmed; blank inputs count as absent. File contents are
/// taken verbatim.
pub fn validate(raw: RawInputs) -> Result<Validated, InputError> {
    let token = present(raw.token).unwrap_or_default();
    let file = present_path(raw.file);
    let message = present(raw.message);
    let mode = present(raw.mode).unwrap_or_default();
    let prefix = present(raw.prefix);
    let name = present(raw.name);
    let title = present(raw.title);
    let summary = present(raw.summary);
    let conclusion = present(raw.conclusion);
    let annotations = present_path(raw.annotations);

    debug!(
        token = !token.is_empty(),
        file = ?file,
        message = ?message,
        mode = %mode,
        prefix = ?prefix,
        name = ?name,
        title = ?title,
        summary = ?summary,
        conclusion = ?conclusion,
        annotations = ?annotations,
        "[INPUTS] Resolved inputs"
    );

    let mode: Mode = mode.parse()?;
    let conclusion = conclusion
        .map(|c| {
            c.parse::<Conclusion>()
                .map_err(|_| InputError::InvalidConclusion(c.clone()))
        })
        .transpose()?;

    if message.is_none() && file.is_none() {
        return Err(InputError::MissingBodySource);
    }

    if mode == Mode::Comment && prefix.is_none() {
        return Err(InputError::MissingPrefix(mode.to_string()));
    }
    let check = match mode {
        Mode::Check => match (name, title, summary, conclusion) {
            (Some(name), Some(title), Some(summary), Some(conclusion)) => {
                Some((name, title, summary, conclusion))
            }
            _ => return Err(InputError::MissingCheckInputs(mode.to_string())),
        },
        Mode::Comment => None,
    };

    let mut body = match (message, file) {
        (Some(message), _) => message,
        (None, Some(path)) => match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(source) => return Err(InputError::ReadBody { path, source }),
        },
        (None, None) => String::new(),
    };
    if body.is_empty() {
        return Err(InputError::EmptyBody);
    }
    if let (Mode::Comment, Some(prefix)) = (mode, prefix.as_deref()) {
        body = add_prefix(&body, prefix);
    }

    Ok(Validated {
        token,
        mode,
        body,
        prefix,
        check,
        annotations,
    })
}

/// Validates `raw` against `context` and produces the run's [`Command`].
pub fn resolve(raw: RawInputs, context: &ExecutionContext) -> Result<Command, InputError> {
    validate(raw)?.bind(context)
}
