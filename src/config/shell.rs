//! Shell command entries.
use serde::Deserialize;

/// A shell command to run through `bash -c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawShellCommand")]
pub struct ShellCommand {
    /// Script text.
    pub command: String,
    /// Human-readable label; the command itself is shown when absent.
    pub description: Option<String>,
    /// Text piped to the command's standard input.
    pub stdin: Option<String>,
}

impl ShellCommand {
    /// Label used in narration.
    #[must_use]
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.command)
    }
}

/// Either `["command", "description"]` or `{ command, description, stdin }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawShellCommand {
    List(Vec<String>),
    Structured {
        #[serde(default)]
        command: String,
        description: Option<String>,
        stdin: Option<String>,
    },
}

impl From<RawShellCommand> for ShellCommand {
    fn from(raw: RawShellCommand) -> Self {
        match raw {
            RawShellCommand::List(parts) => {
                let mut parts = parts.into_iter();
                Self {
                    command: parts.next().unwrap_or_default(),
                    description: parts.next(),
                    stdin: None,
                }
            }
            RawShellCommand::Structured {
                command,
                description,
                stdin,
            } => Self {
                command,
                description,
                stdin: stdin.filter(|s| !s.is_empty()),
            },
        }
    }
}
