use std::env;
use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "JENKINS_URL",
    "TRAVIS",
    "CIRCLECI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
];

/// How progress should be drawn on the terminal dc-update runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalContext {
    /// A human is watching: animate spinners
    Interactive,
    /// Logs, pipes or CI: one plain line per event
    Plain,
}

impl TerminalContext {
    /// Detects the current terminal context
    ///
    /// Detection strategy:
    /// 1. `--non-interactive` always wins
    /// 2. Any CI environment variable forces plain output
    /// 3. Otherwise spinners are used only if both stdout and stderr are terminals
    pub fn detect(non_interactive: bool) -> Self {
        let ci = CI_ENV_VARS
            .iter()
            .any(|var| env::var_os(var).is_some_and(|v| !v.is_empty()));
        let tty = std::io::stdout().is_terminal() && std::io::stderr().is_terminal();

        Self::from_signals(non_interactive, ci, tty)
    }

    fn from_signals(non_interactive: bool, ci: bool, tty: bool) -> Self {
        if non_interactive || ci || !tty {
            Self::Plain
        } else {
            Self::Interactive
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

impl std::fmt::Display for TerminalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interactive => write!(f, "Interactive"),
            Self::Plain => write!(f, "Plain"),
        }
    }
}
