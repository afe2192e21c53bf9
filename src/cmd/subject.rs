/*!
Subject enum for the `list` and `get` subcommands.

Variants:
  targets (built-in demo targets)
  methods (all methods of a target)
  method  (single method of a target)

Helpers:
  - needs_target()
*/

use std::fmt;

/// What a `list` / `get` command is about.
#[derive(clap::ValueEnum, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Subject {
    /// Built-in targets
    Targets,
    /// All methods of a target (plural)
    Methods,
    /// A single method of a target (singular)
    Method,
}

impl Subject {
    /// Whether the subject is resolved against a `--target`.
    pub fn needs_target(&self) -> bool {
        matches!(self, Subject::Methods | Subject::Method)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subject::Targets => "targets",
            Subject::Methods => "methods",
            Subject::Method => "method",
        };
        f.write_str(s)
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::Subject;

    #[test]
    fn display_matches_cli_spelling() {
        assert_eq!(Subject::Targets.to_string(), "targets");
        assert_eq!(Subject::Methods.to_string(), "methods");
        assert_eq!(Subject::Method.to_string(), "method");
    }

    #[test]
    fn target_requirement() {
        assert!(!Subject::Targets.needs_target());
        assert!(Subject::Methods.needs_target());
        assert!(Subject::Method.needs_target());
    }
}
