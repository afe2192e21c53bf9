/*!
`list.rs`

Implements the `list` subcommand for the `invoke` CLI.

Supported subjects (via `Subject` enum):
  - targets : the built-in demo targets (no `--target` needed)
  - methods : method names of the selected target
  - method  : alias to `methods`

JSON Output Shape (methods):
{
  "status": "ok",
  "subject": "methods",
  "target": "counter",
  "type": "Counter",
  "count": 5,
  "methods": ["Add", "Divide", "Get", "Rename", "Reset"]
}

Targets that are not records (int, nil) list zero methods with a note.
*/

use anyhow::Result;
use clap::Args;

use crate::catalog::TargetSpec;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::require_target;
use crate::cmd::subject::Subject;

/// CLI arguments for `invoke list <subject>`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Subject to list (targets|methods)
    pub subject: Subject,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Target object (falls back to INVOKE_TARGET env var if omitted)
    #[arg(short = 't', long)]
    pub target: Option<String>,
}

/// Entry point for the list subcommand.
pub fn execute_list(args: ListArgs) -> Result<()> {
    if args.subject.needs_target() {
        list_methods(&args)
    } else {
        list_targets(args.json)
    }
}

/// Print the demo targets; shared with `get targets`.
pub(crate) fn list_targets(json: bool) -> Result<()> {
    let all = TargetSpec::all();

    if json {
        let items: Vec<serde_json::Value> = all
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "record": t.method_set().is_some(),
                    "methods": t.method_set().map_or(0, |s| s.len()),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": "targets",
                "count": items.len(),
                "targets": items,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Targets ({})", emoji("list", &style), all.len()),
            None::<&str>,
            &style
        )
    );
    let rows: Vec<Vec<String>> = all
        .iter()
        .map(|t| {
            vec![
                t.name().to_string(),
                t.method_set()
                    .map_or_else(|| "-".to_string(), |s| s.type_name().to_string()),
                t.method_set().map_or(0, |s| s.len()).to_string(),
                t.description().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["NAME", "TYPE", "METHODS", "DESCRIPTION"], &rows, &style)
    );
    Ok(())
}

fn list_methods(args: &ListArgs) -> Result<()> {
    let spec = require_target(args.target.as_deref())?;

    let Some(set) = spec.method_set() else {
        if args.json {
            println!(
                "{}",
                serde_json::json!({
                    "status": "ok",
                    "subject": "methods",
                    "target": spec.name(),
                    "count": 0,
                    "methods": [],
                    "note": "target is not a record; it exposes no methods",
                })
            );
        } else {
            println!("Methods (0) - target: {spec} (not a record)");
        }
        return Ok(());
    };

    let names: Vec<&str> = set.names().collect();

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": "methods",
                "target": spec.name(),
                "type": set.type_name(),
                "count": names.len(),
                "methods": names,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Methods ({})", emoji("list", &style), names.len()),
            Some(format!("target={spec} • type={}", set.type_name())),
            &style,
        )
    );
    for name in &names {
        println!("  {} {}", emoji("method", &style), color(Role::Primary, name, &style));
    }
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            "Use `invoke get method <name>` for its parameter and result types",
            &style
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    // Ad-hoc parser just for testing ListArgs in isolation.
    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        List(ListArgs),
    }

    #[test]
    fn clap_parses_list_targets() {
        let cli = TestCli::try_parse_from(["t", "list", "targets"]).unwrap();
        match cli.cmd {
            TestSub::List(a) => {
                assert!(matches!(a.subject, Subject::Targets));
                assert!(a.target.is_none());
            }
        }
    }

    #[test]
    fn clap_parses_list_methods_with_target() {
        let cli = TestCli::try_parse_from(["t", "list", "methods", "-t", "counter", "--json"])
            .unwrap();
        match cli.cmd {
            TestSub::List(a) => {
                assert!(matches!(a.subject, Subject::Methods));
                assert_eq!(a.target.as_deref(), Some("counter"));
                assert!(a.json);
            }
        }
    }

    #[test]
    fn clap_rejects_unknown_subject() {
        assert!(TestCli::try_parse_from(["t", "list", "tools"]).is_err());
    }

    #[test]
    fn list_methods_requires_target() {
        let args = ListArgs {
            subject: Subject::Methods,
            json: true,
            target: None,
        };
        assert!(execute_list(args).is_err());
    }

    #[test]
    fn list_methods_of_non_record_is_empty() {
        let args = ListArgs {
            subject: Subject::Methods,
            json: true,
            target: Some("int".into()),
        };
        assert!(execute_list(args).is_ok());
    }
}
