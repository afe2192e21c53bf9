/*!
`get.rs`

Implements the `get` subcommand for the `invoke` CLI.

Supported subjects (via `Subject` enum):
  - methods (plural): signatures of every method of the target
  - method  (singular): signature of exactly one method (NAME required)
  - targets: same output as `list targets`

JSON Output Shapes:

1) get methods
{
  "status":"ok",
  "subject":"methods",
  "target":"counter",
  "type":"Counter",
  "count": 5,
  "methods":[
    {"name":"Add","num_in":1,"num_out":1,
     "params":[{"index":0,"type":"i64"}],"results":[{"index":0,"type":"i64"}]}
  ]
}

2) get method <NAME>
{
  "status":"ok",
  "subject":"method",
  "target":"counter",
  "type":"Counter",
  "method": { ...same shape as one entry above... }
}

Method names are matched exactly, as the dispatcher does; a case-only
mismatch is reported with a suggestion.
*/

use anyhow::{Result, bail};
use clap::Args;

use crate::catalog::TargetSpec;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::list::list_targets;
use crate::cmd::shared::{
    find_method, method_json, method_rows, require_target, short_type_name,
};
use crate::cmd::subject::Subject;
use invoke::{Method, MethodSet};

/// CLI arguments for `invoke get <subject> [NAME]`
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Subject to describe (methods|method|targets)
    pub subject: Subject,

    /// Method name (required for subject `method`)
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Target object (falls back to INVOKE_TARGET env var if omitted)
    #[arg(short = 't', long)]
    pub target: Option<String>,
}

/// Entry point for the get subcommand.
pub fn execute_get(args: GetArgs) -> Result<()> {
    if !args.subject.needs_target() {
        return list_targets(args.json);
    }

    let spec = require_target(args.target.as_deref())?;
    let Some(set) = spec.method_set() else {
        bail!("target '{spec}' is not a record; it exposes no methods");
    };

    match args.subject {
        Subject::Method => {
            let Some(name) = args.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
                bail!("method name required: invoke get method <NAME>");
            };
            let method = find_method(set, name)?;
            get_single_method(spec, set, method, args.json);
        }
        _ => get_all_methods(spec, set, args.json),
    }
    Ok(())
}

fn get_all_methods(spec: TargetSpec, set: &MethodSet, json: bool) {
    if json {
        let methods: Vec<serde_json::Value> = set.iter().map(method_json).collect();
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": "methods",
                "target": spec.name(),
                "type": set.type_name(),
                "count": methods.len(),
                "methods": methods,
            })
        );
        return;
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Methods ({})", emoji("list", &style), set.len()),
            Some(format!("target={spec} • type={}", set.type_name())),
            &style,
        )
    );
    if set.is_empty() {
        println!(
            "{}",
            color(Role::Dim, format!("{} (none)", emoji("info", &style)), &style)
        );
        return;
    }
    println!(
        "{}",
        table(
            &["#", "NAME", "PARAMS", "RESULTS"],
            &method_rows(set),
            &style
        )
    );
}

fn get_single_method(spec: TargetSpec, set: &MethodSet, method: &Method, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": "method",
                "target": spec.name(),
                "type": set.type_name(),
                "method": method_json(method),
            })
        );
        return;
    }

    let style = StyleOptions::detect();
    let sig = method.signature();
    println!(
        "{}",
        box_header(
            format!("{} {}.{}", emoji("method", &style), set.type_name(), method.name()),
            Some(format!("target={spec} • in={} out={}", sig.num_in(), sig.num_out())),
            &style,
        )
    );

    let slot_rows = |slots: &[invoke::TypeDesc]| -> Vec<Vec<String>> {
        slots
            .iter()
            .enumerate()
            .map(|(i, t)| vec![i.to_string(), short_type_name(t.name), t.name.to_string()])
            .collect()
    };

    for (label, slots) in [("Parameters:", &sig.params), ("Results:", &sig.results)] {
        println!("{}", color(Role::Accent, label, &style));
        if slots.is_empty() {
            println!(
                "{}",
                color(Role::Dim, format!("{} (none)", emoji("info", &style)), &style)
            );
        } else {
            println!(
                "{}",
                table(&["#", "TYPE", "FULL TYPE"], &slot_rows(slots.as_slice()), &style)
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Get(GetArgs),
    }

    fn args(subject: Subject, name: Option<&str>, target: Option<&str>) -> GetArgs {
        GetArgs {
            subject,
            name: name.map(str::to_string),
            json: true,
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn clap_parses_get_method_with_name() {
        let cli = TestCli::try_parse_from(["t", "get", "method", "ExampleFunc", "-t", "example"])
            .unwrap();
        match cli.cmd {
            TestSub::Get(a) => {
                assert!(matches!(a.subject, Subject::Method));
                assert_eq!(a.name.as_deref(), Some("ExampleFunc"));
                assert_eq!(a.target.as_deref(), Some("example"));
            }
        }
    }

    #[test]
    fn single_method_requires_name() {
        let err = execute_get(args(Subject::Method, None, Some("counter"))).unwrap_err();
        assert!(err.to_string().contains("method name required"));
    }

    #[test]
    fn unknown_method_is_an_error() {
        assert!(execute_get(args(Subject::Method, Some("Nope"), Some("counter"))).is_err());
        assert!(execute_get(args(Subject::Method, Some("Add"), Some("counter"))).is_ok());
    }

    #[test]
    fn non_record_target_rejected() {
        let err = execute_get(args(Subject::Methods, None, Some("int"))).unwrap_err();
        assert!(err.to_string().contains("not a record"));
    }

    #[test]
    fn all_methods_of_example() {
        assert!(execute_get(args(Subject::Methods, None, Some("example"))).is_ok());
    }
}
