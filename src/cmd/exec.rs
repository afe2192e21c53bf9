/*!
`exec.rs`

Implements the `exec` subcommand for the `invoke` CLI: one raw-payload
invocation of a named method on a fresh demo target.

Parameter injection (concatenated in this order):
  --param-file params.(json|yaml)   array, or object with a `params` array
  --params '[100, "x"]'             JSON array
  --param RAW                       repeatable; non-JSON text becomes a string

JSON Success Output:
{
  "status": "ok",
  "target": "counter",
  "method": "Add",
  "elapsed_ms": 0,
  "results": [ 5 ]
}

JSON Error Output (dispatcher rejections and recovered faults included):
{
  "status":"error",
  "error":"invoke: mismatch in number of params 0 and func inputs 1"
}

Error results exit non-zero.
*/

use anyhow::Result;
use clap::Args;
use serde_json::value::RawValue;
use tracing::debug;

use crate::catalog::TargetSpec;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::{collect_payloads, require_target, result_rows};
use crate::utils::Stopwatch;
use invoke::{Results, invoke_raw};

/* -------------------------------------------------------------------------- */
/* Argument Struct                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Method name to invoke (exact, case-sensitive)
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// Positional payload (raw JSON; bare text is sent as a string), repeatable
    #[arg(long = "param", value_name = "RAW")]
    pub params: Vec<String>,

    /// Positional payloads as one JSON array
    #[arg(long = "params", value_name = "JSON_ARRAY")]
    pub params_json: Option<String>,

    /// Load payloads from file (JSON or YAML), placed before all other payloads
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Target object (falls back to INVOKE_TARGET env var if omitted)
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

/* -------------------------------------------------------------------------- */
/* Public Entry Point                                                         */
/* -------------------------------------------------------------------------- */

pub fn execute_exec(args: ExecArgs) -> Result<()> {
    let method = args.method.trim().to_string();
    if method.is_empty() {
        return output_error(args.json, "method name cannot be empty");
    }

    let spec = match require_target(args.target.as_deref()) {
        Ok(spec) => spec,
        Err(e) => return output_error(args.json, &format!("{e:#}")),
    };

    let payloads = match collect_payloads(
        args.param_file.as_deref(),
        args.params_json.as_deref(),
        &args.params,
    ) {
        Ok(p) => p,
        Err(e) => return output_error(args.json, &format!("{e:#}")),
    };

    let watch = Stopwatch::start();
    let results = invoke_on(spec, &method, &payloads);
    let elapsed_ms = watch.elapsed_ms();

    if let Some(err) = results.error() {
        return output_error(args.json, &err.to_string());
    }

    if args.json {
        let out = serde_json::json!({
            "status": "ok",
            "target": spec.name(),
            "method": method,
            "elapsed_ms": elapsed_ms,
            "results": results.to_json(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Exec Success ({method})", emoji("success", &style)),
            Some(format!("target={spec} • {elapsed_ms} ms")),
            &style,
        )
    );

    if payloads.is_empty() {
        println!(
            "{}",
            color(
                Role::Dim,
                format!("{} No arguments supplied", emoji("info", &style)),
                &style
            )
        );
    } else {
        let rows: Vec<Vec<String>> = payloads
            .iter()
            .enumerate()
            .map(|(i, p)| vec![i.to_string(), p.get().to_string()])
            .collect();
        println!("{}", color(Role::Accent, "Arguments:", &style));
        println!("{}", table(&["#", "PAYLOAD"], &rows, &style));
    }
    println!();

    if results.is_empty() {
        println!(
            "{}",
            color(
                Role::Dim,
                format!("{} Method returned no values", emoji("info", &style)),
                &style
            )
        );
    } else {
        println!("{}", color(Role::Success, "Results:", &style));
        println!(
            "{}",
            table(&["#", "TYPE", "VALUE"], &result_rows(&results), &style)
        );
    }
    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Core Invocation                                                            */
/* -------------------------------------------------------------------------- */

/// Invoke `method` on a freshly created instance of `spec`.
fn invoke_on(spec: TargetSpec, method: &str, payloads: &[Box<RawValue>]) -> Results {
    debug!(target_spec = %spec, method, payloads = payloads.len(), "exec");
    let mut instance = spec.instantiate();
    invoke_raw(instance.target(), method, payloads)
}

/* -------------------------------------------------------------------------- */
/* Output Helpers                                                             */
/* -------------------------------------------------------------------------- */

fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        let err = serde_json::json!({"status":"error","error":msg});
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let mut lines = msg.lines();
        let first = lines.next().unwrap_or_default();
        let title = format!("{} Exec Error", emoji("error", &style));
        println!(
            "{}",
            box_header(title, Some(color(Role::Error, first, &style)), &style)
        );
        // Recovered faults carry a backtrace after the first line.
        let rest: Vec<&str> = lines.collect();
        if !rest.is_empty() {
            println!("{}", color(Role::Dim, rest.join("\n"), &style));
        }
        println!(
            "{} {}",
            emoji("info", &style),
            color(
                Role::Dim,
                "Re-run with --json for machine-readable output.",
                &style
            )
        );
    }
    anyhow::bail!(msg.lines().next().unwrap_or_default().to_string())
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use invoke::InvokeError;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Exec(ExecArgs),
    }

    fn raw(items: &[&str]) -> Vec<Box<RawValue>> {
        items
            .iter()
            .map(|s| RawValue::from_string(s.to_string()).unwrap())
            .collect()
    }

    fn exec_args(method: &str, target: &str, params: &[&str]) -> ExecArgs {
        ExecArgs {
            method: method.into(),
            params: params.iter().map(|s| s.to_string()).collect(),
            params_json: None,
            param_file: None,
            target: Some(target.into()),
            json: true,
        }
    }

    #[test]
    fn clap_parses_repeated_params() {
        let cli = TestCli::try_parse_from([
            "t", "exec", "Add", "-t", "counter", "--param", "5", "--params", "[1]", "--json",
        ])
        .unwrap();
        match cli.cmd {
            TestSub::Exec(a) => {
                assert_eq!(a.method, "Add");
                assert_eq!(a.params, vec!["5".to_string()]);
                assert_eq!(a.params_json.as_deref(), Some("[1]"));
                assert!(a.json);
            }
        }
    }

    #[test]
    fn clap_requires_method() {
        assert!(TestCli::try_parse_from(["t", "exec"]).is_err());
    }

    #[test]
    fn invoke_on_example_round_trip() {
        let results = invoke_on(
            TargetSpec::Example,
            "ExampleFunc",
            &raw(&["100", "\"hi\"", "[1,2]", "10"]),
        );
        assert!(!results.is_error());
        assert_eq!(results.to_json(), serde_json::json!([100, 10, null]));
    }

    #[test]
    fn invoke_on_non_record_reports_shape() {
        let results = invoke_on(TargetSpec::Int, "Add", &raw(&["1"]));
        assert!(matches!(
            results.error(),
            Some(InvokeError::InvalidTargetShape { .. })
        ));
        let results = invoke_on(TargetSpec::Nil, "Add", &raw(&["1"]));
        assert!(matches!(results.error(), Some(InvokeError::NilTarget)));
    }

    #[test]
    fn exec_success_and_error_exit() {
        assert!(execute_exec(exec_args("Add", "counter", &["5"])).is_ok());
        assert!(execute_exec(exec_args("Add", "counter", &[])).is_err());
        assert!(execute_exec(exec_args("Divide", "counter", &["0"])).is_err());
        assert!(execute_exec(exec_args("Missing", "counter", &[])).is_err());
    }

    #[test]
    fn exec_rejects_blank_method_and_bad_target() {
        assert!(execute_exec(exec_args("  ", "counter", &[])).is_err());
        assert!(execute_exec(exec_args("Add", "server", &["1"])).is_err());
    }
}
