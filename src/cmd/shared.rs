/*!
shared.rs - shared helpers for subcommands.

Focus:
  - require_target: resolve `--target` into a demo `TargetSpec`
  - collect_payloads: gather raw JSON payloads from a param file, `--params`
    and repeated `--param`
  - method_json / method_rows / result_rows: render method metadata and call
    results for JSON and table output
  - short_type_name: strip module paths from Rust type names
*/

use anyhow::{Context, Result, bail};
use serde_json::value::{RawValue, to_raw_value};

use crate::catalog::{self, TargetSpec};
use invoke::{Method, MethodSet, Results, TypeDesc};

/* ---- Target Resolution ---- */

/// Resolve the effective target or fail with a hint about `--target`.
pub fn require_target(target: Option<&str>) -> Result<TargetSpec> {
    match target {
        Some(t) if !t.trim().is_empty() => catalog::parse_target(t)
            .with_context(|| format!("Failed to parse target: '{}'", t.trim())),
        _ => bail!("no target specified (use --target or INVOKE_TARGET)"),
    }
}

/* ---- Payload Collection ---- */

/// Build the positional payload list: param file entries first, then the
/// `--params` array, then each `--param`.
pub fn collect_payloads(
    param_file: Option<&str>,
    params_json: Option<&str>,
    params: &[String],
) -> Result<Vec<Box<RawValue>>> {
    let mut out = Vec::new();

    if let Some(path) = param_file {
        for value in load_param_file(path)? {
            out.push(to_raw_value(&value).context("failed to encode param file entry")?);
        }
    }

    if let Some(raw) = params_json {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("failed to parse --params (expected JSON array)")?;
        for item in payload_array(value, "--params")? {
            out.push(to_raw_value(&item).context("failed to encode --params entry")?);
        }
    }

    for p in params {
        out.push(param_payload(p)?);
    }
    Ok(out)
}

/// One `--param` value: valid JSON is passed through untouched, anything else
/// becomes a JSON string.
pub fn param_payload(raw: &str) -> Result<Box<RawValue>> {
    let trimmed = raw.trim();
    if serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok() {
        return RawValue::from_string(trimmed.to_string())
            .with_context(|| format!("invalid --param: {raw}"));
    }
    to_raw_value(trimmed).with_context(|| format!("invalid --param: {raw}"))
}

/// Read a JSON or YAML param file: a top-level array, or an object holding a
/// `params` array.
pub fn load_param_file(path: &str) -> Result<Vec<serde_json::Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: serde_json::Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    payload_array(value, "param file")
}

fn payload_array(value: serde_json::Value, origin: &str) -> Result<Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut map) => match map.remove("params") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            Some(_) => bail!("{origin}: 'params' must be an array"),
            None => bail!("{origin}: object root must contain a 'params' array"),
        },
        _ => bail!("{origin}: root must be an array or an object with 'params'"),
    }
}

/* ---- Rendering Helpers ---- */

/// `alloc::vec::Vec<alloc::string::String>` -> `Vec<String>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let flush = |segment: &mut String, out: &mut String| {
        let last = segment.rsplit("::").next().unwrap_or_default();
        out.push_str(last);
        segment.clear();
    };
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            flush(&mut segment, &mut out);
            out.push(c);
        }
    }
    flush(&mut segment, &mut out);
    out
}

fn type_list(slots: &[TypeDesc]) -> String {
    if slots.is_empty() {
        return "-".to_string();
    }
    slots
        .iter()
        .map(|t| short_type_name(t.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON description of one method: name, parameter and result types.
pub fn method_json(method: &Method) -> serde_json::Value {
    let sig = method.signature();
    let slots = |types: &[TypeDesc]| {
        types
            .iter()
            .enumerate()
            .map(|(i, t)| serde_json::json!({ "index": i, "type": short_type_name(t.name) }))
            .collect::<Vec<_>>()
    };
    serde_json::json!({
        "name": method.name(),
        "num_in": sig.num_in(),
        "num_out": sig.num_out(),
        "params": slots(&sig.params),
        "results": slots(&sig.results),
    })
}

/// Table rows `#, NAME, PARAMS, RESULTS` for every method, sorted by name.
pub fn method_rows(set: &MethodSet) -> Vec<Vec<String>> {
    set.iter()
        .enumerate()
        .map(|(idx, m)| {
            vec![
                (idx + 1).to_string(),
                m.name().to_string(),
                type_list(&m.signature().params),
                type_list(&m.signature().results),
            ]
        })
        .collect()
}

/// Exact-name lookup with a case-insensitive fallback suggestion.
pub fn find_method<'s>(set: &'s MethodSet, name: &str) -> Result<&'s Method> {
    if let Some(m) = set.get(name) {
        return Ok(m);
    }
    let wanted = name.to_ascii_lowercase();
    match set.names().find(|n| n.to_ascii_lowercase() == wanted) {
        Some(hint) => bail!(
            "method '{name}' not found on {} (did you mean '{hint}'?)",
            set.type_name()
        ),
        None => bail!("method '{name}' not found on {}", set.type_name()),
    }
}

/// Table rows `#, TYPE, VALUE` for successful call results.
pub fn result_rows(results: &Results) -> Vec<Vec<String>> {
    results
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            let rendered = match v.to_json() {
                Some(serde_json::Value::String(s)) => format!("{s:?}"),
                Some(json) => json.to_string(),
                None => format!("<{}>", short_type_name(v.type_name())),
            };
            vec![
                idx.to_string(),
                short_type_name(v.type_name()),
                rendered,
            ]
        })
        .collect()
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;
    use invoke::Object;
    use invoke::sample::Counter;

    fn temp_file(name: &str, body: &str) -> String {
        let path = std::env::temp_dir().join(format!("invoke_{}_{name}", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn payload_order_file_then_array_then_params() {
        let path = temp_file("order.json", r#"[1, "a"]"#);
        let out = collect_payloads(Some(&path), Some("[2]"), &["3".into(), "x y".into()]).unwrap();
        let got: Vec<&str> = out.iter().map(|r| r.get()).collect();
        assert_eq!(got, vec!["1", "\"a\"", "2", "3", "\"x y\""]);
    }

    #[test]
    fn param_file_accepts_params_object_and_yaml() {
        let json = temp_file("wrapped.json", r#"{"params": [100, null]}"#);
        assert_eq!(load_param_file(&json).unwrap().len(), 2);

        let yaml = temp_file("list.yaml", "- 100\n- hello\n- [1, 2]\n");
        let values = load_param_file(&yaml).unwrap();
        assert_eq!(values[1], serde_json::json!("hello"));
        assert_eq!(values[2], serde_json::json!([1, 2]));
    }

    #[test]
    fn param_file_rejects_bad_root() {
        let path = temp_file("scalar.json", "42");
        assert!(load_param_file(&path).is_err());
        let path = temp_file("noparams.json", r#"{"args": []}"#);
        let err = load_param_file(&path).unwrap_err().to_string();
        assert!(err.contains("params"));
    }

    #[test]
    fn params_flag_must_be_array() {
        assert!(collect_payloads(None, Some("{\"a\":1}"), &[]).is_err());
        assert!(collect_payloads(None, Some("not json"), &[]).is_err());
    }

    #[test]
    fn param_payload_passes_json_through() {
        assert_eq!(param_payload(" [1,2] ").unwrap().get(), "[1,2]");
        assert_eq!(param_payload("null").unwrap().get(), "null");
        assert_eq!(param_payload("hello").unwrap().get(), "\"hello\"");
    }

    #[test]
    fn short_type_names() {
        assert_eq!(short_type_name("i64"), "i64");
        assert_eq!(
            short_type_name("alloc::vec::Vec<alloc::string::String>"),
            "Vec<String>"
        );
        assert_eq!(
            short_type_name("core::option::Option<(i64, invoke::sample::Nanos)>"),
            "Option<(i64, Nanos)>"
        );
    }

    #[test]
    fn method_rendering() {
        let set = Counter::default().method_set().unwrap();
        let rows = method_rows(set);
        assert_eq!(rows.len(), 5);
        let add = rows.iter().find(|r| r[1] == "Add").unwrap();
        assert_eq!(add[2], "i64");
        assert_eq!(add[3], "i64");
        let reset = rows.iter().find(|r| r[1] == "Reset").unwrap();
        assert_eq!(reset[2], "-");

        let json = method_json(set.get("Rename").unwrap());
        assert_eq!(json["num_in"], 1);
        assert_eq!(json["results"][1]["type"], "usize");
    }

    #[test]
    fn find_method_suggests_case() {
        let set = Counter::default().method_set().unwrap();
        assert!(find_method(set, "Add").is_ok());
        let err = find_method(set, "add").unwrap_err().to_string();
        assert!(err.contains("did you mean 'Add'"));
    }

    #[test]
    fn require_target_needs_value() {
        assert!(require_target(None).is_err());
        assert!(require_target(Some("  ")).is_err());
        assert_eq!(require_target(Some("counter")).unwrap(), TargetSpec::Counter);
    }
}
