//! Policy evaluation.
//!
//! An `opa` bead names an input artifact (`input`) and a policy document
//! (`path`), both relative to the landing zone, plus an optional query
//! (`package`). The engine builds a [`PolicyRequest`] from those fields and
//! asks a [`PolicyEvaluator`] for a boolean verdict.

use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use kado_config::landing_zone::LandingZone;
use kado_core::bead::{Bead, keys};
use kado_core::kind::BeadKind;

use crate::error::PolicyError;

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    pub allow: bool,
    /// The terraform or ansible bead that relayed into the gate. Other
    /// origins, and top-level evaluations, record `None`.
    pub origin: Option<BeadKind>,
}

/// Everything an evaluator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRequest {
    pub input: Value,
    pub input_path: PathBuf,
    pub policy_path: PathBuf,
    pub query: String,
}

impl PolicyRequest {
    /// Reads the bead's input artifact and checks its policy document.
    ///
    /// Inputs ending in `.yaml`/`.yml` are parsed as YAML, anything else as
    /// JSON.
    pub fn from_bead(
        bead: &Bead,
        landing_zone: &LandingZone,
        default_query: &str,
    ) -> Result<Self, PolicyError> {
        let input_rel = bead
            .field(keys::INPUT)
            .ok_or(PolicyError::MissingField("input"))?;
        let input_path = landing_zone.join(input_rel);
        let input = read_input(&input_path)?;

        let policy_rel = bead
            .field(keys::PATH)
            .ok_or(PolicyError::MissingField("policy"))?;
        let policy_path = landing_zone.join(policy_rel);
        if let Err(source) = std::fs::metadata(&policy_path) {
            return Err(PolicyError::Read {
                path: policy_path,
                source,
            });
        }

        let query = bead.field(keys::PACKAGE).unwrap_or(default_query).to_string();

        Ok(Self {
            input,
            input_path,
            policy_path,
            query,
        })
    }
}

fn read_input(path: &Path) -> Result<Value, PolicyError> {
    let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    if is_yaml {
        serde_yaml::from_str(&text).map_err(|source| PolicyError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&text).map_err(|source| PolicyError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Turns a request into a verdict.
pub trait PolicyEvaluator {
    fn evaluate(&mut self, request: &PolicyRequest) -> Result<bool, PolicyError>;
}

// ---------------------------------------------------------------------------
// OPA command-line evaluator
// ---------------------------------------------------------------------------

/// Evaluates with `opa eval`, feeding the input on stdin.
#[derive(Debug, Clone)]
pub struct OpaCli {
    binary: String,
}

impl OpaCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> PolicyError {
        PolicyError::Spawn {
            program: self.binary.clone(),
            source,
        }
    }
}

impl PolicyEvaluator for OpaCli {
    fn evaluate(&mut self, request: &PolicyRequest) -> Result<bool, PolicyError> {
        let policy = request.policy_path.to_string_lossy();
        tracing::debug!(
            policy = %policy,
            query = %request.query,
            "running opa eval"
        );
        let mut child = Command::new(&self.binary)
            .args(["eval", "--format", "json", "--stdin-input", "-d"])
            .arg(policy.as_ref())
            .arg(&request.query)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            let payload = serde_json::to_vec(&request.input)
                .map_err(|e| PolicyError::Evaluation(e.to_string()))?;
            stdin.write_all(&payload).map_err(|e| self.spawn_error(e))?;
        }

        let output = child.wait_with_output().map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(PolicyError::Failed {
                program: self.binary.clone(),
                code: output.status.code(),
            });
        }

        let result: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| PolicyError::Evaluation(format!("unreadable opa output: {e}")))?;
        Ok(is_allowed(&result))
    }
}

/// `true` only when the first expression of the first result is the
/// boolean `true`. Undefined results deny.
pub fn is_allowed(eval_output: &Value) -> bool {
    eval_output.pointer("/result/0/expressions/0/value") == Some(&Value::Bool(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kado_core::bead::Fields;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn opa_bead(pairs: &[(&str, &str)]) -> Bead {
        let fields: Fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Bead::new(BeadKind::Opa, fields)
    }

    fn landing_zone() -> (tempfile::TempDir, LandingZone) {
        let dir = tempfile::tempdir().unwrap();
        let lz = LandingZone::new(dir.path());
        std::fs::write(lz.join("policy.rego"), "package terraform\nallow := true\n").unwrap();
        (dir, lz)
    }

    #[test]
    fn yaml_input_and_default_query() {
        let (_dir, lz) = landing_zone();
        std::fs::write(lz.join("input.yaml"), "resource_changes:\n  - type: aws_instance\n").unwrap();
        let bead = opa_bead(&[("input", "input.yaml"), ("path", "policy.rego")]);

        let req = PolicyRequest::from_bead(&bead, &lz, "data.terraform.allow").unwrap();

        assert_eq!(req.input, json!({"resource_changes": [{"type": "aws_instance"}]}));
        assert_eq!(req.query, "data.terraform.allow");
        assert_eq!(req.policy_path, lz.join("policy.rego"));
    }

    #[test]
    fn json_input_and_explicit_package() {
        let (_dir, lz) = landing_zone();
        std::fs::write(lz.join("plan.json"), r#"{"planned_values": {}}"#).unwrap();
        let bead = opa_bead(&[
            ("input", "plan.json"),
            ("path", "policy.rego"),
            ("package", "data.custom.allow"),
        ]);

        let req = PolicyRequest::from_bead(&bead, &lz, "data.terraform.allow").unwrap();

        assert_eq!(req.input, json!({"planned_values": {}}));
        assert_eq!(req.query, "data.custom.allow");
    }

    #[test]
    fn missing_fields_and_files() {
        let (_dir, lz) = landing_zone();
        let no_input = opa_bead(&[("path", "policy.rego")]);
        assert_eq!(
            PolicyRequest::from_bead(&no_input, &lz, "q").unwrap_err().to_string(),
            "input path not specified in bead"
        );

        std::fs::write(lz.join("in.json"), "{}").unwrap();
        let no_policy = opa_bead(&[("input", "in.json")]);
        assert_eq!(
            PolicyRequest::from_bead(&no_policy, &lz, "q").unwrap_err().to_string(),
            "policy path not specified in bead"
        );

        let absent = opa_bead(&[("input", "absent.json"), ("path", "policy.rego")]);
        assert!(matches!(
            PolicyRequest::from_bead(&absent, &lz, "q"),
            Err(PolicyError::Read { .. })
        ));
    }

    #[test]
    fn malformed_json_input() {
        let (_dir, lz) = landing_zone();
        std::fs::write(lz.join("in.json"), "{not json").unwrap();
        let bead = opa_bead(&[("input", "in.json"), ("path", "policy.rego")]);
        assert!(matches!(
            PolicyRequest::from_bead(&bead, &lz, "q"),
            Err(PolicyError::Json { .. })
        ));
    }

    /// Writes an executable stand-in for `opa` that drains stdin first.
    #[cfg(unix)]
    fn fake_opa(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("opa");
        std::fs::write(&path, format!("#!/bin/sh\ncat >/dev/null\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn request(lz: &LandingZone) -> PolicyRequest {
        PolicyRequest {
            input: json!({"planned_values": {}}),
            input_path: lz.join("plan.json"),
            policy_path: lz.join("policy.rego"),
            query: "data.terraform.allow".to_string(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn opa_cli_reads_the_verdict_from_stdout() {
        let (dir, lz) = landing_zone();
        let bin = fake_opa(
            dir.path(),
            r#"echo '{"result": [{"expressions": [{"value": true}]}]}'"#,
        );
        let mut opa = OpaCli::new(bin.to_string_lossy());
        assert!(opa.evaluate(&request(&lz)).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn opa_cli_failure_reports_exit_code() {
        let (dir, lz) = landing_zone();
        let bin = fake_opa(dir.path(), "echo 'rego_parse_error' >&2\nexit 2");
        let mut opa = OpaCli::new(bin.to_string_lossy());

        let err = opa.evaluate(&request(&lz)).unwrap_err();
        assert!(matches!(err, PolicyError::Failed { code: Some(2), .. }), "{err}");
        assert!(err.to_string().ends_with("eval failed (exit code Some(2))"));
    }

    #[test]
    fn verdict_extraction() {
        assert!(is_allowed(&json!({"result": [{"expressions": [{"value": true}]}]})));
        assert!(!is_allowed(&json!({"result": [{"expressions": [{"value": false}]}]})));
        assert!(!is_allowed(&json!({"result": [{"expressions": [{"value": "true"}]}]})));
        assert!(!is_allowed(&json!({})));
    }

    #[test]
    fn missing_opa_binary_is_spawn_error() {
        let (_dir, lz) = landing_zone();
        let req = PolicyRequest {
            input: json!({}),
            input_path: lz.join("in.json"),
            policy_path: lz.join("policy.rego"),
            query: "data.terraform.allow".into(),
        };
        let err = OpaCli::new("kado-no-such-opa").evaluate(&req).unwrap_err();
        assert!(matches!(err, PolicyError::Spawn { .. }));
    }
}
