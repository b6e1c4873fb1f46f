//! The process-backed [`Provisioner`]: `git`, `ansible-playbook`,
//! `terraform` and `terragrunt`.

use std::path::{Path, PathBuf};

use kado_config::data::DataFile;
use kado_config::run::RunConfig;
use kado_core::bead::{Bead, keys};
use kado_core::flatten::FlatMap;
use kado_core::kind::BeadKind;

use crate::error::HandlerError;
use crate::process::{run_captured, run_streaming};
use crate::provisioner::{Action, Provisioner};
use crate::template;

const ANSIBLE: &str = "ansible-playbook";
const TERRAFORM: &str = "terraform";
const TERRAGRUNT: &str = "terragrunt";

const PLAN_OUT: &str = "plan.out";
const PLAN_JSON: &str = "plan.json";
const BACKEND_TFVARS: &str = "backend.tfvars";
const DEFAULT_INVENTORY: &str = "inventory.ini";
const EXTRA_VARS: &str = "extra_vars.yaml";

pub struct Toolchain<'a> {
    config: &'a RunConfig,
    data: &'a DataFile,
    flat: FlatMap,
}

impl<'a> Toolchain<'a> {
    pub fn new(config: &'a RunConfig, data: &'a DataFile) -> Self {
        Self {
            config,
            data,
            flat: data.flatten(),
        }
    }

    /// Writes the data file to the landing zone for `--extra-vars`.
    fn write_extra_vars(&self) -> Result<PathBuf, HandlerError> {
        let path = self.config.landing_zone.join(EXTRA_VARS);
        std::fs::write(&path, self.data.text()).map_err(io_error(&path))?;
        tracing::debug!(path = %path.display(), "extra vars written");
        Ok(path)
    }
}

impl Provisioner for Toolchain<'_> {
    fn materialize(&mut self, bead: &Bead, dest: &Path) -> Result<(), HandlerError> {
        let Some(source) = bead.source() else {
            return Ok(());
        };
        kado_git::clone_repo(source, dest, bead.refs())?;
        Ok(())
    }

    fn render_templates(&mut self, bead: &Bead) -> Result<(), HandlerError> {
        let templates = self.data.templates()?;
        let output_root = self.config.landing_zone.root();
        for relative in templates {
            let path = self.config.resolve(&relative);
            let written = template::render_file(&path, &self.flat, output_root)
                .map_err(|source| HandlerError::Template {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(
                bead = %bead.kind,
                template = %path.display(),
                output = %written.display(),
                "template rendered"
            );
        }
        Ok(())
    }

    fn ansible(&mut self, bead: &Bead, action: Action) -> Result<(), HandlerError> {
        let Some(playbook) = bead.field(keys::PLAYBOOK) else {
            return Ok(());
        };
        let lz = &self.config.landing_zone;
        let playbook = lz.bead_dir(BeadKind::Ansible).join(playbook);
        if !playbook.is_file() {
            return Err(HandlerError::MissingPlaybook(playbook));
        }

        let inventory = match bead.field(keys::INVENTORY) {
            Some(inventory) => PathBuf::from(inventory),
            None => lz.join(DEFAULT_INVENTORY),
        };
        let extra_vars = if bead.flag(keys::EXTRA_VARS_FILE) {
            Some(self.write_extra_vars()?)
        } else {
            None
        };

        let args = ansible_args(&playbook, &inventory, extra_vars.as_deref(), action);
        run_streaming(ANSIBLE, &as_strs(&args), &self.config.work_dir)
    }

    fn terraform(&mut self, _bead: &Bead, action: Action) -> Result<(), HandlerError> {
        let dir = self.config.landing_zone.bead_dir(BeadKind::Terraform);
        std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;

        if action.plans() {
            let staged = stage_tfvars(self.config.landing_zone.root(), &dir)?;

            let mut init = vec!["init".to_string()];
            if staged.backend {
                init.push(format!("-backend-config={BACKEND_TFVARS}"));
            }
            run_streaming(TERRAFORM, &as_strs(&init), &dir)?;

            let mut plan = vec!["plan".to_string(), format!("-out={PLAN_OUT}")];
            for file in &staged.var_files {
                plan.push("--var-file".to_string());
                plan.push(file.clone());
            }
            run_streaming(TERRAFORM, &as_strs(&plan), &dir)?;

            let json = run_captured(TERRAFORM, &["show", "-no-color", "-json", PLAN_OUT], &dir)?;
            write_plan_json(&dir, &json)?;
        }

        if action.applies() {
            run_streaming(TERRAFORM, &["apply", PLAN_OUT], &dir)?;
        }
        Ok(())
    }

    fn terragrunt(&mut self, _bead: &Bead, action: Action) -> Result<(), HandlerError> {
        let dir = self.config.landing_zone.bead_dir(BeadKind::Terragrunt);
        std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        // terragrunt runs terraform from its cache, so the plan path must be absolute
        let plan_out = dir.join(PLAN_OUT);
        let plan_out = plan_out.to_string_lossy();

        if action.plans() {
            run_streaming(TERRAGRUNT, &["plan", "-out", &plan_out], &dir)?;
            let json = run_captured(TERRAGRUNT, &["show", "-json", &plan_out], &dir)?;
            write_plan_json(&dir, &json)?;
        }

        if action.applies() {
            run_streaming(TERRAGRUNT, &["apply", &plan_out], &dir)?;
        }
        Ok(())
    }
}

fn ansible_args(
    playbook: &Path,
    inventory: &Path,
    extra_vars: Option<&Path>,
    action: Action,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), inventory.display().to_string()];
    if let Some(extra_vars) = extra_vars {
        args.push("--extra-vars".to_string());
        args.push(format!("@{}", extra_vars.display()));
    }
    if !action.applies() {
        args.push("--check".to_string());
    }
    args.push(playbook.display().to_string());
    args
}

/// `.tfvars` files moved into the terraform directory.
#[derive(Debug, Default, PartialEq, Eq)]
struct StagedVars {
    /// File names to pass as `--var-file`, sorted.
    var_files: Vec<String>,
    /// Whether `backend.tfvars` was moved.
    backend: bool,
}

/// Moves every `*.tfvars` file at the top of `from` into `to`.
fn stage_tfvars(from: &Path, to: &Path) -> Result<StagedVars, HandlerError> {
    let entries = std::fs::read_dir(from).map_err(io_error(from))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_error(from))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "tfvars") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let mut staged = StagedVars::default();
    for name in names {
        let dest = to.join(&name);
        std::fs::rename(from.join(&name), &dest).map_err(io_error(&dest))?;
        tracing::debug!(file = %name, "tfvars staged");
        if name == BACKEND_TFVARS {
            staged.backend = true;
        } else {
            staged.var_files.push(name);
        }
    }
    Ok(staged)
}

fn write_plan_json(dir: &Path, json: &[u8]) -> Result<(), HandlerError> {
    let path = dir.join(PLAN_JSON);
    std::fs::write(&path, json).map_err(io_error(&path))
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> HandlerError + '_ {
    move |source| HandlerError::Io {
        path: path.to_path_buf(),
        source,
    }
}
