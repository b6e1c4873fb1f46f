//! `kado version` -- print the kado version and the tools it will drive.
//!
//! Besides the build, the report names the policy evaluator binary and the
//! default query from the active settings, so a run can be traced back to
//! the `opa` it used.

use anyhow::Result;
use serde::Serialize;

use kado_config::settings::KadoSettings;

use crate::context::RuntimeContext;
use crate::output::output_json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, overridable at build time.
const BUILD: &str = {
    match option_env!("KADO_BUILD") {
        Some(b) => b,
        None => "dev",
    }
};

#[derive(Debug, Serialize)]
struct VersionInfo<'a> {
    version: &'static str,
    build: &'static str,
    platform: String,
    opa_binary: &'a str,
    policy_query: &'a str,
}

impl<'a> VersionInfo<'a> {
    fn new(settings: &'a KadoSettings) -> Self {
        Self {
            version: VERSION,
            build: BUILD,
            platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
            opa_binary: &settings.opa_binary,
            policy_query: &settings.default_policy_query,
        }
    }

    fn render(&self) -> String {
        format!(
            "kado version {} ({}) {}\n  opa: {} (query {})\n",
            self.version, self.build, self.platform, self.opa_binary, self.policy_query
        )
    }
}

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let info = VersionInfo::new(&ctx.settings);
    if ctx.json {
        output_json(&info);
    } else {
        print!("{}", info.render());
    }
    Ok(())
}
