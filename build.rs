use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = env::var_os("OUT_DIR").ok_or("OUT_DIR not set")?;
    let dest_path = Path::new(&out_dir).join("version.rs");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR")?;
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");

    // Plugin API version lives in [package.metadata] so plugins and host agree on one number
    let cargo_toml_content = fs::read_to_string(&cargo_toml_path)?;
    let plugin_api_version = cargo_toml_content
        .parse::<toml::Table>()
        .ok()
        .and_then(|cargo_toml| {
            cargo_toml
                .get("package")
                .and_then(|p| p.as_table())
                .and_then(|p| p.get("metadata"))
                .and_then(|m| m.as_table())
                .and_then(|m| m.get("plugin_api_version"))
                .and_then(|v| v.as_integer())
        })
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let git_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    fs::write(
        &dest_path,
        format!(
            r###"pub const PLUGIN_API_VERSION: &str = "{plugin_api_version}";
pub const BUILD_TIME: &str = "{build_time}";
pub const GIT_HASH: &str = "{git_hash}";
"###
        ),
    )?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");
    Ok(())
}
