use anyhow::{Context, Result};

fn main() -> Result<()> {
    let app_version = env("CARGO_PKG_VERSION")?
        .into_string()
        .map_err(|version| anyhow::anyhow!("invalid CARGO_PKG_VERSION: {version:?}"))?;

    let rustc_version = rustc_version::version().context("failed to detect rustc version")?;

    println!("cargo:rustc-env=INTAKE_VERSION={app_version}");
    println!("cargo:rustc-env=INTAKE_RUSTC_VERSION={rustc_version}");
    Ok(())
}

fn env(key: &str) -> Result<std::ffi::OsString> {
    println!("cargo:rerun-if-env-changed={key}");
    std::env::var_os(key).with_context(|| format!("missing '{key}' environment variable"))
}
