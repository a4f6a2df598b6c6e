use anyhow::Result;
use tracing::{debug, info, warn};

/// Best-effort registration of the custom URL scheme with the OS so that
/// following a `<scheme>://...` link launches this binary with the URL as an
/// argument. Failure is logged and never aborts the flow.
pub fn register_scheme_handler(scheme: &str) {
    match try_register(scheme) {
        Ok(true) => info!("Registered as handler for {}:// URLs", scheme),
        Ok(false) => debug!(
            "Automatic registration for {}:// is not supported on this platform; \
             register the handler manually",
            scheme
        ),
        Err(e) => warn!("Could not register {}:// handler: {}", scheme, e),
    }
}

#[cfg(target_os = "linux")]
fn try_register(scheme: &str) -> Result<bool> {
    use anyhow::{anyhow, Context};
    use directories::BaseDirs;
    use std::process::Command;

    let exe = std::env::current_exe().context("Failed to resolve current executable")?;
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let applications_dir = base_dirs.data_dir().join("applications");
    std::fs::create_dir_all(&applications_dir)?;

    let desktop_id = "implicit-grant.desktop";
    let entry = format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=implicit-grant\n\
         Exec={} %u\n\
         NoDisplay=true\n\
         MimeType=x-scheme-handler/{};\n",
        exe.display(),
        scheme
    );
    std::fs::write(applications_dir.join(desktop_id), entry)?;

    let status = Command::new("xdg-mime")
        .arg("default")
        .arg(desktop_id)
        .arg(format!("x-scheme-handler/{}", scheme))
        .status()
        .context("Failed to run xdg-mime")?;
    if !status.success() {
        return Err(anyhow!("xdg-mime exited with {}", status));
    }

    Ok(true)
}

#[cfg(not(target_os = "linux"))]
fn try_register(_scheme: &str) -> Result<bool> {
    // macOS reads the scheme from the app bundle's Info.plist and Windows
    // from the registry; neither is wired up from this demo binary.
    Ok(false)
}
