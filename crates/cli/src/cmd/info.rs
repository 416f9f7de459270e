use anyhow::Result;

use addonctl_lib::config::Settings;
use addonctl_lib::platform::paths::config_file;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(settings: &Settings, output: OutputFormat) -> Result<()> {
  let token = settings.api_token.as_ref().map(|_| "<redacted>");
  let file = config_file().map(|p| p.display().to_string());

  if output.is_json() {
    print_json(&serde_json::json!({
      "version": env!("CARGO_PKG_VERSION"),
      "config_file": file,
      "catalog_url": settings.catalog_url,
      "projects_url": settings.projects_url,
      "api_token": token,
      "timeout_secs": settings.timeout_secs,
    }))?;
  } else {
    println!("addonctl {}", env!("CARGO_PKG_VERSION"));
    print_stat("Config file", file.as_deref().unwrap_or("(no config directory)"));
    print_stat("Catalog URL", &settings.catalog_url);
    print_stat("Projects URL", &settings.projects_url);
    print_stat("API token", token.unwrap_or("(not set)"));
    print_stat("Timeout", &format!("{}s", settings.timeout_secs));
  }

  Ok(())
}
