/// Application name, used for config directories and the HTTP user agent.
pub const APP_NAME: &str = "addonctl";

/// Suffix the deployment API appends to the name of a configuration's paired container.
pub const CONTAINER_SUFFIX: &str = " Container";

/// Install kind of catalog versions that can be deployed into a project.
pub const DEPLOYABLE_INSTALL_KIND: &str = "terraform";

/// Length of the random suffix appended to dependency configuration names.
pub const CONFIG_NAME_SUFFIX_LEN: usize = 6;

/// Default request timeout for catalog and project API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_CATALOG_URL: &str = "https://cm.globalcatalog.cloud.ibm.com/api/v1-beta";
pub const DEFAULT_PROJECTS_URL: &str = "https://projects.api.cloud.ibm.com";

pub const ENV_CATALOG_URL: &str = "ADDONCTL_CATALOG_URL";
pub const ENV_PROJECTS_URL: &str = "ADDONCTL_PROJECTS_URL";
pub const ENV_API_TOKEN: &str = "ADDONCTL_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "ADDONCTL_TIMEOUT_SECS";
