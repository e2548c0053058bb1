use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

pub(crate) const APP_NAME: &str = "powermax-zabbix";

lazy_static::lazy_static! {
    pub(crate) static ref PROJECT_NAME: String = APP_NAME.replace('-', "_").to_uppercase();
    static ref DATA_FOLDER: Option<PathBuf> = env::var(format!("{}_DATA", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from);
}

/// Directory holding the rotating log file.
///
/// `POWERMAX_ZABBIX_DATA` wins over the platform data directory.
pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub(crate) fn default_log_file() -> PathBuf {
    get_data_dir().join(format!("{APP_NAME}.log"))
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "dell", APP_NAME)
}
