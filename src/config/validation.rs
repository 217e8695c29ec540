use regex::Regex;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Expand environment variables in a string using ${VAR_NAME} syntax
pub fn expand_env_var_in_string(value: &str) -> String {
    static VAR: OnceLock<Regex> = OnceLock::new();
    let re = VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var regex"));

    let mut result = value.to_string();
    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let replacement = env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name));
        result = result.replace(&cap[0], &replacement);
    }

    result
}

/// Expand `${VAR}` and a leading `~` in a configured path
pub fn expand_path(value: &str) -> PathBuf {
    let expanded = expand_env_var_in_string(value);
    if expanded == "~" {
        return dirs::home_dir().unwrap_or_default();
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(expanded)
}

pub fn ensure_positive(name: &str, value: f32) -> Result<f32, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{} must be a non-negative number, got {}", name, value))
    }
}
