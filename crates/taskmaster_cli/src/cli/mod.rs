use clap::{Parser, Subcommand};
use taskmaster_core::config::ConfigOverrides;
use taskmaster_core::report::MAX_WINDOW_SIZE;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskmaster add "Buy milk" --due "2024-06-01 17:00"
    Add {
        title: Option<String>,
        /// When work on the task starts
        #[arg(long, value_name = "DATETIME")]
        start: Option<String>,
        /// When the task is due
        #[arg(long, value_name = "DATETIME")]
        due: Option<String>,
    },
    /// List tasks
    ///
    /// Example: taskmaster list --overdue
    List {
        /// Only tasks past their due date that are not completed
        #[arg(long)]
        overdue: bool,
    },
    /// Show details of a task
    ///
    /// Example: taskmaster show task-1
    Show { id: String },
    /// Move a task to its next status
    ///
    /// Example: taskmaster advance task-1
    /// Example: taskmaster advance task-1 --strategy toggle
    Advance {
        id: String,
        /// `cycle` (pending, in-progress, completed) or `toggle` (open/completed)
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<String>,
    },
    /// Delete a task
    ///
    /// Example: taskmaster delete task-1
    Delete { id: String },
    /// Show status totals and opened/closed counts per month
    ///
    /// Example: taskmaster report
    /// Example: taskmaster report --window 12 --at 2024-06-30
    Report {
        /// Number of months to include, ending at the current month
        #[arg(long, value_name = "MONTHS")]
        window: Option<usize>,
        /// Reference time instead of now
        #[arg(long, value_name = "DATETIME")]
        at: Option<String>,
    },
    /// Replace all tasks on the server with sample data
    ///
    /// Example: taskmaster seed
    Seed,
    /// Send notifications for overdue tasks
    ///
    /// Example: taskmaster notify
    Notify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    ApiUrl,
    WindowSize,
    Transition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "api_url" | "server" => ConfigOverrideTarget::ApiUrl,
        "window_size" | "window" => ConfigOverrideTarget::WindowSize,
        "transition" | "strategy" => ConfigOverrideTarget::Transition,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::ApiUrl => overrides.api_url = Some(parsed.value),
            ConfigOverrideTarget::WindowSize => {
                let size = parsed
                    .value
                    .parse::<usize>()
                    .ok()
                    .filter(|size| (1..=MAX_WINDOW_SIZE).contains(size))
                    .ok_or_else(|| {
                        format!("window_size must be an integer between 1 and {MAX_WINDOW_SIZE}")
                    })?;
                overrides.window_size = Some(size);
            }
            ConfigOverrideTarget::Transition => overrides.transition = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigOverrideTarget, collect_overrides, parse_config_override};

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Midnight ").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Theme);
        assert_eq!(parsed.value, "Midnight");

        let parsed = parse_config_override("Api-URL=http://localhost:8000").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::ApiUrl);
        assert_eq!(parsed.value, "http://localhost:8000");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("theme").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_key() {
        let err = parse_config_override(" = noir").unwrap_err();
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn collect_overrides_fills_each_field() {
        let raw = vec![
            "window_size=12".to_string(),
            "transition=toggle".to_string(),
            "theme=noir".to_string(),
        ];
        let overrides = collect_overrides(&raw).unwrap();

        assert_eq!(overrides.window_size, Some(12));
        assert_eq!(overrides.transition.as_deref(), Some("toggle"));
        assert_eq!(overrides.theme.as_deref(), Some("noir"));
        assert_eq!(overrides.api_url, None);
    }

    #[test]
    fn collect_overrides_rejects_out_of_range_window() {
        let err = collect_overrides(&["window=0".to_string()]).unwrap_err();
        assert!(err.contains("between 1 and"));

        let err = collect_overrides(&["window=5000".to_string()]).unwrap_err();
        assert!(err.contains("between 1 and"));
    }
}
