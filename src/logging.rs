use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const ENV_LOG: &str = "SWAGGER_PWSH_LOG";

/// Installs a stderr fmt subscriber.
///
/// `SWAGGER_PWSH_LOG` is either a plain level, applied to this crate, or a
/// full filter spec.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = filter_spec(std::env::var(ENV_LOG).ok().as_deref(), default_level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn filter_spec(env_value: Option<&str>, default_level: &str) -> String {
    let crate_root = env!("CARGO_CRATE_NAME");
    match env_value {
        Some(level) if is_plain_level(level) => format!("{crate_root}={level}"),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => format!("{crate_root}={default_level}"),
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_levels_apply_to_this_crate() {
        let crate_root = env!("CARGO_CRATE_NAME");
        assert_eq!(filter_spec(Some("warn"), "info"), format!("{crate_root}=warn"));
        assert_eq!(filter_spec(None, "debug"), format!("{crate_root}=debug"));
        assert_eq!(filter_spec(Some(""), "info"), format!("{crate_root}=info"));
    }

    #[test]
    fn full_specs_pass_through() {
        assert_eq!(filter_spec(Some("swagger_pwsh=trace,reqwest=warn"), "info"), "swagger_pwsh=trace,reqwest=warn");
    }
}
