pub const APP_NAME: &str = "Transport Quote Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Release tag when built from one, otherwise the crate version; commit appended when known.
pub fn version_label() -> String {
    let base = match GIT_TAG {
        Some(tag) => tag.to_string(),
        None => format!("v{APP_VERSION}"),
    };
    match GIT_COMMIT {
        Some(commit) => format!("{base} ({commit})"),
        None => base,
    }
}

/// `User-Agent` sent with every backend call.
pub fn user_agent() -> String {
    let version = GIT_TAG.unwrap_or(APP_VERSION);
    format!(
        "transport-quote/{}",
        version.trim_start_matches(|ch| ch == 'v' || ch == 'V')
    )
}
