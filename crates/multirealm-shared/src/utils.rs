//! Utility functions

/// Masks the local part of an email address for log output.
pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let visible: String = local.chars().take(if local.chars().count() <= 2 { 1 } else { 2 }).collect();
        format!("{}***{}", visible, domain)
    } else {
        "***".to_string()
    }
}

/// Trims a trailing slash so base URLs can be joined with absolute paths.
pub fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
