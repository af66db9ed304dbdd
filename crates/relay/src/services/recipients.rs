use crate::config::ReplyMode;

/// Who gets the draft. Depends only on the configured mode and, in direct
/// mode, the contact's own address.
pub fn resolve_recipients(mode: &ReplyMode, contact_email: &str) -> Vec<String> {
    match mode {
        ReplyMode::Review { recipients } => recipients.clone(),
        ReplyMode::Direct => vec![contact_email.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_mode_always_yields_the_fixed_list() {
        let mode = ReplyMode::Review {
            recipients: vec!["qa@team.io".to_string(), "lead@team.io".to_string()],
        };
        for contact in ["jane@x.com", "sam@y.org", ""] {
            assert_eq!(
                resolve_recipients(&mode, contact),
                vec!["qa@team.io".to_string(), "lead@team.io".to_string()]
            );
        }
    }

    #[test]
    fn direct_mode_yields_only_the_contact() {
        assert_eq!(
            resolve_recipients(&ReplyMode::Direct, "jane@x.com"),
            vec!["jane@x.com".to_string()]
        );
    }
}
