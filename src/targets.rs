use crate::config::PurgeConfig;
use crate::services::{AccountClient, AccountError, AccountUser};

/// A user account resolved for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUser {
    pub id: String,
    pub email: String,
}

/// Which accounts a run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    /// Deactivated accounts only.
    Inactive,
    /// Active and deactivated accounts alike.
    All,
}

/// Page through the account service and resolve the target set.
///
/// System administrators are always excluded. When e-mail filters are
/// configured an account must match one of them; without filters only
/// the `Inactive` scope resolves anything, since `All` with no filter
/// would target every account on the platform.
pub async fn resolve_targets(
    accounts: &dyn AccountClient,
    config: &PurgeConfig,
    page_size: u32,
    scope: TargetScope,
) -> Result<Vec<TargetUser>, AccountError> {
    if scope == TargetScope::All && !config.has_target_filters() {
        tracing::warn!("no e-mail filters configured; refusing to target all accounts");
        return Ok(Vec::new());
    }

    let inactive_only = scope == TargetScope::Inactive;
    let mut targets = Vec::new();

    for page in 0.. {
        let users = accounts.list_users(page, page_size, inactive_only).await?;
        if users.is_empty() {
            break;
        }

        for user in users {
            if user.is_system_admin() {
                tracing::debug!(email = %user.email, "skipping system administrator");
                continue;
            }
            if !matches_filters(config, &user) {
                continue;
            }
            targets.push(TargetUser {
                id: user.id,
                email: user.email,
            });
        }
    }

    Ok(targets)
}

fn matches_filters(config: &PurgeConfig, user: &AccountUser) -> bool {
    if !config.has_target_filters() {
        return true;
    }
    config
        .target_email_suffixes
        .iter()
        .any(|suffix| user.email.ends_with(suffix))
        || config
            .target_email_addresses
            .iter()
            .any(|address| address == &user.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purge::testing::{FakeAccountClient, account_user};

    fn filter_config(suffixes: Vec<&str>, addresses: Vec<&str>) -> PurgeConfig {
        PurgeConfig {
            target_email_suffixes: suffixes.into_iter().map(String::from).collect(),
            target_email_addresses: addresses.into_iter().map(String::from).collect(),
            ..PurgeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_inactive_scope_skips_active_and_admin_accounts() {
        let accounts = FakeAccountClient::new(vec![
            account_user("u1", "gone@corp.test", "system_user", 1),
            account_user("u2", "active@corp.test", "system_user", 0),
            account_user("u3", "admin@corp.test", "system_user system_admin", 1),
        ]);

        let targets = resolve_targets(
            &accounts,
            &PurgeConfig::default(),
            100,
            TargetScope::Inactive,
        )
        .await
        .unwrap();

        assert_eq!(
            targets,
            vec![TargetUser {
                id: "u1".into(),
                email: "gone@corp.test".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_filters_match_suffix_or_exact_address() {
        let accounts = FakeAccountClient::new(vec![
            account_user("u1", "a@old.test", "system_user", 0),
            account_user("u2", "b@corp.test", "system_user", 0),
            account_user("u3", "keep@corp.test", "system_user", 0),
        ]);
        let config = filter_config(vec!["@old.test"], vec!["b@corp.test"]);

        let targets = resolve_targets(&accounts, &config, 100, TargetScope::All)
            .await
            .unwrap();

        let emails: Vec<&str> = targets.iter().map(|t| t.email.as_str()).collect();
        assert_eq!(emails, vec!["a@old.test", "b@corp.test"]);
    }

    #[tokio::test]
    async fn test_all_scope_without_filters_resolves_nothing() {
        let accounts = FakeAccountClient::new(vec![account_user(
            "u1",
            "a@corp.test",
            "system_user",
            0,
        )]);

        let targets = resolve_targets(&accounts, &PurgeConfig::default(), 100, TargetScope::All)
            .await
            .unwrap();
        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_walks_every_page() {
        let users: Vec<_> = (0..250)
            .map(|i| account_user(&format!("u{i}"), &format!("u{i}@old.test"), "system_user", 1))
            .collect();
        let accounts = FakeAccountClient::new(users);

        let targets = resolve_targets(
            &accounts,
            &PurgeConfig::default(),
            100,
            TargetScope::Inactive,
        )
        .await
        .unwrap();
        assert_eq!(targets.len(), 250);
    }
}
