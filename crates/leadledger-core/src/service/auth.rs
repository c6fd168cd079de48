//! Bearer token authentication.
//!
//! Tokens are opaque strings of the form `token_<account-id>_<unix-millis>`.
//! The core trusts token resolution; there is no signature to check, only a
//! lookup against the accounts table.

use chrono::Utc;
use tracing::warn;

use crate::account::{Account, AccountId, AccountRepository};
use crate::{Error, Result};

/// Issue a bearer token for an account.
#[must_use]
pub fn generate_token(account_id: AccountId) -> String {
    format!("token_{}_{}", account_id.0, Utc::now().timestamp_millis())
}

/// Parse a bearer token into the account id it names.
#[must_use]
pub fn verify_token(token: &str) -> Option<AccountId> {
    let mut parts = token.split('_');
    if parts.next() != Some("token") {
        return None;
    }
    parts.next()?.parse().ok().map(AccountId)
}

/// Resolve a bearer token to an account.
///
/// # Errors
///
/// Returns [`Error::Unauthorized`] if the token is malformed or names an
/// unknown account.
pub async fn authenticate(accounts: &AccountRepository, token: &str) -> Result<Account> {
    let Some(account_id) = verify_token(token) else {
        warn!("rejected malformed bearer token");
        return Err(Error::Unauthorized("Invalid token".into()));
    };

    accounts
        .get(account_id)
        .await?
        .ok_or_else(|| Error::Unauthorized("User not found".into()))
}

/// Check a login and issue a token on success.
///
/// # Errors
///
/// Returns [`Error::Unauthorized`] if the email is unknown or the password
/// does not match.
pub async fn login(
    accounts: &AccountRepository,
    email: &str,
    password: &str,
) -> Result<(Account, String)> {
    let account = accounts
        .check_credentials(email, password)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid credentials".into()))?;

    let token = generate_token(account.id);
    Ok((account, token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Storage;
    use crate::account::NewAccount;

    fn new_account() -> NewAccount {
        NewAccount {
            full_name: "Auth Tester".into(),
            email: "auth@example.com".into(),
            password: "password123".into(),
            company_name: None,
            industry: None,
            role: None,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = generate_token(AccountId(42));
        assert!(token.starts_with("token_42_"));
        assert_eq!(verify_token(&token), Some(AccountId(42)));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(verify_token(""), None);
        assert_eq!(verify_token("bearer_1_2"), None);
        assert_eq!(verify_token("token_abc_2"), None);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let storage = Storage::in_memory().await.unwrap();
        let account = storage.accounts().create(&new_account(), 100).await.unwrap();

        let token = generate_token(account.id);
        let resolved = authenticate(&storage.accounts(), &token).await.unwrap();
        assert_eq!(resolved.id, account.id);

        let err = authenticate(&storage.accounts(), "token_999_0").await;
        assert!(matches!(err, Err(Error::Unauthorized(_))));

        let err = authenticate(&storage.accounts(), "garbage").await;
        assert!(matches!(err, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login() {
        let storage = Storage::in_memory().await.unwrap();
        storage.accounts().create(&new_account(), 100).await.unwrap();

        let (account, token) = login(&storage.accounts(), "auth@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(verify_token(&token), Some(account.id));

        let err = login(&storage.accounts(), "auth@example.com", "nope-nope").await;
        assert!(matches!(err, Err(Error::Unauthorized(_))));
    }
}
