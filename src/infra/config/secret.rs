use tracing::{debug, info};

use crate::usecase::ports::store::{StoreError, TokenStore};

pub const KEYRING_SERVICE: &str = "HardcoverApp";
pub const KEYRING_USER: &str = "BearerToken";

pub struct KeyringTokenStore {
    entry: keyring::Entry,
}

impl KeyringTokenStore {
    pub fn new(service: &str, user: &str) -> Result<Self, StoreError> {
        let entry = keyring::Entry::new(service, user)
            .map_err(|err| StoreError::Credential(format!("failed to open keyring entry: {err}")))?;
        Ok(Self { entry })
    }
}

impl TokenStore for KeyringTokenStore {
    fn load_token(&self) -> Result<Option<String>, StoreError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token).filter(|token| !token.trim().is_empty())),
            Err(keyring::Error::NoEntry) => {
                debug!("no bearer token in keyring");
                Ok(None)
            }
            Err(err) => Err(StoreError::Credential(format!("failed to read token: {err}"))),
        }
    }

    fn save_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        let token = token.map(str::trim).filter(|token| !token.is_empty());
        match token {
            Some(token) => self
                .entry
                .set_password(token)
                .map_err(|err| StoreError::Credential(format!("failed to store token: {err}")))?,
            None => match self.entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(err) => {
                    return Err(StoreError::Credential(format!("failed to remove token: {err}")))
                }
            },
        }
        info!(stored = token.is_some(), "bearer token updated");
        Ok(())
    }
}

pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.trim().chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
