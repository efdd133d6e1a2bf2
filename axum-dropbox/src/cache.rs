use std::{fmt, str::FromStr};

use crate::{
    ConfigError,
    config::DROPBOX_CACHE_STORAGE,
    provider::{AccountInfo, DropboxClient, DropboxSession},
};

/// Where derived values (session, client, account info) are memoized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheStorage {
    /// Memoized on the request's [`Dropbox`](crate::Dropbox) handle.
    #[default]
    Request,
    /// Never memoized, every access recomputes.
    None,
}

impl CacheStorage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStorage::Request => "request",
            CacheStorage::None => "none",
        }
    }
}

impl FromStr for CacheStorage {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "request" => Ok(CacheStorage::Request),
            "none" => Ok(CacheStorage::None),
            _ => Err(ConfigError::Invalid {
                name: DROPBOX_CACHE_STORAGE,
                value: value.to_owned(),
            }),
        }
    }
}

/// A lazily computed value, either unset or computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    value: Option<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<T> Cached<T> {
    pub fn unset() -> Self {
        Self { value: None }
    }

    pub fn computed(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_computed(&self) -> bool {
        self.value.is_some()
    }

    /// Moves the value out, leaving the slot unset.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn insert(&mut self, value: T) -> &mut T {
        self.value.insert(value)
    }

    pub fn invalidate(&mut self) {
        self.value = None;
    }
}

/// Request scoped cache of the values derived from the session state.
pub struct DropboxCache {
    storage: CacheStorage,
    pub(crate) session: Cached<DropboxSession>,
    pub(crate) client: Cached<DropboxClient>,
    pub(crate) account_info: Cached<AccountInfo>,
}

impl DropboxCache {
    pub fn new(storage: CacheStorage) -> Self {
        Self {
            storage,
            session: Cached::unset(),
            client: Cached::unset(),
            account_info: Cached::unset(),
        }
    }

    pub fn storage(&self) -> CacheStorage {
        self.storage
    }

    pub fn session(&self) -> Option<&DropboxSession> {
        self.session.get()
    }

    pub fn client(&self) -> Option<&DropboxClient> {
        self.client.get()
    }

    pub fn account_info(&self) -> Option<&AccountInfo> {
        self.account_info.get()
    }

    pub fn is_empty(&self) -> bool {
        !(self.session.is_computed()
            || self.client.is_computed()
            || self.account_info.is_computed())
    }

    pub fn invalidate(&mut self) {
        self.session.invalidate();
        self.client.invalidate();
        self.account_info.invalidate();
    }

    pub(crate) fn reuse_session(&mut self) -> Option<DropboxSession> {
        reuse(self.storage, &mut self.session)
    }

    pub(crate) fn reuse_client(&mut self) -> Option<DropboxClient> {
        reuse(self.storage, &mut self.client)
    }

    pub(crate) fn reuse_account_info(&mut self) -> Option<AccountInfo> {
        reuse(self.storage, &mut self.account_info)
    }
}

fn reuse<T>(storage: CacheStorage, slot: &mut Cached<T>) -> Option<T> {
    match storage {
        CacheStorage::Request => slot.take(),
        CacheStorage::None => {
            slot.invalidate();
            None
        }
    }
}

impl fmt::Debug for DropboxCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropboxCache")
            .field("storage", &self.storage)
            .field("session", &self.session.is_computed())
            .field("client", &self.client.is_computed())
            .field("account_info", &self.account_info.get())
            .finish()
    }
}
