//! Merchant secret key sources.
//!
//! The client reads the key from a [`KeyProvider`] on every call, so a
//! rotated key takes effect on the next request. A plain string key is
//! wrapped in [`StaticKey`]; rotation shared across tasks goes through a
//! provider that does its own synchronization.

use zeroize::Zeroizing;

/// Supplies the merchant secret key.
pub trait KeyProvider: Send + Sync {
    fn secret_key(&self) -> Zeroizing<String>;
}

/// A fixed key.
pub struct StaticKey(Zeroizing<String>);

impl StaticKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }
}

impl From<Zeroizing<String>> for StaticKey {
    fn from(key: Zeroizing<String>) -> Self {
        Self(key)
    }
}

impl KeyProvider for StaticKey {
    fn secret_key(&self) -> Zeroizing<String> {
        self.0.clone()
    }
}

impl<F> KeyProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn secret_key(&self) -> Zeroizing<String> {
        Zeroizing::new(self())
    }
}

impl std::fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticKey([REDACTED])")
    }
}
