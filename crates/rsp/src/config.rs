//! Response configuration: the success code and the padding strategy.
//!
//! A [`RspConfig`] can be passed explicitly to the `*_with` writer methods, or
//! installed once as the process-wide default used by `success` / `failed`.
//! Installation is set-once: after the first install, or after the first read of
//! the default, the global can not change anymore.

use crate::envelope::{DefaultPadding, Envelope, Padding};
use crate::error::ConfigError;
use crate::RetCode;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

static GLOBAL_CONFIG: OnceCell<RspConfig> = OnceCell::new();

#[derive(Clone)]
pub struct RspConfig {
    success: RetCode,
    padding: Arc<dyn Padding>,
}

impl RspConfig {
    /// Starts from the default config: [`RetCode::SUCCESS`] and [`DefaultPadding`].
    pub fn builder() -> RspConfigBuilder {
        RspConfigBuilder::new()
    }

    /// Installs this config as the process-wide default.
    ///
    /// Must happen during startup, before any response is written: the default is
    /// frozen as soon as it is first read.
    pub fn install(self) -> Result<(), ConfigError> {
        GLOBAL_CONFIG.set(self).map_err(|_rejected| ConfigError::AlreadyInstalled)?;
        debug!(success = %Self::global().success, "response config installed");
        Ok(())
    }

    /// Returns the installed config, freezing the built-in default if none was installed.
    pub fn global() -> &'static RspConfig {
        GLOBAL_CONFIG.get_or_init(RspConfig::default)
    }

    /// The code used by every `success` call.
    #[inline]
    pub fn success(&self) -> &RetCode {
        &self.success
    }

    /// Applies the configured padding to `rc` and `data`.
    #[inline]
    pub fn pad(&self, rc: &RetCode, data: Option<Value>) -> Envelope {
        self.padding.pad(rc, data)
    }
}

impl Default for RspConfig {
    fn default() -> Self {
        Self { success: RetCode::SUCCESS, padding: Arc::new(DefaultPadding) }
    }
}

impl fmt::Debug for RspConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RspConfig").field("success", &self.success).finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct RspConfigBuilder {
    inner: RspConfig,
}

impl RspConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Replaces the code used by every `success` call.
    pub fn success(mut self, rc: RetCode) -> Self {
        self.inner.success = rc;
        self
    }

    /// Replaces the padding strategy.
    ///
    /// Any `Fn(&RetCode, Option<Value>) -> Envelope + Send + Sync` closure works, e.g. one
    /// that always writes `data`, even as `null`.
    pub fn padding<P: Padding + 'static>(mut self, padding: P) -> Self {
        self.inner.padding = Arc::new(padding);
        self
    }

    /// Finishes the config, ready to be passed around or [installed](RspConfig::install).
    pub fn build(self) -> RspConfig {
        self.inner
    }
}
