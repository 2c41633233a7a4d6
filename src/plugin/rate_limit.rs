//! Rate-Limit Circuit Breaker
//!
//! When a plugin run fails with HTTP 429 the plugin is disabled for the
//! acting user's organization, for the organization's configured
//! rate-limit timeout. A plugin is only disabled when the throttled
//! credential is shared by the organization; a personal API key keeps the
//! plugin enabled for everybody else.

use crate::core::time::Clock;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::parameters::PluginParameters;
use crate::store::models::User;
use crate::store::traits::OrgConfigStore;
use log::{info, warn};
use std::sync::Arc;

/// What the breaker did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerDecision {
    /// The user is not in an organization
    NoMembership,
    /// The organization has no rate-limit timeout configured
    NoTimeout,
    /// The throttled key belongs to the user
    PersonalKey,
    Disabled,
    /// Another run disabled the plugin first
    AlreadyDisabled,
}

pub struct RateLimitBreaker {
    store: Arc<dyn OrgConfigStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimitBreaker {
    pub fn new(store: Arc<dyn OrgConfigStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Disable `plugin` for `user`'s organization after an HTTP 429
    ///
    /// `label` identifies the running instance in log messages.
    pub async fn disable_for_rate_limit(
        &self,
        plugin: &str,
        label: &str,
        user: &User,
        parameters: &PluginParameters,
    ) -> PluginResult<BreakerDecision> {
        info!("Trying to disable for rate limit {}", label);

        let Some(organization) = user.organization() else {
            info!("User {} is not in organization.", user.username);
            return Ok(BreakerDecision::NoMembership);
        };

        let config = self
            .store
            .get_or_create(organization, plugin)
            .await
            .map_err(|e| PluginError::store("get_or_create_org_configuration", e))?;

        if config.rate_limit_timeout.is_none() {
            warn!(
                "You are trying to disable {} for rate limit without specifying a timeout.",
                label
            );
            return Ok(BreakerDecision::NoTimeout);
        }

        let shared_credential = match parameters.api_key_parameter() {
            None => true,
            Some(key) => key.is_from_org || (!key.required && !key.has_value()),
        };
        if !shared_credential {
            warn!("Not disabling {} because api key used is personal", label);
            return Ok(BreakerDecision::PersonalKey);
        }

        let changed = self
            .store
            .disable_for_rate_limit(organization, plugin, self.clock.now())
            .await
            .map_err(|e| PluginError::store("disable_for_rate_limit", e))?;

        Ok(if changed {
            BreakerDecision::Disabled
        } else {
            BreakerDecision::AlreadyDisabled
        })
    }
}
