//! Application registry.
//!
//! The registry caches every dokku app with its metadata, domains and
//! config, and is the only way the rest of the program changes them.
//!
//! ## Write-through
//!
//! Every mutation runs the backend command first and touches the cache only
//! once the command has succeeded. A failed command leaves the cache exactly
//! as it was and comes back as [`Error::CommandFailed`].
//!
//! ## Refresh
//!
//! A refresh builds a complete new app set from four reports and swaps it in
//! at the end. If any command fails or any report fails its integrity
//! checks, the previous app set stays in place.

use crate::gateway::{Gateway, History};
use crate::models::{App, Config, Metadata, Snapshot};
use crate::report;
use crate::{Error, Result};

/// Shown where certificate expiry would go; dokku-letsencrypt isn't parsed.
pub const CERTIFICATE_PLACEHOLDER: &str = "LE placeholder";

/// Cache of dokku applications backed by a [`Gateway`].
pub struct Registry {
    gateway: Gateway,
    /// Apps in `apps:list` order
    apps: Vec<App>,
}

impl Registry {
    /// Create an empty registry. Call [`Registry::refresh`] to populate it.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            apps: Vec::new(),
        }
    }

    /// Re-read every app from the backend and replace the cache.
    pub fn refresh(&mut self) -> Result<()> {
        let apps = self.load_apps()?;
        tracing::info!(apps = apps.len(), "refreshed application registry");
        self.apps = apps;
        Ok(())
    }

    fn load_apps(&mut self) -> Result<Vec<App>> {
        let list = self.gateway.execute("apps:list", &[])?;
        let names = report::parse_app_list(&list);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let reports = self.gateway.execute("apps:report", &["--format", "json"])?;
        let metadata = report::parse_apps_report(&reports, &names)?;

        let domains_output = self.gateway.execute("domains:report", &[])?;
        let domains = report::parse_domains_report(&domains_output, &names)?;

        let mut apps = Vec::with_capacity(names.len());
        for ((name, metadata), domains) in names.into_iter().zip(metadata).zip(domains) {
            let config = self.load_config(&name)?;
            apps.push(App {
                name,
                metadata,
                domains,
                config,
            });
        }
        Ok(apps)
    }

    fn load_config(&mut self, app: &str) -> Result<Config> {
        let output = self
            .gateway
            .execute("config:export", &["--format=json", app])?;
        Ok(report::parse_config_export(&output, app)?)
    }

    /// Create an app, then refresh to pick up what dokku assigned to it.
    ///
    /// If the refresh fails the app exists on the backend but the previous
    /// cache is kept; the refresh error is returned.
    pub fn create_app(&mut self, name: &str) -> Result<()> {
        self.gateway.execute("apps:create", &[name])?;
        self.refresh()
    }

    /// Destroy an app (forced, no confirmation on the dokku side).
    pub fn destroy_app(&mut self, name: &str) -> Result<()> {
        let index = self.index_of(name)?;
        self.gateway
            .execute("apps:destroy", &["--force", name])?;
        self.apps.remove(index);
        Ok(())
    }

    /// Bind a hostname to an app.
    pub fn add_domain(&mut self, app: &str, domain: &str) -> Result<()> {
        let index = self.index_of(app)?;
        self.gateway.execute("domains:add", &[app, domain])?;
        self.apps[index].domains.push(domain.to_string());
        Ok(())
    }

    /// Set (or overwrite) one environment variable.
    pub fn set_config(&mut self, app: &str, key: &str, value: &str) -> Result<()> {
        let index = self.index_of(app)?;
        self.gateway.execute("config:set", &[app, key, value])?;
        self.apps[index]
            .config
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Remove one environment variable.
    pub fn unset_config(&mut self, app: &str, key: &str) -> Result<()> {
        let index = self.index_of(app)?;
        self.gateway.execute("config:unset", &[app, key])?;
        self.apps[index].config.remove(key);
        Ok(())
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.apps
            .iter()
            .position(|app| app.name == name)
            .ok_or_else(|| Error::NotFound(format!("app '{}'", name)))
    }

    pub fn apps(&self) -> &[App] {
        &self.apps
    }

    pub fn app_names(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.name.as_str()).collect()
    }

    pub fn app(&self, name: &str) -> Result<&App> {
        Ok(&self.apps[self.index_of(name)?])
    }

    pub fn metadata(&self, app: &str) -> Result<&Metadata> {
        Ok(&self.app(app)?.metadata)
    }

    pub fn domains(&self, app: &str) -> Result<&[String]> {
        Ok(&self.app(app)?.domains)
    }

    pub fn config(&self, app: &str) -> Result<&Config> {
        Ok(&self.app(app)?.config)
    }

    pub fn config_value(&self, app: &str, key: &str) -> Result<&str> {
        self.config(app)?
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::NotFound(format!("config key '{}' of app '{}'", key, app)))
    }

    /// Certificate expiry for an app's domains. Not implemented; always the
    /// same placeholder.
    pub fn certificate_expiry(&self, _app: &str) -> &'static str {
        CERTIFICATE_PLACEHOLDER
    }

    pub fn history(&self) -> &History {
        self.gateway.history()
    }

    pub fn clear_history(&mut self) {
        self.gateway.clear_history();
    }

    /// Owned copy of the current apps and history.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            apps: self.apps.clone(),
            history: self.gateway.history().clone(),
        }
    }
}
