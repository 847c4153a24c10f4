use core::fmt::{Debug, Display};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

const CONFIG_FILE: &str = "compclub.toml";
const ENV_PREFIX: &str = "COMPCLUB_";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MailConfig {
    /// Sender address of every status email.
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: "compclub@localhost".to_owned(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    pub database_url: String,
    #[serde(default)]
    pub mail: MailConfig,
}

const fn default_listen_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000))
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// `compclub.toml` overridden by `COMPCLUB_` environment variables, nested
/// keys separated by `__` (`COMPCLUB_MAIL__FROM`).
fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn file_with_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                listen_address = "0.0.0.0:8080"
                database_url = "postgres://localhost/compclub"

                [mail]
                from = "team@compclub.example"
                "#,
            )?;
            jail.set_env("COMPCLUB_MAIL__FROM", "staff@compclub.example");

            let config: Config = figment().extract()?;
            assert_eq!(config.listen_address.port(), 8080);
            assert_eq!(config.database_url, "postgres://localhost/compclub");
            assert_eq!(config.mail.from, "staff@compclub.example");
            Ok(())
        });
    }

    #[test]
    fn defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("COMPCLUB_DATABASE_URL", "postgres://db/compclub");

            let config: Config = figment().extract()?;
            assert_eq!(config.listen_address, default_listen_address());
            assert_eq!(config.mail, MailConfig::default());
            Ok(())
        });
    }

    #[test]
    fn database_url_is_required() {
        Jail::expect_with(|_jail| {
            assert!(figment().extract::<Config>().is_err());
            Ok(())
        });
    }
}
