//! Static registry of the exchanges whose SDK examples are mirrored.

use crate::errors::ConfigError;

/// Where a single exchange's examples come from and where they land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Registry key, always lowercase (e.g. `kraken`).
    pub key: &'static str,
    /// Upstream SDK repository name (e.g. `kraken-api`).
    pub repo_name: &'static str,
    /// Published package examples import from after transformation.
    pub package_name: &'static str,
    /// Case-sensitive destination folder under the examples root.
    pub dest_folder: &'static str,
    /// Directory names skipped at any depth while collecting files.
    pub exclude_folders: &'static [&'static str],
    /// Explicit clone URL, overriding the `<base>/<repo_name>.git` convention.
    pub repo_url: Option<&'static str>,
}

const APIDOC: &[&str] = &["apidoc"];

/// All known exchanges, in display order.
pub const EXCHANGES: &[ExchangeConfig] = &[
    ExchangeConfig {
        key: "binance",
        repo_name: "binance",
        package_name: "binance",
        dest_folder: "Binance",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "bitget",
        repo_name: "bitget-api",
        package_name: "bitget-api",
        dest_folder: "Bitget",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "bitmart",
        repo_name: "bitmart-api",
        package_name: "bitmart-api",
        dest_folder: "Bitmart",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "bybit",
        repo_name: "bybit-api",
        package_name: "bybit-api",
        dest_folder: "Bybit",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "coinbase",
        repo_name: "coinbase-api",
        package_name: "coinbase-api",
        dest_folder: "Coinbase",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "gate",
        repo_name: "gateio-api",
        package_name: "gateio-api",
        dest_folder: "Gate",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "kraken",
        repo_name: "kraken-api",
        package_name: "@siebly/kraken-api",
        dest_folder: "Kraken",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "kucoin",
        repo_name: "kucoin-api",
        package_name: "kucoin-api",
        dest_folder: "Kucoin",
        exclude_folders: APIDOC,
        repo_url: None,
    },
    ExchangeConfig {
        key: "okx",
        repo_name: "okx-api",
        package_name: "okx-api",
        dest_folder: "OKX",
        exclude_folders: APIDOC,
        repo_url: None,
    },
];

impl ExchangeConfig {
    /// Clone URL for the SDK repository.
    ///
    /// `override_url` (from the tool configuration) wins over the static
    /// entry, which wins over `{base_url}/{repo_name}.git`.
    pub fn clone_url(&self, base_url: &str, override_url: Option<&str>) -> String {
        if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        if let Some(url) = self.repo_url {
            return url.to_string();
        }
        format!("{}/{}.git", base_url.trim_end_matches('/'), self.repo_name)
    }

    /// Whether `name` should be skipped during traversal.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_folders.contains(&name)
    }
}

/// Registry keys in display order.
pub fn available_keys() -> Vec<&'static str> {
    EXCHANGES.iter().map(|e| e.key).collect()
}

/// Look up an exchange by key, ignoring ASCII case.
pub fn lookup(name: &str) -> Result<&'static ExchangeConfig, ConfigError> {
    let wanted = name.trim();
    EXCHANGES
        .iter()
        .find(|e| e.key.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ConfigError::UnknownExchange {
            name: name.to_string(),
            available: available_keys().into_iter().map(String::from).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let okx = lookup("OKX").unwrap();
        assert_eq!(okx.key, "okx");
        assert_eq!(okx.dest_folder, "OKX");

        let kraken = lookup("Kraken").unwrap();
        assert_eq!(kraken.package_name, "@siebly/kraken-api");
    }

    #[test]
    fn test_lookup_unknown_lists_all_keys() {
        match lookup("ftx") {
            Err(ConfigError::UnknownExchange { name, available }) => {
                assert_eq!(name, "ftx");
                assert_eq!(available.len(), 9);
                assert!(available.contains(&"gate".to_string()));
            }
            other => panic!("expected UnknownExchange, got {:?}", other),
        }
    }

    #[test]
    fn test_registry_keys_are_unique_and_lowercase() {
        let keys = available_keys();
        for key in &keys {
            assert_eq!(*key, key.to_lowercase());
            assert_eq!(keys.iter().filter(|k| *k == key).count(), 1);
        }
    }

    #[test]
    fn test_every_exchange_excludes_apidoc() {
        assert!(EXCHANGES.iter().all(|e| e.is_excluded("apidoc")));
        assert!(!EXCHANGES[0].is_excluded("Rest"));
    }

    #[test]
    fn test_clone_url_resolution() {
        let gate = lookup("gate").unwrap();
        assert_eq!(
            gate.clone_url("https://github.com/tiagosiebler/", None),
            "https://github.com/tiagosiebler/gateio-api.git"
        );
        assert_eq!(
            gate.clone_url("https://github.com/tiagosiebler", Some("/srv/mirror/gate")),
            "/srv/mirror/gate"
        );
        assert_eq!(
            gate.clone_url("https://github.com/tiagosiebler", Some("  ")),
            "https://github.com/tiagosiebler/gateio-api.git"
        );
    }
}
