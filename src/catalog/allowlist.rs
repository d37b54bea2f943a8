//! Commands the gateway is willing to expose

use std::collections::HashSet;

use crate::{Error, Result};

/// Every node command that may become an endpoint, in endpoint order
pub const ALLOWED_COMMANDS: &[&str] = &[
    // blockchain
    "getbestblockhash",
    "getblock",
    "getblockchaininfo",
    "getblockcount",
    "getblockhash",
    "getchaintips",
    "getdifficulty",
    "getmempoolinfo",
    // network
    "getconnectioncount",
    "getnettotals",
    "getnetworkinfo",
    "getpeerinfo",
    "getinfo",
    // transactions
    "getrawtransaction",
    "decoderawtransaction",
];

/// Allow-list with configured exclusions removed
///
/// Disabled names that are not on the allow-list are ignored with a
/// warning; configuration can only narrow the list.
#[must_use]
pub fn permitted_commands(disabled: &[String]) -> Vec<&'static str> {
    for name in disabled {
        if !ALLOWED_COMMANDS.contains(&name.as_str()) {
            tracing::warn!(command = %name, "disabled command is not on the allow-list");
        }
    }

    ALLOWED_COMMANDS
        .iter()
        .copied()
        .filter(|command| !disabled.iter().any(|d| d == command))
        .collect()
}

/// Check that every name is a unique, non-empty, single URL path segment
///
/// # Errors
///
/// Returns `Error::Catalog` naming the first offending entry
pub fn validate<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(Error::Catalog("allow-list contains an empty command name".into()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(Error::Catalog(format!(
                "command name `{name}` must match [a-z0-9_]+"
            )));
        }
        if !seen.insert(name) {
            return Err(Error::Catalog(format!("command `{name}` is listed twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_allow_list_is_valid() {
        assert!(validate(ALLOWED_COMMANDS).is_ok());
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!(validate(&[""]).is_err());
        assert!(validate(&["get/block"]).is_err());
        assert!(validate(&["GetBlock"]).is_err());
        assert!(validate(&["getblock", "getblock"]).is_err());
    }

    #[test]
    fn disabling_only_narrows() {
        let permitted = permitted_commands(&["getpeerinfo".to_string(), "stop".to_string()]);
        assert_eq!(permitted.len(), ALLOWED_COMMANDS.len() - 1);
        assert!(!permitted.contains(&"getpeerinfo"));
        assert!(!permitted.contains(&"stop"));
    }
}
