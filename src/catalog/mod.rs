//! Operation catalog
//!
//! Built once at startup from the allow-list and a [`SignatureSource`].
//! Each permitted command gets exactly one [`OperationDescriptor`]; commands
//! the source does not declare are kept with an empty parameter list and are
//! served through the positional fallback.

pub mod allowlist;
pub mod signature;

use indexmap::IndexMap;

use crate::conversion::ParamValue;
use crate::{Error, Result};

pub use allowlist::{ALLOWED_COMMANDS, permitted_commands};
pub use signature::{DeclaredSignature, Literal, RECEIVER, SignatureSource};

/// One formal parameter of a cataloged operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub has_default: bool,
    /// `Literal::Null` when the parameter has no default
    pub default: Literal,
}

impl ParameterSpec {
    /// Value substituted when the request does not supply this parameter
    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        self.default.into()
    }
}

/// Catalog entry for one permitted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: String,
    /// Whether the signature source declares this command
    pub has_cataloged_signature: bool,
    /// Parameters in declaration order, receiver removed
    pub params: Vec<ParameterSpec>,
}

/// Read-only map from command name to descriptor, in allow-list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    operations: IndexMap<String, OperationDescriptor>,
}

impl Catalog {
    /// Build the catalog for `permitted` commands
    ///
    /// # Errors
    ///
    /// Returns `Error::Catalog` if the allow-list is malformed or a declared
    /// signature is inconsistent
    pub fn build<S: AsRef<str>>(permitted: &[S], source: &impl SignatureSource) -> Result<Self> {
        allowlist::validate(permitted)?;

        let mut operations = IndexMap::with_capacity(permitted.len());
        for name in permitted {
            let name = name.as_ref();
            let descriptor = match source.signature(name) {
                Some(signature) => describe(name, signature)?,
                None => OperationDescriptor {
                    name: name.to_string(),
                    has_cataloged_signature: false,
                    params: Vec::new(),
                },
            };

            tracing::debug!(
                command = name,
                cataloged = descriptor.has_cataloged_signature,
                params = descriptor.params.len(),
                "cataloged command"
            );
            operations.insert(name.to_string(), descriptor);
        }

        Ok(Self { operations })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Descriptors in allow-list order
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.values()
    }
}

/// Strip the receiver and pair trailing parameters with their defaults
fn describe(name: &str, signature: DeclaredSignature<'_>) -> Result<OperationDescriptor> {
    let Some((&receiver, params)) = signature.params.split_first() else {
        return Err(Error::Catalog(format!("`{name}` declares no receiver")));
    };
    if receiver != RECEIVER {
        return Err(Error::Catalog(format!(
            "`{name}` must take `{RECEIVER}` first, found `{receiver}`"
        )));
    }
    if signature.defaults.len() > params.len() {
        return Err(Error::Catalog(format!(
            "`{name}` declares {} defaults for {} parameters",
            signature.defaults.len(),
            params.len()
        )));
    }

    let first_default = params.len() - signature.defaults.len();
    let params = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let default = index
                .checked_sub(first_default)
                .map(|offset| signature.defaults[offset]);
            ParameterSpec {
                name: (*param).to_string(),
                has_default: default.is_some(),
                default: default.unwrap_or(Literal::Null),
            }
        })
        .collect();

    Ok(OperationDescriptor {
        name: name.to_string(),
        has_cataloged_signature: true,
        params,
    })
}
