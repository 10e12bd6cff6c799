//! Security schemes inferred from the host's authentication setup.

use indexmap::IndexMap;
use swaggen_core::schema::SecurityScheme;

use crate::options::GeneratorOptions;

/// Source of the authentication scheme names configured in the host
pub trait AuthenticationSchemeProvider: Send + Sync {
    fn scheme_names(&self) -> Vec<String>;
}

impl AuthenticationSchemeProvider for Vec<String> {
    fn scheme_names(&self) -> Vec<String> {
        self.clone()
    }
}

/// Maps a `Bearer` scheme (any casing) to an HTTP bearer JWT scheme and
/// ignores everything else
#[must_use]
pub fn default_security_schemes(scheme_names: &[String]) -> IndexMap<String, SecurityScheme> {
    scheme_names
        .iter()
        .filter(|name| name.eq_ignore_ascii_case("Bearer"))
        .map(|name| (name.clone(), SecurityScheme::jwt_bearer()))
        .collect()
}

/// Explicit security schemes plus, when inference is enabled, the ones derived
/// from the authentication schemes. Explicit definitions win on name clashes.
pub(crate) fn security_schemes(
    options: &GeneratorOptions,
    provider: Option<&dyn AuthenticationSchemeProvider>,
) -> IndexMap<String, SecurityScheme> {
    let mut schemes = options.security_schemes.clone();
    if !options.infer_security_schemes {
        return schemes;
    }
    let Some(provider) = provider else {
        return schemes;
    };

    let names = provider.scheme_names();
    let inferred = match &options.security_schemes_selector {
        Some(selector) => selector(&names),
        None => default_security_schemes(&names),
    };
    for (name, scheme) in inferred {
        schemes.entry(name).or_insert(scheme);
    }
    schemes
}
