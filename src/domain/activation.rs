// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activation context and activation conditions.

use crate::domain::errors::Result;
use crate::domain::profiles::{ProfileExpression, Profiles};

/// The context used to decide whether a contributor is active.
///
/// Profiles are absent until the engine has bound enough of the tree to compute
/// them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationContext {
    profiles: Option<Profiles>,
}

impl ActivationContext {
    /// Creates a context without profiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with the given profiles.
    pub fn with_profiles(&self, profiles: Profiles) -> Self {
        Self {
            profiles: Some(profiles),
        }
    }

    /// Returns the profiles, if known.
    pub fn profiles(&self) -> Option<&Profiles> {
        self.profiles.as_ref()
    }
}

/// The `<ns>.config.activate.*` condition of a property source.
///
/// # Examples
///
/// ```
/// use layercfg::domain::activation::{ActivationContext, Activation};
/// use layercfg::domain::profiles::{ProfileInputs, Profiles};
///
/// let activation = Activation::on_profiles(&["prod"]).unwrap();
/// assert!(!activation.is_active(None));
/// assert!(!activation.is_active(Some(&ActivationContext::new())));
///
/// let mut inputs = ProfileInputs::default();
/// inputs.active.bound = Some(vec!["prod".to_string()]);
/// let context = ActivationContext::new().with_profiles(Profiles::new(inputs));
/// assert!(activation.is_active(Some(&context)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Activation {
    on_profile: Option<Vec<ProfileExpression>>,
}

impl Activation {
    /// Creates an activation condition that requires one of the profile expressions.
    pub fn on_profiles<S: AsRef<str>>(expressions: &[S]) -> Result<Self> {
        let on_profile = if expressions.is_empty() {
            None
        } else {
            Some(ProfileExpression::parse_all(expressions)?)
        };
        Ok(Self { on_profile })
    }

    /// Returns `true` if the condition depends on profiles.
    pub fn is_profile_dependent(&self) -> bool {
        self.on_profile.is_some()
    }

    /// Evaluates the condition.
    ///
    /// Without any context nothing carrying a condition is active.
    pub fn is_active(&self, context: Option<&ActivationContext>) -> bool {
        let Some(context) = context else {
            return false;
        };
        match &self.on_profile {
            None => true,
            Some(expressions) => match context.profiles() {
                None => false,
                Some(profiles) => {
                    let accepted = |profile: &str| profiles.is_accepted(profile);
                    expressions.iter().any(|e| e.matches(&accepted))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profiles::ProfileInputs;

    fn context_with(active: &[&str]) -> ActivationContext {
        let mut inputs = ProfileInputs::default();
        inputs.active.bound = Some(active.iter().map(|s| s.to_string()).collect());
        ActivationContext::new().with_profiles(Profiles::new(inputs))
    }

    #[test]
    fn test_empty_condition() {
        let activation = Activation::default();
        assert!(!activation.is_profile_dependent());
        assert!(!activation.is_active(None));
        assert!(activation.is_active(Some(&ActivationContext::new())));
    }

    #[test]
    fn test_profile_condition_needs_profiles() {
        let activation = Activation::on_profiles(&["dev"]).unwrap();
        assert!(activation.is_profile_dependent());
        assert!(!activation.is_active(Some(&ActivationContext::new())));
        assert!(activation.is_active(Some(&context_with(&["dev"]))));
        assert!(!activation.is_active(Some(&context_with(&["prod"]))));
    }

    #[test]
    fn test_any_expression_matches() {
        let activation = Activation::on_profiles(&["dev", "prod & eu"]).unwrap();
        assert!(activation.is_active(Some(&context_with(&["prod", "eu"]))));
        assert!(!activation.is_active(Some(&context_with(&["prod"]))));
    }

    #[test]
    fn test_default_profile_is_accepted_when_nothing_active() {
        let activation = Activation::on_profiles(&["default"]).unwrap();
        let context = ActivationContext::new().with_profiles(Profiles::new(ProfileInputs::default()));
        assert!(activation.is_active(Some(&context)));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(Activation::on_profiles(&["a & b | c"]).is_err());
    }
}
