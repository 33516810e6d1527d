//! Language version feature flags consulted by checkers and resolution.

use rustc_hash::FxHashSet;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LanguageFeature {
    /// Permit `break`/`continue` to jump out through inline lambda bodies.
    BreakContinueInInlineLambdas,
    /// Allow `T & Any`-style definitely-non-null types in source.
    DefinitelyNonNullableTypes,
    /// Report narrowing of accessor visibility on non-overridable properties.
    ProhibitAccessorVisibilityNarrowing,
}

/// The set of features enabled for a compilation session.
#[derive(Clone, Debug, Default)]
pub struct LanguageFeatures {
    enabled: FxHashSet<LanguageFeature>,
}

impl LanguageFeatures {
    pub fn none() -> Self {
        LanguageFeatures::default()
    }

    /// Everything the current language version enables by default.
    pub fn latest() -> Self {
        let mut features = LanguageFeatures::default();
        features.enable(LanguageFeature::BreakContinueInInlineLambdas);
        features.enable(LanguageFeature::DefinitelyNonNullableTypes);
        features.enable(LanguageFeature::ProhibitAccessorVisibilityNarrowing);
        features
    }

    pub fn enable(&mut self, feature: LanguageFeature) -> &mut Self {
        self.enabled.insert(feature);
        self
    }

    pub fn disable(&mut self, feature: LanguageFeature) -> &mut Self {
        self.enabled.remove(&feature);
        self
    }

    pub fn supports(&self, feature: LanguageFeature) -> bool {
        self.enabled.contains(&feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_a_feature() {
        let mut features = LanguageFeatures::latest();
        assert!(features.supports(LanguageFeature::BreakContinueInInlineLambdas));
        features.disable(LanguageFeature::BreakContinueInInlineLambdas);
        assert!(!features.supports(LanguageFeature::BreakContinueInInlineLambdas));
    }
}
