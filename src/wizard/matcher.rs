//! Field classification and dropdown choice.
//!
//! [`FieldMatcher`] is an ordered list of substring rules over a field
//! identifier; the first matching rule decides. Sites prepend their own rules
//! to suppress false positives such as "company name". [`OptionResolver`]
//! decides which dropdown option to pick.

use crate::profile::Profile;

use super::field::FieldDescriptor;

/// Which profile value a field receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSlot {
    Name,
    Email,
    Phone,
}

impl ProfileSlot {
    pub fn value<'a>(&self, profile: &'a Profile) -> &'a str {
        match self {
            ProfileSlot::Name => &profile.name,
            ProfileSlot::Email => &profile.email,
            ProfileSlot::Phone => &profile.phone,
        }
    }
}

/// What happens to a field that matches a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    Fill(ProfileSlot),
    /// Leave the field alone and stop looking at later rules.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    /// Lower-case substring searched in the field identifier.
    pub pattern: String,
    pub action: MatchAction,
}

impl MatchRule {
    pub fn fill(pattern: &str, slot: ProfileSlot) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            action: MatchAction::Fill(slot),
        }
    }

    pub fn ignore(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            action: MatchAction::Ignore,
        }
    }

    fn matches(&self, descriptor: &FieldDescriptor) -> bool {
        !self.pattern.is_empty() && descriptor.identifier.contains(&self.pattern)
    }
}

/// Ordered rule list; first match wins.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    rules: Vec<MatchRule>,
}

impl Default for FieldMatcher {
    fn default() -> Self {
        Self {
            rules: vec![
                MatchRule::fill("name", ProfileSlot::Name),
                MatchRule::fill("fullname", ProfileSlot::Name),
                MatchRule::fill("email", ProfileSlot::Email),
                MatchRule::fill("phone", ProfileSlot::Phone),
            ],
        }
    }
}

impl FieldMatcher {
    #[cfg(test)]
    pub fn new(rules: Vec<MatchRule>) -> Self {
        Self { rules }
    }

    /// Adds site-specific rules ahead of the existing ones.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = MatchRule>) -> Self {
        let mut rules: Vec<MatchRule> = overrides.into_iter().collect();
        rules.append(&mut self.rules);
        self.rules = rules;
        self
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// Slot for this field, or `None` when it must stay untouched.
    pub fn classify(&self, descriptor: &FieldDescriptor) -> Option<ProfileSlot> {
        if descriptor.identifier.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(descriptor))
            .and_then(|rule| match rule.action {
                MatchAction::Fill(slot) => Some(slot),
                MatchAction::Ignore => None,
            })
    }
}

/// Picks the option index to select in a dropdown.
pub trait OptionResolver {
    /// `options` are the visible option labels in order. `None` leaves the dropdown as is.
    fn resolve(&self, field: &FieldDescriptor, options: &[String]) -> Option<usize>;
}

/// Picks index 1, skipping what is usually a "Select an option" placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondOptionResolver;

impl OptionResolver for SecondOptionResolver {
    fn resolve(&self, _field: &FieldDescriptor, options: &[String]) -> Option<usize> {
        (options.len() > 1).then_some(1)
    }
}

/// Picks the first option whose label contains one of the preferred answers,
/// falling back to another resolver.
#[derive(Debug, Clone)]
pub struct PreferredAnswerResolver<R> {
    answers: Vec<String>,
    fallback: R,
}

impl<R: OptionResolver> PreferredAnswerResolver<R> {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>, fallback: R) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|answer| answer.into().to_lowercase())
                .collect(),
            fallback,
        }
    }
}

impl<R: OptionResolver> OptionResolver for PreferredAnswerResolver<R> {
    fn resolve(&self, field: &FieldDescriptor, options: &[String]) -> Option<usize> {
        self.answers
            .iter()
            .find_map(|answer| {
                options
                    .iter()
                    .position(|option| option.to_lowercase().contains(answer.as_str()))
            })
            .or_else(|| self.fallback.resolve(field, options))
    }
}
