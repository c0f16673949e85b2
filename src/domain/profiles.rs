// SPDX-License-Identifier: MIT OR Apache-2.0

//! Active and default profiles, profile groups and profile expressions.

use crate::domain::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The name of the profile used when nothing else is active.
pub const RESERVED_DEFAULT_PROFILE: &str = "default";

/// Raw profile settings for one profile kind (active or default).
///
/// The engine gathers these from the environment and from the bound
/// `<ns>.profiles.active` / `<ns>.profiles.default` properties.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileSetting {
    /// The value of the profile property as seen directly by the environment.
    pub environment_property: Option<String>,
    /// The profiles currently reported by the environment.
    pub environment_profiles: Vec<String>,
    /// The profiles bound from the contributor tree, if the property was present.
    pub bound: Option<Vec<String>>,
}

/// Everything needed to compute a [`Profiles`] snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileInputs {
    /// Active profile settings.
    pub active: ProfileSetting,
    /// Default profile settings.
    pub default: ProfileSetting,
    /// Profiles supplied by the caller or declared via `<ns>.profiles.include`.
    pub additional: Vec<String>,
    /// Profile groups bound from `<ns>.profiles.group.<name>`.
    pub groups: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Copy)]
enum ProfileType {
    Active,
    Default,
}

impl ProfileType {
    fn merges_with_environment_profiles(self) -> bool {
        matches!(self, ProfileType::Active)
    }

    fn default_value(self) -> Vec<String> {
        match self {
            ProfileType::Active => Vec::new(),
            ProfileType::Default => vec![RESERVED_DEFAULT_PROFILE.to_string()],
        }
    }
}

/// A resolved snapshot of active, default and accepted profiles.
///
/// # Examples
///
/// ```
/// use layercfg::domain::profiles::{ProfileInputs, Profiles};
///
/// let mut inputs = ProfileInputs::default();
/// inputs.active.bound = Some(vec!["prod".to_string()]);
/// inputs.groups.insert("prod".to_string(), vec!["db".to_string(), "cache".to_string()]);
///
/// let profiles = Profiles::new(inputs);
/// assert_eq!(profiles.active(), ["prod", "db", "cache"]);
/// assert_eq!(profiles.default(), ["default"]);
/// assert!(profiles.is_accepted("db"));
/// assert!(!profiles.is_accepted("default"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profiles {
    groups: BTreeMap<String, Vec<String>>,
    active: Vec<String>,
    default: Vec<String>,
}

impl Profiles {
    /// Computes the profile snapshot from the gathered inputs.
    pub fn new(inputs: ProfileInputs) -> Self {
        let ProfileInputs {
            active,
            default,
            additional,
            groups,
        } = inputs;
        let activated = unique(
            additional
                .into_iter()
                .chain(select_profiles(active, ProfileType::Active)),
        );
        let defaults = select_profiles(default, ProfileType::Default);
        let active = expand_profiles(&groups, &activated);
        let default = expand_profiles(&groups, &defaults);
        Self {
            groups,
            active,
            default,
        }
    }

    /// Returns the expanded active profiles.
    pub fn active(&self) -> &[String] {
        &self.active
    }

    /// Returns the expanded default profiles.
    pub fn default(&self) -> &[String] {
        &self.default
    }

    /// Returns the active profiles if there are any, otherwise the defaults.
    pub fn accepted(&self) -> &[String] {
        if self.active.is_empty() {
            &self.default
        } else {
            &self.active
        }
    }

    /// Returns `true` if `profile` is one of the accepted profiles.
    pub fn is_accepted(&self, profile: &str) -> bool {
        self.accepted().iter().any(|p| p == profile)
    }

    /// Returns the profile groups used for expansion.
    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }
}

fn select_profiles(setting: ProfileSetting, profile_type: ProfileType) -> Vec<String> {
    let ProfileSetting {
        environment_property,
        environment_profiles,
        bound,
    } = setting;
    let property_profiles: Vec<String> = environment_property
        .as_deref()
        .map(|value| {
            value
                .split(',')
                .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let environment_profiles = unique(environment_profiles);
    let programmatic = has_programmatically_set_profiles(
        profile_type,
        environment_property.as_deref(),
        &unique(property_profiles),
        &environment_profiles,
    );
    if programmatic {
        return match bound {
            Some(bound) if profile_type.merges_with_environment_profiles() => {
                unique(environment_profiles.into_iter().chain(bound))
            }
            _ => environment_profiles,
        };
    }
    bound
        .map(unique)
        .unwrap_or_else(|| profile_type.default_value())
}

fn has_programmatically_set_profiles(
    profile_type: ProfileType,
    environment_property: Option<&str>,
    property_profiles: &[String],
    environment_profiles: &[String],
) -> bool {
    let default_value = profile_type.default_value();
    let has_text = environment_property.map_or(false, |v| !v.trim().is_empty());
    if !has_text {
        return !same_set(&default_value, environment_profiles);
    }
    if same_set(&default_value, environment_profiles) {
        return false;
    }
    !same_set(property_profiles, environment_profiles)
}

fn same_set(a: &[String], b: &[String]) -> bool {
    let a: HashSet<&String> = a.iter().collect();
    let b: HashSet<&String> = b.iter().collect();
    a == b
}

fn unique<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Expands profile groups depth first, keeping first-seen order.
///
/// Cycles are harmless: a profile already expanded is never pushed again.
pub fn expand_profiles(groups: &BTreeMap<String, Vec<String>>, profiles: &[String]) -> Vec<String> {
    let mut stack: Vec<&String> = profiles.iter().rev().collect();
    let mut seen = HashSet::new();
    let mut expanded = Vec::new();
    while let Some(current) = stack.pop() {
        if seen.insert(current.as_str()) {
            expanded.push(current.clone());
            if let Some(members) = groups.get(current) {
                stack.extend(members.iter().rev());
            }
        }
    }
    expanded
}

/// A parsed profile expression such as `prod & (eu | us)`.
///
/// # Examples
///
/// ```
/// use layercfg::domain::profiles::ProfileExpression;
///
/// let expression = ProfileExpression::parse("prod & !local").unwrap();
/// assert!(expression.matches(&|p| p == "prod"));
/// assert!(!expression.matches(&|p| p == "prod" || p == "local"));
/// assert!(ProfileExpression::parse("a & b | c").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileExpression {
    /// A single profile name.
    Profile(String),
    /// Negation of an expression.
    Not(Box<ProfileExpression>),
    /// All expressions must match.
    And(Vec<ProfileExpression>),
    /// At least one expression must match.
    Or(Vec<ProfileExpression>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ParseContext {
    None,
    Negate,
    Parenthesis,
}

impl ProfileExpression {
    /// Parses a single profile expression.
    pub fn parse(expression: &str) -> Result<Self> {
        if expression.trim().is_empty() {
            return Err(ConfigError::InvalidProfileExpression {
                expression: expression.to_string(),
            });
        }
        let tokens = tokenize(expression);
        let mut tokens = tokens.into_iter();
        parse_tokens(expression, &mut tokens, ParseContext::None)
    }

    /// Parses a list of expressions. The list matches if any expression matches.
    pub fn parse_all<S: AsRef<str>>(expressions: &[S]) -> Result<Vec<Self>> {
        expressions
            .iter()
            .map(|expression| Self::parse(expression.as_ref()))
            .collect()
    }

    /// Evaluates the expression against an acceptance predicate.
    pub fn matches(&self, is_accepted: &dyn Fn(&str) -> bool) -> bool {
        match self {
            ProfileExpression::Profile(name) => is_accepted(name),
            ProfileExpression::Not(inner) => !inner.matches(is_accepted),
            ProfileExpression::And(all) => all.iter().all(|e| e.matches(is_accepted)),
            ProfileExpression::Or(any) => any.iter().any(|e| e.matches(is_accepted)),
        }
    }
}

fn tokenize(expression: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in expression.chars() {
        if matches!(ch, '(' | ')' | '&' | '|' | '!') {
            if !current.trim().is_empty() {
                tokens.push(current.trim().to_string());
            }
            current.clear();
            tokens.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    tokens
}

fn parse_tokens(
    expression: &str,
    tokens: &mut std::vec::IntoIter<String>,
    context: ParseContext,
) -> Result<ProfileExpression> {
    let mut elements = Vec::new();
    let mut operator: Option<Operator> = None;
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "(" => {
                let contents = parse_tokens(expression, tokens, ParseContext::Parenthesis)?;
                if context == ParseContext::Negate {
                    return Ok(contents);
                }
                elements.push(contents);
            }
            "&" => {
                assert_well_formed(expression, operator != Some(Operator::Or))?;
                operator = Some(Operator::And);
            }
            "|" => {
                assert_well_formed(expression, operator != Some(Operator::And))?;
                operator = Some(Operator::Or);
            }
            "!" => {
                let negated = parse_tokens(expression, tokens, ParseContext::Negate)?;
                elements.push(ProfileExpression::Not(Box::new(negated)));
            }
            ")" => {
                let merged = merge(elements, operator);
                if context == ParseContext::Parenthesis {
                    return Ok(merged);
                }
                elements = vec![merged];
                operator = None;
            }
            name => {
                let value = ProfileExpression::Profile(name.to_string());
                if context == ParseContext::Negate {
                    return Ok(value);
                }
                elements.push(value);
            }
        }
    }
    Ok(merge(elements, operator))
}

fn merge(mut elements: Vec<ProfileExpression>, operator: Option<Operator>) -> ProfileExpression {
    if elements.len() == 1 {
        return elements.remove(0);
    }
    match operator {
        Some(Operator::Or) => ProfileExpression::Or(elements),
        _ => ProfileExpression::And(elements),
    }
}

fn assert_well_formed(expression: &str, well_formed: bool) -> Result<()> {
    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InvalidProfileExpression {
            expression: expression.to_string(),
        })
    }
}
