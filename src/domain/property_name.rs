// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured configuration property names.
//!
//! A [`PropertyName`] is a dotted, optionally indexed key such as
//! `server.hosts[0].name`. Names are immutable: derived names produced by
//! [`PropertyName::append`], [`PropertyName::chop`] or [`PropertyName::sub_name`]
//! share element storage with the name they came from.
//!
//! Equality is deliberately loose so that `foo-bar`, `fooBar` and `foo_bar` all
//! address the same property, while `foo.bar` and `foobar` stay distinct.

use crate::domain::errors::{ConfigError, Result};
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// The classification of a single name element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// No valid characters seen yet. Never stored in a name.
    Empty,
    /// Lowercase letters and digits only.
    Uniform,
    /// Lowercase letters, digits and interior dashes.
    Dashed,
    /// Anything else (uppercase, underscores, ...). Only produced by adaptation.
    NonUniform,
    /// A bracketed, non-numeric index such as `[key]`.
    Indexed,
    /// A bracketed numeric index such as `[0]`.
    NumericallyIndexed,
}

impl ElementKind {
    /// Returns `true` for bracketed elements.
    pub fn is_indexed(self) -> bool {
        matches!(self, ElementKind::Indexed | ElementKind::NumericallyIndexed)
    }

    fn allows_fast_equality_check(self) -> bool {
        matches!(self, ElementKind::Uniform | ElementKind::NumericallyIndexed)
    }

    fn allows_dash_ignoring_equality_check(self) -> bool {
        self.allows_fast_equality_check() || self == ElementKind::Dashed
    }
}

/// Rendering forms for name elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Form {
    /// The element as written, with characters that can never be valid removed.
    Original,
    /// Lowercase letters, digits and dashes.
    Dashed,
    /// Lowercase letters and digits.
    Uniform,
}

#[derive(Clone, Debug)]
struct Element {
    value: Box<str>,
    kind: ElementKind,
    uniform: OnceCell<Box<str>>,
}

impl Element {
    fn new(value: &str, kind: ElementKind) -> Self {
        Self {
            value: value.into(),
            kind,
            uniform: OnceCell::new(),
        }
    }
}

/// An immutable, structured configuration property name.
///
/// # Examples
///
/// ```
/// use layercfg::domain::property_name::PropertyName;
///
/// let name = PropertyName::parse("server.hosts[0].name").unwrap();
/// assert_eq!(name.number_of_elements(), 4);
/// assert!(name.is_numeric_index(2));
/// assert!(!name.is_indexed(1));
///
/// let parent = PropertyName::parse("server.hosts[0]").unwrap();
/// assert!(parent.is_parent_of(&name));
/// ```
#[derive(Clone)]
pub struct PropertyName {
    elements: Arc<[Element]>,
    start: usize,
    end: usize,
    string: OnceCell<String>,
    hash: OnceCell<i32>,
}

impl PropertyName {
    /// The name with no elements.
    pub fn empty() -> Self {
        Self::from_elements(Vec::new())
    }

    fn from_elements(elements: Vec<Element>) -> Self {
        let end = elements.len();
        Self {
            elements: elements.into(),
            start: 0,
            end,
            string: OnceCell::new(),
            hash: OnceCell::new(),
        }
    }

    fn shared(&self, start: usize, end: usize) -> Self {
        Self {
            elements: Arc::clone(&self.elements),
            start,
            end,
            string: OnceCell::new(),
            hash: OnceCell::new(),
        }
    }

    fn el(&self, index: usize) -> &Element {
        &self.elements[self.start + index]
    }

    /// Parses a name in strict mode.
    ///
    /// Returns [`ConfigError::InvalidName`] when the name starts or ends with a
    /// dot or contains an element with characters other than lowercase letters,
    /// digits and interior dashes.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::property_name::PropertyName;
    ///
    /// assert!(PropertyName::parse("app.config.on-not-found").is_ok());
    /// assert!(PropertyName::parse("app.Config").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Ok(Self::empty());
        }
        if name.starts_with('.') || name.ends_with('.') {
            return Err(ConfigError::InvalidName {
                name: name.to_string(),
                invalid_chars: vec!['.'],
            });
        }
        let elements = ElementsParser::new(name, '.').parse(None);
        if let Some(invalid) = elements
            .iter()
            .find(|element| element.kind == ElementKind::NonUniform)
        {
            let invalid_chars = invalid
                .value
                .chars()
                .enumerate()
                .filter(|(index, ch)| !is_valid_char(*ch, *index))
                .map(|(_, ch)| ch)
                .collect();
            return Err(ConfigError::InvalidName {
                name: name.to_string(),
                invalid_chars,
            });
        }
        Ok(Self::from_elements(elements))
    }

    /// Parses a name in strict mode, returning `None` if it is not valid.
    pub fn parse_if_valid(name: &str) -> Option<Self> {
        Self::parse(name).ok()
    }

    /// Returns `true` if `name` parses in strict mode.
    pub fn is_valid(name: &str) -> bool {
        Self::parse(name).is_ok()
    }

    /// Leniently adapts an arbitrary string into a name using `separator`.
    ///
    /// Adaptation never fails. Elements that strict parsing would reject are kept
    /// as [`ElementKind::NonUniform`]; an input with no usable element yields the
    /// empty name.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::property_name::PropertyName;
    ///
    /// let adapted = PropertyName::adapt("fooBar", '.');
    /// assert_eq!(adapted, PropertyName::parse("foo-bar").unwrap());
    /// ```
    pub fn adapt(name: &str, separator: char) -> Self {
        Self::adapt_elements(name, separator, None)
    }

    /// Adapts `name`, rewriting every element with `processor` first.
    ///
    /// The processor output is re-classified; an output that does not form exactly
    /// one element leaves the original element untouched.
    pub fn adapt_with<F>(name: &str, separator: char, processor: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self::adapt_elements(name, separator, Some(&processor))
    }

    fn adapt_elements(
        name: &str,
        separator: char,
        processor: Option<&dyn Fn(&str) -> String>,
    ) -> Self {
        if name.is_empty() {
            return Self::empty();
        }
        Self::from_elements(ElementsParser::new(name, separator).parse(processor))
    }

    /// Returns `true` if the name has no elements.
    pub fn is_empty(&self) -> bool {
        self.number_of_elements() == 0
    }

    /// Returns the number of elements.
    pub fn number_of_elements(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the element at `index` is bracketed.
    pub fn is_indexed(&self, index: usize) -> bool {
        self.el(index).kind.is_indexed()
    }

    /// Returns `true` if the element at `index` is a numeric index.
    pub fn is_numeric_index(&self, index: usize) -> bool {
        self.el(index).kind == ElementKind::NumericallyIndexed
    }

    /// Returns the kind of the element at `index`.
    pub fn element_kind(&self, index: usize) -> ElementKind {
        self.el(index).kind
    }

    /// Returns `true` if the final element is bracketed.
    pub fn is_last_element_indexed(&self) -> bool {
        let size = self.number_of_elements();
        size > 0 && self.is_indexed(size - 1)
    }

    /// Returns `true` if any element is bracketed.
    pub fn has_indexed_element(&self) -> bool {
        (0..self.number_of_elements()).any(|i| self.is_indexed(i))
    }

    /// Returns the last element in the requested form, or `""` for the empty name.
    pub fn last_element(&self, form: Form) -> Cow<'_, str> {
        match self.number_of_elements() {
            0 => Cow::Borrowed(""),
            size => self.element(size - 1, form),
        }
    }

    /// Returns the element at `index` rendered in `form`.
    pub fn element(&self, index: usize, form: Form) -> Cow<'_, str> {
        let element = self.el(index);
        let kind = element.kind;
        if kind.is_indexed() {
            return Cow::Borrowed(&element.value);
        }
        match form {
            Form::Original if kind != ElementKind::NonUniform => Cow::Borrowed(&element.value),
            Form::Original => Cow::Owned(convert_element(&element.value, false, |ch, i| {
                ch == '_' || is_valid_char(lowercase(ch), i)
            })),
            Form::Dashed if matches!(kind, ElementKind::Uniform | ElementKind::Dashed) => {
                Cow::Borrowed(&element.value)
            }
            Form::Dashed => Cow::Owned(convert_element(&element.value, true, is_valid_char)),
            Form::Uniform => Cow::Borrowed(element.uniform.get_or_init(|| {
                if kind == ElementKind::Uniform {
                    element.value.clone()
                } else {
                    convert_element(&element.value, true, |ch, _| is_alpha_numeric(ch)).into()
                }
            })),
        }
    }

    /// Appends a (usually single element) suffix parsed in strict mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::property_name::PropertyName;
    ///
    /// let name = PropertyName::parse("app.profiles.include").unwrap();
    /// assert_eq!(name.append("[0]").unwrap().to_string(), "app.profiles.include[0]");
    /// ```
    pub fn append(&self, suffix: &str) -> Result<Self> {
        if suffix.is_empty() {
            return Ok(self.clone());
        }
        Ok(self.append_name(&Self::parse(suffix)?))
    }

    /// Appends all elements of another name.
    pub fn append_name(&self, suffix: &PropertyName) -> Self {
        if suffix.is_empty() {
            return self.clone();
        }
        let elements = (0..self.number_of_elements())
            .map(|i| self.el(i).clone())
            .chain((0..suffix.number_of_elements()).map(|i| suffix.el(i).clone()))
            .collect();
        Self::from_elements(elements)
    }

    /// Returns the parent name, or the empty name for single element names.
    pub fn parent(&self) -> Self {
        match self.number_of_elements() {
            0 | 1 => Self::empty(),
            size => self.chop(size - 1),
        }
    }

    /// Returns a name holding only the first `size` elements.
    pub fn chop(&self, size: usize) -> Self {
        if size >= self.number_of_elements() {
            return self.clone();
        }
        self.shared(self.start, self.start + size)
    }

    /// Returns a name holding the elements from `offset` onwards.
    ///
    /// An offset at or past the end yields the empty name.
    pub fn sub_name(&self, offset: usize) -> Self {
        if offset == 0 {
            return self.clone();
        }
        if offset >= self.number_of_elements() {
            return Self::empty();
        }
        self.shared(self.start + offset, self.end)
    }

    /// Returns `true` if this name is the direct parent of `name`.
    pub fn is_parent_of(&self, name: &PropertyName) -> bool {
        self.number_of_elements() + 1 == name.number_of_elements() && self.is_ancestor_of(name)
    }

    /// Returns `true` if this name is a strict ancestor of `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::property_name::PropertyName;
    ///
    /// let name = PropertyName::parse("server.hosts[0].name").unwrap();
    /// let child = PropertyName::parse("server.hosts[0].name.first").unwrap();
    /// assert!(name.is_ancestor_of(&child));
    /// assert!(!name.is_ancestor_of(&name));
    /// ```
    pub fn is_ancestor_of(&self, name: &PropertyName) -> bool {
        self.number_of_elements() < name.number_of_elements() && self.elements_equal(name)
    }

    fn elements_equal(&self, other: &PropertyName) -> bool {
        (0..self.number_of_elements())
            .rev()
            .all(|i| elements_match(self.el(i), other.el(i)))
    }

    fn compute_hash(&self) -> i32 {
        let mut hash: i32 = 0;
        for i in 0..self.number_of_elements() {
            let element = self.el(i);
            let indexed = element.kind.is_indexed();
            let mut element_hash: i32 = 0;
            for ch in element.value.chars() {
                let ch = if indexed { ch } else { lowercase(ch) };
                if is_alpha_numeric(ch) {
                    element_hash = element_hash.wrapping_mul(31).wrapping_add(ch as i32);
                }
            }
            hash = hash.wrapping_mul(31).wrapping_add(element_hash);
        }
        hash
    }

    /// Returns the 31-based polynomial hash shared by all equal names.
    pub fn hash_code(&self) -> i32 {
        *self.hash.get_or_init(|| self.compute_hash())
    }

    fn build_string(&self) -> String {
        let mut result = String::with_capacity(self.number_of_elements() * 8);
        for i in 0..self.number_of_elements() {
            if self.is_indexed(i) {
                result.push('[');
                result.push_str(&self.element(i, Form::Original));
                result.push(']');
            } else {
                if !result.is_empty() {
                    result.push('.');
                }
                result.push_str(&self.element(i, Form::Dashed));
            }
        }
        result
    }

    /// Returns the rendered name as a string slice.
    pub fn as_str(&self) -> &str {
        self.string.get_or_init(|| self.build_string())
    }
}

fn elements_match(e1: &Element, e2: &Element) -> bool {
    if e1.kind.allows_fast_equality_check() && e2.kind.allows_fast_equality_check() {
        return e1.value == e2.value;
    }
    if e1.kind.allows_dash_ignoring_equality_check() && e2.kind.allows_dash_ignoring_equality_check()
    {
        return dash_ignoring_equals(e1.value.as_bytes(), e2.value.as_bytes());
    }
    default_equals(e1, e2)
}

// Both sides are ASCII here: uniform, dashed and numeric elements never hold anything else.
fn dash_ignoring_equals(v1: &[u8], v2: &[u8]) -> bool {
    let (mut i1, mut i2) = (0, 0);
    while i1 < v1.len() || i2 < v2.len() {
        if i1 >= v1.len() || i2 >= v2.len() {
            return false;
        }
        let (ch1, ch2) = (v1[i1], v2[i2]);
        if ch1 == b'-' {
            i1 += 1;
        } else if ch2 == b'-' {
            i2 += 1;
        } else if ch1 != ch2 {
            return false;
        } else {
            i1 += 1;
            i2 += 1;
        }
    }
    true
}

fn default_equals(e1: &Element, e2: &Element) -> bool {
    let c1: Vec<char> = e1.value.chars().collect();
    let c2: Vec<char> = e2.value.chars().collect();
    let indexed1 = e1.kind.is_indexed();
    let indexed2 = e2.kind.is_indexed();
    let (mut i1, mut i2) = (0, 0);
    while i1 < c1.len() {
        if i2 >= c2.len() {
            return remainder_is_not_alpha_numeric(&c1[i1..], indexed1);
        }
        let ch1 = if indexed1 { c1[i1] } else { lowercase(c1[i1]) };
        let ch2 = if indexed2 { c2[i2] } else { lowercase(c2[i2]) };
        if !indexed1 && !is_alpha_numeric(ch1) {
            i1 += 1;
        } else if !indexed2 && !is_alpha_numeric(ch2) {
            i2 += 1;
        } else if ch1 != ch2 {
            return false;
        } else {
            i1 += 1;
            i2 += 1;
        }
    }
    if i2 < c2.len() {
        return remainder_is_not_alpha_numeric(&c2[i2..], indexed2);
    }
    true
}

fn remainder_is_not_alpha_numeric(remainder: &[char], indexed: bool) -> bool {
    !indexed && remainder.iter().all(|ch| !is_alpha_numeric(lowercase(*ch)))
}

fn compare_elements(e1: &str, kind1: ElementKind, e2: &str, kind2: ElementKind) -> Ordering {
    let result = kind2.is_indexed().cmp(&kind1.is_indexed());
    if result != Ordering::Equal {
        return result;
    }
    if kind1 == ElementKind::NumericallyIndexed && kind2 == ElementKind::NumericallyIndexed {
        return compare_numeric(e1, e2);
    }
    e1.cmp(e2)
}

fn compare_numeric(v1: &str, v2: &str) -> Ordering {
    let v1 = v1.trim_start_matches('0');
    let v2 = v2.trim_start_matches('0');
    v1.len().cmp(&v2.len()).then_with(|| v1.cmp(v2))
}

fn convert_element<F>(element: &str, lowercase_chars: bool, filter: F) -> String
where
    F: Fn(char, usize) -> bool,
{
    let mut result = String::with_capacity(element.len());
    for (i, ch) in element.chars().enumerate() {
        let ch = if lowercase_chars { lowercase(ch) } else { ch };
        if filter(ch, i) {
            result.push(ch);
        }
    }
    result
}

fn lowercase(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

fn is_valid_char(ch: char, index: usize) -> bool {
    is_alpha_numeric(ch) || (index != 0 && ch == '-')
}

fn is_alpha_numeric(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit()
}

/// Splits raw names into classified elements.
struct ElementsParser<'a> {
    source: &'a str,
    separator: char,
    elements: Vec<Element>,
}

impl<'a> ElementsParser<'a> {
    fn new(source: &'a str, separator: char) -> Self {
        Self {
            source,
            separator,
            elements: Vec::with_capacity(6),
        }
    }

    fn parse(mut self, processor: Option<&dyn Fn(&str) -> String>) -> Vec<Element> {
        let mut open_brackets: i32 = 0;
        let mut start = 0;
        let mut start_char = 0;
        let mut kind = ElementKind::Empty;
        for (char_index, (i, ch)) in self.source.char_indices().enumerate() {
            if ch == '[' {
                if open_brackets == 0 {
                    self.add(start, i, kind, processor);
                    start = i + 1;
                    start_char = char_index + 1;
                    kind = ElementKind::NumericallyIndexed;
                }
                open_brackets += 1;
            } else if ch == ']' {
                open_brackets -= 1;
                if open_brackets == 0 {
                    self.add(start, i, kind, processor);
                    start = i + 1;
                    start_char = char_index + 1;
                    kind = ElementKind::Empty;
                }
            } else if !kind.is_indexed() && ch == self.separator {
                self.add(start, i, kind, processor);
                start = i + ch.len_utf8();
                start_char = char_index + 1;
                kind = ElementKind::Empty;
            } else {
                kind = update_kind(kind, ch, char_index - start_char);
            }
        }
        if open_brackets != 0 {
            kind = ElementKind::NonUniform;
        }
        self.add(start, self.source.len(), kind, processor);
        self.elements
    }

    fn add(
        &mut self,
        start: usize,
        end: usize,
        kind: ElementKind,
        processor: Option<&dyn Fn(&str) -> String>,
    ) {
        if end <= start || kind == ElementKind::Empty {
            return;
        }
        let raw = &self.source[start..end];
        if let Some(processor) = processor {
            let processed = processor(raw);
            let mut reparsed = ElementsParser::new(&processed, '.').parse(None);
            if reparsed.len() == 1 {
                self.elements.push(reparsed.remove(0));
                return;
            }
        }
        self.elements.push(Element::new(raw, kind));
    }
}

fn update_kind(existing: ElementKind, ch: char, index: usize) -> ElementKind {
    if existing.is_indexed() {
        if existing == ElementKind::NumericallyIndexed && !ch.is_ascii_digit() {
            return ElementKind::Indexed;
        }
        return existing;
    }
    if existing == ElementKind::Empty && is_valid_char(ch, index) {
        return if index == 0 {
            ElementKind::Uniform
        } else {
            ElementKind::NonUniform
        };
    }
    if existing == ElementKind::Uniform && ch == '-' {
        return ElementKind::Dashed;
    }
    if !is_valid_char(ch, index) {
        if existing == ElementKind::Empty && !is_valid_char(lowercase(ch), index) {
            return ElementKind::Empty;
        }
        return ElementKind::NonUniform;
    }
    existing
}

impl PartialEq for PropertyName {
    fn eq(&self, other: &Self) -> bool {
        self.number_of_elements() == other.number_of_elements() && self.elements_equal(other)
    }
}

impl Eq for PropertyName {}

impl Hash for PropertyName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

/// Orders names element by element on their uniform forms, numeric indexes by value.
///
/// This ordering is coarser than equality: names such as `foo-` and `foo`, or
/// `a[007]` and `a[7]`, compare as `Equal` while `==` tells them apart. Do not
/// key ordered collections by `PropertyName` when such names may coexist; key
/// them by [`PropertyName::as_str`] or use a hashed collection instead.
impl Ord for PropertyName {
    fn cmp(&self, other: &Self) -> Ordering {
        let (l1, l2) = (self.number_of_elements(), other.number_of_elements());
        for i in 0..l1.max(l2) {
            if i >= l1 {
                return Ordering::Less;
            }
            if i >= l2 {
                return Ordering::Greater;
            }
            let result = compare_elements(
                &self.element(i, Form::Uniform),
                self.el(i).kind,
                &other.element(i, Form::Uniform),
                other.el(i).kind,
            );
            if result != Ordering::Equal {
                return result;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PropertyName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyName({:?})", self.as_str())
    }
}

impl FromStr for PropertyName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PropertyName {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl Default for PropertyName {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    fn name(raw: &str) -> PropertyName {
        PropertyName::parse(raw).unwrap()
    }

    fn hash_of(name: &PropertyName) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_parse_simple() {
        let n = name("foo.bar");
        assert_eq!(n.number_of_elements(), 2);
        assert_eq!(n.element(0, Form::Original), "foo");
        assert_eq!(n.element(1, Form::Original), "bar");
        assert_eq!(n.element_kind(0), ElementKind::Uniform);
    }

    #[test]
    fn test_parse_empty() {
        let n = name("");
        assert!(n.is_empty());
        assert_eq!(n.to_string(), "");
    }

    #[test]
    fn test_parse_dashed() {
        let n = name("foo-bar.baz");
        assert_eq!(n.element_kind(0), ElementKind::Dashed);
        assert_eq!(n.element(0, Form::Uniform), "foobar");
        assert_eq!(n.element(0, Form::Dashed), "foo-bar");
    }

    #[test]
    fn test_parse_indexed() {
        let n = name("foo[0].bar[baz]");
        assert_eq!(n.number_of_elements(), 4);
        assert!(n.is_numeric_index(1));
        assert!(n.is_indexed(3));
        assert!(!n.is_numeric_index(3));
        assert_eq!(n.element(3, Form::Uniform), "baz");
        assert_eq!(n.to_string(), "foo[0].bar[baz]");
    }

    #[test]
    fn test_parse_indexed_with_dots() {
        let n = name("foo[a.b].bar");
        assert_eq!(n.number_of_elements(), 3);
        assert_eq!(n.element(1, Form::Original), "a.b");
    }

    #[test]
    fn test_parse_rejects_leading_dot() {
        let err = PropertyName::parse(".foo").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { ref invalid_chars, .. } if invalid_chars == &vec!['.']));
    }

    #[test]
    fn test_parse_rejects_trailing_dot() {
        assert!(PropertyName::parse("foo.").is_err());
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        let err = PropertyName::parse("foo.fooBar").unwrap_err();
        match err {
            ConfigError::InvalidName { invalid_chars, .. } => assert_eq!(invalid_chars, vec!['B']),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_underscore() {
        assert!(PropertyName::parse("foo_bar").is_err());
        assert!(!PropertyName::is_valid("foo_bar"));
        assert!(PropertyName::parse_if_valid("foo_bar").is_none());
    }

    #[test]
    fn test_parse_rejects_leading_dash_element() {
        assert!(PropertyName::parse("foo.-bar").is_err());
    }

    #[test]
    fn test_parse_drops_empty_elements() {
        let n = name("foo..bar");
        assert_eq!(n.number_of_elements(), 2);
    }

    #[test]
    fn test_parse_unbalanced_bracket_is_invalid() {
        assert!(PropertyName::parse("foo[0").is_err());
    }

    #[test]
    fn test_adapt_keeps_non_uniform() {
        let n = PropertyName::adapt("Foo_Bar.baz", '.');
        assert_eq!(n.number_of_elements(), 2);
        assert_eq!(n.element_kind(0), ElementKind::NonUniform);
        assert_eq!(n.element(0, Form::Original), "Foo_Bar");
        assert_eq!(n.element(0, Form::Dashed), "foobar");
        assert_eq!(n.element(0, Form::Uniform), "foobar");
        assert_eq!(n.to_string(), "foobar.baz");
    }

    #[test]
    fn test_adapt_empty() {
        assert!(PropertyName::adapt("", '.').is_empty());
        assert!(PropertyName::adapt("___", '.').is_empty());
    }

    #[test]
    fn test_adapt_with_processor() {
        let n = PropertyName::adapt_with("APP_PROFILES_ACTIVE", '_', |element| {
            element.to_lowercase()
        });
        assert_eq!(n, name("app.profiles.active"));
        assert_eq!(n.element_kind(0), ElementKind::Uniform);
    }

    #[test]
    fn test_adapt_with_processor_producing_index() {
        let n = PropertyName::adapt_with("APP_HOSTS_0", '_', |element| {
            if element.chars().all(|c| c.is_ascii_digit()) {
                format!("[{element}]")
            } else {
                element.to_lowercase()
            }
        });
        assert_eq!(n, name("app.hosts[0]"));
        assert!(n.is_numeric_index(2));
    }

    #[test]
    fn test_equality_dash_ignoring() {
        assert_eq!(name("foo-bar"), name("foobar"));
        assert_eq!(name("foobar"), name("foo-bar"));
        assert_eq!(name("f-o-o.bar"), name("foo.bar"));
        assert_ne!(name("foo.bar"), name("foobar"));
    }

    #[test]
    fn test_equality_trailing_dash_is_not_equal() {
        assert_ne!(name("foo-"), name("foo"));
        assert_ne!(name("foo"), name("foo-"));
    }

    #[test]
    fn test_equality_adapted_forms() {
        let dashed = name("foo-bar");
        assert_eq!(dashed, PropertyName::adapt("fooBar", '.'));
        assert_eq!(dashed, PropertyName::adapt("foo_bar", '.'));
        assert_eq!(PropertyName::adapt("fooBar", '.'), PropertyName::adapt("foo_bar", '.'));
    }

    #[test]
    fn test_equality_non_uniform_trailing_punctuation() {
        assert_eq!(PropertyName::adapt("foo_", '.'), name("foo"));
        assert_eq!(name("foo"), PropertyName::adapt("foo__", '.'));
    }

    #[test]
    fn test_equality_indexed() {
        assert_eq!(name("foo[0]"), name("foo[0]"));
        assert_ne!(name("foo[0]"), name("foo[1]"));
        assert_ne!(name("foo[Bar]"), name("foo[bar]"));
        assert_ne!(name("foo[a-b]"), name("foo[ab]"));
    }

    #[test]
    fn test_equality_different_lengths() {
        assert_ne!(name("foo"), name("foo.bar"));
    }

    #[test]
    fn test_hash_matches_equality() {
        assert_eq!(hash_of(&name("foo-bar")), hash_of(&name("foobar")));
        assert_eq!(
            hash_of(&name("foo-bar")),
            hash_of(&PropertyName::adapt("Foo_Bar", '.'))
        );
        assert_eq!(name("foo-bar").hash_code(), name("foobar").hash_code());
    }

    #[test]
    fn test_hash_code_is_polynomial() {
        // 'a' = 97, then 31 * 0 + 97 for the single element
        assert_eq!(name("a").hash_code(), 97);
        assert_eq!(name("a.b").hash_code(), 31 * 97 + 98);
    }

    #[test]
    fn test_hash_map_lookup() {
        let mut map = HashMap::new();
        map.insert(name("server.port"), "8080");
        assert_eq!(map.get(&PropertyName::adapt("server.PORT", '.')), Some(&"8080"));
    }

    #[test]
    fn test_ordering_numeric_index() {
        assert!(name("a[9]") < name("a[10]"));
        assert!(name("a[010]") > name("a[9]"));
        assert_eq!(name("a[007]").cmp(&name("a[7]")), Ordering::Equal);
    }

    #[test]
    fn test_ordering_is_coarser_than_equality() {
        for (a, b) in [("foo-", "foo"), ("a[007]", "a[7]")] {
            assert_ne!(name(a), name(b));
            assert_eq!(name(a).cmp(&name(b)), Ordering::Equal);
        }
    }

    #[test]
    fn test_ordering_indexed_before_named() {
        assert!(name("a[0]") < name("a.b"));
        assert!(name("a.b") > name("a[z]"));
    }

    #[test]
    fn test_ordering_shorter_first() {
        assert!(name("a") < name("a.b"));
        assert!(name("a.b") > name("a"));
    }

    #[test]
    fn test_ordering_lexical() {
        let mut names = vec![name("b"), name("a-c"), name("ab")];
        names.sort();
        assert_eq!(names, vec![name("ab"), name("a-c"), name("b")]);
    }

    #[test]
    fn test_ancestor_and_parent() {
        let n = name("server.hosts[0].name");
        let child = name("server.hosts[0].name.first");
        assert!(n.is_ancestor_of(&child));
        assert!(n.is_parent_of(&child));
        assert!(!n.is_ancestor_of(&n));
        assert!(name("server").is_ancestor_of(&child));
        assert!(!name("server").is_parent_of(&child));
        assert!(!child.is_ancestor_of(&n));
        assert!(PropertyName::empty().is_ancestor_of(&n));
    }

    #[test]
    fn test_append() {
        let n = name("foo");
        assert_eq!(n.append("bar").unwrap(), name("foo.bar"));
        assert_eq!(n.append("[1]").unwrap(), name("foo[1]"));
        assert_eq!(n.append("").unwrap(), n);
        assert!(n.append("Bar").is_err());
        assert_eq!(n.append_name(&name("bar.baz")), name("foo.bar.baz"));
    }

    #[test]
    fn test_chop_and_parent() {
        let n = name("a.b.c");
        assert_eq!(n.chop(2), name("a.b"));
        assert_eq!(n.chop(5), n);
        assert_eq!(n.parent(), name("a.b"));
        assert!(name("a").parent().is_empty());
    }

    #[test]
    fn test_sub_name() {
        let n = name("a.b[0].c");
        assert_eq!(n.sub_name(1), name("b[0].c"));
        assert_eq!(n.sub_name(1).to_string(), "b[0].c");
        assert!(n.sub_name(4).is_empty());
        assert!(n.sub_name(9).is_empty());
        assert_eq!(n.sub_name(0), n);
    }

    #[test]
    fn test_chopped_names_share_uniform_cache() {
        let n = PropertyName::adapt("Foo_Bar.baz", '.');
        let chopped = n.chop(1);
        assert_eq!(chopped.element(0, Form::Uniform), "foobar");
        assert_eq!(n.element(0, Form::Uniform), "foobar");
    }

    #[test]
    fn test_last_element() {
        assert_eq!(name("a.b[2]").last_element(Form::Original), "2");
        assert!(name("a.b[2]").is_last_element_indexed());
        assert!(name("a.b[2]").has_indexed_element());
        assert!(!name("a.b").has_indexed_element());
        assert_eq!(PropertyName::empty().last_element(Form::Uniform), "");
    }

    #[test]
    fn test_round_trip_through_original_form() {
        for raw in ["foo.bar", "foo[0].bar-baz", "x[a.b][3]", "a1.b2-c3"] {
            let n = name(raw);
            assert_eq!(name(&n.to_string()), n);
        }
    }

    #[test]
    fn test_from_str_and_display() {
        let n: PropertyName = "app.config.import".parse().unwrap();
        assert_eq!(format!("{}", n), "app.config.import");
        assert_eq!(format!("{:?}", n), "PropertyName(\"app.config.import\")");
    }
}
