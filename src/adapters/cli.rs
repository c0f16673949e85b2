// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument property source adapter.

use crate::adapters::map_source::MapPropertySource;
use crate::domain::{ConfigValue, PropertyName};
use crate::ports::PropertySource;

/// The conventional name of the command-line source.
pub const COMMAND_LINE_ARGS: &str = "commandLineArgs";

/// Property source adapter for command-line arguments.
///
/// Supported forms:
/// - `--key=value`
/// - `--key value`
/// - `-k value` (single character keys)
///
/// A key given more than once collects its values into a comma-delimited list, so
/// `--app.profiles.active=dev --app.profiles.active=local` activates both
/// profiles. Arguments that are not options are kept aside as positional
/// arguments.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::CommandLineAdapter;
/// use layercfg::ports::PropertySource;
///
/// let adapter = CommandLineAdapter::from_args(vec!["--app.profiles.active=prod", "run"]);
/// assert_eq!(adapter.get("app.profiles.active").unwrap().as_str(), "prod");
/// assert_eq!(adapter.non_option_args(), ["run"]);
/// ```
#[derive(Debug)]
pub struct CommandLineAdapter {
    values: MapPropertySource,
    non_option_args: Vec<String>,
}

impl CommandLineAdapter {
    /// Creates an adapter with no arguments.
    pub fn new() -> Self {
        Self::from_args(Vec::<String>::new())
    }

    /// Creates an adapter from a vector of arguments.
    pub fn from_args<S: AsRef<str>>(args: Vec<S>) -> Self {
        let (pairs, non_option_args) = parse_args(&args);
        Self {
            values: MapPropertySource::new(COMMAND_LINE_ARGS, pairs),
            non_option_args,
        }
    }

    /// Creates an adapter from the process's arguments, skipping the program name.
    pub fn from_env_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_args(args)
    }

    /// Returns the arguments that were not options, in order.
    pub fn non_option_args(&self) -> &[String] {
        &self.non_option_args
    }
}

fn parse_args<S: AsRef<str>>(args: &[S]) -> (Vec<(String, String)>, Vec<String>) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut non_options = Vec::new();
    let mut put = |key: &str, value: &str| match pairs.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => {
            existing.push(',');
            existing.push_str(value);
        }
        None => pairs.push((key.to_string(), value.to_string())),
    };
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_ref();
        let next_value = args
            .get(i + 1)
            .map(|next| next.as_ref())
            .filter(|next| !next.starts_with('-'));
        if let Some(option) = arg.strip_prefix("--") {
            if let Some((key, value)) = option.split_once('=') {
                put(key, value);
            } else if let Some(value) = next_value {
                put(option, value);
                i += 1;
            }
        } else if arg.starts_with('-') && arg.chars().count() == 2 {
            if let Some(value) = next_value {
                put(&arg[1..], value);
                i += 1;
            }
        } else {
            non_options.push(arg.to_string());
        }
        i += 1;
    }
    (pairs, non_options)
}

impl Default for CommandLineAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for CommandLineAdapter {
    fn name(&self) -> &str {
        self.values.name()
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys()
    }

    fn property_names(&self) -> Vec<PropertyName> {
        self.values.property_names()
    }

    fn get_property(&self, name: &PropertyName) -> Option<ConfigValue> {
        self.values.get_property(name)
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> bool {
        self.values.contains_descendant_of(name)
    }
}
