//! Input combinations and their lazy Cartesian generation.

use std::collections::HashMap;
use std::fmt;

use ipfee_eval::Bindings;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::{DomainValue, VariableDomain};

/// An immutable assignment of one value per variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputCombination {
    values: HashMap<String, DomainValue>,
}

impl InputCombination {
    pub fn new(values: HashMap<String, DomainValue>) -> Self {
        InputCombination { values }
    }

    pub fn get(&self, name: &str) -> Option<&DomainValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of this combination with one more (or one replaced) value.
    pub fn with(&self, name: &str, value: DomainValue) -> InputCombination {
        let mut values = self.values.clone();
        values.insert(name.to_string(), value);
        InputCombination { values }
    }

    /// Entries ordered by variable name.
    pub fn sorted(&self) -> Vec<(&str, &DomainValue)> {
        let mut entries: Vec<(&str, &DomainValue)> =
            self.values.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Bind every value for the expression evaluator.
    pub fn to_bindings(&self) -> Bindings {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_runtime()))
            .collect()
    }
}

impl fmt::Display for InputCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .sorted()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl Serialize for InputCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.sorted() {
            map.serialize_entry(name, &value.to_string())?;
        }
        map.end()
    }
}

/// Which values of each domain a generator walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    All,
    /// Representative values, at most this many per numeric domain.
    Representative(usize),
}

type LevelValues<'a> = Box<dyn Iterator<Item = DomainValue> + 'a>;

/// Lazy Cartesian product over a list of domains.
///
/// One value iterator is kept per bound level. Advancing binds the next
/// value of the deepest level into a working map; a snapshot of the map
/// is taken whenever every level is bound. An empty domain list yields a
/// single empty combination.
pub struct Combinations<'a> {
    domains: &'a [VariableDomain],
    source: ValueSource,
    stack: Vec<LevelValues<'a>>,
    working: HashMap<String, DomainValue>,
    started: bool,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(domains: &'a [VariableDomain], source: ValueSource) -> Self {
        Combinations {
            domains,
            source,
            stack: Vec::with_capacity(domains.len()),
            working: HashMap::with_capacity(domains.len()),
            started: false,
            done: false,
        }
    }

    fn level_values(&self, level: usize) -> LevelValues<'a> {
        let domains: &'a [VariableDomain] = self.domains;
        let domain = &domains[level].domain;
        match self.source {
            ValueSource::All => domain.values(),
            ValueSource::Representative(max) => {
                Box::new(domain.representative_values(max).into_iter())
            }
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = InputCombination;

    fn next(&mut self) -> Option<InputCombination> {
        if self.done {
            return None;
        }
        if self.domains.is_empty() {
            self.done = true;
            return Some(InputCombination::default());
        }
        if !self.started {
            self.started = true;
            let first = self.level_values(0);
            self.stack.push(first);
        }

        loop {
            let depth = self.stack.len();
            if depth == 0 {
                self.done = true;
                return None;
            }
            let level = depth - 1;
            match self.stack[level].next() {
                Some(value) => {
                    self.working
                        .insert(self.domains[level].name.clone(), value);
                    if depth == self.domains.len() {
                        return Some(InputCombination::new(self.working.clone()));
                    }
                    let deeper = self.level_values(depth);
                    self.stack.push(deeper);
                }
                None => {
                    self.stack.pop();
                    self.working.remove(&self.domains[level].name);
                }
            }
        }
    }
}
