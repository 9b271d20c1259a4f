use crate::error::LockError;

/// A set of event names given to [`EventLock::block`](crate::EventLock::block) /
/// [`EventLock::unblock`](crate::EventLock::unblock).
///
/// Built from a delimited string (`"a, b c"`) or from a list. Validation happens when
/// the set is used: an empty set, or a list containing a blank name, is malformed.
///
/// # Example
/// ```
/// use taskflow::EventNames;
///
/// let names = EventNames::from("db, cache  queue");
/// assert_eq!(names.as_slice(), ["db", "cache", "queue"]);
/// assert!(EventNames::from(vec!["ok", " "]).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventNames(Vec<String>);

impl EventNames {
    /// Splits `s` on commas and whitespace.
    pub fn parse(s: &str) -> Self {
        EventNames(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the de-duplicated names, keeping first-seen order.
    pub fn validate(&self) -> Result<Vec<String>, LockError> {
        if self.0.is_empty() || self.0.iter().any(|n| n.trim().is_empty()) {
            return Err(LockError::MalformedNames {
                names: self.0.clone(),
            });
        }
        let mut unique: Vec<String> = Vec::with_capacity(self.0.len());
        for name in &self.0 {
            if !unique.contains(name) {
                unique.push(name.clone());
            }
        }
        Ok(unique)
    }
}

impl From<&str> for EventNames {
    fn from(s: &str) -> Self {
        EventNames::parse(s)
    }
}

impl From<String> for EventNames {
    fn from(s: String) -> Self {
        EventNames::parse(&s)
    }
}

impl From<Vec<String>> for EventNames {
    fn from(names: Vec<String>) -> Self {
        EventNames(names)
    }
}

impl From<Vec<&str>> for EventNames {
    fn from(names: Vec<&str>) -> Self {
        EventNames(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for EventNames {
    fn from(names: &[&str]) -> Self {
        EventNames(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventNames {
    fn from(names: [&str; N]) -> Self {
        EventNames(names.iter().map(|n| n.to_string()).collect())
    }
}
