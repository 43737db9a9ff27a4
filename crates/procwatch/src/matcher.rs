use regex::Regex;

use procwatch_core::{ProcessId, WatchError};

/// Matches running command lines against the user-supplied patterns.
///
/// Patterns are regular expressions searched anywhere in the command line
/// (no anchoring), OR-ed together. An empty pattern set matches nothing.
pub struct PatternMatcher {
    regexes: Vec<Regex>,
}

impl PatternMatcher {
    /// Compile all patterns up front so a bad pattern fails the run before
    /// the loop starts.
    pub fn new(patterns: &[String]) -> Result<Self, WatchError> {
        let mut regexes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|e| WatchError::PatternInvalid {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            regexes.push(regex);
        }
        Ok(Self { regexes })
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    /// Process identities whose command line matches at least one pattern.
    pub fn matches(&self, processes: &[(ProcessId, String)]) -> Vec<ProcessId> {
        if self.regexes.is_empty() {
            return Vec::new();
        }

        processes
            .iter()
            .filter(|(_, command_line)| self.regexes.iter().any(|re| re.is_match(command_line)))
            .map(|(pid, _)| *pid)
            .collect()
    }
}
