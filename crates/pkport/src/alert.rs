//! Alerts: human-readable notes about lossy or ambiguous conversions.
//!
//! Every tag produces at most one [Alert]. Alerts about the same tag (or
//! produced by operations that touch the same tag) are merged rather than
//! listed twice, see [Alert::merge] and [AlertLog::add].

use std::fmt;

use serde::Serialize;

/// Why an alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertKind {
    /// No value was given; a default was used.
    Unspecified,
    /// A number was above the maximum and was clamped.
    Overflow,
    /// A number was below the minimum and was clamped.
    Underflow,
    /// The value is not recognized by the target format; a default was used.
    Invalid,
    /// The value is valid on its own but conflicts with another tag.
    Mismatch,
    /// A string or list was longer than the format allows.
    TooLong,
    /// A string or list was shorter than the format requires.
    TooShort,
    /// The value only exists during battle and was dropped.
    InBattle,
    /// The value was converted to a different representation.
    Casted,
    /// Several encodings are equally valid; a choice must be made.
    Ambiguous,
}

/// A titled message. The title names the tag(s) the message is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    titles: Vec<String>,
    message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            titles: vec![title.into()],
            message: message.into(),
        }
    }

    /// Rendered title, e.g. `"Nature, Gender"` for a merged alert.
    pub fn title(&self) -> String {
        self.titles.join(", ")
    }

    /// Title parts in the order they were first seen.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Combines two alerts into one.
    ///
    /// Title parts are unioned in order of first appearance. Non-empty
    /// messages are joined with a blank line.
    pub fn merge(mut self, other: Alert) -> Alert {
        for title in other.titles {
            if !self.titles.contains(&title) {
                self.titles.push(title);
            }
        }

        if !other.message.is_empty() {
            if !self.message.is_empty() {
                self.message.push_str("\n\n");
            }
            self.message.push_str(&other.message);
        }

        self
    }

    /// Adds a paragraph to the message, keeping the title.
    pub fn with_paragraph(self, paragraph: impl Into<String>) -> Alert {
        let title = self.titles.first().cloned().unwrap_or_default();
        self.merge(Alert::new(title, paragraph))
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message)
    }
}

/// Merges two optional alerts. `None` is the identity.
pub fn combine(a: Option<Alert>, b: Option<Alert>) -> Option<Alert> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.merge(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// An ordered collection of alerts. Adding an alert whose title matches an
/// existing entry merges it into that entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AlertLog {
    alerts: Vec<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `alert`; `None` is a no-op.
    pub fn add(&mut self, alert: impl Into<Option<Alert>>) {
        let Some(alert) = alert.into() else {
            return;
        };

        match self.alerts.iter_mut().find(|a| a.titles == alert.titles) {
            Some(existing) => *existing = existing.clone().merge(alert),
            None => self.alerts.push(alert),
        }
    }

    /// The alert with the given rendered title.
    pub fn get(&self, title: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.title() == title)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn into_vec(self) -> Vec<Alert> {
        self.alerts
    }
}

impl Extend<Alert> for AlertLog {
    fn extend<I: IntoIterator<Item = Alert>>(&mut self, iter: I) {
        for alert in iter {
            self.add(alert);
        }
    }
}

impl<'a> IntoIterator for &'a AlertLog {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.iter()
    }
}

/// One option offered to the chooser of an ambiguous value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub name: String,
    /// What picking this option implies, e.g. the resulting gender and nature.
    pub description: String,
}

impl Choice {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A blocking alert: an explanation plus one [Choice] per candidate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceAlert {
    pub alert: Alert,
    pub choices: Vec<Choice>,
}

impl ChoiceAlert {
    pub fn new(title: impl Into<String>, message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            alert: Alert::new(title, message),
            choices,
        }
    }

    pub fn title(&self) -> String {
        self.alert.title()
    }
}

impl fmt::Display for ChoiceAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alert)?;
        for (i, choice) in self.choices.iter().enumerate() {
            write!(f, "\n  [{i}] {}", choice.name)?;
            for line in choice.description.lines() {
                write!(f, "\n      {line}")?;
            }
        }
        Ok(())
    }
}
