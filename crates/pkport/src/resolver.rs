//! Deferred values: a set of legal candidates and a callback that commits one.

use std::fmt;

use tracing::debug;

use crate::{alert::ChoiceAlert, errors::PortError};

type Commit<D, T> = Box<dyn FnOnce(&mut D, T) -> Result<(), PortError> + Send>;

/// A value whose encoding is not known until a choice is made.
///
/// Holds the candidates in display order and a commit callback that writes
/// the chosen one into the conversion's data `D`. Committing consumes the
/// resolver, so each one is applied exactly once.
pub struct ErrorResolver<D, T> {
    tag: String,
    alert: Option<ChoiceAlert>,
    candidates: Vec<T>,
    commit: Commit<D, T>,
}

impl<D, T> ErrorResolver<D, T> {
    /// A resolver over `candidates`. With more than one candidate, `alert`
    /// must offer exactly one choice per candidate.
    pub fn new(
        tag: impl Into<String>,
        candidates: Vec<T>,
        alert: Option<ChoiceAlert>,
        commit: impl FnOnce(&mut D, T) -> Result<(), PortError> + Send + 'static,
    ) -> Result<Self, PortError> {
        let tag = tag.into();
        if candidates.is_empty() {
            return Err(PortError::NoCandidates(tag));
        }
        if candidates.len() > 1 {
            let choices = alert.as_ref().map_or(0, |a| a.choices.len());
            if choices != candidates.len() {
                return Err(PortError::ChoiceMismatch {
                    tag,
                    choices,
                    candidates: candidates.len(),
                });
            }
        }

        Ok(Self {
            tag,
            alert,
            candidates,
            commit: Box::new(commit),
        })
    }

    /// A resolver with nothing to decide.
    pub fn single(
        tag: impl Into<String>,
        value: T,
        commit: impl FnOnce(&mut D, T) -> Result<(), PortError> + Send + 'static,
    ) -> Self {
        Self {
            tag: tag.into(),
            alert: None,
            candidates: vec![value],
            commit: Box::new(commit),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    /// The blocking alert, present only when there is a real choice.
    pub fn alert(&self) -> Option<&ChoiceAlert> {
        self.alert.as_ref().filter(|_| self.is_ambiguous())
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    /// Applies candidate `index` to `data`.
    pub fn commit(mut self, data: &mut D, index: usize) -> Result<(), PortError> {
        if index >= self.candidates.len() {
            return Err(PortError::InvalidChoice {
                tag: self.tag,
                index,
                len: self.candidates.len(),
            });
        }

        let value = self.candidates.swap_remove(index);
        (self.commit)(data, value)
    }
}

impl<D, T: fmt::Debug> fmt::Debug for ErrorResolver<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorResolver")
            .field("tag", &self.tag)
            .field("candidates", &self.candidates)
            .finish_non_exhaustive()
    }
}

/// Type-erased view of an [ErrorResolver], so resolvers over different
/// value types can wait in one list.
pub trait Resolve<D>: Send {
    fn tag(&self) -> &str;
    fn alert(&self) -> Option<&ChoiceAlert>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn commit(self: Box<Self>, data: &mut D, index: usize) -> Result<(), PortError>;
}

impl<D, T: Send> Resolve<D> for ErrorResolver<D, T> {
    fn tag(&self) -> &str {
        ErrorResolver::tag(self)
    }

    fn alert(&self) -> Option<&ChoiceAlert> {
        ErrorResolver::alert(self)
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn commit(self: Box<Self>, data: &mut D, index: usize) -> Result<(), PortError> {
        ErrorResolver::commit(*self, data, index)
    }
}

/// Picks among the choices of a blocking alert. `None` declines.
pub trait Chooser {
    fn choose(&mut self, alert: &ChoiceAlert) -> Option<usize>;
}

impl<F: FnMut(&ChoiceAlert) -> Option<usize>> Chooser for F {
    fn choose(&mut self, alert: &ChoiceAlert) -> Option<usize> {
        self(alert)
    }
}

/// Commits `resolver`, asking `chooser` only when there is a real choice.
pub fn settle<D>(
    resolver: Box<dyn Resolve<D>>,
    data: &mut D,
    chooser: &mut dyn Chooser,
) -> Result<(), PortError> {
    let index = match resolver.alert() {
        Some(alert) => chooser
            .choose(alert)
            .ok_or_else(|| PortError::Unresolved(resolver.tag().to_string()))?,
        None => {
            debug!(tag = resolver.tag(), "auto-committing resolver");
            0
        }
    };

    resolver.commit(data, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Choice;

    fn two_choices() -> Option<ChoiceAlert> {
        Some(ChoiceAlert::new(
            "PID",
            "pick one",
            vec![Choice::new("Keep", ""), Choice::new("Regenerate", "")],
        ))
    }

    #[test]
    fn test_commit_applies_chosen_candidate() {
        let resolver =
            ErrorResolver::new("PID", vec![10u32, 20], two_choices(), |d: &mut u32, v| {
                *d = v;
                Ok(())
            })
            .unwrap();
        assert!(resolver.is_ambiguous());

        let mut data = 0;
        resolver.commit(&mut data, 1).unwrap();
        assert_eq!(data, 20);
    }

    #[test]
    fn test_construction_errors() {
        let commit = |_: &mut u32, _: u32| -> Result<(), PortError> { Ok(()) };
        assert!(matches!(
            ErrorResolver::new("PID", vec![], None, commit),
            Err(PortError::NoCandidates(_))
        ));
        assert!(matches!(
            ErrorResolver::new("PID", vec![1, 2], None, commit),
            Err(PortError::ChoiceMismatch {
                choices: 0,
                candidates: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_choice() {
        let resolver =
            ErrorResolver::new("PID", vec![1u32, 2], two_choices(), |_: &mut u32, _| Ok(()))
                .unwrap();
        let mut data = 0;
        assert!(matches!(
            resolver.commit(&mut data, 2),
            Err(PortError::InvalidChoice { index: 2, len: 2, .. })
        ));
    }

    #[test]
    fn test_settle_single_without_asking() {
        let resolver: Box<dyn Resolve<Vec<bool>>> =
            Box::new(ErrorResolver::single("Fateful Encounter", true, |d: &mut Vec<bool>, v| {
                d.push(v);
                Ok(())
            }));
        let mut asked = false;
        let mut chooser = |_: &ChoiceAlert| -> Option<usize> {
            asked = true;
            None
        };

        let mut data = Vec::new();
        settle(resolver, &mut data, &mut chooser).unwrap();
        assert_eq!(data, vec![true]);
        assert!(!asked);
    }

    #[test]
    fn test_settle_declined() {
        let resolver: Box<dyn Resolve<u32>> = Box::new(
            ErrorResolver::new("PID", vec![1u32, 2], two_choices(), |d: &mut u32, v| {
                *d = v;
                Ok(())
            })
            .unwrap(),
        );
        let mut data = 0;
        let err = settle(resolver, &mut data, &mut |_: &ChoiceAlert| -> Option<usize> { None }).unwrap_err();
        assert!(matches!(err, PortError::Unresolved(tag) if tag == "PID"));
        assert_eq!(data, 0);
    }
}
