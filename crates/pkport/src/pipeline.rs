//! The conversion driver: runs the phases of a [Schedule] over one
//! [Session] and stops before SecondPass while choices are pending.

use tracing::debug;

use crate::{
    alert::{Alert, AlertLog, ChoiceAlert},
    errors::{PortError, ScheduleError},
    resolver::{Chooser, ErrorResolver, Resolve, settle},
    scheduler::{Operation, Phase, Schedule},
};

/// The state of one conversion.
///
/// `source` is what is being read, `data` is what is being written and
/// `work` holds the format's working variables shared between operations.
pub struct Session<S, D, W> {
    pub source: S,
    pub data: D,
    pub warnings: AlertLog,
    pub resolvers: Vec<Box<dyn Resolve<D>>>,
    pub work: W,
}

impl<S, D: 'static, W> Session<S, D, W> {
    pub fn new(source: S, data: D, work: W) -> Self {
        Self {
            source,
            data,
            warnings: AlertLog::new(),
            resolvers: Vec::new(),
            work,
        }
    }

    pub fn warn(&mut self, alert: impl Into<Option<Alert>>) {
        self.warnings.add(alert);
    }

    /// Queues a resolver for SecondPass.
    pub fn defer<T: Send + 'static>(&mut self, resolver: ErrorResolver<D, T>) {
        self.resolvers.push(Box::new(resolver));
    }
}

/// A validated set of operations for one format.
pub struct Pipeline<S, D, W> {
    schedule: Schedule<Session<S, D, W>>,
}

impl<S, D: 'static, W> Pipeline<S, D, W> {
    pub fn new(operations: Vec<Operation<Session<S, D, W>>>) -> Result<Self, ScheduleError> {
        Ok(Self {
            schedule: Schedule::build(operations)?,
        })
    }

    pub fn schedule(&self) -> &Schedule<Session<S, D, W>> {
        &self.schedule
    }

    /// Runs FormatOverride, PreProcessing and FirstPass.
    pub fn start(self, mut session: Session<S, D, W>) -> Result<Pending<S, D, W>, PortError> {
        for phase in [Phase::FormatOverride, Phase::PreProcessing, Phase::FirstPass] {
            self.schedule.run_phase(phase, &mut session)?;
        }
        debug!(
            warnings = session.warnings.len(),
            resolvers = session.resolvers.len(),
            "first pass complete"
        );

        Ok(Pending {
            schedule: self.schedule,
            session,
        })
    }
}

/// A conversion that has run its first pass and is waiting on its resolvers.
pub struct Pending<S, D, W> {
    schedule: Schedule<Session<S, D, W>>,
    session: Session<S, D, W>,
}

impl<S, D: 'static, W> Pending<S, D, W> {
    /// Non-blocking alerts gathered so far.
    pub fn warnings(&self) -> &AlertLog {
        &self.session.warnings
    }

    /// Blocking alerts, one per resolver that needs a choice.
    pub fn errors(&self) -> Vec<&ChoiceAlert> {
        self.session
            .resolvers
            .iter()
            .filter_map(|r| r.alert())
            .collect()
    }

    pub fn is_blocked(&self) -> bool {
        self.session.resolvers.iter().any(|r| r.alert().is_some())
    }

    /// The data as written by the first pass.
    pub fn data(&self) -> &D {
        &self.session.data
    }

    /// Commits `choice` for the `index`-th entry of [Pending::errors].
    pub fn resolve(&mut self, index: usize, choice: usize) -> Result<(), PortError> {
        let blocking: Vec<usize> = self
            .session
            .resolvers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.alert().is_some())
            .map(|(i, _)| i)
            .collect();

        let Some(&position) = blocking.get(index) else {
            return Err(PortError::InvalidChoice {
                tag: "<pending errors>".to_string(),
                index,
                len: blocking.len(),
            });
        };

        let resolver = &self.session.resolvers[position];
        if choice >= resolver.len() {
            return Err(PortError::InvalidChoice {
                tag: resolver.tag().to_string(),
                index: choice,
                len: resolver.len(),
            });
        }

        let resolver = self.session.resolvers.remove(position);
        resolver.commit(&mut self.session.data, choice)
    }

    /// Commits every remaining resolver, then runs SecondPass and
    /// PostProcessing. Resolvers with a single candidate commit on their own;
    /// the rest are put to `chooser`.
    pub fn finish(mut self, chooser: &mut dyn Chooser) -> Result<Finished<D>, PortError> {
        for resolver in std::mem::take(&mut self.session.resolvers) {
            settle(resolver, &mut self.session.data, chooser)?;
        }

        for phase in [Phase::SecondPass, Phase::PostProcessing] {
            self.schedule.run_phase(phase, &mut self.session)?;
        }

        Ok(Finished {
            data: self.session.data,
            warnings: self.session.warnings,
        })
    }
}

/// A completed conversion.
#[derive(Debug)]
pub struct Finished<D> {
    pub data: D,
    pub warnings: AlertLog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Choice;

    type Ctx = Session<u32, Vec<u32>, bool>;

    fn ambiguous(ctx: &mut Ctx) -> Result<(), PortError> {
        let alert = ChoiceAlert::new(
            "PID",
            "two ways",
            vec![Choice::new("Low", "1"), Choice::new("High", "2")],
        );
        let resolver = ErrorResolver::new("PID", vec![1, 2], Some(alert), |d: &mut Vec<u32>, v| {
            d.push(v);
            Ok(())
        })?;
        ctx.defer(resolver);
        Ok(())
    }

    fn certain(ctx: &mut Ctx) -> Result<(), PortError> {
        let value = ctx.source;
        ctx.defer(ErrorResolver::single("EXP", value, |d: &mut Vec<u32>, v| {
            d.push(v);
            Ok(())
        }));
        ctx.warn(Alert::new("EXP", "noted"));
        Ok(())
    }

    fn seal(ctx: &mut Ctx) -> Result<(), PortError> {
        ctx.work = true;
        ctx.data.push(0);
        Ok(())
    }

    fn pipeline() -> Pipeline<u32, Vec<u32>, bool> {
        Pipeline::new(vec![
            Operation::new("Seal", Phase::PostProcessing, seal),
            Operation::new("PID", Phase::FirstPass, ambiguous),
            Operation::new("EXP", Phase::FirstPass, certain),
        ])
        .unwrap()
    }

    #[test]
    fn test_blocking_choice_then_finish() {
        let mut pending = pipeline().start(Session::new(7, Vec::new(), false)).unwrap();
        assert!(pending.is_blocked());
        assert_eq!(pending.errors().len(), 1);
        assert_eq!(pending.errors()[0].title(), "PID");
        assert_eq!(pending.warnings().len(), 1);

        pending.resolve(0, 1).unwrap();
        assert!(!pending.is_blocked());
        assert_eq!(pending.data(), &vec![2]);

        let finished = pending
            .finish(&mut |_: &ChoiceAlert| -> Option<usize> { None })
            .unwrap();
        assert_eq!(finished.data, vec![2, 7, 0]);
        assert_eq!(finished.warnings.len(), 1);
    }

    #[test]
    fn test_finish_asks_chooser() {
        let pending = pipeline().start(Session::new(7, Vec::new(), false)).unwrap();
        let mut chooser = |alert: &ChoiceAlert| -> Option<usize> {
            assert_eq!(alert.choices.len(), 2);
            Some(0)
        };
        let finished = pending.finish(&mut chooser).unwrap();
        assert_eq!(finished.data, vec![1, 7, 0]);
    }

    #[test]
    fn test_declined_choice_is_unresolved() {
        let pending = pipeline().start(Session::new(7, Vec::new(), false)).unwrap();
        let err = pending
            .finish(&mut |_: &ChoiceAlert| -> Option<usize> { None })
            .unwrap_err();
        assert!(matches!(err, PortError::Unresolved(tag) if tag == "PID"));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let mut pending = pipeline().start(Session::new(7, Vec::new(), false)).unwrap();
        assert!(pending.resolve(1, 0).is_err());
        assert!(pending.resolve(0, 5).is_err());
    }

    #[test]
    fn test_rejected_choice_keeps_resolver_pending() {
        let mut pending = pipeline().start(Session::new(7, Vec::new(), false)).unwrap();
        assert!(matches!(
            pending.resolve(0, 5),
            Err(PortError::InvalidChoice { index: 5, len: 2, .. })
        ));
        assert!(pending.is_blocked());
        assert_eq!(pending.errors().len(), 1);

        let err = pending
            .finish(&mut |_: &ChoiceAlert| -> Option<usize> { None })
            .unwrap_err();
        assert!(matches!(err, PortError::Unresolved(tag) if tag == "PID"));
    }
}
