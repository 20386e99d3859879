//! Phase and dependency ordering of tag operations.
//!
//! Operations are registered once per format as plain descriptors. A
//! [Schedule] validates the whole set up front (unknown or duplicate names,
//! dependencies on later phases, cycles) and fixes the run order, so a
//! misconfigured format fails when it is built rather than halfway through a
//! conversion.

use std::collections::HashMap;

use petgraph::{algo::toposort, graph::DiGraph};
use tracing::{debug, warn};

use crate::errors::{PortError, ScheduleError};

/// The five stages of a conversion, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Merge the per-format overrides into the source.
    FormatOverride,
    /// Derive working values the tags need (dex number, meta tags).
    PreProcessing,
    /// Port every tag. May create resolvers.
    FirstPass,
    /// Runs once every resolver has been committed.
    SecondPass,
    /// Whole-buffer work on the finished target (checksums, raw patches).
    PostProcessing,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::FormatOverride,
        Phase::PreProcessing,
        Phase::FirstPass,
        Phase::SecondPass,
        Phase::PostProcessing,
    ];
}

/// Body of an operation over a conversion context `C`.
pub type OperationFn<C> = fn(&mut C) -> Result<(), PortError>;

/// A named unit of tag processing.
pub struct Operation<C> {
    pub name: &'static str,
    pub phase: Phase,
    /// Operations that must run first. They may live in the same phase or an
    /// earlier one.
    pub requires: &'static [&'static str],
    pub run: OperationFn<C>,
}

impl<C> Operation<C> {
    pub const fn new(name: &'static str, phase: Phase, run: OperationFn<C>) -> Self {
        Self {
            name,
            phase,
            requires: &[],
            run,
        }
    }

    pub const fn requires(mut self, requires: &'static [&'static str]) -> Self {
        self.requires = requires;
        self
    }
}

impl<C> Clone for Operation<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Operation<C> {}

impl<C> std::fmt::Debug for Operation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("requires", &self.requires)
            .finish()
    }
}

/// A validated run order for a set of operations.
pub struct Schedule<C> {
    phases: [Vec<Operation<C>>; 5],
}

impl<C> Schedule<C> {
    /// Validates `operations` and orders each phase topologically.
    /// Independent operations keep a stable order.
    pub fn build(operations: Vec<Operation<C>>) -> Result<Self, ScheduleError> {
        let mut by_name = HashMap::with_capacity(operations.len());
        for op in &operations {
            if by_name.insert(op.name, op.phase).is_some() {
                return Err(ScheduleError::DuplicateOperation(op.name));
            }
        }

        for op in &operations {
            for &requires in op.requires {
                let Some(&phase) = by_name.get(requires) else {
                    return Err(ScheduleError::UnknownDependency {
                        operation: op.name,
                        requires,
                    });
                };
                if phase > op.phase {
                    return Err(ScheduleError::LaterPhaseDependency {
                        operation: op.name,
                        phase: op.phase,
                        requires,
                    });
                }
            }
        }

        let mut phases: [Vec<Operation<C>>; 5] = Default::default();
        for (slot, phase) in phases.iter_mut().zip(Phase::ALL) {
            *slot = order_phase(phase, operations.iter().filter(|op| op.phase == phase))?;
        }

        Ok(Self { phases })
    }

    /// Operations of `phase` in run order.
    pub fn phase(&self, phase: Phase) -> &[Operation<C>] {
        &self.phases[phase as usize]
    }

    /// Every operation name in run order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.phases.iter().flatten().map(|op| op.name)
    }

    /// Runs every operation of `phase`. The first failure aborts the run.
    pub fn run_phase(&self, phase: Phase, ctx: &mut C) -> Result<(), PortError> {
        for op in self.phase(phase) {
            debug!(operation = op.name, ?phase, "running operation");
            if let Err(e) = (op.run)(ctx) {
                warn!(operation = op.name, ?phase, error = %e, "conversion aborted");
                return Err(PortError::Aborted {
                    operation: op.name,
                    source: Box::new(e),
                });
            }
        }
        Ok(())
    }
}

fn order_phase<'a, C: 'a>(
    phase: Phase,
    operations: impl Iterator<Item = &'a Operation<C>>,
) -> Result<Vec<Operation<C>>, ScheduleError> {
    let mut graph = DiGraph::<Operation<C>, ()>::new();
    let mut nodes = HashMap::new();
    for op in operations {
        nodes.insert(op.name, graph.add_node(*op));
    }

    for node in graph.node_indices().collect::<Vec<_>>() {
        let op = graph[node];
        for requires in op.requires {
            if let Some(&dep) = nodes.get(requires) {
                graph.add_edge(dep, node, ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|idx| graph[idx]).collect()),
        Err(cycle) => Err(ScheduleError::Cycle {
            phase,
            operation: graph[cycle.node_id()].name,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<&'static str>);

    fn op(name: &'static str, phase: Phase) -> Operation<Log> {
        Operation::new(name, phase, |log| {
            log.0.push("?");
            Ok(())
        })
    }

    fn position(order: &[&str], name: &str) -> usize {
        order.iter().position(|n| *n == name).unwrap()
    }

    #[test]
    fn test_respects_requires_within_phase() {
        let ops = vec![
            op("PID", Phase::FirstPass).requires(&["Gender", "Nature", "TID"]),
            op("Gender", Phase::FirstPass),
            op("Nature", Phase::FirstPass),
            op("TID", Phase::FirstPass),
            op("Checksum", Phase::PostProcessing),
            op("Dex", Phase::PreProcessing),
        ];
        let schedule = Schedule::build(ops).unwrap();
        let order: Vec<_> = schedule.names().collect();

        assert_eq!(order[0], "Dex");
        assert_eq!(*order.last().unwrap(), "Checksum");
        for dep in ["Gender", "Nature", "TID"] {
            assert!(position(&order, dep) < position(&order, "PID"));
        }
    }

    #[test]
    fn test_earlier_phase_dependency_is_allowed() {
        let ops = vec![
            op("Species", Phase::FirstPass).requires(&["Dex"]),
            op("Dex", Phase::PreProcessing),
        ];
        assert!(Schedule::build(ops).is_ok());
    }

    #[test]
    fn test_rejects_bad_declarations() {
        let dup = vec![op("A", Phase::FirstPass), op("A", Phase::SecondPass)];
        assert_eq!(
            Schedule::build(dup).err(),
            Some(ScheduleError::DuplicateOperation("A"))
        );

        let unknown = vec![op("A", Phase::FirstPass).requires(&["B"])];
        assert_eq!(
            Schedule::build(unknown).err(),
            Some(ScheduleError::UnknownDependency {
                operation: "A",
                requires: "B"
            })
        );

        let later = vec![
            op("A", Phase::FirstPass).requires(&["B"]),
            op("B", Phase::PostProcessing),
        ];
        assert_eq!(
            Schedule::build(later).err(),
            Some(ScheduleError::LaterPhaseDependency {
                operation: "A",
                phase: Phase::FirstPass,
                requires: "B"
            })
        );
    }

    #[test]
    fn test_cycle_detected_at_build() {
        let ops = vec![
            op("A", Phase::FirstPass).requires(&["C"]),
            op("B", Phase::FirstPass).requires(&["A"]),
            op("C", Phase::FirstPass).requires(&["B"]),
        ];
        assert!(matches!(
            Schedule::build(ops).err(),
            Some(ScheduleError::Cycle {
                phase: Phase::FirstPass,
                ..
            })
        ));
    }

    #[test]
    fn test_failure_aborts_phase() {
        let ops = vec![
            Operation::new("First", Phase::FirstPass, |log: &mut Log| {
                log.0.push("First");
                Ok(())
            }),
            Operation::new("Broken", Phase::FirstPass, |_: &mut Log| {
                Err(PortError::Format("boom".into()))
            })
            .requires(&["First"]),
            Operation::new("Never", Phase::FirstPass, |log: &mut Log| {
                log.0.push("Never");
                Ok(())
            })
            .requires(&["Broken"]),
        ];
        let schedule = Schedule::build(ops).unwrap();
        let mut log = Log::default();

        let err = schedule.run_phase(Phase::FirstPass, &mut log).unwrap_err();
        assert!(matches!(err, PortError::Aborted { operation: "Broken", .. }));
        assert_eq!(log.0, vec!["First"]);
    }
}
