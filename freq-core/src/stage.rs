//! Workflow stages and the progression that unlocks them.
//!
//! Each stage is one tab of the dashboard. A successful data response for a
//! stage unlocks its successors in the [`StageGraph`]; nothing is ever locked
//! again within a session.

use crate::error::{FreqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// One workflow tab of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "trend_detection")]
    TrendDetection,
    #[serde(rename = "periodic_fluctuations")]
    PeriodicFluctuations,
    #[serde(rename = "autoregressive")]
    Autoregressive,
    #[serde(rename = "additive")]
    Additive,
    #[serde(rename = "frequency")]
    Frequency,
    #[serde(rename = "map_")]
    Map,
}

impl Stage {
    /// Every stage, in tab order.
    pub const ALL: [Stage; 6] = [
        Stage::Map,
        Stage::TrendDetection,
        Stage::PeriodicFluctuations,
        Stage::Autoregressive,
        Stage::Additive,
        Stage::Frequency,
    ];

    /// Wire name, as embedded by the server and used in data URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TrendDetection => "trend_detection",
            Stage::PeriodicFluctuations => "periodic_fluctuations",
            Stage::Autoregressive => "autoregressive",
            Stage::Additive => "additive",
            Stage::Frequency => "frequency",
            Stage::Map => "map_",
        }
    }

    /// Data endpoint for this stage, e.g. `/trend_detection_data/`.
    ///
    /// The map stage keeps its trailing underscore, giving `/map__data/`.
    pub fn data_path(&self) -> String {
        format!("/{}_data/", self.as_str())
    }

    /// Page the tab navigates to.
    pub fn page_path(&self) -> String {
        match self {
            Stage::Map => "/map".to_string(),
            other => format!("/{}", other.as_str()),
        }
    }

    /// Tab caption.
    pub fn title(&self) -> &'static str {
        match self {
            Stage::TrendDetection => "Detection of Trends",
            Stage::PeriodicFluctuations => "Periodic Fluctuations",
            Stage::Autoregressive => "Autoregressive Model",
            Stage::Additive => "Additive Model",
            Stage::Frequency => "Sampling Frequency",
            Stage::Map => "Map",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = FreqError;

    fn from_str(s: &str) -> Result<Self> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| FreqError::UnknownStage(s.to_string()))
    }
}

/// Static successor map between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StageGraph {
    edges: BTreeMap<Stage, Vec<Stage>>,
}

impl Default for StageGraph {
    fn default() -> Self {
        let edges = BTreeMap::from([
            (Stage::Map, vec![Stage::TrendDetection]),
            (Stage::TrendDetection, vec![Stage::PeriodicFluctuations]),
            (Stage::PeriodicFluctuations, vec![Stage::Autoregressive]),
            (Stage::Autoregressive, vec![Stage::Additive, Stage::Frequency]),
        ]);
        Self { edges }
    }
}

impl StageGraph {
    /// Build a graph from explicit edges, rejecting cycles.
    pub fn new(edges: BTreeMap<Stage, Vec<Stage>>) -> Result<Self> {
        let graph = Self { edges };
        for stage in Stage::ALL {
            graph.check_acyclic_from(stage, &mut Vec::new())?;
        }
        Ok(graph)
    }

    fn check_acyclic_from(&self, stage: Stage, path: &mut Vec<Stage>) -> Result<()> {
        if path.contains(&stage) {
            return Err(FreqError::CyclicStageGraph(stage.to_string()));
        }
        path.push(stage);
        for next in self.successors(stage) {
            self.check_acyclic_from(*next, path)?;
        }
        path.pop();
        Ok(())
    }

    /// Stages unlocked by a successful response for `stage`.
    pub fn successors(&self, stage: Stage) -> &[Stage] {
        self.edges.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// UI affordance of a tab: whether it can be clicked and where it leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Affordance {
    pub enabled: bool,
    pub href: Option<String>,
}

/// Monotonic unlock state machine over a [`StageGraph`].
#[derive(Debug, Clone)]
pub struct StageProgression {
    graph: StageGraph,
    unlocked: BTreeSet<Stage>,
}

impl StageProgression {
    /// Start at the server-provided stage, which is itself reachable.
    pub fn new(graph: StageGraph, initial: Stage) -> Self {
        Self {
            graph,
            unlocked: BTreeSet::from([initial]),
        }
    }

    /// Advance after a successful data response for `stage`.
    ///
    /// Returns the successors that were newly unlocked by this call.
    pub fn on_success(&mut self, stage: Stage) -> Vec<Stage> {
        let newly: Vec<Stage> = self
            .graph
            .successors(stage)
            .iter()
            .copied()
            .filter(|next| self.unlocked.insert(*next))
            .collect();
        if !newly.is_empty() {
            log::info!("{} unlocked {:?}", stage, newly);
        }
        newly
    }

    pub fn is_unlocked(&self, stage: Stage) -> bool {
        self.unlocked.contains(&stage)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Stage> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn affordance(&self, stage: Stage) -> Affordance {
        let enabled = self.is_unlocked(stage);
        Affordance {
            enabled,
            href: enabled.then(|| stage.page_path()),
        }
    }
}
