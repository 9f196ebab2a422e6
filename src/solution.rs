//! A retained candidate turned into a buildable plan.

use std::fmt;

use serde::Serialize;

use crate::devices::BiomassPlant;
use crate::economics::{EconomicParams, Economics};
use crate::error::Result;
use crate::scoring::Score;
use crate::selection::{EquipmentPlan, EquipmentSelector};
use crate::sim::kpi::SimulationResult;
use crate::sim::types::CapacityCandidate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// 1-based position in the ranked output.
    pub rank: usize,
    pub candidate: CapacityCandidate,
    pub plan: EquipmentPlan,
    pub simulation: SimulationResult,
    pub score: Score,
    /// Linear capex estimate the candidate was ranked by.
    pub estimated_capex: f64,
    /// Price of the selected equipment.
    pub total_cost: f64,
    pub economics: Economics,
}

impl Solution {
    /// Selects equipment for a ranked candidate and prices it.
    #[expect(clippy::too_many_arguments)]
    pub fn materialize(
        rank: usize,
        candidate: CapacityCandidate,
        simulation: SimulationResult,
        score: Score,
        estimated_capex: f64,
        selector: &EquipmentSelector<'_>,
        biomass: &BiomassPlant,
        params: &EconomicParams,
    ) -> Result<Self> {
        let plan = selector.select(&candidate)?;
        let feedstock_t = biomass.feedstock_for_energy_t(simulation.biomass_generation_mwh);
        let economics = Economics::evaluate(&plan, &simulation, feedstock_t, params);
        Ok(Self {
            rank,
            candidate,
            total_cost: plan.total_price(),
            plan,
            simulation,
            score,
            estimated_capex,
            economics,
        })
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} score {}", self.rank, self.score)?;
        writeln!(f, "Capacities:         {}", self.candidate)?;
        writeln!(f, "{}", self.simulation)?;
        writeln!(f, "Equipment:")?;
        writeln!(f, "{}", self.plan)?;
        match self.economics.lcoe {
            Some(lcoe) => writeln!(f, "LCOE:               {lcoe:.1} $/MWh")?,
            None => writeln!(f, "LCOE:               n/a")?,
        }
        for issue in &self.score.issues {
            writeln!(f, "  ! {issue}")?;
        }
        Ok(())
    }
}
