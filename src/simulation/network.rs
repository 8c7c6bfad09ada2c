// network.rs - Stochastic SIR on an Erdős–Rényi contact network

use super::{check_unit, time_labels};
use crate::core::cancel::CancelToken;
use crate::core::result::{Provenance, ResultBuilder, RunConfig};
use crate::core::AnalysisResult;
use crate::error::{BioenvError, Result};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSirParams {
    pub nodes: usize,
    /// Probability that any pair of nodes shares an edge
    pub edge_probability: f64,
    /// Infection probability per contact per step
    pub beta: f64,
    /// Recovery probability per step
    pub gamma: f64,
    pub initial_infected_fraction: f64,
    pub steps: usize,
    pub seed: u64,
}

impl Default for NetworkSirParams {
    fn default() -> Self {
        Self {
            nodes: 200,
            edge_probability: 0.05,
            beta: 0.3,
            gamma: 0.1,
            initial_infected_fraction: 0.02,
            steps: 50,
            seed: 42,
        }
    }
}

impl NetworkSirParams {
    pub fn validate(&self) -> Result<()> {
        if self.nodes == 0 {
            return Err(BioenvError::Config("network needs at least one node".to_string()));
        }
        if self.steps == 0 {
            return Err(BioenvError::Config("steps must be at least 1".to_string()));
        }
        check_unit("edge probability", self.edge_probability)?;
        check_unit("beta", self.beta)?;
        check_unit("gamma", self.gamma)?;
        check_unit("initial infected fraction", self.initial_infected_fraction)?;
        Ok(())
    }

    /// max(1, ⌊fraction · n⌋)
    pub fn initial_infected(&self) -> usize {
        ((self.initial_infected_fraction * self.nodes as f64).floor() as usize)
            .max(1)
            .min(self.nodes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Susceptible,
    Infected,
    Recovered,
}

/// Undirected G(n, p) graph as adjacency lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNetwork {
    neighbors: Vec<Vec<usize>>,
}

impl ContactNetwork {
    pub fn erdos_renyi<R: Rng>(n: usize, p: f64, rng: &mut R) -> Self {
        let mut neighbors = vec![Vec::new(); n];
        for i in 0..n {
            for j in i + 1..n {
                if rng.random_bool(p) {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        Self { neighbors }
    }

    pub fn nodes(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edges(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn mean_degree(&self) -> f64 {
        if self.neighbors.is_empty() {
            0.0
        } else {
            2.0 * self.edges() as f64 / self.nodes() as f64
        }
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }
}

fn tally(status: &[Status]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for s in status {
        match s {
            Status::Susceptible => counts[0] += 1,
            Status::Infected => counts[1] += 1,
            Status::Recovered => counts[2] += 1,
        }
    }
    counts
}

/// Synchronous update: every transition reads the previous step's state.
/// An infected node either recovers or tries to infect each susceptible neighbor.
fn advance<R: Rng>(
    network: &ContactNetwork,
    current: &[Status],
    beta: f64,
    gamma: f64,
    rng: &mut R,
) -> Vec<Status> {
    let mut next = current.to_vec();
    for node in 0..network.nodes() {
        if current[node] != Status::Infected {
            continue;
        }
        if rng.random::<f64>() < gamma {
            next[node] = Status::Recovered;
        } else {
            for &nbr in network.neighbors(node) {
                if current[nbr] == Status::Susceptible && rng.random::<f64>() < beta {
                    next[nbr] = Status::Infected;
                }
            }
        }
    }
    next
}

/// Run the network model; all randomness comes from `params.seed`
pub fn simulate_network(params: &NetworkSirParams, cancel: &CancelToken) -> Result<AnalysisResult> {
    params.validate()?;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed);
    let network = ContactNetwork::erdos_renyi(params.nodes, params.edge_probability, &mut rng);
    debug!(
        "Contact network: {} nodes, {} edges, mean degree {:.2}",
        network.nodes(),
        network.edges(),
        network.mean_degree()
    );

    let mut status = vec![Status::Susceptible; params.nodes];
    for node in rand::seq::index::sample(&mut rng, params.nodes, params.initial_infected()).iter() {
        status[node] = Status::Infected;
    }

    let mut history = Vec::with_capacity(params.steps + 1);
    history.push(tally(&status));
    for step in 0..params.steps {
        cancel.check(step, params.steps)?;
        status = advance(&network, &status, params.beta, params.gamma, &mut rng);
        history.push(tally(&status));
    }

    let n = params.nodes as f64;
    let peak_infected = history.iter().map(|c| c[1]).max().unwrap_or(0);
    let last = history.last().copied().unwrap_or([0, 0, 0]);
    let attack_rate = (params.nodes - last[0]) as f64 / n;

    info!(
        "Network SIR: peak {} infected, attack rate {:.1}%",
        peak_infected,
        attack_rate * 100.0
    );

    let labels = time_labels(history.len());
    let column = |c: usize| history.iter().map(|h| h[c] as f64).collect::<Vec<f64>>();
    let mut builder = ResultBuilder::new();
    builder.series("susceptible", labels.clone(), column(0));
    builder.series("infected", labels.clone(), column(1));
    builder.series("recovered", labels, column(2));
    builder.scalar("edges", network.edges() as f64);
    builder.scalar("mean_degree", network.mean_degree());
    builder.scalar("peak_infected", peak_infected as f64);
    builder.scalar("final_recovered", last[2] as f64);
    builder.scalar("attack_rate", attack_rate);

    Ok(builder.finish(Provenance {
        fingerprint: None,
        dataset_kind: None,
        records: 0,
        config: RunConfig::NetworkSir(params.clone()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResultValue;

    fn series(result: &AnalysisResult, name: &str) -> Vec<f64> {
        match result.get(name) {
            Some(ResultValue::Series { values, .. }) => values.clone(),
            other => panic!("expected series '{}', got {:?}", name, other),
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let params = NetworkSirParams::default();
        let a = simulate_network(&params, &CancelToken::new()).unwrap();
        let b = simulate_network(&params, &CancelToken::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_compartments_sum_to_n() {
        let params = NetworkSirParams {
            nodes: 150,
            seed: 7,
            ..NetworkSirParams::default()
        };
        let result = simulate_network(&params, &CancelToken::new()).unwrap();
        let (s, i, r) = (
            series(&result, "susceptible"),
            series(&result, "infected"),
            series(&result, "recovered"),
        );
        assert_eq!(s.len(), params.steps + 1);
        for t in 0..s.len() {
            assert_eq!(s[t] + i[t] + r[t], 150.0);
        }
        assert_eq!(i[0], params.initial_infected() as f64);
    }

    #[test]
    fn test_initial_infected_at_least_one() {
        let params = NetworkSirParams {
            nodes: 10,
            initial_infected_fraction: 0.0,
            ..NetworkSirParams::default()
        };
        assert_eq!(params.initial_infected(), 1);
    }

    #[test]
    fn test_empty_and_complete_graphs() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert_eq!(ContactNetwork::erdos_renyi(20, 0.0, &mut rng).edges(), 0);
        let complete = ContactNetwork::erdos_renyi(20, 1.0, &mut rng);
        assert_eq!(complete.edges(), 190);
        assert!((complete.mean_degree() - 19.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_transmission_without_edges() {
        let params = NetworkSirParams {
            edge_probability: 0.0,
            gamma: 0.0,
            ..NetworkSirParams::default()
        };
        let result = simulate_network(&params, &CancelToken::new()).unwrap();
        assert_eq!(result.scalar("peak_infected"), Some(params.initial_infected() as f64));
    }

    #[test]
    fn test_invalid_probability() {
        let params = NetworkSirParams {
            beta: 1.2,
            ..NetworkSirParams::default()
        };
        assert!(matches!(params.validate(), Err(BioenvError::Config(_))));
    }
}
