// sirv.rs - SIR model with a vaccinated susceptible compartment

use super::{check_finite, check_non_negative, check_unit, time_labels};
use crate::core::cancel::CancelToken;
use crate::core::result::{Provenance, ResultBuilder, RunConfig};
use crate::core::AnalysisResult;
use crate::error::{BioenvError, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// SIR-V parameters; rates are per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SirvParams {
    pub base_beta: f64,
    pub gamma: f64,
    pub vaccine_efficacy: f64,
    /// Ambient temperature in °C
    pub temperature: f64,
    /// Contact multiplier relative to baseline
    pub mobility: f64,
    /// Temperature below which transmission rises
    pub reference_temperature: f64,
    /// Transmission increase per degree below the reference
    pub temperature_sensitivity: f64,
    pub population: f64,
    pub vaccinated_fraction: f64,
    pub initial_infected: f64,
    pub days: usize,
    /// RK4 sub-steps per day
    pub steps_per_day: usize,
}

impl Default for SirvParams {
    fn default() -> Self {
        Self {
            base_beta: 0.3,
            gamma: 0.1,
            vaccine_efficacy: 0.8,
            temperature: 0.0,
            mobility: 1.0,
            reference_temperature: 10.0,
            temperature_sensitivity: 0.05,
            population: 1_000_000.0,
            vaccinated_fraction: 0.3,
            initial_infected: 1000.0,
            days: 180,
            steps_per_day: 10,
        }
    }
}

impl SirvParams {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("base beta", self.base_beta)?;
        check_non_negative("gamma", self.gamma)?;
        if self.gamma == 0.0 {
            return Err(BioenvError::Config("gamma must be positive".to_string()));
        }
        check_unit("vaccine efficacy", self.vaccine_efficacy)?;
        check_finite("temperature", self.temperature)?;
        check_non_negative("mobility", self.mobility)?;
        check_finite("reference temperature", self.reference_temperature)?;
        check_non_negative("temperature sensitivity", self.temperature_sensitivity)?;
        check_non_negative("population", self.population)?;
        if self.population < 1.0 {
            return Err(BioenvError::Config("population must be at least 1".to_string()));
        }
        check_unit("vaccinated fraction", self.vaccinated_fraction)?;
        check_non_negative("initial infected", self.initial_infected)?;
        if self.initial_infected > self.population {
            return Err(BioenvError::Config(format!(
                "initial infected ({}) exceeds population ({})",
                self.initial_infected, self.population
            )));
        }
        if self.days == 0 {
            return Err(BioenvError::Config("days must be at least 1".to_string()));
        }
        if self.steps_per_day == 0 {
            return Err(BioenvError::Config("steps per day must be at least 1".to_string()));
        }
        Ok(())
    }

    /// β₀ · (1 + α · max(0, T₀ − T)) · mobility
    pub fn effective_beta(&self) -> f64 {
        let survival = 1.0
            + self.temperature_sensitivity * (self.reference_temperature - self.temperature).max(0.0);
        self.base_beta * survival * self.mobility
    }

    pub fn basic_reproduction_number(&self) -> f64 {
        self.effective_beta() / self.gamma
    }
}

/// Compartments: unvaccinated susceptible, vaccinated susceptible, infected, recovered
type State = [f64; 4];

fn derivatives(y: &State, beta: f64, gamma: f64, efficacy: f64) -> State {
    let [su, sv, i, r] = *y;
    let n = su + sv + i + r;
    let lambda_u = beta * i / n;
    let lambda_v = lambda_u * (1.0 - efficacy);
    [
        -lambda_u * su,
        -lambda_v * sv,
        lambda_u * su + lambda_v * sv - gamma * i,
        gamma * i,
    ]
}

fn rk4_step(y: &State, h: f64, f: impl Fn(&State) -> State) -> State {
    let shift = |base: &State, k: &State, scale: f64| -> State {
        [
            base[0] + scale * k[0],
            base[1] + scale * k[1],
            base[2] + scale * k[2],
            base[3] + scale * k[3],
        ]
    };
    let k1 = f(y);
    let k2 = f(&shift(y, &k1, h / 2.0));
    let k3 = f(&shift(y, &k2, h / 2.0));
    let k4 = f(&shift(y, &k3, h));
    let mut next = *y;
    for c in 0..4 {
        next[c] += h / 6.0 * (k1[c] + 2.0 * k2[c] + 2.0 * k3[c] + k4[c]);
    }
    next
}

/// Integrate the SIR-V system and report daily compartments
pub fn simulate_sirv(params: &SirvParams, cancel: &CancelToken) -> Result<AnalysisResult> {
    params.validate()?;

    let beta = params.effective_beta();
    let susceptible = params.population - params.initial_infected;
    let mut y: State = [
        susceptible * (1.0 - params.vaccinated_fraction),
        susceptible * params.vaccinated_fraction,
        params.initial_infected,
        0.0,
    ];
    let h = 1.0 / params.steps_per_day as f64;
    let f = |s: &State| derivatives(s, beta, params.gamma, params.vaccine_efficacy);

    let mut daily = Vec::with_capacity(params.days + 1);
    daily.push(y);
    for day in 0..params.days {
        cancel.check(day, params.days)?;
        for _ in 0..params.steps_per_day {
            y = rk4_step(&y, h, &f);
        }
        daily.push(y);
    }

    let (peak_day, peak_infected) = daily
        .iter()
        .enumerate()
        .map(|(d, s)| (d, s[2]))
        .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
    let final_recovered = daily.last().map_or(0.0, |s| s[3]);

    info!(
        "SIR-V: beta_eff={:.4}, R0={:.3}, peak {:.0} infected on day {}",
        beta,
        params.basic_reproduction_number(),
        peak_infected,
        peak_day
    );

    let labels = time_labels(daily.len());
    let mut builder = ResultBuilder::new();
    builder.series("susceptible", labels.clone(), daily.iter().map(|s| s[0] + s[1]).collect());
    builder.series("infected", labels.clone(), daily.iter().map(|s| s[2]).collect());
    builder.series("recovered", labels.clone(), daily.iter().map(|s| s[3]).collect());
    builder.series("total_infected", labels, daily.iter().map(|s| s[2] + s[3]).collect());
    builder.scalar("effective_beta", beta);
    builder.scalar("basic_reproduction_number", params.basic_reproduction_number());
    builder.scalar("peak_infected", peak_infected);
    builder.scalar("peak_day", peak_day as f64);
    builder.scalar("final_recovered", final_recovered);

    Ok(builder.finish(Provenance {
        fingerprint: None,
        dataset_kind: None,
        records: 0,
        config: RunConfig::Sirv(params.clone()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResultValue;

    fn series<'a>(result: &'a AnalysisResult, name: &str) -> &'a [f64] {
        match result.get(name) {
            Some(ResultValue::Series { values, .. }) => values,
            other => panic!("expected series '{}', got {:?}", name, other),
        }
    }

    #[test]
    fn test_effective_beta() {
        let params = SirvParams {
            base_beta: 0.3,
            temperature: 0.0,
            reference_temperature: 10.0,
            temperature_sensitivity: 0.05,
            mobility: 2.0,
            ..SirvParams::default()
        };
        assert!((params.effective_beta() - 0.3 * 1.5 * 2.0).abs() < 1e-12);

        let warm = SirvParams {
            temperature: 30.0,
            ..params
        };
        assert!((warm.effective_beta() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_population_conserved() {
        let params = SirvParams::default();
        let result = simulate_sirv(&params, &CancelToken::new()).unwrap();

        let s = series(&result, "susceptible");
        let i = series(&result, "infected");
        let r = series(&result, "recovered");
        assert_eq!(s.len(), params.days + 1);
        for t in 0..s.len() {
            let total = s[t] + i[t] + r[t];
            assert!((total - params.population).abs() / params.population < 1e-9);
        }
        assert_eq!(i[0], params.initial_infected);
    }

    #[test]
    fn test_epidemic_grows_and_peaks() {
        let result = simulate_sirv(&SirvParams::default(), &CancelToken::new()).unwrap();
        let peak = result.scalar("peak_infected").unwrap();
        assert!(peak > 1000.0);
        assert!(result.scalar("peak_day").unwrap() > 0.0);
        assert!(result.scalar("basic_reproduction_number").unwrap() > 1.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let bad = SirvParams {
            vaccine_efficacy: 1.5,
            ..SirvParams::default()
        };
        assert!(matches!(
            simulate_sirv(&bad, &CancelToken::new()),
            Err(BioenvError::Config(_))
        ));
        let no_days = SirvParams {
            days: 0,
            ..SirvParams::default()
        };
        assert!(matches!(no_days.validate(), Err(BioenvError::Config(_))));
    }

    #[test]
    fn test_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            simulate_sirv(&SirvParams::default(), &token),
            Err(BioenvError::Cancelled { .. })
        ));
    }
}
