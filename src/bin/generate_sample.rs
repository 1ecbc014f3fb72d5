use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use startup_profit::data::loader;
use startup_profit::predict::artifact::{LinearPipeline, ModelArtifact};
use startup_profit::predict::store;
use startup_profit::{Dataset, Record, ServiceConfig};

/// Normal draw via Box-Muller on top of two uniform samples.
fn gauss<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.gen::<f64>().max(1e-15);
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Coefficients in the neighbourhood of a regression fitted on the public
/// 50 startups data; used to give the synthetic profits a realistic shape.
fn pipeline() -> LinearPipeline {
    let states: BTreeMap<String, f64> = [("California", 0.0), ("Florida", 198.8), ("New York", -41.9)]
        .into_iter()
        .map(|(s, c)| (s.to_string(), c))
        .collect();
    LinearPipeline {
        intercept: 50125.34,
        rd_spend: 0.806,
        administration: -0.027,
        marketing_spend: 0.027,
        states,
    }
}

fn sample_records(pipe: &LinearPipeline, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let states = ["New York", "California", "Florida"];

    (0..50)
        .map(|i| {
            let rd_spend = round2(rng.gen_range(0.0..165_349.2));
            let administration = round2(rng.gen_range(51_283.14..182_645.56));
            let marketing_spend = round2(rng.gen_range(0.0..471_784.1));
            let state = states[i % states.len()];
            let profit = pipe.intercept
                + pipe.rd_spend * rd_spend
                + pipe.administration * administration
                + pipe.marketing_spend * marketing_spend
                + pipe.states[state]
                + gauss(&mut rng, 0.0, 9_000.0);
            Record {
                rd_spend,
                administration,
                marketing_spend,
                state: state.to_string(),
                profit: round2(profit.max(0.0)),
            }
        })
        .collect()
}

fn main() {
    let pipe = pipeline();
    let records = sample_records(&pipe, 42);

    let config = ServiceConfig::default();
    let dataset = Dataset::from_records(records);

    if let Some(dir) = config.data_path.parent() {
        std::fs::create_dir_all(dir).expect("Failed to create data directory");
    }
    loader::write_csv(&dataset, &config.data_path).expect("Failed to write dataset");

    let bytes = ModelArtifact::Linear(pipe)
        .to_vec_pretty()
        .expect("Failed to encode model");
    store::replace_model(&bytes, &config.model_path).expect("Failed to write model");

    println!(
        "Wrote {} startups to {} and a linear model to {}",
        dataset.len(),
        config.data_path.display(),
        config.model_path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_dataset() {
        let pipe = pipeline();
        assert_eq!(sample_records(&pipe, 42), sample_records(&pipe, 42));
        assert_ne!(sample_records(&pipe, 42), sample_records(&pipe, 7));
    }

    #[test]
    fn records_stay_in_observed_ranges() {
        let records = sample_records(&pipeline(), 42);
        assert_eq!(records.len(), 50);
        for r in &records {
            assert!((0.0..=165_349.2).contains(&r.rd_spend));
            assert!((51_283.14..=182_645.56).contains(&r.administration));
            assert!((0.0..=471_784.1).contains(&r.marketing_spend));
            assert!(r.profit >= 0.0 && r.profit.is_finite());
        }
        let ds = Dataset::from_records(records);
        assert_eq!(ds.states(), vec!["New York", "California", "Florida"]);
    }
}
