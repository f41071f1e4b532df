//! Checkpoint round-trip: a reloaded snapshot reproduces the generator
//! bit-for-bit.

use alsvin_train::{
    AdversarialTrainer, Checkpoint, DatasetSampler, SeedSequence, TrainerConfig,
};
use ndarray::Array2;

fn flat_dataset(rows: usize, dim: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, dim), |(i, j)| 0.1 * i as f64 - 0.2 * j as f64)
}

#[test]
fn checkpoint_json_roundtrip_reproduces_generation() {
    let config = TrainerConfig {
        data_dim: 4,
        batch_size: 8,
        ..TrainerConfig::default()
    };
    let mut sampler = DatasetSampler::new(flat_dataset(32, 4)).unwrap();
    let trainer = AdversarialTrainer::new(config, &sampler).unwrap();
    let mut state = trainer.init_state(31);
    trainer.step(&mut state, &mut sampler).unwrap();

    let checkpoint = Checkpoint {
        iteration: state.iteration,
        score: Some(1.25),
        circuit_params: state.circuit_params.clone(),
        readout: state.readout.clone(),
    };
    let json = serde_json::to_string(&checkpoint).unwrap();
    let restored: Checkpoint = serde_json::from_str(&json).unwrap();

    let mut seeds_a = SeedSequence::new(123);
    let mut seeds_b = SeedSequence::new(123);
    let original = trainer
        .generate(&checkpoint.circuit_params, &checkpoint.readout, 16, &mut seeds_a)
        .unwrap();
    let reloaded = trainer
        .generate(&restored.circuit_params, &restored.readout, 16, &mut seeds_b)
        .unwrap();
    assert_eq!(original, reloaded);
    assert_eq!(restored.iteration, checkpoint.iteration);
    assert_eq!(restored.score, Some(1.25));
}
