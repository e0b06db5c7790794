use rand::Rng;

const NOISE_LIMIT: f32 = 5.0;

/// Per-vertex scalar offsets along the normal, plus the random walk feeding them.
#[derive(Clone, Debug)]
pub struct DisplacementField {
    displacement: Vec<f32>,
    noise: Vec<f32>,
}

impl DisplacementField {
    pub fn new<R: Rng>(vertex_count: usize, rng: &mut R) -> Self {
        let noise = (0..vertex_count)
            .map(|_| rng.gen::<f32>() * NOISE_LIMIT)
            .collect();
        Self {
            displacement: vec![0.0; vertex_count],
            noise,
        }
    }

    pub fn len(&self) -> usize {
        self.displacement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty()
    }

    pub fn displacement(&self) -> &[f32] {
        &self.displacement
    }

    pub fn noise(&self) -> &[f32] {
        &self.noise
    }

    /// Recompute every displacement as a travelling sine wave plus a clamped
    /// random walk.
    pub fn step<R: Rng>(&mut self, time: f32, rng: &mut R) {
        for (i, (d, n)) in self
            .displacement
            .iter_mut()
            .zip(self.noise.iter_mut())
            .enumerate()
        {
            *n += 0.5 * (0.5 - rng.gen::<f32>());
            *n = n.clamp(-NOISE_LIMIT, NOISE_LIMIT);
            *d = (0.1 * i as f32 + time).sin() + *n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn initial_noise_is_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = DisplacementField::new(1000, &mut rng);
        assert_eq!(field.len(), 1000);
        assert!(field.noise().iter().all(|n| (0.0..5.0).contains(n)));
        assert!(field.displacement().iter().all(|d| *d == 0.0));
    }

    #[test]
    fn noise_stays_clamped() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = DisplacementField::new(64, &mut rng);
        for frame in 0..2000 {
            field.step(frame as f32 * 0.16, &mut rng);
            assert!(field.noise().iter().all(|n| n.abs() <= 5.0));
        }
        assert_eq!(field.len(), 64);
    }

    #[test]
    fn displacement_is_sine_plus_noise() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = DisplacementField::new(32, &mut rng);
        let time = 12.5;
        field.step(time, &mut rng);
        for (i, (d, n)) in field.displacement().iter().zip(field.noise()).enumerate() {
            let expected = (0.1 * i as f32 + time).sin() + n;
            assert!((d - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = DisplacementField::new(16, &mut StdRng::seed_from_u64(5));
        let mut b = DisplacementField::new(16, &mut StdRng::seed_from_u64(5));
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        a.step(1.0, &mut rng_a);
        b.step(1.0, &mut rng_b);
        assert_eq!(a.displacement(), b.displacement());
    }

    #[test]
    fn empty_field() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = DisplacementField::new(0, &mut rng);
        field.step(1.0, &mut rng);
        assert!(field.is_empty());
    }
}
