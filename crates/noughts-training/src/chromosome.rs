//! Chromosome operators: initialization, crossover and mutation.
//!
//! A chromosome is a plain `Vec<f32>` whose length equals the candidate's
//! parameter count. Every operator here keeps genes inside
//! `[GENE_MIN, GENE_MAX]`.
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws every gene uniformly from `[-1, 1]`
//! - **Crossover**: [`arithmetic_crossover`] blends two parents with one scalar per child
//! - **Mutation**: [`mutate`] adds Gaussian noise to a random subset of genes
//!
//! Parent selection and elitism live in [`genetic`](crate::genetic).

use rand::Rng;
use rand_distr::Normal;

pub const GENE_MIN: f32 = -1.0;
pub const GENE_MAX: f32 = 1.0;

/// Creates a chromosome by applying a function to each index.
///
/// # Examples
///
/// ```
/// use noughts_training::chromosome;
///
/// let genes = chromosome::from_fn(|i| if i % 2 == 0 { 0.5 } else { -0.5 }, 4);
/// assert_eq!(genes, vec![0.5, -0.5, 0.5, -0.5]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    (0..len).map(f).collect()
}

/// Generates a chromosome with every gene uniform in `[GENE_MIN, GENE_MAX]`.
pub fn random<R>(rng: &mut R, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(GENE_MIN..=GENE_MAX), len)
}

/// Arithmetic crossover: `child[i] = a * p1[i] + (1 - a) * p2[i]`.
///
/// A single blend factor `a`, uniform in `[0, 1]`, is drawn per child and
/// shared by all genes, so the child lies on the segment between the parents.
///
/// # Panics
///
/// Panics if parent chromosomes have different lengths.
pub fn arithmetic_crossover<R>(p1: &[f32], p2: &[f32], rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let a: f32 = rng.random_range(0.0..=1.0);
    from_fn(
        |i| (a * p1[i] + (1.0 - a) * p2[i]).clamp(GENE_MIN, GENE_MAX),
        p1.len(),
    )
}

/// Applies Gaussian mutation in place.
///
/// Each gene independently, with probability `rate`, receives a sample of
/// `noise` and is clamped back into `[GENE_MIN, GENE_MAX]`.
pub fn mutate<R>(genes: &mut [f32], noise: Normal<f32>, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let rate = f64::from(rate);
    for gene in genes {
        if rng.random_bool(rate) {
            *gene = (*gene + rng.sample(noise)).clamp(GENE_MIN, GENE_MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(17)
    }

    #[test]
    fn test_random_genes_in_range() {
        let genes = random(&mut rng(), 1000);
        assert_eq!(genes.len(), 1000);
        assert!(genes.iter().all(|g| (GENE_MIN..=GENE_MAX).contains(g)));
        // Both halves of the range are used.
        assert!(genes.iter().any(|&g| g < -0.5));
        assert!(genes.iter().any(|&g| g > 0.5));
    }

    #[test]
    fn test_crossover_stays_between_parents() {
        let mut rng = rng();
        let p1 = random(&mut rng, 50);
        let p2 = random(&mut rng, 50);
        for _ in 0..100 {
            let child = arithmetic_crossover(&p1, &p2, &mut rng);
            for ((c, a), b) in child.iter().zip(&p1).zip(&p2) {
                let (lo, hi) = (a.min(*b), a.max(*b));
                assert!(*c >= lo - 1e-6 && *c <= hi + 1e-6);
            }
        }
    }

    #[test]
    fn test_crossover_uses_one_blend_factor_per_child() {
        let p1 = vec![1.0; 8];
        let p2 = vec![-1.0; 8];
        let child = arithmetic_crossover(&p1, &p2, &mut rng());
        // With constant parents every gene gets the same blend.
        assert!(child.iter().all(|&g| (g - child[0]).abs() < 1e-6));
    }

    #[test]
    fn test_crossover_of_identical_parents() {
        let p = random(&mut rng(), 20);
        let child = arithmetic_crossover(&p, &p, &mut rng());
        for (c, g) in child.iter().zip(&p) {
            assert!((c - g).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mutation_stays_in_bounds() {
        let mut rng = rng();
        let huge = Normal::new(0.0, 100.0).unwrap();
        let mut genes = random(&mut rng, 500);
        for _ in 0..10 {
            mutate(&mut genes, huge, 0.5, &mut rng);
        }
        assert!(genes.iter().all(|g| (GENE_MIN..=GENE_MAX).contains(g)));
    }

    #[test]
    fn test_zero_rate_leaves_genes_unchanged() {
        let mut rng = rng();
        let genes = random(&mut rng, 100);
        let mut mutated = genes.clone();
        mutate(&mut mutated, Normal::new(0.0, 1.0).unwrap(), 0.0, &mut rng);
        assert_eq!(mutated, genes);
    }

    #[test]
    fn test_full_rate_changes_every_gene() {
        let mut rng = rng();
        let genes = vec![0.0; 100];
        let mut mutated = genes.clone();
        mutate(&mut mutated, Normal::new(0.0, 0.1).unwrap(), 1.0, &mut rng);
        assert!(mutated.iter().all(|&g| g != 0.0));
    }
}
