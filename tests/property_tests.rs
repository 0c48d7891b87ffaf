//! Property-based tests for binary-evo
//!
//! Uses proptest to verify invariants of the codec, the operators and the
//! generation step.

use binary_evo::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn pool(fitness: &[f64]) -> Vec<Genome> {
    let codec = VectorCodec::new(BitCodec::new(8, 4).unwrap(), MultiBounds::symmetric(10.0, 1));
    fitness
        .iter()
        .enumerate()
        .map(|(i, &f)| {
            Genome::from_phenotype(GenomeId(i as u64), &[0.0], &codec)
                .unwrap()
                .with_fitness(f)
        })
        .collect()
}

fn bit_pair(max_len: usize) -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (2usize..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
        )
    })
}

proptest! {
    // ==================== Codec Properties ====================

    #[test]
    fn codec_round_trip_error_is_bounded(
        half_width in 0.01f64..1000.0,
        fraction in -1.0f64..=1.0,
        exponent_bits in 4usize..8,
        mantissa_bits in 3usize..20,
    ) {
        let codec = BitCodec::new(1 + exponent_bits + mantissa_bits, exponent_bits).unwrap();
        prop_assume!(codec.max_magnitude() >= half_width);

        let bounds = Bounds::symmetric(half_width);
        let value = fraction * half_width;
        let decoded = codec.decode(codec.encode(value, &bounds).bits(), &bounds).unwrap();

        let tolerance = value.abs() * (-(mantissa_bits as f64)).exp2() + codec.min_magnitude();
        prop_assert!(
            (decoded - value).abs() <= tolerance,
            "value {} decoded as {} (tolerance {})", value, decoded, tolerance
        );
        prop_assert!((decoded - value).abs() <= bounds.range() * (-(mantissa_bits as f64)).exp2() + codec.min_magnitude());
    }

    #[test]
    fn codec_zero_is_exact(exponent_bits in 1usize..11, mantissa_bits in 0usize..30) {
        let codec = BitCodec::new(1 + exponent_bits + mantissa_bits, exponent_bits).unwrap();
        let bounds = Bounds::symmetric(5.0);
        let bits = codec.encode(0.0, &bounds);
        prop_assert!(bits.is_all_zero());
        prop_assert_eq!(bits.len(), codec.bits_per_var());
        prop_assert_eq!(codec.decode(bits.bits(), &bounds).unwrap(), 0.0);
    }

    #[test]
    fn codec_decode_of_any_bits_is_in_bounds(
        bits in prop::collection::vec(any::<bool>(), 12),
        low in -50.0f64..0.0,
        width in 0.1f64..100.0,
    ) {
        let codec = BitCodec::new(12, 5).unwrap();
        let bounds = Bounds::new(low, low + width);
        let value = codec.decode(&bits, &bounds).unwrap();
        prop_assert!(bounds.contains(value));
    }

    #[test]
    fn codec_rejects_wrong_field_width(len in 0usize..40) {
        prop_assume!(len != 16);
        let codec = BitCodec::new(16, 5).unwrap();
        let bits = vec![false; len];
        prop_assert!(codec.decode(&bits, &Bounds::default()).is_err());
    }

    #[test]
    fn vector_codec_genotype_length(num_vars in 1usize..10, values in prop::collection::vec(-10.0f64..10.0, 10)) {
        let codec = VectorCodec::new(BitCodec::new(16, 5).unwrap(), MultiBounds::symmetric(10.0, num_vars));
        let genotype = codec.encode(&values[..num_vars]).unwrap();
        prop_assert_eq!(genotype.len(), num_vars * 16);
        prop_assert_eq!(codec.decode(&genotype).unwrap().len(), num_vars);
    }

    // ==================== Operator Properties ====================

    #[test]
    fn crossover_preserves_length_and_provenance(
        (p1, p2) in bit_pair(64),
        points_seed in any::<usize>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let length = p1.len();
        let points = 1 + points_seed % (length - 1);
        let parent1 = BitString::new(p1);
        let parent2 = BitString::new(p2);

        let (c1, c2) = MultiPointCrossover::new(points)
            .crossover(&parent1, &parent2, &mut rng)
            .unwrap();

        prop_assert_eq!(c1.len(), length);
        prop_assert_eq!(c2.len(), length);
        for i in 0..length {
            // each position is taken from one parent and its complement from the other
            let from_first = c1[i] == parent1[i] && c2[i] == parent2[i];
            let from_second = c1[i] == parent2[i] && c2[i] == parent1[i];
            prop_assert!(from_first || from_second);
        }
    }

    #[test]
    fn crossover_rejects_invalid_cut_counts((p1, p2) in bit_pair(32), extra in 0usize..4) {
        let mut rng = StdRng::seed_from_u64(0);
        let length = p1.len();
        let parent1 = BitString::new(p1);
        let parent2 = BitString::new(p2);
        let too_many = MultiPointCrossover::new(length + extra).crossover(&parent1, &parent2, &mut rng);
        prop_assert!(
            matches!(too_many, Err(OperatorError::InvalidCutCount { .. })),
            "unexpected result: {:?}",
            too_many
        );
    }

    #[test]
    fn mutation_extremes(bits in prop::collection::vec(any::<bool>(), 1..100), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let original = BitString::new(bits);

        let mut untouched = original.clone();
        BitFlipMutation::new(0.0).mutate(&mut untouched, &mut rng);
        prop_assert_eq!(&untouched, &original);

        let mut flipped = original.clone();
        BitFlipMutation::new(1.0).mutate(&mut flipped, &mut rng);
        prop_assert_eq!(flipped.hamming_distance(&original), original.len());
    }

    // ==================== Selection Properties ====================

    #[test]
    fn tournament_parents_are_distinct(
        fitness in prop::collection::vec(-100.0f64..100.0, 2..30),
        size_seed in any::<usize>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool = pool(&fitness);
        let size = 2 + size_seed % (pool.len() - 1);
        let selection = TournamentSelection::new(size, OptimizationGoal::Minimize);

        let (a, b) = selection.select_pair(&pool, &mut rng).unwrap();
        prop_assert!(a < pool.len() && b < pool.len());
        prop_assert_ne!(pool[a].id(), pool[b].id());
    }

    #[test]
    fn roulette_parents_are_distinct(
        fitness in prop::collection::vec(-100.0f64..100.0, 2..30),
        maximize in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let goal = if maximize { OptimizationGoal::Maximize } else { OptimizationGoal::Minimize };
        let pool = pool(&fitness);

        let (a, b) = RouletteSelection::new(goal).select_pair(&pool, &mut rng).unwrap();
        prop_assert_ne!(pool[a].id(), pool[b].id());
    }

    #[test]
    fn selection_weights_are_positive(
        raw in prop::collection::vec(-1e6f64..1e6, 1..50),
        maximize in any::<bool>(),
    ) {
        let goal = if maximize { OptimizationGoal::Maximize } else { OptimizationGoal::Minimize };
        let weights = selection_weights(&raw, goal);
        prop_assert!(weights.iter().all(|&w| w >= WEIGHT_EPSILON));
    }

    #[test]
    fn survivors_are_distinct(fitness in prop::collection::vec(-10.0f64..10.0, 4), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let genomes = pool(&fitness);
        let candidates: [Genome; 4] = [
            genomes[0].clone(),
            genomes[1].clone(),
            genomes[2].clone(),
            genomes[3].clone(),
        ];
        let [a, b] = SurvivorSelector::new(OptimizationGoal::Minimize)
            .select(&candidates, &mut rng)
            .unwrap();
        prop_assert_ne!(a, b);
    }

    // ==================== Bounds Properties ====================

    #[test]
    fn bounds_clamp_within_range(
        value in -1000.0f64..1000.0,
        min in -100.0f64..0.0,
        max in 0.1f64..100.0
    ) {
        let bounds = Bounds::new(min, max);
        let clamped = bounds.clamp(value);
        prop_assert!(bounds.contains(clamped));
    }

    // ==================== Bit String Properties ====================

    #[test]
    fn bit_string_display_parse_round_trip(bits in prop::collection::vec(any::<bool>(), 0..100)) {
        let original = BitString::new(bits);
        let parsed: BitString = original.to_string().parse().unwrap();
        prop_assert_eq!(parsed, original);
    }

    #[test]
    fn bit_string_count_consistency(bits in prop::collection::vec(any::<bool>(), 1..100)) {
        let bs = BitString::new(bits);
        prop_assert_eq!(bs.count_ones() + bs.count_zeros(), bs.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // ==================== Population Properties ====================

    #[test]
    fn population_size_is_invariant(
        size in 1usize..30,
        steady_state in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let scheme = if steady_state && size >= 2 {
            GenerationScheme::SteadyState
        } else {
            GenerationScheme::Generational
        };
        let mut ga = BinaryGA::builder()
            .population_size(size)
            .search_space(2, Bounds::symmetric(5.0))
            .bits_per_var(12)
            .exponent_bits(4)
            .tournament(2)
            .scheme(scheme)
            .objective(Sphere::new(2))
            .build()
            .unwrap();
        ga.seed(&mut rng).unwrap();

        for _ in 0..5 {
            ga.step(&mut rng).unwrap();
            prop_assert_eq!(ga.population().len(), size);
            prop_assert!(ga.population().all_evaluated());
        }
    }

    #[test]
    fn degenerate_population_is_repaired(size in 4usize..40, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ga = BinaryGA::builder()
            .population_size(size)
            .search_space(3, Bounds::symmetric(10.0))
            .objective(Sphere::new(3))
            .build()
            .unwrap();
        ga.seed_from_phenotypes(&vec![vec![1.5, -2.0, 3.0]; size]).unwrap();
        prop_assert!(ga.population().is_degenerate(0.95));

        ga.evolve_one_generation(&mut rng).unwrap();
        prop_assert!(ga.population().most_common_genotype_ratio() <= 0.95);
    }
}
