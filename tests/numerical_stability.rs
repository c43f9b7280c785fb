use qnoise::*;

#[test]
fn bounded_noise_never_leaves_support() {
    // q = 0.5, tau = 1: eta_cut = 1 / sqrt(0.5)
    let (tau, q) = (1.0, 0.5);
    let eta_cut = support_bound(tau, q);
    assert!((eta_cut - 1.414).abs() < 1e-3);

    let mut gen = QNoiseGen::from_seed(20_210_101);
    let step = StepSize::new(0.001);
    let mut eta = gen.gaussian_white_noise() / 100.0;
    for i in 0..1_000_000 {
        eta = gen.q_noise(eta, tau, q, step);
        assert!(
            eta.abs() <= eta_cut,
            "step {}: |{}| exceeds {}",
            i,
            eta,
            eta_cut
        );
    }
}

#[test]
fn bounded_noise_survives_stiff_parameters() {
    // Small q, long tau and a coarse step push the Heun step across the
    // boundary often, exercising every escalation tier.
    let cases = [(100.0, 0.1, 0.1), (10.0, 0.001, 0.5), (0.1, 0.3, 0.05), (1.0, -2.0, 0.2)];
    for (idx, &(tau, q, h)) in cases.iter().enumerate() {
        let eta_cut = support_bound(tau, q);
        let mut gen = QNoiseGen::from_seed(idx as u64);
        let mut eta = 0.0;
        for _ in 0..50_000 {
            let report = gen.q_noise_report(eta, tau, q, h);
            assert!(report.attempts <= 21);
            assert!(report.value.is_finite());
            assert!(
                report.value.abs() <= eta_cut,
                "tau={}, q={}, h={}: |{}| > {}",
                tau,
                q,
                h,
                report.value,
                eta_cut
            );
            eta = report.value;
        }
    }
}

#[test]
fn normalized_bounded_noise_respects_rescaled_support() {
    let (tau, q) = (1.0, 0.2);
    let eta_cut = support_bound(normalized_tau(tau, q), q);
    let mut gen = QNoiseGen::from_seed(77);
    let mut eta = 0.0;
    for _ in 0..200_000 {
        eta = gen.q_noise_norm(eta, tau, q, 0.01);
        assert!(eta.abs() <= eta_cut);
    }
}

#[test]
fn escalation_terminates_for_adversarial_variates() {
    struct Adversary(f64);
    impl VariateSource for Adversary {
        fn normal(&mut self) -> f64 {
            // Alternate huge positive and negative kicks.
            self.0 = -self.0;
            self.0
        }
        fn uniform(&mut self) -> f64 {
            0.98
        }
    }

    let mut rng = Adversary(1.0e9);
    for &start in &[0.0, 0.9, -0.9, 1.4] {
        let report = q_noise_report(&mut rng, start, 1.0, 0.5, 0.01);
        assert_eq!(report.tier, Tier::HardReset);
        assert_eq!(report.attempts, 21);
        assert!(report.value.abs() <= support_bound(1.0, 0.5));
    }
}

#[test]
fn heavy_tailed_noise_stays_finite() {
    let mut gen = QNoiseGen::from_seed(9);
    let mut eta = 0.0;
    for _ in 0..200_000 {
        eta = gen.q_noise(eta, 1.0, 1.3, 0.01);
        assert!(eta.is_finite());
    }
}
