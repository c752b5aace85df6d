use colourcomb::notch::{
    ChainMode, EngineConfig, FilterChain, FrequencyBounds, NotchEngine, Note, ParamError,
    ParameterSnapshot, QCurve, ToggleOutcome,
};

const SAMPLE_RATE: f32 = 44100.0;

fn note(index: u8) -> Note {
    Note::new(index).expect("valid note index")
}

fn engine() -> NotchEngine {
    let mut engine = NotchEngine::new(EngineConfig::default());
    engine.prepare(SAMPLE_RATE, 512, 2);
    engine
}

fn tone(frequency: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / SAMPLE_RATE).sin())
        .collect()
}

fn mixture(len: usize) -> Vec<f32> {
    let a = tone(523.25, len);
    let b = tone(1234.0, len);
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Run a stereo signal through the engine in fixed blocks.
fn run(engine: &mut NotchEngine, left: &[f32], right: &[f32], block: usize) -> (Vec<f32>, Vec<f32>) {
    let mut out_left = left.to_vec();
    let mut out_right = right.to_vec();
    for (l, r) in out_left.chunks_mut(block).zip(out_right.chunks_mut(block)) {
        engine.process_block(&mut [l, r]);
    }
    (out_left, out_right)
}

#[test]
fn zero_mix_is_exact_dry_passthrough() {
    let mut engine = engine();
    for i in [0, 4, 7, 9] {
        engine.toggle_note(note(i));
    }
    engine.set_parameter("mix", 0.0).unwrap();

    let input = mixture(4096);
    let (left, right) = run(&mut engine, &input, &input, 256);
    assert_eq!(left, input);
    assert_eq!(right, input);
}

#[test]
fn full_mix_is_exactly_the_filtered_signal() {
    let mut engine = engine();
    engine.toggle_note(note(0));
    engine.toggle_note(note(9));
    engine.set_parameter("mix", 100.0).unwrap();
    engine.set_parameter("makeup", 0.0).unwrap();

    let mut reference = engine.controller().build_chain();
    let input = mixture(3000);
    let expected: Vec<f32> = input
        .iter()
        .map(|&s| reference.process_sample(0, s))
        .collect();

    let (left, _) = run(&mut engine, &input, &input, 128);
    assert_eq!(left, expected);
}

#[test]
fn empty_bank_is_dry_passthrough() {
    let mut engine = engine();
    engine.toggle_note(note(2));
    engine.toggle_note(note(2));
    assert!(engine.controller().notes().is_empty());

    let input = mixture(2048);
    let (left, right) = run(&mut engine, &input, &input, 512);
    assert_eq!(left, input);
    assert_eq!(right, input);
}

#[test]
fn silence_stays_silent() {
    let mut engine = engine();
    for i in 0..5 {
        engine.toggle_note(note(i));
    }
    engine.set_parameter("mix", 63.0).unwrap();
    let silence = vec![0.0; 1024];
    let (left, right) = run(&mut engine, &silence, &silence, 256);
    assert!(left.iter().chain(right.iter()).all(|&s| s == 0.0));
}

#[test]
fn makeup_gain_scales_linearly() {
    let mut engine = engine();
    engine.set_parameter("makeup", -6.0).unwrap();
    let input = mixture(1024);
    let (left, _) = run(&mut engine, &input, &input, 256);
    let gain = 10f32.powf(-6.0 / 20.0);
    for (out, dry) in left.iter().zip(input.iter()) {
        assert!((out - dry * gain).abs() < 1e-6);
    }
}

#[test]
fn partial_mix_blends_wet_and_dry() {
    let mut engine = engine();
    engine.toggle_note(note(0));
    engine.set_parameter("mix", 25.0).unwrap();

    let mut reference = engine.controller().build_chain();
    let input = mixture(2048);
    let (left, _) = run(&mut engine, &input, &input, 512);
    for (out, &dry) in left.iter().zip(input.iter()) {
        let wet = reference.process_sample(0, dry);
        let expected = 0.25 * wet + 0.75 * dry;
        assert!((out - expected).abs() < 1e-5);
    }
}

#[test]
fn engaged_note_suppresses_its_harmonic() {
    let mut engine = engine();
    engine.set_parameter("q", 10.0).unwrap();
    engine.toggle_note(note(0));

    let input = tone(1046.5, 44100);
    let (left, _) = run(&mut engine, &input, &input, 512);
    let settled = &left[22050..];
    assert!(rms(settled) < 0.1 * rms(&input[22050..]), "rms {}", rms(settled));
}

#[test]
fn channels_are_filtered_independently() {
    let mut engine = engine();
    engine.toggle_note(note(0));

    let signal = mixture(2048);
    let silence = vec![0.0; 2048];
    let (left, right) = run(&mut engine, &signal, &silence, 256);
    assert!(right.iter().all(|&s| s == 0.0));

    let mut mono = self::engine();
    mono.toggle_note(note(0));
    let mut alone = signal.clone();
    for block in alone.chunks_mut(256) {
        mono.process_block(&mut [block]);
    }
    assert_eq!(left, alone);
}

#[test]
fn extra_channels_get_mix_and_gain_only() {
    let mut engine = engine();
    engine.toggle_note(note(9));
    engine.set_parameter("makeup", -20.0).unwrap();

    let input = mixture(256);
    let mut a = input.clone();
    let mut b = input.clone();
    let mut c = input.clone();
    engine.process_block(&mut [&mut a, &mut b, &mut c]);
    for (out, dry) in c.iter().zip(input.iter()) {
        assert!((out - dry * 0.1).abs() < 1e-6);
    }
}

#[test]
fn interleaved_matches_planar() {
    let mut planar = engine();
    let mut interleaved = engine();
    for engine in [&mut planar, &mut interleaved] {
        engine.toggle_note(note(0));
        engine.toggle_note(note(7));
        engine.set_parameter("mix", 80.0).unwrap();
    }

    let left = mixture(1024);
    let right = tone(880.0, 1024);
    let (out_left, out_right) = run(&mut planar, &left, &right, 256);

    let mut frames: Vec<f32> = left
        .iter()
        .zip(right.iter())
        .flat_map(|(l, r)| [*l, *r])
        .collect();
    for block in frames.chunks_mut(512) {
        interleaved.processor_mut().process_interleaved(block, 2);
    }
    for (i, frame) in frames.chunks(2).enumerate() {
        assert_eq!(frame[0], out_left[i]);
        assert_eq!(frame[1], out_right[i]);
    }
}

#[test]
fn toggles_respect_the_cap_and_rebuild() {
    let mut engine = engine();
    for i in 0..5 {
        assert_eq!(engine.toggle_note(note(i)), ToggleOutcome::Engaged);
    }
    let generation = engine.controller().generation();
    assert_eq!(engine.toggle_note(note(11)), ToggleOutcome::Rejected);
    assert_eq!(engine.controller().generation(), generation);
    assert_eq!(engine.controller().notes().len(), 5);

    engine.processor_mut().sync();
    assert_eq!(engine.processor().generation(), generation);
    let filters = engine.processor().chain().filters();
    assert!(filters.len() <= 35);
    assert!(filters.iter().all(|f| f.note() != note(11)));
}

#[test]
fn mix_changes_do_not_rebuild() {
    let mut engine = engine();
    let generation = engine.controller().generation();
    engine.set_parameter("mix", 40.0).unwrap();
    engine.set_parameter("makeup", -3.0).unwrap();
    assert_eq!(engine.controller().generation(), generation);
    engine.set_parameter("q", 200.0).unwrap();
    assert_eq!(engine.controller().generation(), generation + 1);
}

#[test]
fn parameters_are_clamped_and_snapped() {
    let mut engine = engine();
    engine.set_parameter("q", 1000.0).unwrap();
    assert_eq!(engine.controller().parameter("q").unwrap(), 300.0);
    engine.set_parameter("q", 121.0).unwrap();
    let q = engine.controller().parameter("q").unwrap();
    assert!(q == 120.0 || q == 122.0);
    engine.set_parameter("makeup", -100.0).unwrap();
    assert_eq!(engine.controller().parameter("makeup").unwrap(), -60.0);
    engine.set_parameter("qFunction", 1.0).unwrap();
    assert_eq!(engine.controller().params().q_function, QCurve::InverseSine);
    engine.set_parameter("key", 14.0).unwrap();
    assert_eq!(engine.controller().params().key, note(11));
}

#[test]
fn bad_parameter_requests_are_errors() {
    let mut engine = engine();
    assert_eq!(
        engine.set_parameter("resonance", 1.0),
        Err(ParamError::UnknownParameter("resonance".to_string()))
    );
    assert_eq!(
        engine.set_parameter("mix", f32::NAN),
        Err(ParamError::NotANumber { id: "mix" })
    );
    assert_eq!(engine.controller().parameter("mix").unwrap(), 100.0);
}

#[test]
fn press_key_sets_key_and_toggles() {
    let mut engine = engine();
    let outcome = engine.controller_mut().press_key(note(4));
    assert_eq!(outcome, ToggleOutcome::Engaged);
    assert_eq!(engine.controller().params().key, note(4));
    assert!(engine.controller().notes().is_engaged(note(4)));
}

#[test]
fn single_key_mode_publishes_a_key_chain() {
    let mut engine = engine();
    engine.set_parameter("key", 9.0).unwrap();
    engine.controller_mut().set_chain_mode(ChainMode::SingleKey);
    engine.processor_mut().sync();
    match engine.processor().chain() {
        FilterChain::SingleKey(chain) => {
            assert_eq!(chain.key(), note(9));
            assert_eq!(chain.slots().len(), 7);
            assert_eq!(chain.active_count(), 4);
        }
        other => panic!("expected a key chain, got {:?}", other.mode()),
    }
}

#[test]
fn single_key_mode_matches_one_engaged_note() {
    let mut dynamic = engine();
    dynamic.toggle_note(note(9));

    let mut legacy = engine();
    legacy.set_parameter("key", 9.0).unwrap();
    legacy.controller_mut().set_chain_mode(ChainMode::SingleKey);

    let input = mixture(4096);
    let (a, _) = run(&mut dynamic, &input, &input, 512);
    let (b, _) = run(&mut legacy, &input, &input, 512);
    assert_eq!(a, b);
}

#[test]
fn frequency_bounds_trigger_rebuild() {
    let mut engine = engine();
    engine.toggle_note(note(9));
    let generation = engine.controller().generation();
    engine.controller_mut().set_frequency_bounds(300.0, 20_000.0);
    assert_eq!(engine.controller().generation(), generation + 1);
    // A: 440 through 14080 Hz, 220 Hz falls below the floor
    let chain = engine.controller().build_chain();
    assert_eq!(chain.active_filters().count(), 6);
    assert!(chain.active_filters().all(|f| f.center_hz() >= 300.0));
}

#[test]
fn retuning_keeps_filter_history() {
    let mut engine = engine();
    engine.toggle_note(note(0));
    let input = mixture(1024);
    run(&mut engine, &input, &input, 256);

    engine.set_parameter("q", 40.0).unwrap();
    engine.processor_mut().sync();
    assert!(engine
        .processor()
        .chain()
        .filters()
        .iter()
        .all(|f| !f.biquad().states()[0].is_quiescent()));
}

#[test]
fn prepare_resets_filter_history() {
    let mut engine = engine();
    engine.toggle_note(note(0));
    let input = mixture(1024);
    run(&mut engine, &input, &input, 256);

    engine.prepare(48000.0, 256, 2);
    assert_eq!(engine.controller().config().sample_rate, 48000.0);
    let chain = engine.processor().chain();
    assert!(!chain.filters().is_empty());
    assert!(chain
        .filters()
        .iter()
        .all(|f| f.biquad().states().iter().all(|s| s.is_quiescent())));
}

#[test]
fn reset_survives_when_the_prepared_chain_is_discarded() {
    let mut engine = engine();
    engine.toggle_note(note(0));
    let input = mixture(1024);
    run(&mut engine, &input, &input, 256);

    let (mut controller, mut processor) = engine.split();
    controller.prepare(EngineConfig::new(SAMPLE_RATE, 512, 2));
    let prepared = controller.generation();
    // Overflow the pending queue so the prepared chain is dropped unseen.
    for q in [20.0, 30.0, 40.0, 50.0, 60.0] {
        controller.set_parameter("q", q).unwrap();
    }
    processor.sync();

    assert_eq!(processor.generation(), controller.generation());
    assert!(processor.generation() > prepared);
    let chain = processor.chain();
    assert!(!chain.filters().is_empty());
    assert!(chain
        .filters()
        .iter()
        .all(|f| f.biquad().states().iter().all(|s| s.is_quiescent())));
}

#[test]
fn non_finite_input_resets_the_chain_and_recovers() {
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let mut engine = engine();
        engine.toggle_note(note(0));
        let mut left = tone(1046.5, 256);
        let mut right = left.clone();
        left[255] = bad;
        right[255] = bad;
        engine.process_block(&mut [&mut left, &mut right]);

        assert!(left[..255].iter().all(|s| s.is_finite()));
        assert!(engine
            .processor()
            .chain()
            .filters()
            .iter()
            .all(|f| f.biquad().states().iter().all(|s| s.is_quiescent())));

        let mut left = tone(1046.5, 256);
        let mut right = left.clone();
        left[3] = bad;
        engine.process_block(&mut [&mut left, &mut right]);
        assert!(left[4..].iter().all(|s| s.is_finite()));
        assert!(right.iter().all(|s| s.is_finite()));
    }
}

#[test]
fn prepare_sanitizes_bad_configs() {
    let mut engine = engine();
    engine.prepare(f32::NAN, 0, 0);
    let config = *engine.controller().config();
    assert_eq!(config.sample_rate, 44100.0);
    assert_eq!(config.max_block_size, 1);
    assert_eq!(config.num_channels, 1);
    assert!(EngineConfig::new(44100.0, 512, 3).validate().is_err());
    assert!(EngineConfig::new(44100.0, 512, 1).validate().is_ok());
}

#[test]
fn state_round_trip_rebuilds_the_same_bank() {
    let mut saved = engine();
    for i in [0, 4, 7] {
        saved.toggle_note(note(i));
    }
    saved.set_parameter("q", 150.0).unwrap();
    saved.set_parameter("qFunction", 1.0).unwrap();
    saved.set_parameter("mix", 70.0).unwrap();
    saved.controller_mut().set_frequency_bounds(300.0, 20_000.0);
    let blob = saved.save_state();

    let mut restored = engine();
    restored.restore_state(&blob);
    assert_eq!(restored.controller().params(), saved.controller().params());
    assert_eq!(restored.controller().notes(), saved.controller().notes());
    assert_eq!(restored.controller().bounds(), saved.controller().bounds());

    let a = saved.controller().build_chain();
    let b = restored.controller().build_chain();
    assert_eq!(a.filters().len(), b.filters().len());
    for (x, y) in a.filters().iter().zip(b.filters().iter()) {
        assert!((x.center_hz() - y.center_hz()).abs() < 1e-3);
        assert!((x.q() - y.q()).abs() < 1e-4);
    }
}

#[test]
fn corrupt_state_falls_back_to_defaults() {
    let mut engine = engine();
    engine.toggle_note(note(3));
    engine.set_parameter("q", 50.0).unwrap();
    engine.restore_state(b"<xml>not json</xml>");
    assert_eq!(*engine.controller().params(), ParameterSnapshot::default());
    assert!(engine.controller().notes().is_empty());
}

#[test]
fn partial_state_keeps_valid_parts() {
    let mut engine = engine();
    engine.restore_state(br#"{"parameters":{"q":1000.0,"mix":12.5},"active_notes":[11,3,3,42,0,1,2,5]}"#);
    let params = engine.controller().params();
    assert_eq!(params.q_ratio, 300.0);
    assert_eq!(params.mix, 12.5);
    assert_eq!(params.makeup_db, 0.0);
    let notes: Vec<u8> = engine.controller().notes().iter().map(u8::from).collect();
    assert_eq!(notes, vec![0, 1, 2, 3, 5]);
    assert_eq!(engine.controller().bounds(), FrequencyBounds::default());
}

#[test]
fn tail_length_is_zero() {
    assert_eq!(engine().tail_length_seconds(), 0.0);
}
