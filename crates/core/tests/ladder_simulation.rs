use luckydraw_core::{
    advance_ladder, build_ladder_board, ConfigError, DrawError, LadderBoard, LadderConfig,
    LadderEvent, LadderRun, RngState, TokenState,
};
use std::collections::{HashMap, HashSet};

fn labels(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|idx| format!("{prefix}{idx}")).collect()
}

fn assert_spacing(board: &LadderBoard) {
    let rungs = board.rungs();
    for (idx, a) in rungs.iter().enumerate() {
        for b in &rungs[idx + 1..] {
            if a.slot == b.slot {
                assert!(
                    (a.y - b.y).abs() >= board.min_spacing(),
                    "slot {} rungs at {} and {}",
                    a.slot,
                    a.y,
                    b.y
                );
            }
        }
    }
}

macro_rules! ladder_case {
    ($name:ident, $lanes:expr, $prizes:expr) => {
        #[test]
        fn $name() {
            let config = LadderConfig::default();
            let people = labels("p", $lanes);
            let prizes = labels("g", $prizes);
            for seed in 0..25u64 {
                let mut rng = RngState::from_seed(seed * 1_000 + $lanes);
                let run = LadderRun::new(people.clone(), &prizes, &config, &mut rng)
                    .expect("ladder run");
                assert_spacing(run.board());
                let lane_prizes = run.lane_prizes().to_vec();
                let expected_lanes = run.board().trace();
                let budget = run.step_budget();

                let mut run = run;
                let mut ticks = 0u64;
                while !run.advance(1).done {
                    ticks += 1;
                    assert!(ticks <= budget, "seed {seed} exceeded {budget} ticks");
                }

                let ended: Vec<usize> = run.tokens().iter().map(|token| token.lane).collect();
                assert_eq!(ended, expected_lanes, "seed {seed}");

                let pairs = run.result().expect("finished run has a result");
                assert_eq!(pairs.len(), $lanes);
                let givers: Vec<_> = pairs.iter().map(|pair| pair.giver.clone()).collect();
                assert_eq!(givers, people);

                let mut remaining: HashMap<&str, usize> = HashMap::new();
                for prize in &lane_prizes {
                    *remaining.entry(prize.as_str()).or_default() += 1;
                }
                for pair in &pairs {
                    let slot = remaining
                        .get_mut(pair.receiver.as_str())
                        .expect("prize from the lane row");
                    assert!(*slot > 0, "prize {} handed out twice", pair.receiver);
                    *slot -= 1;
                }
                assert!(remaining.values().all(|count| *count == 0));
            }
        }
    };
}

ladder_case!(ladder_one_lane, 1, 3);
ladder_case!(ladder_two_lanes, 2, 2);
ladder_case!(ladder_three_lanes_one_prize, 3, 1);
ladder_case!(ladder_four_lanes, 4, 4);
ladder_case!(ladder_five_lanes_short_prizes, 5, 2);
ladder_case!(ladder_six_lanes_extra_prizes, 6, 9);
ladder_case!(ladder_eight_lanes, 8, 8);

#[test]
fn tokens_finish_on_the_bottom_edge() {
    let mut rng = RngState::from_seed(55);
    let mut run = LadderRun::new(
        labels("p", 6),
        &labels("g", 6),
        &LadderConfig::default(),
        &mut rng,
    )
    .expect("ladder run");
    while !run.advance(8).done {}
    let height = run.board().height();
    for token in run.tokens() {
        assert_eq!(token.state, TokenState::Finished);
        assert_eq!(token.y, height);
        assert_eq!(token.x, run.board().lane_x(token.lane));
    }
}

#[test]
fn events_report_every_crossing_and_finish() {
    let mut rng = RngState::from_seed(8);
    let mut run = LadderRun::new(
        labels("p", 5),
        &labels("g", 5),
        &LadderConfig::default(),
        &mut rng,
    )
    .expect("ladder run");
    let mut transfers = 0usize;
    let mut finished = Vec::new();
    loop {
        let progress = run.advance(4);
        for event in run.drain_events() {
            match event {
                LadderEvent::Transferred { from, to, .. } => {
                    assert_eq!(from.abs_diff(to), 1);
                    transfers += 1;
                }
                LadderEvent::Finished { token, .. } => finished.push(token),
            }
        }
        if progress.done {
            break;
        }
    }
    finished.sort_unstable();
    assert_eq!(finished, vec![0, 1, 2, 3, 4]);
    // Every rung is crossed by exactly the two tokens meeting at it.
    assert_eq!(transfers, run.board().rungs().len() * 2);
}

#[test]
fn pausing_between_steps_changes_nothing() {
    let config = LadderConfig::default();
    let people = labels("p", 7);
    let prizes = labels("g", 3);
    let straight = LadderRun::new(
        people.clone(),
        &prizes,
        &config,
        &mut RngState::from_seed(31),
    )
    .expect("run")
    .run_to_completion()
    .expect("finish");

    let mut paused =
        LadderRun::new(people, &prizes, &config, &mut RngState::from_seed(31)).expect("run");
    let snapshot = paused.clone();
    let mut cadence = [1u32, 7, 3, 30].into_iter().cycle();
    while !paused.advance(cadence.next().unwrap_or(1)).done {}
    assert_eq!(paused.result(), Some(straight));
    assert_eq!(snapshot.steps(), 0);
}

#[test]
fn advance_ladder_drives_bare_tokens() {
    let mut rng = RngState::from_seed(64);
    let board = build_ladder_board(5, 240.0, 24.0, &mut rng).expect("board");
    assert_spacing(&board);
    let run = LadderRun::with_board(
        board.clone(),
        labels("p", 5),
        labels("g", 5),
        &[2.0, 2.2, 2.4, 2.6, 2.8],
    )
    .expect("run");
    let mut tokens = run.tokens().to_vec();
    let mut done = false;
    for _ in 0..run.step_budget() {
        if advance_ladder(&board, &mut tokens, 1) {
            done = true;
            break;
        }
    }
    assert!(done);
    let lanes: Vec<usize> = tokens.iter().map(|token| token.lane).collect();
    assert_eq!(lanes, board.trace());
}

#[test]
fn tight_spacing_is_refused_up_front() {
    assert!(matches!(
        build_ladder_board(8, 250.0, 2.0, &mut RngState::from_seed(0)),
        Err(ConfigError::SpacingTooTight { .. })
    ));
    let config = LadderConfig {
        min_spacing: 2.0,
        ..LadderConfig::default()
    };
    let mut rng = RngState::from_seed(0);
    assert!(matches!(
        LadderRun::new(labels("p", 8), &labels("g", 8), &config, &mut rng),
        Err(DrawError::InvalidConfig(ConfigError::SpacingTooTight { .. }))
    ));
}

#[test]
fn crowded_boards_never_hand_out_a_prize_twice() {
    let config = LadderConfig {
        min_spacing: 2.0,
        ..LadderConfig::default()
    };
    let mut refused = 0;
    for seed in 0..200u64 {
        let board = LadderBoard::generate(8, &config, &mut RngState::from_seed(seed));
        let run = match LadderRun::with_board(board, labels("p", 8), labels("g", 8), &[3.0; 8]) {
            Ok(run) => run,
            Err(DrawError::CrowdedRungs { .. }) => {
                refused += 1;
                continue;
            }
            Err(err) => panic!("seed {seed}: {err}"),
        };
        let pairs = run.run_to_completion().expect("finish");
        let receivers: HashSet<_> = pairs.iter().map(|pair| pair.receiver.as_str()).collect();
        assert_eq!(receivers.len(), 8, "seed {seed}: {pairs:?}");
    }
    assert!(refused > 0);
}

#[test]
fn budget_is_never_exhausted_on_valid_boards() {
    for seed in 0..20u64 {
        let mut run = LadderRun::new(
            labels("p", 8),
            &labels("g", 8),
            &LadderConfig::default(),
            &mut RngState::from_seed(seed),
        )
        .expect("run");
        while !run.advance(1).done {
            assert!(!run.budget_exhausted(), "seed {seed}");
        }
        assert!(!run.budget_exhausted());
    }
}
