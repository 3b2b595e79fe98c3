use crate::{
    Backoff, BitLayout, DEFAULT_EPOCH, Error, IdGenStatus, SnowflakeGenerator, SnowflakeId,
    SystemClock, TimeSource,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::scope;

const EPOCH: u64 = 1_739_526_270_000;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock tests can move forwards or backwards at will.
struct StepTime {
    millis: AtomicU64,
}

impl StepTime {
    fn at(millis: u64) -> Arc<Self> {
        Arc::new(Self {
            millis: AtomicU64::new(millis),
        })
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    fn advance(&self, by: u64) {
        self.millis.fetch_add(by, Ordering::SeqCst);
    }
}

impl TimeSource for StepTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_until } => {
                panic!("unexpected pending (yield until: {yield_until})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_until } => yield_until,
        }
    }
}

fn exhaust_sequence<T: TimeSource>(generator: &SnowflakeGenerator<T>) {
    for expected in 0..=generator.layout().max_sequence() {
        let id = generator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(generator.parse(id).sequence, expected);
    }
}

fn run_generator_monotonic<T: TimeSource>(generator: &SnowflakeGenerator<T>, total: usize) {
    let mut last: Option<SnowflakeId> = None;
    for _ in 0..total {
        let id = generator.generate().unwrap();
        let parts = generator.parse(id);
        assert_eq!(parts.machine_id, generator.machine_id());
        if let Some(prev) = last {
            assert!(id > prev, "{id} must be greater than {prev}");
            let prev_parts = generator.parse(prev);
            if parts.timestamp > prev_parts.timestamp {
                assert_eq!(parts.sequence, 0);
            } else {
                assert_eq!(parts.timestamp, prev_parts.timestamp);
                assert_eq!(parts.sequence, prev_parts.sequence + 1);
            }
        }
        last = Some(id);
    }
}

#[test]
fn first_ids_match_reference_values() {
    let generator = SnowflakeGenerator::new(5, EPOCH, MockTime { millis: EPOCH }).unwrap();
    assert_eq!(generator.generate().unwrap().to_i64(), 20480);
    assert_eq!(generator.generate().unwrap().to_i64(), 20481);
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = SnowflakeGenerator::new(0, 0, MockTime { millis: 42 }).unwrap();
    let id1 = generator.try_poll_id().unwrap().unwrap_ready();
    let id2 = generator.try_poll_id().unwrap().unwrap_ready();
    let id3 = generator.try_poll_id().unwrap().unwrap_ready();

    for (id, sequence) in [(id1, 0), (id2, 1), (id3, 2)] {
        let parts = generator.parse(id);
        assert_eq!(parts.timestamp, 42);
        assert_eq!(parts.sequence, sequence);
    }
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn sequence_resets_when_clock_advances() {
    let time = StepTime::at(EPOCH + 10);
    let generator = SnowflakeGenerator::new(7, EPOCH, Arc::clone(&time)).unwrap();
    generator.generate().unwrap();
    generator.generate().unwrap();

    time.advance(3);
    let parts = generator.parse(generator.generate().unwrap());
    assert_eq!(parts.timestamp, 13);
    assert_eq!(parts.sequence, 0);
    assert_eq!(parts.unix_millis(generator.epoch()), EPOCH + 13);
}

#[test]
fn returns_pending_when_sequence_exhausted() {
    let generator = SnowflakeGenerator::new(1, 0, MockTime { millis: 42 }).unwrap();
    exhaust_sequence(&generator);

    let yield_until = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_until, 43);
    // Still pending: nothing was consumed by the previous attempt
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 43);
}

#[test]
fn generate_blocks_until_next_millisecond_on_rollover() {
    let time = StepTime::at(EPOCH + 42);
    let generator = SnowflakeGenerator::new(1, EPOCH, Arc::clone(&time)).unwrap();
    exhaust_sequence(&generator);

    let mut waits = Vec::new();
    let id = generator
        .generate_with(|yield_until| {
            waits.push(yield_until);
            // Simulated clock stalls twice, then ticks
            if waits.len() == 3 {
                time.advance(1);
            }
        })
        .unwrap();

    assert_eq!(waits, vec![EPOCH + 43; 3]);
    let parts = generator.parse(id);
    assert_eq!(parts.timestamp, 43);
    assert_eq!(parts.sequence, 0);
    assert_eq!(parts.machine_id, 1);
}

#[test]
fn generate_waits_for_real_clock_with_backoff() {
    let time = StepTime::at(EPOCH);
    let generator = SnowflakeGenerator::new(2, EPOCH, Arc::clone(&time))
        .unwrap()
        .with_backoff(Backoff::Yield);
    exhaust_sequence(&generator);

    scope(|s| {
        let waiter = s.spawn(|| generator.generate());
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!waiter.is_finished());
        time.advance(1);
        let id = waiter.join().unwrap().unwrap();
        assert_eq!(generator.parse(id).timestamp, 1);
        assert_eq!(generator.parse(id).sequence, 0);
    });
}

#[test]
fn clock_regression_is_reported_without_mutating_state() {
    let time = StepTime::at(EPOCH + 100);
    let generator = SnowflakeGenerator::new(3, EPOCH, Arc::clone(&time)).unwrap();
    let before = generator.generate().unwrap();

    time.set(EPOCH + 90);
    assert_eq!(generator.generate(), Err(Error::ClockDrift { drift_ms: 10 }));
    assert_eq!(
        generator.try_poll_id(),
        Err(Error::ClockDrift { drift_ms: 10 })
    );

    // Back at the last timestamp: continues the old sequence
    time.set(EPOCH + 100);
    let after = generator.generate().unwrap();
    assert!(after > before);
    assert_eq!(generator.parse(after).sequence, 1);
}

#[test]
fn clock_regression_during_rollover_wait_is_reported() {
    let time = StepTime::at(EPOCH + 5);
    let generator = SnowflakeGenerator::new(3, EPOCH, Arc::clone(&time)).unwrap();
    exhaust_sequence(&generator);

    let result = generator.generate_with(|_| time.set(EPOCH + 4));
    assert_eq!(result, Err(Error::ClockDrift { drift_ms: 1 }));
}

#[test]
fn clock_regression_before_epoch_is_reported_as_drift() {
    let time = StepTime::at(EPOCH + 5);
    let generator = SnowflakeGenerator::new(3, EPOCH, Arc::clone(&time)).unwrap();
    let before = generator.generate().unwrap();

    time.set(EPOCH - 2);
    assert_eq!(generator.generate(), Err(Error::ClockDrift { drift_ms: 7 }));

    time.set(EPOCH + 5);
    let after = generator.generate().unwrap();
    assert!(after > before);
    assert_eq!(generator.parse(after).sequence, 1);
}

#[test]
fn timestamps_outside_the_field_are_rejected() {
    let before_epoch = SnowflakeGenerator::new(0, EPOCH, MockTime { millis: EPOCH - 1 }).unwrap();
    assert_eq!(
        before_epoch.generate(),
        Err(Error::TimestampOutOfRange { millis: EPOCH - 1 })
    );

    let layout = BitLayout::TWITTER;
    let last = EPOCH + layout.max_timestamp();
    let at_end = SnowflakeGenerator::new(0, EPOCH, MockTime { millis: last }).unwrap();
    assert_eq!(
        at_end.parse(at_end.generate().unwrap()).timestamp,
        layout.max_timestamp()
    );

    let past_end = SnowflakeGenerator::new(0, EPOCH, MockTime { millis: last + 1 }).unwrap();
    assert_eq!(
        past_end.generate(),
        Err(Error::TimestampOutOfRange { millis: last + 1 })
    );
}

#[test]
fn construction_enforces_machine_id_bounds() {
    let max = BitLayout::TWITTER.max_machine_id();
    let max_i64 = i64::try_from(max).unwrap();

    for machine_id in [-1, max_i64 + 1, i64::MIN, i64::MAX] {
        assert_eq!(
            SnowflakeGenerator::new(machine_id, EPOCH, SystemClock).err(),
            Some(Error::InvalidMachineId { machine_id, max })
        );
    }
    assert_eq!(
        SnowflakeGenerator::new(0, EPOCH, SystemClock)
            .unwrap()
            .machine_id(),
        0
    );
    assert_eq!(
        SnowflakeGenerator::new(max_i64, EPOCH, SystemClock)
            .unwrap()
            .machine_id(),
        max
    );
}

#[test]
fn custom_layout_bounds_and_round_trip() {
    let layout = BitLayout::new(41, 16, 6).unwrap();
    assert!(SnowflakeGenerator::with_layout(layout, 65_536, EPOCH, SystemClock).is_err());

    let time = StepTime::at(EPOCH + 77);
    let generator = SnowflakeGenerator::with_layout(layout, 65_535, EPOCH, Arc::clone(&time))
        .unwrap();
    exhaust_sequence(&generator);
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), EPOCH + 78);

    time.advance(1);
    let parts = generator.parse(generator.generate().unwrap());
    assert_eq!(parts.machine_id, 65_535);
    assert_eq!(parts.timestamp, 78);
    assert_eq!(parts.sequence, 0);
}

#[test]
fn generated_ids_round_trip_machine_id_and_timestamp() {
    let generator = SnowflakeGenerator::new(1023, DEFAULT_EPOCH, SystemClock).unwrap();
    let start = SystemClock.current_millis();
    for _ in 0..10_000 {
        let id = generator.generate().unwrap();
        assert!(generator.layout().is_valid(id));
        assert!(id.to_i64() > 0);

        let parts = generator.parse(id);
        assert_eq!(parts.machine_id, 1023);
        let created = parts.unix_millis(generator.epoch());
        assert!(created >= start);
        assert!(created <= SystemClock.current_millis());
    }
}

#[test]
fn system_clock_generator_is_monotonic() {
    let generator = SnowflakeGenerator::new(1, DEFAULT_EPOCH, SystemClock).unwrap();
    run_generator_monotonic(&generator, 4096 * 64);
}

#[test]
fn threaded_generation_yields_unique_ids() {
    const IDS_PER_THREAD: usize = 4096 * 16;
    let threads = num_cpus::get().clamp(2, 8);
    let total = threads * IDS_PER_THREAD;

    let generator = SnowflakeGenerator::new(0, DEFAULT_EPOCH, SystemClock).unwrap();
    let seen_ids = Mutex::new(HashSet::with_capacity(total));

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(generator.generate().unwrap());
                }
                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id}");
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, total, "Expected {total} unique IDs");
}

#[test]
fn threaded_generation_on_stalled_clock_waits_instead_of_duplicating() {
    const THREADS: usize = 4;
    const IDS_PER_THREAD: usize = 3_000;

    let time = StepTime::at(EPOCH);
    let generator = SnowflakeGenerator::new(4, EPOCH, Arc::clone(&time))
        .unwrap()
        .with_backoff(Backoff::Yield);
    let done = AtomicUsize::new(0);
    let seen_ids = Mutex::new(HashSet::new());

    scope(|s| {
        // Ticks the clock only when someone is stuck on an exhausted sequence
        s.spawn(|| {
            while done.load(Ordering::SeqCst) < THREADS {
                std::thread::sleep(std::time::Duration::from_millis(1));
                time.advance(1);
            }
        });
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.generate().unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    let seen = seen_ids.into_inner().unwrap();
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
    let max_per_tick = usize::try_from(generator.layout().max_sequence()).unwrap() + 1;
    let ticks: HashSet<u64> = seen.iter().map(|id| generator.parse(*id).timestamp).collect();
    assert!(ticks.len() >= (THREADS * IDS_PER_THREAD).div_ceil(max_per_tick));
}
