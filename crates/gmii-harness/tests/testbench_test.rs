//! Async testbench tests.
//!
//! All tests run on paused tokio time, so the clock task advances only when
//! every other task is waiting and runs are reproducible. Wait timeouts are
//! simulated time: 1 us is 125 edges of the default 8 ns clock.

use std::time::Duration;

use gmii_core::{SourceConfig, SourceState};
use gmii_harness::{
    HarnessError, SimConfig, Testbench, WaitOutcome, World, payloads::incrementing,
};
use gmii_proto::GmiiFrame;

fn testbench(ifg: u32) -> Testbench {
    Testbench::start(World::loopback(SourceConfig { ifg }).unwrap())
}

#[tokio::test(start_paused = true)]
async fn frames_flow_through_running_clock() {
    let tb = testbench(12);
    tb.reset().await.unwrap();

    let source = tb.source();
    let sink = tb.sink();
    let lens = [64, 65, 512];
    for len in lens {
        source.send(GmiiFrame::from_payload(incrementing(len)));
    }
    assert_eq!(source.count(), 3);

    source.wait().await.unwrap();
    assert!(source.is_idle());

    for len in lens {
        let frame = sink.recv_timeout(Some(Duration::from_micros(20))).await.unwrap().unwrap();
        assert_eq!(frame.payload(), incrementing(len).as_slice());
    }
    assert!(sink.is_empty());
    assert_eq!(sink.queue_occupancy().frames, 0);
}

#[tokio::test(start_paused = true)]
async fn edges_counts_clock_cycles() {
    let tb = testbench(12);
    let start = tb.cycle();
    tb.edges(5).await.unwrap();
    assert_eq!(tb.cycle(), start + 5);
}

#[tokio::test(start_paused = true)]
async fn reset_sequence_leaves_link_idle() {
    let tb = testbench(12);
    tb.reset().await.unwrap();

    assert_eq!(tb.cycle(), 6);
    let state = tb.with_world(|world| world.source().state().clone());
    assert_eq!(state, SourceState::Idle);
    assert!(tb.sink().is_idle());
}

#[tokio::test(start_paused = true)]
async fn sink_wait_times_out_without_traffic() {
    let tb = testbench(12);
    let sink = tb.sink();

    let outcome = sink.wait(Some(Duration::from_micros(1))).await;
    assert_eq!(outcome, Ok(WaitOutcome::TimedOut));
    assert!(sink.is_empty());
    assert_eq!(tb.cycle(), 125);
    assert_eq!(sink.recv_timeout(Some(Duration::from_nanos(8))).await, Ok(None));
}

#[tokio::test(start_paused = true)]
async fn timeout_counts_edges_of_fractional_period() {
    let world = World::loopback(SourceConfig::default())
        .unwrap()
        .with_config(SimConfig { clock_period_ps: 7_500 });
    let tb = Testbench::start(world);

    let outcome = tb.sink().wait(Some(Duration::from_nanos(75))).await;
    assert_eq!(outcome, Ok(WaitOutcome::TimedOut));
    assert_eq!(tb.cycle(), 10);
    assert_eq!(tb.with_world(|world| world.now()).as_ps(), 75_000);
}

#[tokio::test(start_paused = true)]
async fn sink_wait_returns_immediately_when_frame_waiting() {
    let tb = testbench(12);
    tb.source().send(vec![1u8, 2, 3]);
    assert_eq!(tb.sink().wait(None).await, Ok(WaitOutcome::Ready));

    let cycle = tb.cycle();
    assert_eq!(tb.sink().wait(Some(Duration::from_nanos(1))).await, Ok(WaitOutcome::Ready));
    assert_eq!(tb.cycle(), cycle);
    assert_eq!(tb.sink().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_waits_indefinitely() {
    let tb = testbench(12);
    tb.source().send(GmiiFrame::from_payload(incrementing(1500)));
    assert_eq!(tb.sink().wait(Some(Duration::ZERO)).await, Ok(WaitOutcome::Ready));
    assert_eq!(tb.sink().recv().map(|f| f.len()), Some(1508));
}

#[tokio::test(start_paused = true)]
async fn every_waiter_is_woken() {
    let tb = testbench(12);
    let (a, b) = (tb.sink(), tb.sink());
    tb.source().send(vec![9u8; 16]);

    let (first, second) = tokio::join!(a.wait(None), b.wait(None));
    assert_eq!(first, Ok(WaitOutcome::Ready));
    assert_eq!(second, Ok(WaitOutcome::Ready));
    assert_eq!(a.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn clock_enable_low_holds_everything() {
    let tb = testbench(12);
    tb.set_enable(Some(false));
    tb.source().send(vec![1u8, 2, 3]);
    tb.edges(50).await.unwrap();

    assert_eq!(tb.source().count(), 1);
    assert!(tb.sink().is_empty());

    tb.set_enable(None);
    assert_eq!(tb.sink().wait(Some(Duration::from_micros(1))).await, Ok(WaitOutcome::Ready));
    assert_eq!(tb.source().queue_occupancy().bytes, 0);
}

#[tokio::test(start_paused = true)]
async fn gap_change_applies_to_running_source() {
    let tb = testbench(12);
    let source = tb.source();
    source.set_ifg(0);
    for _ in 0..4 {
        source.send(vec![0xEEu8; 8]);
    }

    let start = tb.cycle();
    source.wait().await.unwrap();
    // Four 8-byte frames with one idle cycle between each.
    assert!(tb.cycle() - start <= 4 * 8 + 3 + 1);
}

#[tokio::test(start_paused = true)]
async fn stopped_clock_is_reported() {
    let tb = testbench(12);
    let source = tb.source();
    source.send(vec![1u8; 64]);
    drop(tb);

    assert_eq!(source.wait().await, Err(HarnessError::ClockStopped));
}

#[tokio::test(start_paused = true)]
async fn sink_wait_reports_stopped_clock() {
    let tb = testbench(12);
    let sink = tb.sink();
    drop(tb);

    assert_eq!(sink.wait(None).await, Err(HarnessError::ClockStopped));
    assert_eq!(
        sink.recv_timeout(Some(Duration::from_micros(1))).await,
        Err(HarnessError::ClockStopped)
    );
}
