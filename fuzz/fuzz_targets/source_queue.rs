//! Fuzz target: random send / edge / reset sequences on the source.
//!
//! The source must never drive `dv` without a queued or in-flight frame,
//! and its queue counters must stay consistent.

#![no_main]

use gmii_core::{BusLayout, Control, GmiiSource, SourceConfig};
use gmii_proto::{GmiiFrame, GmiiSignals};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&ifg, ops)) = data.split_first() else {
        return;
    };
    let Ok(mut source) =
        GmiiSource::new(&BusLayout::gmii(), SourceConfig { ifg: u32::from(ifg % 16) })
    else {
        return;
    };

    let mut wires = GmiiSignals::IDLE;
    for &op in ops {
        match op >> 6 {
            0 => source.send(GmiiFrame::new(vec![op; usize::from(op & 0x0F)])),
            1 => source.on_edge(Control::RESET).apply(&mut wires),
            2 => source.on_edge(Control::HOLD).apply(&mut wires),
            _ => {
                let was_idle = source.is_idle();
                source.on_edge(Control::RUN).apply(&mut wires);
                if was_idle {
                    assert!(!wires.dv);
                }
            },
        }
        assert!(source.queue().is_consistent());
    }
});
