//! Fuzz target: arbitrary bus traces into the sink.
//!
//! Each pair of input bytes is one clock edge: a flags byte (bit 0 `dv`,
//! bit 1 `er`, bit 2 reset, bit 3 clock enable low) and a data byte. The
//! sink must never panic, its queue counters must stay consistent, and
//! every received frame must be non-empty with canonical error markers.

#![no_main]

use gmii_core::{BusLayout, Control, GmiiSink};
use gmii_proto::{GmiiSignals, SimTime};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut sink) = GmiiSink::new(&BusLayout::gmii()) else {
        return;
    };

    for (cycle, edge) in data.chunks_exact(2).enumerate() {
        let flags = edge[0];
        let sample = GmiiSignals { d: edge[1], er: flags & 0x02 != 0, dv: flags & 0x01 != 0 };
        let control = Control { reset: flags & 0x04 != 0, enable: flags & 0x08 == 0 };
        sink.on_edge(control, sample, SimTime::from_ns(8 * cycle as u64));

        assert!(sink.queue().is_consistent());
    }

    while let Some(frame) = sink.recv() {
        assert!(!frame.is_empty());
        if let Some(error) = &frame.error {
            assert_eq!(error.len(), frame.len());
            assert!(error.iter().any(|&er| er));
        }
        assert!(sink.queue().is_consistent());
    }
});
