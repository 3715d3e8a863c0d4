//! GC trace line parsing and aggregation (§4.7, §8 scenario 7), through the public
//! `benchcore::gc_trace` surface.

use benchcore::gc_trace::{aggregate_gc_stats, aggregate_lines, parse_gc_line, GcKind};

const V8_SCAVENGE_LINE: &str = "[71753:0x83280c000:0] 9 ms: pause=0.5 mutator=0.1 gc=s \
    allocated=293224 promoted=653480 new_space_survived=290176 \
    start_object_size=4392688 end_object_size=4287840";

#[test]
fn v8_scavenge_line_parses_exactly() {
    let event = parse_gc_line(V8_SCAVENGE_LINE).unwrap();
    assert_eq!(event.kind, GcKind::Scavenge);
    assert_eq!(event.pause_ms, 0.5);
    assert_eq!(event.allocated, 293224);
    assert_eq!(event.promoted, 653480);
    assert_eq!(event.survived, 290176);
    assert_eq!(event.collected, 4392688 - 4287840);
}

#[test]
fn mark_compact_aliases_all_map_to_mark_compact() {
    for code in ["mc", "ms", "mark-compact"] {
        let line = format!("pause=1.0 gc={}", code);
        assert_eq!(parse_gc_line(&line).unwrap().kind, GcKind::MarkCompact);
    }
}

#[test]
fn minor_ms_aliases_all_map_to_minor_ms() {
    for code in ["mmc", "minor-mc", "minor-ms"] {
        let line = format!("pause=1.0 gc={}", code);
        assert_eq!(parse_gc_line(&line).unwrap().kind, GcKind::MinorMs);
    }
}

#[test]
fn unrecognized_gc_code_maps_to_unknown_but_still_parses() {
    let event = parse_gc_line("pause=1.0 gc=weird-code").unwrap();
    assert_eq!(event.kind, GcKind::Unknown);
}

#[test]
fn aggregate_of_empty_event_list_is_all_zero_counters() {
    let stats = aggregate_gc_stats(&[]);
    assert_eq!(stats.scavenges, 0);
    assert_eq!(stats.mark_compacts, 0);
    assert_eq!(stats.total_collected, 0);
    assert_eq!(stats.gc_pause_time, 0.0);
    assert!(stats.total_allocated.is_none());
}

#[test]
fn aggregate_lines_passes_through_mixed_stdout_stream() {
    let stream = [
        "server listening on :8080",
        V8_SCAVENGE_LINE,
        "pause=2.0 gc=mc allocated=100 promoted=10 new_space_survived=5 \
         start_object_size=1000 end_object_size=900",
        "another ordinary log line",
    ];
    let stats = aggregate_lines(stream.into_iter());
    assert_eq!(stats.scavenges, 1);
    assert_eq!(stats.mark_compacts, 1);
    assert_eq!(stats.total_collected, (4392688 - 4287840) + 100);
    assert!((stats.gc_pause_time - 2.5).abs() < 1e-9);
    assert!(stats.total_allocated.is_some());
}
