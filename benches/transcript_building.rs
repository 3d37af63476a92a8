use std::hint::black_box;
use std::io::Cursor;

use claude_session_export::parsers::{DecodeOptions, read_transcript};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Synthetic Claude Code log with `turns` prompt / tool call / result / answer rounds
pub fn generate_log(turns: usize) -> String {
    let mut log = String::new();
    for i in 0..turns {
        let ts = format!("2024-01-{:02}T12:00:00Z", (i % 28) + 1);
        log.push_str(&format!(
            r#"{{"type":"user","timestamp":"{ts}","sessionId":"bench","message":{{"role":"user","content":"Prompt {i}: explain the code"}}}}"#
        ));
        log.push('\n');
        log.push_str(&format!(
            r#"{{"type":"assistant","timestamp":"{ts}","message":{{"id":"msg_{i}_a","model":"claude-sonnet-4","content":[{{"type":"thinking","thinking":"Let me look"}},{{"type":"tool_use","id":"toolu_{i}","name":"Read","input":{{"file_path":"/src/lib_{i}.rs"}}}}]}}}}"#
        ));
        log.push('\n');
        log.push_str(&format!(
            r#"{{"type":"user","timestamp":"{ts}","message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"toolu_{i}","content":"fn main() {{ println!(\"{i}\"); }}"}}]}}}}"#
        ));
        log.push('\n');
        log.push_str(&format!(
            r#"{{"type":"assistant","timestamp":"{ts}","message":{{"id":"msg_{i}_b","model":"claude-sonnet-4","content":[{{"type":"text","text":"The file prints **{i}**."}}]}}}}"#
        ));
        log.push('\n');
    }
    log
}

fn bench_read_transcript(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_transcript");
    let options = DecodeOptions::default();

    for turns in [10, 100, 1_000, 5_000].iter() {
        let log = generate_log(*turns);

        group.throughput(Throughput::Bytes(log.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(turns), turns, |b, _| {
            b.iter(|| read_transcript(Cursor::new(black_box(log.as_bytes())), &options).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_transcript);
criterion_main!(benches);
