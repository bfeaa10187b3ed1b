use cipherforge::api::SessionRecord;
use cipherforge::kasiski::KeyLengthAnalysis;
use cipherforge::scorer::ScoreBreakdown;
use cipherforge::search::progress::{format_duration, format_rate};
use cipherforge::search::ScoredCandidate;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

fn metric(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{:.4}", x))
}

pub fn print_candidates(results: &[ScoredCandidate]) {
    if results.is_empty() {
        println!("\nNo candidates cleared the admission floor.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["#", "Key", "Score", "Plaintext"]));

    for (i, c) in results.iter().enumerate() {
        let rank = Cell::new(i + 1).set_alignment(CellAlignment::Right);
        let key = if i == 0 {
            Cell::new(&c.key).fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&c.key)
        };
        table.add_row(vec![
            rank,
            key,
            Cell::new(format!("{:.4}", c.score)).set_alignment(CellAlignment::Right),
            Cell::new(&c.sample),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_session_summary(record: &SessionRecord) {
    let p = &record.progress;
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    table.add_row(vec![Cell::new("State"), Cell::new(record.state).fg(Color::Cyan)]);
    table.add_row(vec![
        Cell::new("Keys tested"),
        Cell::new(format!(
            "{} / {} ({:.1}%)",
            p.keys_tested,
            p.total_keys,
            p.percent()
        )),
    ]);
    table.add_row(vec![Cell::new("Elapsed"), Cell::new(format_duration(p.elapsed))]);
    table.add_row(vec![
        Cell::new("Throughput"),
        Cell::new(format!("{} keys/s", format_rate(p.keys_per_second))),
    ]);
    table.add_row(vec![
        Cell::new("Method"),
        Cell::new(record.request.method),
    ]);
    if let Some(len) = record.length_hint {
        table.add_row(vec![Cell::new("Length hint"), Cell::new(len)]);
    }
    println!("\n{}", table);
}

pub fn print_key_lengths(analysis: &KeyLengthAnalysis, top: usize) {
    match (analysis.best, analysis.source) {
        (Some(len), Some(source)) => println!("\nBest estimate: {} ({:?})", len, source),
        _ => println!("\nNo estimate; every length is equally plausible."),
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["Length", "Votes", "Share", "Avg IC"]));
    for i in 0..4 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for c in analysis.top(top) {
        let length = if Some(c.length) == analysis.best {
            Cell::new(c.length).fg(Color::Green)
        } else {
            Cell::new(c.length)
        };
        table.add_row(vec![
            length,
            Cell::new(c.votes),
            Cell::new(format!("{:.1}%", c.score * 100.0)),
            Cell::new(format!("{:.4}", c.coincidence)),
        ]);
    }
    println!("{}", table);
}

pub fn print_breakdown(b: &ScoreBreakdown) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(header(&["Metric", "Value"]));

    let rows = [
        ("Symbols", b.symbols.to_string()),
        ("Quadgram log10", metric(b.quadgram)),
        ("Index of coincidence", metric(b.index_of_coincidence)),
        ("Chi-squared", metric(b.chi_squared)),
        ("Entropy closeness", metric(b.entropy)),
        ("Word boundary", metric(b.word_boundary)),
        ("Common words", format!("{:.4}", b.common_words)),
        ("Word coverage", format!("{:.4}", b.word_coverage)),
        ("Anchor", format!("{:.4}", b.anchor)),
        ("Illegal pairs", b.illegal_pairs.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Composite").add_attribute(Attribute::Bold),
        Cell::new(metric(b.composite))
            .fg(Color::Cyan)
            .set_alignment(CellAlignment::Right),
    ]);
    println!("\n{}", table);
}
