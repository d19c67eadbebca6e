//! Offline evaluation: run a local model over a labelled JSON-lines file.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, bail};
use medsent_ai::Classifier;
use medsent_core::{Evaluation, Sentiment, normalize};
use serde::Deserialize;
use serde_json::Value;

const EVAL_BATCH_SIZE: usize = 64;

#[derive(Deserialize)]
struct Sample {
    text: String,
    label: Value,
}

/// Read `{"text": ..., "label": ...}` lines. Blank lines are skipped.
pub fn read_samples(path: &Path) -> anyhow::Result<Vec<(String, Sentiment)>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut samples = Vec::new();
    for (i, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let sample: Sample = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid sample", path.display(), i + 1))?;
        let label = parse_label(&sample.label)
            .with_context(|| format!("{}:{}", path.display(), i + 1))?;
        samples.push((sample.text, label));
    }
    Ok(samples)
}

/// Accepts `0`/`1`, booleans, and `positive`/`negative`-style strings.
fn parse_label(value: &Value) -> anyhow::Result<Sentiment> {
    match value {
        Value::Number(n) if n.as_u64() == Some(1) => Ok(Sentiment::Positive),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(Sentiment::Negative),
        Value::Bool(true) => Ok(Sentiment::Positive),
        Value::Bool(false) => Ok(Sentiment::Negative),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "pos" | "positive" | "label_1" => Ok(Sentiment::Positive),
            "0" | "neg" | "negative" | "label_0" => Ok(Sentiment::Negative),
            other => bail!("unrecognised label '{other}'"),
        },
        other => bail!("unrecognised label {other}"),
    }
}

/// Classify every sample and score the predictions.
pub fn evaluate(classifier: &dyn Classifier, samples: &[(String, Sentiment)]) -> anyhow::Result<Evaluation> {
    let start = Instant::now();
    let mut predicted = Vec::with_capacity(samples.len());

    for chunk in samples.chunks(EVAL_BATCH_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|(t, _)| t.as_str()).collect();
        let raw = classifier.predict(&texts).context("running classifier")?;
        anyhow::ensure!(
            raw.len() == texts.len(),
            "classifier returned {} predictions for {} texts",
            raw.len(),
            texts.len()
        );
        predicted.extend(raw.iter().map(|p| normalize(&p.label, p.score).sentiment));

        eprint!("\r  Classified {}/{}", predicted.len(), samples.len());
    }
    eprintln!(" in {:.1}s", start.elapsed().as_secs_f64());

    let truth: Vec<Sentiment> = samples.iter().map(|(_, s)| *s).collect();
    Ok(Evaluation::from_pairs(&truth, &predicted)?)
}

pub fn print_report(eval: &Evaluation) {
    println!("Samples   {}", eval.samples);
    println!("Accuracy  {:.4}", eval.accuracy);
    println!("F1 (pos)  {:.4}", eval.f1);
    println!();
    println!("  {:<10} {:>9} {:>9} {:>9} {:>9}", "class", "precision", "recall", "f1", "support");
    for m in &eval.per_class {
        println!(
            "  {:<10} {:>9.4} {:>9.4} {:>9.4} {:>9}",
            m.class.as_str(),
            m.precision,
            m.recall,
            m.f1,
            m.support
        );
    }
    println!();
    println!("Confusion (rows = truth, cols = predicted)");
    println!("  {:<10} {:>9} {:>9}", "", "negative", "positive");
    for (class, row) in ["negative", "positive"].iter().zip(&eval.confusion) {
        println!("  {:<10} {:>9} {:>9}", class, row[0], row[1]);
    }
}
