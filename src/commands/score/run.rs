use super::*;

use crate::commands::shard::{CotRow, NormalizedBatch, Normalizer, repair_question_ids};

pub fn run(args: ScoreArgs) -> Result<()> {
    let mut records: Vec<RawRecord> =
        load_json_records(&args.records, args.json_lines)?;
    ensure!(
        !records.is_empty(),
        "records file is empty: {}",
        args.records.display()
    );

    let question_type = QuestionType::parse(&records[0].question_type)?;
    for record in &records {
        ensure!(
            record.question_type == records[0].question_type,
            "record {}: question type differs from the rest of the batch",
            record.question_id
        );
    }

    if repair_question_ids(&mut records) {
        warn!(
            path = %args.records.display(),
            "non-numeric question ids, regenerating sequential ids"
        );
    }

    let predictions = load_predictions(&args)?;
    info!(
        records = records.len(),
        predictions = predictions.len(),
        question_type = %records[0].question_type,
        "scoring predictions"
    );

    let normalizer = Normalizer::new(&args.image_root)?;
    let batch = normalizer.normalize_batch(&records, question_type)?;

    match batch {
        NormalizedBatch::Mcq(rows) => {
            let items = rows
                .iter()
                .map(|row| ChoiceItem {
                    index: row.index,
                    options: &row.options,
                    answer: &row.answer,
                    taxonomy: &row.taxonomy,
                })
                .collect::<Vec<_>>();
            score_choice_batch(&items, &predictions, args.report_path.as_deref())
        }
        NormalizedBatch::Cot(rows) => {
            let items = rows.iter().map(ChoiceItem::from_cot).collect::<Vec<_>>();
            score_choice_batch(&items, &predictions, args.report_path.as_deref())
        }
        NormalizedBatch::Vg(rows) => {
            let extractor = BoxExtractor::new()?;
            let mut root = AccNode::<VgCounts>::default();
            let mut missing = 0_usize;

            for row in &rows {
                let prediction = match predictions.get(&row.index) {
                    Some(text) => text.as_str(),
                    None => {
                        missing += 1;
                        ""
                    }
                };
                let pred_box = extractor.extract(prediction);
                let iou = best_rescaled_iou(
                    &row.answer,
                    &pred_box,
                    row.image_width as f64,
                    row.image_height as f64,
                );
                accumulate_vg(
                    &mut root,
                    &VgScoredItem {
                        iou,
                        taxonomy: row.taxonomy.clone(),
                    },
                );
            }
            warn_missing(missing);

            let report = finalize_vg(&root);
            for line in format_vg_report(&report).lines() {
                info!("{line}");
            }
            info!(
                mean_iou = report.overall_mean_iou,
                items = report.item_count,
                "scoring completed"
            );
            write_report(args.report_path.as_deref(), &report)
        }
    }
}

struct ChoiceItem<'a> {
    index: i32,
    options: &'a [String],
    answer: &'a str,
    taxonomy: &'a Taxonomy,
}

impl<'a> ChoiceItem<'a> {
    fn from_cot(row: &'a CotRow) -> Self {
        Self {
            index: row.index,
            options: &row.options,
            answer: &row.answer,
            taxonomy: &row.taxonomy,
        }
    }
}

fn score_choice_batch(
    items: &[ChoiceItem<'_>],
    predictions: &BTreeMap<i32, String>,
    report_path: Option<&std::path::Path>,
) -> Result<()> {
    let extractor = AnswerExtractor::new()?;
    let mut root = AccNode::<McqCounts>::default();
    let mut missing = 0_usize;

    for item in items {
        let unable_to_decide = unable_to_decide_letter(item.options)
            .with_context(|| format!("record index {}", item.index))?;
        let prediction = match predictions.get(&item.index) {
            Some(text) => text.as_str(),
            None => {
                missing += 1;
                ""
            }
        };
        let scored = McqScoredItem {
            pred_answer: extractor.extract(prediction),
            answer: item.answer.to_string(),
            unable_to_decide,
            taxonomy: item.taxonomy.clone(),
        };
        accumulate_mcq(&mut root, &scored);
    }
    warn_missing(missing);

    let report = finalize_mcq(&root);
    for line in format_mcq_report(&report).lines() {
        info!("{line}");
    }
    info!(
        accuracy = report.overall_accuracy,
        items = report.item_count,
        "scoring completed"
    );
    write_report(report_path, &report)
}

fn load_predictions(args: &ScoreArgs) -> Result<BTreeMap<i32, String>> {
    let rows: Vec<PredictionRow> = load_json_records(&args.predictions, true)?;

    let mut predictions = BTreeMap::new();
    for row in rows {
        if predictions.insert(row.index, row.prediction).is_some() {
            warn!(index = row.index, "duplicate prediction, keeping the last");
        }
    }

    Ok(predictions)
}

fn warn_missing(missing: usize) {
    if missing > 0 {
        warn!(
            missing,
            "records without a prediction were scored as no answer"
        );
    }
}

fn write_report<T: Serialize>(report_path: Option<&std::path::Path>, report: &T) -> Result<()> {
    if let Some(path) = report_path {
        write_json_pretty(path, report)?;
        info!(path = %path.display(), "wrote score report");
    }

    Ok(())
}
