use super::*;

use std::sync::Arc;

use arrow::array::{
    ArrayRef, FixedSizeListBuilder, Float64Builder, Int32Builder, ListBuilder, StringBuilder,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

pub fn shard_path(output_root: &Path, question_type: QuestionType, taxonomy: &Taxonomy) -> PathBuf {
    output_root
        .join(question_type.type_root())
        .join(sanitize_component(&taxonomy.l1))
        .join(sanitize_component(&taxonomy.l2))
        .join(sanitize_component(&taxonomy.l3))
        .join(format!("{}.parquet", sanitize_component(&taxonomy.l4)))
}

pub fn sanitize_component(label: &str) -> String {
    label.replace(' ', "_")
}

pub fn write_shard(path: &Path, batch: &NormalizedBatch) -> Result<()> {
    let record_batch = match batch {
        NormalizedBatch::Mcq(rows) => mcq_record_batch(rows)?,
        NormalizedBatch::Cot(rows) => cot_record_batch(rows)?,
        NormalizedBatch::Vg(rows) => vg_record_batch(rows)?,
    };

    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create shard file: {}", path.display()))?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, record_batch.schema(), Some(props))
        .with_context(|| format!("failed to open parquet writer: {}", path.display()))?;
    writer
        .write(&record_batch)
        .with_context(|| format!("failed to write shard: {}", path.display()))?;
    writer
        .close()
        .with_context(|| format!("failed to finalize shard: {}", path.display()))?;

    Ok(())
}

fn mcq_record_batch(rows: &[McqRow]) -> Result<RecordBatch> {
    let mut index = Int32Builder::new();
    let mut question = StringBuilder::new();
    let mut question_type = StringBuilder::new();
    let mut options = ListBuilder::new(StringBuilder::new());
    let mut answer = StringBuilder::new();
    let mut image = ListBuilder::new(StringBuilder::new());

    for row in rows {
        index.append_value(row.index);
        question.append_value(&row.question);
        question_type.append_value(&row.question_type);
        append_string_list(&mut options, &row.options);
        answer.append_value(&row.answer);
        append_string_list(&mut image, &row.images);
    }

    let mut columns: Vec<(&str, ArrayRef)> = vec![
        ("index", Arc::new(index.finish()) as ArrayRef),
        ("question", Arc::new(question.finish()) as ArrayRef),
        ("question_type", Arc::new(question_type.finish()) as ArrayRef),
        ("multi-choice options", Arc::new(options.finish()) as ArrayRef),
        ("answer", Arc::new(answer.finish()) as ArrayRef),
        ("image", Arc::new(image.finish()) as ArrayRef),
    ];
    columns.extend(taxonomy_columns(rows.iter().map(|row| (&row.taxonomy, row.dataset.as_str()))));

    RecordBatch::try_from_iter(columns).context("failed to assemble mcq record batch")
}

fn cot_record_batch(rows: &[CotRow]) -> Result<RecordBatch> {
    let mut index = Int32Builder::new();
    let mut question = StringBuilder::new();
    let mut question_type = StringBuilder::new();
    let mut options = ListBuilder::new(StringBuilder::new());
    let mut answer = StringBuilder::new();
    let mut cot = ListBuilder::new(StringBuilder::new());
    let mut reference_caption = ListBuilder::new(StringBuilder::new());
    let mut logical_conclusion = ListBuilder::new(StringBuilder::new());
    let mut image = ListBuilder::new(StringBuilder::new());

    for row in rows {
        index.append_value(row.index);
        question.append_value(&row.question);
        question_type.append_value(&row.question_type);
        append_string_list(&mut options, &row.options);
        answer.append_value(&row.answer);
        append_string_list(&mut cot, &row.cot);
        append_string_list(&mut reference_caption, &row.reference_caption);
        append_string_list(&mut logical_conclusion, &row.logical_conclusion);
        append_string_list(&mut image, &row.images);
    }

    let mut columns: Vec<(&str, ArrayRef)> = vec![
        ("index", Arc::new(index.finish()) as ArrayRef),
        ("question", Arc::new(question.finish()) as ArrayRef),
        ("question_type", Arc::new(question_type.finish()) as ArrayRef),
        ("multi-choice options", Arc::new(options.finish()) as ArrayRef),
        ("answer", Arc::new(answer.finish()) as ArrayRef),
        ("CoT", Arc::new(cot.finish()) as ArrayRef),
        ("reference_caption", Arc::new(reference_caption.finish()) as ArrayRef),
        ("logical_conclusion", Arc::new(logical_conclusion.finish()) as ArrayRef),
        ("image", Arc::new(image.finish()) as ArrayRef),
    ];
    columns.extend(taxonomy_columns(rows.iter().map(|row| (&row.taxonomy, row.dataset.as_str()))));

    RecordBatch::try_from_iter(columns).context("failed to assemble cot record batch")
}

fn vg_record_batch(rows: &[VgRow]) -> Result<RecordBatch> {
    let mut index = Int32Builder::new();
    let mut question = StringBuilder::new();
    let mut question_type = StringBuilder::new();
    let mut answer = FixedSizeListBuilder::new(Float64Builder::new(), 4);
    let mut image = StringBuilder::new();
    let mut image_width = Int32Builder::new();
    let mut image_height = Int32Builder::new();

    for row in rows {
        index.append_value(row.index);
        question.append_value(&row.question);
        question_type.append_value(&row.question_type);
        for corner in row.answer {
            answer.values().append_value(corner);
        }
        answer.append(true);
        image.append_value(&row.image);
        image_width.append_value(row.image_width);
        image_height.append_value(row.image_height);
    }

    let mut columns: Vec<(&str, ArrayRef)> = vec![
        ("index", Arc::new(index.finish()) as ArrayRef),
        ("question", Arc::new(question.finish()) as ArrayRef),
        ("question_type", Arc::new(question_type.finish()) as ArrayRef),
        ("answer", Arc::new(answer.finish()) as ArrayRef),
        ("image", Arc::new(image.finish()) as ArrayRef),
        ("image_width", Arc::new(image_width.finish()) as ArrayRef),
        ("image_height", Arc::new(image_height.finish()) as ArrayRef),
    ];
    columns.extend(taxonomy_columns(rows.iter().map(|row| (&row.taxonomy, row.dataset.as_str()))));

    RecordBatch::try_from_iter(columns).context("failed to assemble vg record batch")
}

fn taxonomy_columns<'a>(
    rows: impl Iterator<Item = (&'a Taxonomy, &'a str)>,
) -> Vec<(&'static str, ArrayRef)> {
    let mut l1 = StringBuilder::new();
    let mut l2 = StringBuilder::new();
    let mut l3 = StringBuilder::new();
    let mut l4 = StringBuilder::new();
    let mut dataset = StringBuilder::new();

    for (taxonomy, dataset_name) in rows {
        l1.append_value(&taxonomy.l1);
        l2.append_value(&taxonomy.l2);
        l3.append_value(&taxonomy.l3);
        l4.append_value(&taxonomy.l4);
        dataset.append_value(dataset_name);
    }

    vec![
        ("L1-task", Arc::new(l1.finish())),
        ("L2-task", Arc::new(l2.finish())),
        ("L3-task", Arc::new(l3.finish())),
        ("L4-task", Arc::new(l4.finish())),
        ("Dataset", Arc::new(dataset.finish()) as ArrayRef),
    ]
}

fn append_string_list(builder: &mut ListBuilder<StringBuilder>, values: &[String]) {
    for value in values {
        builder.values().append_value(value);
    }
    builder.append(true);
}
