use super::*;

#[derive(Debug, Clone)]
pub struct McqRow {
    pub index: i32,
    pub question: String,
    pub question_type: String,
    pub options: Vec<String>,
    pub answer: String,
    pub images: Vec<String>,
    pub taxonomy: Taxonomy,
    pub dataset: String,
}

#[derive(Debug, Clone)]
pub struct CotRow {
    pub index: i32,
    pub question: String,
    pub question_type: String,
    pub options: Vec<String>,
    pub answer: String,
    pub images: Vec<String>,
    pub cot: Vec<String>,
    pub reference_caption: Vec<String>,
    pub logical_conclusion: Vec<String>,
    pub taxonomy: Taxonomy,
    pub dataset: String,
}

#[derive(Debug, Clone)]
pub struct VgRow {
    pub index: i32,
    pub question: String,
    pub question_type: String,
    pub answer: [f64; 4],
    pub image: String,
    pub image_width: i32,
    pub image_height: i32,
    pub taxonomy: Taxonomy,
    pub dataset: String,
}

#[derive(Debug)]
pub enum NormalizedBatch {
    Mcq(Vec<McqRow>),
    Cot(Vec<CotRow>),
    Vg(Vec<VgRow>),
}

impl NormalizedBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Mcq(rows) => rows.len(),
            Self::Cot(rows) => rows.len(),
            Self::Vg(rows) => rows.len(),
        }
    }
}

pub struct Normalizer {
    image_root: PathBuf,
    step_marker: Regex,
    gt_box: Regex,
}

impl Normalizer {
    pub fn new(image_root: &Path) -> Result<Self> {
        let step_marker = Regex::new(r"^Step \d+:\s*")
            .context("failed to compile reasoning step marker regex")?;
        let gt_box = Regex::new(r"<(-?\d+(?:\.\d+)?)>")
            .context("failed to compile ground-truth box regex")?;

        Ok(Self {
            image_root: image_root.to_path_buf(),
            step_marker,
            gt_box,
        })
    }

    pub fn normalize_batch(
        &self,
        records: &[RawRecord],
        question_type: QuestionType,
    ) -> Result<NormalizedBatch> {
        ensure!(!records.is_empty(), "refusing to normalize an empty batch");

        let batch = match question_type {
            QuestionType::SingleChoice | QuestionType::MultipleChoice => NormalizedBatch::Mcq(
                records
                    .par_iter()
                    .map(|record| self.normalize_mcq(record))
                    .collect::<Result<Vec<_>>>()?,
            ),
            QuestionType::ChainOfThought => NormalizedBatch::Cot(
                records
                    .par_iter()
                    .map(|record| self.normalize_cot(record))
                    .collect::<Result<Vec<_>>>()?,
            ),
            QuestionType::VisualGrounding => NormalizedBatch::Vg(
                records
                    .par_iter()
                    .map(|record| self.normalize_vg(record))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(batch)
    }

    pub fn normalize_mcq(&self, record: &RawRecord) -> Result<McqRow> {
        let index = parse_index(&record.question_id)?;
        let options = trimmed_options(record);
        let images = self.resolve_images(record)?;

        Ok(McqRow {
            index,
            question: record.text.clone(),
            question_type: record.question_type.clone(),
            options,
            answer: record.ground_truth.clone(),
            images,
            taxonomy: Taxonomy::of(record),
            dataset: record.dataset.clone(),
        })
    }

    pub fn normalize_cot(&self, record: &RawRecord) -> Result<CotRow> {
        let index = parse_index(&record.question_id)?;
        let options = trimmed_options(record);
        let images = self.resolve_images(record)?;

        let mut reference_caption = Vec::new();
        let mut logical_conclusion = Vec::new();
        for step in &record.cot {
            ensure!(
                step.contains("Step "),
                "record {}: reasoning step lacks a 'Step <n>:' marker: {step}",
                record.question_id
            );
            let body = self.step_marker.replace(step, "").trim().to_string();
            if body.contains("is a photo") {
                reference_caption.push(body);
            } else {
                logical_conclusion.push(body);
            }
        }
        if !record.cot.is_empty() {
            logical_conclusion.push(format!("The answer is {}", record.ground_truth));
        }

        Ok(CotRow {
            index,
            question: record.text.clone(),
            question_type: record.question_type.clone(),
            options,
            answer: record.ground_truth.clone(),
            images,
            cot: record.cot.clone(),
            reference_caption,
            logical_conclusion,
            taxonomy: Taxonomy::of(record),
            dataset: record.dataset.clone(),
        })
    }

    pub fn normalize_vg(&self, record: &RawRecord) -> Result<VgRow> {
        let index = parse_index(&record.question_id)?;
        ensure!(
            record.images.len() == 1,
            "record {}: visual grounding requires exactly one image, found {}",
            record.question_id,
            record.images.len()
        );

        let image_path = self.resolve_image(&record.images[0])?;
        let (width, height) = image::image_dimensions(&image_path)
            .with_context(|| format!("failed to decode image header: {}", image_path.display()))?;

        let corners: Vec<f64> = self
            .gt_box
            .captures_iter(&record.ground_truth)
            .filter_map(|caps| caps[1].parse::<f64>().ok())
            .collect();
        ensure!(
            corners.len() == 4,
            "record {}: ground truth must contain exactly four bracketed numbers, found {} in {:?}",
            record.question_id,
            corners.len(),
            record.ground_truth
        );

        let answer = [
            corners[0] / width as f64,
            corners[1] / height as f64,
            corners[2] / width as f64,
            corners[3] / height as f64,
        ];

        Ok(VgRow {
            index,
            question: record.text.clone(),
            question_type: record.question_type.clone(),
            answer,
            image: image_path.display().to_string(),
            image_width: width as i32,
            image_height: height as i32,
            taxonomy: Taxonomy::of(record),
            dataset: record.dataset.clone(),
        })
    }

    fn resolve_images(&self, record: &RawRecord) -> Result<Vec<String>> {
        record
            .images
            .iter()
            .map(|name| {
                let path = self.resolve_image(name)?;
                Ok(path.display().to_string())
            })
            .collect()
    }

    fn resolve_image(&self, name: &str) -> Result<PathBuf> {
        let path = std::path::absolute(self.image_root.join(name))
            .with_context(|| format!("failed to resolve image path: {name}"))?;
        // Every referenced image is touched once so missing files surface here,
        // not at inference time.
        image::image_dimensions(&path)
            .with_context(|| format!("failed to probe image: {}", path.display()))?;
        Ok(path)
    }
}

pub fn parse_index(question_id: &str) -> Result<i32> {
    let suffix = question_id.rsplit('/').next().unwrap_or(question_id);
    suffix
        .parse::<i32>()
        .with_context(|| format!("non-numeric question id suffix: {question_id:?}"))
}

pub fn repair_question_ids(records: &mut [RawRecord]) -> bool {
    let all_numeric = records
        .iter()
        .all(|record| parse_index(&record.question_id).is_ok());
    if all_numeric {
        return false;
    }

    for (position, record) in records.iter_mut().enumerate() {
        record.question_id = format!("{}/{}", record.l4_task, position);
    }

    true
}

fn trimmed_options(record: &RawRecord) -> Vec<String> {
    record
        .answer_choices
        .iter()
        .map(|option| option.trim().to_string())
        .collect()
}
