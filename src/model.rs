use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Question_id")]
    pub question_id: String,

    #[serde(rename = "Question Type")]
    pub question_type: String,

    #[serde(rename = "Text")]
    pub text: String,

    #[serde(rename = "Answer Choices", default)]
    pub answer_choices: Vec<String>,

    #[serde(rename = "Ground Truth")]
    pub ground_truth: String,

    #[serde(rename = "Images", default)]
    pub images: Vec<String>,

    #[serde(rename = "L1-task")]
    pub l1_task: String,

    #[serde(rename = "L2-task")]
    pub l2_task: String,

    #[serde(rename = "L3-task")]
    pub l3_task: String,

    #[serde(rename = "L4-task")]
    pub l4_task: String,

    #[serde(rename = "Dataset")]
    pub dataset: String,

    #[serde(rename = "CoT", default)]
    pub cot: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    ChainOfThought,
    VisualGrounding,
}

impl QuestionType {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "Single Choice" => Ok(Self::SingleChoice),
            "Multiple Choice" => Ok(Self::MultipleChoice),
            "Chain-of-Thought" => Ok(Self::ChainOfThought),
            "Visual Grounding" => Ok(Self::VisualGrounding),
            other => bail!("unhandled question type: {other}"),
        }
    }

    pub fn type_root(self) -> &'static str {
        match self {
            Self::SingleChoice | Self::MultipleChoice => "mcq_shards",
            Self::ChainOfThought => "cot_shards",
            Self::VisualGrounding => "vg_shards",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    pub l1: String,
    pub l2: String,
    pub l3: String,
    pub l4: String,
}

impl Taxonomy {
    pub fn of(record: &RawRecord) -> Self {
        Self {
            l1: record.l1_task.clone(),
            l2: record.l2_task.clone(),
            l3: record.l3_task.clone(),
            l4: record.l4_task.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRow {
    pub index: i32,
    pub prediction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSourceHash {
    pub task: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ShardCounts {
    pub task_count: usize,
    pub record_count: usize,
    pub mcq_shards_written: usize,
    pub cot_shards_written: usize,
    pub vg_shards_written: usize,
    pub repaired_id_batches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShardPaths {
    pub tasks_manifest: String,
    pub json_root: String,
    pub image_root: String,
    pub output_root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShardRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub paths: ShardPaths,
    pub counts: ShardCounts,
    pub source_hashes: Vec<TaskSourceHash>,
    pub warnings: Vec<String>,
}
