use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use chrono::Utc;
use rayon::prelude::*;
use regex::Regex;
use tracing::{info, warn};

use crate::cli::ShardArgs;
use crate::model::{
    QuestionType, RawRecord, ShardCounts, ShardPaths, ShardRunManifest, TaskSourceHash, Taxonomy,
};
use crate::util::{
    ensure_directory, load_json_records, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};

mod normalize;
mod run;
mod schema;

pub use normalize::{CotRow, McqRow, NormalizedBatch, Normalizer, VgRow, repair_question_ids};
pub use run::run;

use normalize::*;
use schema::*;
