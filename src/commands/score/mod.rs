use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result, ensure};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::ScoreArgs;
use crate::model::{PredictionRow, QuestionType, RawRecord, Taxonomy};
use crate::util::{load_json_records, write_json_pretty};

mod aggregate;
mod bbox;
mod extract;
mod report;
mod run;
#[cfg(test)]
mod tests;

pub use run::run;

use aggregate::*;
use bbox::*;
use extract::*;
use report::*;
