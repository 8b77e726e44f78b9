use super::*;

pub fn run(args: ShardArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to configure worker pool")?;
    }

    let manifest_dir = args
        .manifest_dir
        .clone()
        .unwrap_or_else(|| args.output_root.join("manifests"));
    ensure_directory(&manifest_dir)?;
    let run_manifest_path = manifest_dir.join(format!(
        "shard_run_{}.json",
        utc_compact_string(started_ts)
    ));

    info!(
        tasks_manifest = %args.tasks_manifest.display(),
        output_root = %args.output_root.display(),
        run_id = %run_id,
        "starting shard build"
    );

    let raw = std::fs::read(&args.tasks_manifest)
        .with_context(|| format!("failed to read {}", args.tasks_manifest.display()))?;
    let tasks_by_type: BTreeMap<String, Vec<String>> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.tasks_manifest.display()))?;

    let normalizer = Normalizer::new(&args.image_root)?;
    let mut counts = ShardCounts::default();
    let mut source_hashes = Vec::new();
    let mut warnings = Vec::new();

    for (type_name, tasks) in &tasks_by_type {
        let question_type = QuestionType::parse(type_name)?;
        for task in tasks {
            let task_path = args.json_root.join(format!("{task}.json"));
            source_hashes.push(TaskSourceHash {
                task: task.clone(),
                path: task_path.display().to_string(),
                sha256: sha256_file(&task_path)?,
            });

            let shard = build_task_shard(
                &normalizer,
                &task_path,
                question_type,
                &args.output_root,
                args.json_lines,
            )
            .with_context(|| format!("failed to build shard for task {task:?}"))?;

            counts.task_count += 1;
            counts.record_count += shard.record_count;
            if shard.ids_repaired {
                counts.repaired_id_batches += 1;
                warnings.push(format!(
                    "task {task:?}: non-numeric question ids regenerated sequentially"
                ));
            }
            match question_type {
                QuestionType::SingleChoice | QuestionType::MultipleChoice => {
                    counts.mcq_shards_written += 1;
                }
                QuestionType::ChainOfThought => counts.cot_shards_written += 1,
                QuestionType::VisualGrounding => counts.vg_shards_written += 1,
            }
        }
    }

    let manifest = ShardRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        updated_at: now_utc_string(),
        command: render_shard_command(&args),
        paths: ShardPaths {
            tasks_manifest: args.tasks_manifest.display().to_string(),
            json_root: args.json_root.display().to_string(),
            image_root: args.image_root.display().to_string(),
            output_root: args.output_root.display().to_string(),
        },
        counts: counts.clone(),
        source_hashes,
        warnings,
    };
    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(path = %run_manifest_path.display(), "wrote shard run manifest");
    info!(
        tasks = counts.task_count,
        records = counts.record_count,
        mcq_shards = counts.mcq_shards_written,
        cot_shards = counts.cot_shards_written,
        vg_shards = counts.vg_shards_written,
        "shard build completed"
    );

    Ok(())
}

struct TaskShardOutcome {
    record_count: usize,
    ids_repaired: bool,
}

fn build_task_shard(
    normalizer: &Normalizer,
    task_path: &Path,
    question_type: QuestionType,
    output_root: &Path,
    json_lines: bool,
) -> Result<TaskShardOutcome> {
    let mut records: Vec<RawRecord> = load_json_records(task_path, json_lines)?;
    ensure!(
        !records.is_empty(),
        "task file is empty: {}",
        task_path.display()
    );

    let taxonomy = Taxonomy::of(&records[0]);
    validate_taxonomy(&records, &taxonomy, task_path)?;

    let ids_repaired = repair_question_ids(&mut records);
    if ids_repaired {
        warn!(
            path = %task_path.display(),
            "non-numeric question ids, regenerating sequential ids"
        );
    }

    let batch = normalizer.normalize_batch(&records, question_type)?;
    let path = shard_path(output_root, question_type, &taxonomy);
    write_shard(&path, &batch)?;

    info!(
        path = %path.display(),
        records = batch.len(),
        "wrote shard"
    );

    Ok(TaskShardOutcome {
        record_count: batch.len(),
        ids_repaired,
    })
}

fn validate_taxonomy(records: &[RawRecord], taxonomy: &Taxonomy, task_path: &Path) -> Result<()> {
    ensure!(
        !taxonomy.l1.is_empty()
            && !taxonomy.l2.is_empty()
            && !taxonomy.l3.is_empty()
            && !taxonomy.l4.is_empty(),
        "empty taxonomy label in {}",
        task_path.display()
    );
    for record in records {
        ensure!(
            Taxonomy::of(record) == *taxonomy,
            "record {}: taxonomy differs from the rest of {}",
            record.question_id,
            task_path.display()
        );
    }

    Ok(())
}

pub fn render_shard_command(args: &ShardArgs) -> String {
    let mut parts = vec![
        "mmeval shard".to_string(),
        format!("--tasks-manifest {}", args.tasks_manifest.display()),
        format!("--json-root {}", args.json_root.display()),
        format!("--image-root {}", args.image_root.display()),
        format!("--output-root {}", args.output_root.display()),
    ];
    if let Some(manifest_dir) = &args.manifest_dir {
        parts.push(format!("--manifest-dir {}", manifest_dir.display()));
    }
    if args.json_lines {
        parts.push("--json-lines".to_string());
    }
    if let Some(jobs) = args.jobs {
        parts.push(format!("--jobs {jobs}"));
    }

    parts.join(" ")
}
