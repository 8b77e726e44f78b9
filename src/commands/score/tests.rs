use super::*;

fn taxonomy(l4: &str) -> Taxonomy {
    Taxonomy {
        l1: "Perception".to_string(),
        l2: "Visual Recognition".to_string(),
        l3: "Animals".to_string(),
        l4: l4.to_string(),
    }
}

fn mcq_item(pred_answer: &str, answer: &str, l4: &str) -> McqScoredItem {
    McqScoredItem {
        pred_answer: pred_answer.to_string(),
        answer: answer.to_string(),
        unable_to_decide: 'E',
        taxonomy: taxonomy(l4),
    }
}

#[test]
fn iou_of_a_box_with_itself_is_one() {
    let a = [0.1, 0.2, 0.5, 0.8];
    assert!((compute_iou(&a, &a) - 1.0).abs() < 1e-12);
}

#[test]
fn iou_of_disjoint_boxes_is_zero() {
    let a = [0.0, 0.0, 0.2, 0.2];
    let b = [0.5, 0.5, 0.9, 0.9];
    assert_eq!(compute_iou(&a, &b), 0.0);
}

#[test]
fn iou_is_symmetric() {
    let a = [0.0, 0.0, 0.4, 0.4];
    let b = [0.2, 0.2, 0.6, 0.6];
    assert!((compute_iou(&a, &b) - compute_iou(&b, &a)).abs() < 1e-12);
}

#[test]
fn iou_of_degenerate_union_is_zero_not_an_error() {
    let zero = [0.0, 0.0, 0.0, 0.0];
    assert_eq!(compute_iou(&zero, &zero), 0.0);
}

#[test]
fn extractor_prefers_parenthetical_letters() {
    let extractor = AnswerExtractor::new().unwrap();
    assert_eq!(extractor.extract("The answer is (B)"), "B");
    assert_eq!(extractor.extract("The correct answer is (d)."), "D");
}

#[test]
fn extractor_falls_back_to_bare_letter_scan() {
    let extractor = AnswerExtractor::new().unwrap();
    assert_eq!(extractor.extract("I think A and C are both right"), "AC");
}

#[test]
fn extractor_keeps_every_space_separated_letter() {
    // Multiple Choice predictions are requested as letters separated by
    // spaces; adjacent standalone letters must all survive extraction.
    let extractor = AnswerExtractor::new().unwrap();
    assert_eq!(extractor.extract("A B C"), "ABC");
    assert_eq!(extractor.extract("The answer is A B"), "AB");
}

#[test]
fn extractor_returns_empty_when_no_candidate_letter_appears() {
    let extractor = AnswerExtractor::new().unwrap();
    assert_eq!(extractor.extract("I just know you"), "");
    assert_eq!(extractor.extract(""), "");
}

#[test]
fn extractor_is_idempotent_on_normalized_output() {
    let extractor = AnswerExtractor::new().unwrap();
    let first = extractor.extract("The answer is (A) and (B)");
    assert_eq!(first, "AB");
    assert_eq!(extractor.extract(&first), first);
}

#[test]
fn box_extractor_handles_all_three_patterns() {
    let extractor = BoxExtractor::new().unwrap();
    assert_eq!(
        extractor.extract("bbox: [10, 20.5, 30, 40]"),
        [10.0, 20.5, 30.0, 40.0]
    );
    assert_eq!(
        extractor.extract("the region (0.1, 0.2, 0.3, 0.4) holds it"),
        [0.1, 0.2, 0.3, 0.4]
    );
    assert_eq!(
        extractor.extract("from (10, 20), (30, 40)"),
        [10.0, 20.0, 30.0, 40.0]
    );
}

#[test]
fn box_extractor_returns_zero_sentinel_when_unparseable() {
    let extractor = BoxExtractor::new().unwrap();
    assert_eq!(extractor.extract("somewhere on the left"), [0.0; 4]);
}

#[test]
fn rescaling_candidates_recover_pixel_coordinates() {
    let answer = [0.1, 0.1, 0.3, 0.3];
    let pred = [10.0, 20.0, 30.0, 40.0];

    let raw = compute_iou(&answer, &pred);
    let best = best_rescaled_iou(&answer, &pred, 100.0, 100.0);

    assert_eq!(raw, 0.0);
    // [10,20,30,40] / 100 = [0.1,0.2,0.3,0.4] overlaps the ground truth.
    assert!((best - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn unable_to_decide_letter_is_the_last_option() {
    let options = vec![
        "(A) A cat".to_string(),
        "(B) A dog".to_string(),
        "(C) You are unable to decide.".to_string(),
    ];
    assert_eq!(unable_to_decide_letter(&options).unwrap(), 'C');

    let missing = vec!["(A) A cat".to_string(), "(B) A dog".to_string()];
    assert!(unable_to_decide_letter(&missing).is_err());
}

#[test]
fn overall_rate_is_sum_over_sum_not_mean_of_rates() {
    let mut root = AccNode::<McqCounts>::default();
    accumulate_mcq(&mut root, &mcq_item("A", "A", "leaf1"));
    for _ in 0..9 {
        accumulate_mcq(&mut root, &mcq_item("B", "A", "leaf2"));
    }

    let report = finalize_mcq(&root);
    assert!((report.overall_accuracy - 0.1).abs() < 1e-12);

    let l3 = &report.levels["Perception"].children["Visual Recognition"].children["Animals"];
    assert!((l3.children["leaf1"].accuracy - 1.0).abs() < 1e-12);
    assert_eq!(l3.children["leaf2"].accuracy, 0.0);
}

#[test]
fn multiple_choice_match_is_set_valued() {
    let mut root = AccNode::<McqCounts>::default();
    accumulate_mcq(&mut root, &mcq_item("CA", "AC", "leaf"));

    let report = finalize_mcq(&root);
    assert_eq!(report.overall_accuracy, 1.0);
}

#[test]
fn unable_to_decide_predictions_are_tracked_separately() {
    let mut root = AccNode::<McqCounts>::default();
    accumulate_mcq(&mut root, &mcq_item("E", "A", "leaf"));
    accumulate_mcq(&mut root, &mcq_item("A", "A", "leaf"));

    let report = finalize_mcq(&root);
    let leaf = &report.levels["Perception"].children["Visual Recognition"].children["Animals"]
        .children["leaf"];
    assert_eq!(leaf.unable_count, 1);
    assert_eq!(leaf.item_count, 2);
    assert!((leaf.accuracy - 0.5).abs() < 1e-12);
}

#[test]
fn empty_tree_reports_zero_rates_without_failing() {
    let root = AccNode::<McqCounts>::default();
    let report = finalize_mcq(&root);
    assert_eq!(report.overall_accuracy, 0.0);
    assert_eq!(report.item_count, 0);

    let root = AccNode::<VgCounts>::default();
    let report = finalize_vg(&root);
    assert_eq!(report.overall_mean_iou, 0.0);
    assert_eq!(report.overall_accuracy_at["ACC@0.5"], 0.0);
}

#[test]
fn merged_partition_trees_equal_a_single_tree() {
    let mut left = AccNode::<McqCounts>::default();
    let mut right = AccNode::<McqCounts>::default();
    let mut whole = AccNode::<McqCounts>::default();

    let items = [
        mcq_item("A", "A", "leaf1"),
        mcq_item("B", "A", "leaf1"),
        mcq_item("C", "C", "leaf2"),
    ];
    for (position, item) in items.iter().enumerate() {
        if position % 2 == 0 {
            accumulate_mcq(&mut left, item);
        } else {
            accumulate_mcq(&mut right, item);
        }
        accumulate_mcq(&mut whole, item);
    }

    left.merge(&right);
    let merged = finalize_mcq(&left);
    let single = finalize_mcq(&whole);

    assert_eq!(merged.overall_accuracy, single.overall_accuracy);
    assert_eq!(merged.item_count, single.item_count);
    let merged_l1 = &merged.levels["Perception"];
    let single_l1 = &single.levels["Perception"];
    assert_eq!(merged_l1.item_count, single_l1.item_count);
    assert_eq!(merged_l1.accuracy, single_l1.accuracy);
}

#[test]
fn vg_aggregation_tracks_mean_iou_and_threshold_hits() {
    let mut root = AccNode::<VgCounts>::default();
    accumulate_vg(
        &mut root,
        &VgScoredItem {
            iou: 0.6,
            taxonomy: taxonomy("leaf"),
        },
    );
    accumulate_vg(
        &mut root,
        &VgScoredItem {
            iou: 0.2,
            taxonomy: taxonomy("leaf"),
        },
    );

    let report = finalize_vg(&root);
    assert!((report.overall_mean_iou - 0.4).abs() < 1e-12);
    assert_eq!(report.overall_accuracy_at["ACC@0.1"], 1.0);
    assert_eq!(report.overall_accuracy_at["ACC@0.3"], 0.5);
    assert_eq!(report.overall_accuracy_at["ACC@0.5"], 0.5);
    assert_eq!(report.overall_accuracy_at["ACC@0.7"], 0.0);
}

#[test]
fn report_formatting_emits_one_line_per_node() {
    let mut root = AccNode::<McqCounts>::default();
    accumulate_mcq(&mut root, &mcq_item("A", "A", "leaf"));

    let text = format_mcq_report(&finalize_mcq(&root));
    assert_eq!(text.lines().count(), 5);
    assert!(text.contains("Overall Acc 1.0000"));
    assert!(text.contains("leaf (Level-4, 1 items)"));
}
