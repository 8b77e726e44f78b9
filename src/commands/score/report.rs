use super::*;

const LEVEL_PREFIXES: [&str; 4] = [
    "************************************",
    "++++++++++++++++++++++++",
    "++++++++++++",
    "------",
];

pub fn format_mcq_report(report: &McqReport) -> String {
    let mut lines = Vec::new();
    format_mcq_level(&report.levels, 0, &mut lines);
    lines.push(format!(
        "{} Overall Acc {:.4} ({} items)",
        LEVEL_PREFIXES[0], report.overall_accuracy, report.item_count
    ));

    lines.join("\n")
}

fn format_mcq_level(
    nodes: &BTreeMap<String, McqReportNode>,
    level: usize,
    lines: &mut Vec<String>,
) {
    for (label, node) in nodes {
        lines.push(format!(
            "{} Acc {:.4}\tUnable choice {}\t{} (Level-{}, {} items)",
            LEVEL_PREFIXES[level],
            node.accuracy,
            node.unable_count,
            label,
            level + 1,
            node.item_count
        ));
        if level + 1 < LEVEL_PREFIXES.len() {
            format_mcq_level(&node.children, level + 1, lines);
        }
    }
}

pub fn format_vg_report(report: &VgReport) -> String {
    let mut lines = Vec::new();
    format_vg_level(&report.levels, 0, &mut lines);
    lines.push(format!(
        "{} Overall IoU {:.4} ({} items)",
        LEVEL_PREFIXES[0], report.overall_mean_iou, report.item_count
    ));
    for (metric, value) in &report.overall_accuracy_at {
        lines.push(format!(
            "{} Overall {} {:.4}",
            LEVEL_PREFIXES[0], metric, value
        ));
    }

    lines.join("\n")
}

fn format_vg_level(nodes: &BTreeMap<String, VgReportNode>, level: usize, lines: &mut Vec<String>) {
    for (label, node) in nodes {
        lines.push(format!(
            "{} IoU {:.4}\t{} (Level-{}, {} items)",
            LEVEL_PREFIXES[level],
            node.mean_iou,
            label,
            level + 1,
            node.item_count
        ));
        if level + 1 == LEVEL_PREFIXES.len() {
            for (metric, value) in &node.accuracy_at {
                lines.push(format!("{} {} {:.4}", LEVEL_PREFIXES[level], metric, value));
            }
        } else {
            format_vg_level(&node.children, level + 1, lines);
        }
    }
}
