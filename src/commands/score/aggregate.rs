use super::*;

pub const VG_THRESHOLDS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

pub trait Counters: Default + Clone {
    fn merge(&mut self, other: &Self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct McqCounts {
    pub correct: u64,
    pub wrong: u64,
    pub unable: u64,
}

impl McqCounts {
    pub fn total(&self) -> u64 {
        self.correct + self.wrong
    }
}

impl Counters for McqCounts {
    fn merge(&mut self, other: &Self) {
        self.correct += other.correct;
        self.wrong += other.wrong;
        self.unable += other.unable;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VgCounts {
    pub iou_sum: f64,
    pub threshold_hits: [u64; 5],
    pub count: u64,
}

impl Counters for VgCounts {
    fn merge(&mut self, other: &Self) {
        self.iou_sum += other.iou_sum;
        for (hits, other_hits) in self.threshold_hits.iter_mut().zip(other.threshold_hits) {
            *hits += other_hits;
        }
        self.count += other.count;
    }
}

#[derive(Debug)]
pub struct AccNode<C> {
    pub counts: C,
    pub children: BTreeMap<String, AccNode<C>>,
}

impl<C: Counters> Default for AccNode<C> {
    fn default() -> Self {
        Self {
            counts: C::default(),
            children: BTreeMap::new(),
        }
    }
}

impl<C: Counters> AccNode<C> {
    pub fn insert(&mut self, taxonomy: &Taxonomy, counts: &C) {
        self.counts.merge(counts);

        let mut node = self;
        for label in [&taxonomy.l1, &taxonomy.l2, &taxonomy.l3, &taxonomy.l4] {
            node = node.children.entry(label.clone()).or_default();
            node.counts.merge(counts);
        }
    }

    // Partition-parallel scoring merges per-partition trees with this; counter
    // addition is associative and commutative so merge order does not matter.
    pub fn merge(&mut self, other: &AccNode<C>) {
        self.counts.merge(&other.counts);
        for (label, child) in &other.children {
            self.children.entry(label.clone()).or_default().merge(child);
        }
    }
}

pub struct McqScoredItem {
    pub pred_answer: String,
    pub answer: String,
    pub unable_to_decide: char,
    pub taxonomy: Taxonomy,
}

pub struct VgScoredItem {
    pub iou: f64,
    pub taxonomy: Taxonomy,
}

pub fn accumulate_mcq(root: &mut AccNode<McqCounts>, item: &McqScoredItem) {
    let correct = letter_set(&item.pred_answer) == letter_set(&item.answer);
    let unable = item.pred_answer == item.unable_to_decide.to_string();
    let counts = McqCounts {
        correct: correct as u64,
        wrong: !correct as u64,
        unable: unable as u64,
    };
    root.insert(&item.taxonomy, &counts);
}

pub fn accumulate_vg(root: &mut AccNode<VgCounts>, item: &VgScoredItem) {
    let mut threshold_hits = [0_u64; 5];
    for (hits, threshold) in threshold_hits.iter_mut().zip(VG_THRESHOLDS) {
        *hits = (item.iou >= threshold) as u64;
    }
    let counts = VgCounts {
        iou_sum: item.iou,
        threshold_hits,
        count: 1,
    };
    root.insert(&item.taxonomy, &counts);
}

#[derive(Debug, Serialize)]
pub struct McqReportNode {
    pub accuracy: f64,
    pub item_count: u64,
    pub unable_count: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, McqReportNode>,
}

#[derive(Debug, Serialize)]
pub struct McqReport {
    pub overall_accuracy: f64,
    pub item_count: u64,
    pub levels: BTreeMap<String, McqReportNode>,
}

#[derive(Debug, Serialize)]
pub struct VgReportNode {
    pub mean_iou: f64,
    pub accuracy_at: BTreeMap<String, f64>,
    pub item_count: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, VgReportNode>,
}

#[derive(Debug, Serialize)]
pub struct VgReport {
    pub overall_mean_iou: f64,
    pub overall_accuracy_at: BTreeMap<String, f64>,
    pub item_count: u64,
    pub levels: BTreeMap<String, VgReportNode>,
}

pub fn rate(successes: u64, total: u64) -> f64 {
    // A node with zero items reports rate 0 rather than failing.
    if total == 0 {
        0.0
    } else {
        successes as f64 / total as f64
    }
}

pub fn finalize_mcq(root: &AccNode<McqCounts>) -> McqReport {
    // The overall rate is global successes over global items (sum/sum), which
    // differs from the mean of per-node rates when leaf counts are unequal.
    McqReport {
        overall_accuracy: rate(root.counts.correct, root.counts.total()),
        item_count: root.counts.total(),
        levels: finalize_mcq_children(root),
    }
}

fn finalize_mcq_children(node: &AccNode<McqCounts>) -> BTreeMap<String, McqReportNode> {
    node.children
        .iter()
        .map(|(label, child)| {
            let report = McqReportNode {
                accuracy: rate(child.counts.correct, child.counts.total()),
                item_count: child.counts.total(),
                unable_count: child.counts.unable,
                children: finalize_mcq_children(child),
            };
            (label.clone(), report)
        })
        .collect()
}

pub fn finalize_vg(root: &AccNode<VgCounts>) -> VgReport {
    VgReport {
        overall_mean_iou: mean_iou(&root.counts),
        overall_accuracy_at: threshold_rates(&root.counts),
        item_count: root.counts.count,
        levels: finalize_vg_children(root),
    }
}

fn finalize_vg_children(node: &AccNode<VgCounts>) -> BTreeMap<String, VgReportNode> {
    node.children
        .iter()
        .map(|(label, child)| {
            let report = VgReportNode {
                mean_iou: mean_iou(&child.counts),
                accuracy_at: threshold_rates(&child.counts),
                item_count: child.counts.count,
                children: finalize_vg_children(child),
            };
            (label.clone(), report)
        })
        .collect()
}

fn mean_iou(counts: &VgCounts) -> f64 {
    if counts.count == 0 {
        0.0
    } else {
        counts.iou_sum / counts.count as f64
    }
}

fn threshold_rates(counts: &VgCounts) -> BTreeMap<String, f64> {
    VG_THRESHOLDS
        .iter()
        .zip(counts.threshold_hits)
        .map(|(threshold, hits)| (format!("ACC@{threshold}"), rate(hits, counts.count)))
        .collect()
}
