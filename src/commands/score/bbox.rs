use super::*;

const NUM: &str = r"(-?\d+(?:\.\d+)?)";

pub struct BoxExtractor {
    patterns: Vec<Regex>,
}

impl BoxExtractor {
    pub fn new() -> Result<Self> {
        let quad = format!(r"{NUM}\s*,\s*{NUM}\s*,\s*{NUM}\s*,\s*{NUM}");
        let pair = format!(r"{NUM}\s*,\s*{NUM}");
        let sources = [
            format!(r"\[\s*{quad}\s*\]"),
            format!(r"\(\s*{quad}\s*\)"),
            format!(r"\(\s*{pair}\s*\)\s*,\s*\(\s*{pair}\s*\)"),
        ];

        let patterns = sources
            .iter()
            .map(|source| {
                Regex::new(source)
                    .with_context(|| format!("failed to compile box regex: {source}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    // [0,0,0,0] is the unparseable sentinel; its zero area guarantees IoU 0.
    pub fn extract(&self, text: &str) -> [f64; 4] {
        for pattern in &self.patterns {
            if let Some(caps) = pattern.captures(text) {
                let corners: Vec<f64> = (1..=4)
                    .filter_map(|group| caps.get(group))
                    .filter_map(|group| group.as_str().parse::<f64>().ok())
                    .collect();
                if let [x_min, y_min, x_max, y_max] = corners[..] {
                    return [x_min, y_min, x_max, y_max];
                }
            }
        }

        [0.0, 0.0, 0.0, 0.0]
    }
}

pub fn compute_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x_left = a[0].max(b[0]);
    let y_top = a[1].max(b[1]);
    let x_right = a[2].min(b[2]);
    let y_bottom = a[3].min(b[3]);

    let intersection = (x_right - x_left).max(0.0) * (y_bottom - y_top).max(0.0);
    let a_area = (a[2] - a[0]) * (a[3] - a[1]);
    let b_area = (b[2] - b[0]) * (b[3] - b[1]);
    let union = a_area + b_area - intersection;

    if union <= 0.0 { 0.0 } else { intersection / union }
}

// The coordinate scale of a predicted box is not reliably knowable from model
// output alone, so the score is the best IoU over four candidate rescalings.
pub fn best_rescaled_iou(answer: &[f64; 4], pred: &[f64; 4], width: f64, height: f64) -> f64 {
    let candidates = [
        *pred,
        [
            pred[0] / width,
            pred[1] / height,
            pred[2] / width,
            pred[3] / height,
        ],
        pred.map(|corner| corner / 1000.0),
        pred.map(|corner| corner / 100.0),
    ];

    candidates
        .iter()
        .map(|candidate| compute_iou(answer, candidate))
        .fold(0.0, f64::max)
}
