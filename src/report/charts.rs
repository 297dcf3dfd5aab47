//! SVG charts comparing evaluation runs.

use plotters::data::Quartiles;
use plotters::element::Boxplot;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::error::{DrugrecallError, Result};
use crate::eval::EvaluationRow;
use crate::report::runs::{common_doids, Run};
use crate::report::summary::SummaryRow;

// --------------------------------------------------------
//  Constants
// --------------------------------------------------------
pub const RECALL_BOXPLOT_FILE: &str = "recall_boxplot.svg";
pub const RECALL_BARPLOT_FILE: &str = "recall_barplot.svg";
pub const HIT_RATE_BARPLOT_FILE: &str = "hit_rate_barplot.svg";
pub const DRUGS_PER_DISEASE_FILE: &str = "num_drugs_per_disease.svg";

const PLOT_WIDTH: u32 = 800;
const PLOT_HEIGHT: u32 = 600;
const WIDE_PLOT_WIDTH: u32 = 1200;
const PLOT_MARGIN: i32 = 25;
const FONT_SIZE_TITLE: u32 = 20;
const FONT_SIZE_TICK: u32 = 10;
const RECALL_AXIS_MAX: f64 = 1.05;

/// Where each chart was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub recall_boxplot: PathBuf,
    pub recall_barplot: PathBuf,
    pub hit_rate_barplot: PathBuf,
    pub drugs_per_disease: PathBuf,
}

impl ChartPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            recall_boxplot: dir.join(RECALL_BOXPLOT_FILE),
            recall_barplot: dir.join(RECALL_BARPLOT_FILE),
            hit_rate_barplot: dir.join(HIT_RATE_BARPLOT_FILE),
            drugs_per_disease: dir.join(DRUGS_PER_DISEASE_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            &self.recall_boxplot,
            &self.recall_barplot,
            &self.hit_rate_barplot,
            &self.drugs_per_disease,
        ]
    }
}

// --------------------------------------------------------
//  Entrypoint
// --------------------------------------------------------
/// Render all four charts into `dir`, creating it if needed.
///
/// `summaries` must be in the same order as `runs`.
pub fn render_all(dir: &Path, runs: &[Run], summaries: &[SummaryRow]) -> Result<ChartPaths> {
    std::fs::create_dir_all(dir)?;
    let paths = ChartPaths::in_dir(dir);

    plot_recall_boxplot(&paths.recall_boxplot, runs).map_err(plot_err)?;
    plot_macro_micro_recall(&paths.recall_barplot, summaries).map_err(plot_err)?;
    plot_hit_rate(&paths.hit_rate_barplot, summaries).map_err(plot_err)?;
    plot_drugs_per_disease(&paths.drugs_per_disease, runs).map_err(plot_err)?;

    Ok(paths)
}

fn plot_err(e: Box<dyn Error>) -> DrugrecallError {
    DrugrecallError::Plot(e.to_string())
}

/// Category axis: item `i` sits at x = i, range padded by half a slot.
fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

/// Label integer ticks with their category name, blank elsewhere.
fn category_label<'a>(names: &'a [String]) -> impl Fn(&f64) -> String + 'a {
    move |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        names.get(idx as usize).cloned().unwrap_or_default()
    }
}

/// Recall axis, with headroom so a recall of 1.0 stays off the frame.
fn recall_axis() -> std::ops::Range<f64> {
    0.0..RECALL_AXIS_MAX
}

/// Hit rate is a fraction of diseases, plotted on exactly [0, 1].
fn hit_rate_axis() -> std::ops::Range<f64> {
    0.0..1.0
}

fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).mix(0.9)
}

// --------------------------------------------------------
//  Charts
// --------------------------------------------------------
fn plot_recall_boxplot(output_path: &Path, runs: &[Run]) -> std::result::Result<(), Box<dyn Error>> {
    let root_area = SVGBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let names: Vec<String> = runs.iter().map(|r| r.name.clone()).collect();
    let label = category_label(&names);
    let recall = recall_axis();

    let mut chart = ChartBuilder::on(&root_area)
        .margin(PLOT_MARGIN)
        .caption("Recall distribution across runs", ("sans-serif", FONT_SIZE_TITLE))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(category_range(runs.len()), recall.start as f32..recall.end as f32)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(runs.len().max(1))
        .x_label_formatter(&label)
        .y_desc("Recall per disease")
        .draw()?;

    for (idx, quartiles) in recall_boxes(runs) {
        chart.draw_series(std::iter::once(
            Boxplot::new_vertical(idx as f64, &quartiles)
                .width(40)
                .style(series_color(idx)),
        ))?;
    }

    root_area.present()?;
    log::info!("Recall box plot saved: {}", output_path.display());
    Ok(())
}

/// One box per run that has rows, keyed by the run's slot on the x axis.
fn recall_boxes(runs: &[Run]) -> Vec<(usize, Quartiles)> {
    runs.iter()
        .enumerate()
        .filter_map(|(idx, run)| {
            if run.rows.is_empty() {
                log::warn!("Run '{}' has no rows; leaving its box out", run.name);
                return None;
            }
            Some((idx, Quartiles::new(&run.recalls()[..])))
        })
        .collect()
}

fn plot_macro_micro_recall(
    output_path: &Path,
    summaries: &[SummaryRow],
) -> std::result::Result<(), Box<dyn Error>> {
    let root_area = SVGBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let names: Vec<String> = summaries.iter().map(|s| s.run.clone()).collect();
    let label = category_label(&names);

    let mut chart = ChartBuilder::on(&root_area)
        .margin(PLOT_MARGIN)
        .caption("Macro vs Micro Recall", ("sans-serif", FONT_SIZE_TITLE))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(category_range(summaries.len()), recall_axis())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(summaries.len().max(1))
        .x_label_formatter(&label)
        .y_desc("Recall")
        .draw()?;

    let macro_color = series_color(0);
    let micro_color = series_color(1);

    chart
        .draw_series(summaries.iter().enumerate().map(|(i, s)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x, s.macro_recall)], macro_color.filled())
        }))?
        .label("macro_recall")
        .legend(move |(x, y)| Rectangle::new([(x - 5, y - 5), (x + 5, y + 5)], macro_color.filled()));

    chart
        .draw_series(summaries.iter().enumerate().map(|(i, s)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + 0.4, s.micro_recall)], micro_color.filled())
        }))?
        .label("micro_recall")
        .legend(move |(x, y)| Rectangle::new([(x - 5, y - 5), (x + 5, y + 5)], micro_color.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root_area.present()?;
    log::info!("Macro/micro recall bar chart saved: {}", output_path.display());
    Ok(())
}

fn plot_hit_rate(output_path: &Path, summaries: &[SummaryRow]) -> std::result::Result<(), Box<dyn Error>> {
    let root_area = SVGBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let names: Vec<String> = summaries.iter().map(|s| s.run.clone()).collect();
    let label = category_label(&names);

    let mut chart = ChartBuilder::on(&root_area)
        .margin(PLOT_MARGIN)
        .caption(
            "Fraction of diseases with \u{2265}1 GT drug recovered",
            ("sans-serif", FONT_SIZE_TITLE),
        )
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(category_range(summaries.len()), hit_rate_axis())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(summaries.len().max(1))
        .x_label_formatter(&label)
        .y_desc("hit_rate")
        .draw()?;

    let color = series_color(0);
    chart.draw_series(summaries.iter().enumerate().map(|(i, s)| {
        let x = i as f64;
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, s.hit_rate)], color.filled())
    }))?;

    root_area.present()?;
    log::info!("Hit rate bar chart saved: {}", output_path.display());
    Ok(())
}

/// Drug counts over the DOIDs shared by every run, in ascending DOID order.
struct CountSeries {
    doids: Vec<String>,
    /// Ground-truth counts, read from the first run
    gt: Vec<(f64, f64)>,
    /// Predicted counts, one series per run
    predicted: Vec<Vec<(f64, f64)>>,
}

impl CountSeries {
    fn from_runs(runs: &[Run]) -> Self {
        let doids = common_doids(runs);
        let by_doid: Vec<_> = runs.iter().map(|r| r.by_doid()).collect();
        let points = |run_idx: usize, count: fn(&EvaluationRow) -> usize| -> Vec<(f64, f64)> {
            doids
                .iter()
                .enumerate()
                .filter_map(|(i, d)| {
                    by_doid[run_idx]
                        .get(d.as_str())
                        .map(|row| (i as f64, count(row) as f64))
                })
                .collect()
        };

        let gt = if runs.is_empty() { Vec::new() } else { points(0, |r| r.num_gt) };
        let predicted = (0..runs.len()).map(|i| points(i, |r| r.num_pred)).collect();
        Self { doids, gt, predicted }
    }

    fn y_max(&self) -> f64 {
        self.gt
            .iter()
            .chain(self.predicted.iter().flatten())
            .map(|&(_, y)| y)
            .fold(0.0f64, f64::max)
            + 1.0
    }
}

fn plot_drugs_per_disease(output_path: &Path, runs: &[Run]) -> std::result::Result<(), Box<dyn Error>> {
    let series = CountSeries::from_runs(runs);
    if series.doids.is_empty() {
        log::info!("No DOIDs common to all runs; drug count chart will be empty");
    }
    let doids = &series.doids;

    let root_area = SVGBackend::new(output_path, (WIDE_PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let label = category_label(doids);

    let mut chart = ChartBuilder::on(&root_area)
        .margin(PLOT_MARGIN)
        .caption(
            "Number of GT drugs vs Predicted drugs per disease",
            ("sans-serif", FONT_SIZE_TITLE),
        )
        .x_label_area_size(90)
        .y_label_area_size(50)
        .build_cartesian_2d(category_range(doids.len()), 0.0..series.y_max())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(doids.len().max(1))
        .x_label_formatter(&label)
        .x_label_style(("sans-serif", FONT_SIZE_TICK).into_font().transform(FontTransform::Rotate90))
        .x_desc("Disease (DOID)")
        .y_desc("Number of drugs")
        .draw()?;

    chart
        .draw_series(LineSeries::new(series.gt.clone(), BLACK.stroke_width(2)))?
        .label("GT (num_gt)")
        .legend(|(x, y)| PathElement::new(vec![(x - 5, y), (x + 5, y)], BLACK.stroke_width(2)));
    chart.draw_series(series.gt.iter().map(|&(x, y)| Circle::new((x, y), 3, BLACK.filled())))?;

    for (idx, (run, points)) in runs.iter().zip(series.predicted).enumerate() {
        let color = series_color(idx + 1);
        chart
            .draw_series(LineSeries::new(points, color))?
            .label(run.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x - 5, y), (x + 5, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root_area.present()?;
    log::info!("Drug count chart saved: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::summary::summarize_runs;
    use std::fs;
    use tempfile::TempDir;

    fn row(doid: &str, num_gt: usize, num_pred: usize, num_matched: usize) -> EvaluationRow {
        EvaluationRow {
            doid: doid.to_string(),
            num_gt,
            num_pred,
            num_matched,
            recall: num_matched as f64 / num_gt as f64,
            matched_drugs: (0..num_matched).map(|i| format!("D{}", i)).collect(),
        }
    }

    fn runs() -> Vec<Run> {
        vec![
            Run::new("All drugs", vec![row("DOID:1", 2, 40, 2), row("DOID:2", 4, 40, 1)]),
            Run::new("Top 30", vec![row("DOID:2", 4, 30, 0), row("DOID:1", 2, 30, 1)]),
        ]
    }

    #[test]
    fn renders_four_svg_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("eval_results");
        let runs = runs();
        let summaries = summarize_runs(&runs).unwrap();

        let paths = render_all(&out, &runs, &summaries).unwrap();
        for path in paths.all() {
            let svg = fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an SVG", path.display());
        }
        assert_eq!(paths.recall_boxplot, out.join(RECALL_BOXPLOT_FILE));
    }

    #[test]
    fn no_common_doids_still_renders() {
        let dir = TempDir::new().unwrap();
        let runs = vec![
            Run::new("a", vec![row("DOID:1", 1, 1, 1)]),
            Run::new("b", vec![row("DOID:2", 1, 1, 0)]),
        ];
        let summaries = summarize_runs(&runs).unwrap();

        let paths = render_all(dir.path(), &runs, &summaries).unwrap();
        assert!(paths.drugs_per_disease.exists());
    }

    #[test]
    fn drug_count_chart_orders_doids_ascending() {
        let dir = TempDir::new().unwrap();
        let runs = vec![
            Run::new("first", vec![row("DOID:9", 3, 10, 1), row("DOID:5", 2, 10, 1), row("DOID:2", 1, 10, 1)]),
            Run::new("second", vec![row("DOID:5", 2, 8, 0), row("DOID:2", 1, 8, 1), row("DOID:9", 3, 8, 2)]),
        ];
        let summaries = summarize_runs(&runs).unwrap();

        let paths = render_all(dir.path(), &runs, &summaries).unwrap();
        let svg = fs::read_to_string(&paths.drugs_per_disease).unwrap();
        let at = |label: &str| svg.find(label).unwrap_or_else(|| panic!("{} not drawn", label));
        assert!(at("DOID:2") < at("DOID:5"));
        assert!(at("DOID:5") < at("DOID:9"));
        for legend in ["GT (num_gt)", "first", "second"] {
            assert!(svg.contains(legend), "legend entry {} missing", legend);
        }
    }

    #[test]
    fn drug_count_chart_labels_every_doid() {
        let dir = TempDir::new().unwrap();
        let rows: Vec<EvaluationRow> = (0..120).map(|i| row(&format!("DOID:{}", 1000 + i), 1, 5, 1)).collect();
        let runs = vec![Run::new("only", rows)];
        let summaries = summarize_runs(&runs).unwrap();

        let paths = render_all(dir.path(), &runs, &summaries).unwrap();
        let svg = fs::read_to_string(&paths.drugs_per_disease).unwrap();
        let mut last = 0;
        for i in 0..120 {
            let label = format!("DOID:{}", 1000 + i);
            let pos = svg.find(&label).unwrap_or_else(|| panic!("{} not drawn", label));
            assert!(pos >= last, "{} drawn out of order", label);
            last = pos;
        }
    }

    #[test]
    fn count_series_takes_gt_from_first_run() {
        let runs = vec![
            Run::new("a", vec![row("DOID:9", 2, 40, 1), row("DOID:2", 3, 40, 1), row("DOID:4", 1, 1, 1)]),
            Run::new("b", vec![row("DOID:2", 7, 30, 0), row("DOID:9", 5, 30, 1)]),
            Run::new("c", vec![row("DOID:9", 6, 20, 0), row("DOID:2", 4, 20, 0)]),
        ];

        let series = CountSeries::from_runs(&runs);
        assert_eq!(series.doids, vec!["DOID:2".to_string(), "DOID:9".to_string()]);
        assert_eq!(series.gt, vec![(0.0, 3.0), (1.0, 2.0)]);
        assert_eq!(series.predicted.len(), runs.len());
        assert_eq!(series.predicted[0], vec![(0.0, 40.0), (1.0, 40.0)]);
        assert_eq!(series.predicted[1], vec![(0.0, 30.0), (1.0, 30.0)]);
        assert_eq!(series.predicted[2], vec![(0.0, 20.0), (1.0, 20.0)]);
        assert_eq!(series.y_max(), 41.0);

        let empty = CountSeries::from_runs(&[]);
        assert!(empty.doids.is_empty() && empty.gt.is_empty() && empty.predicted.is_empty());
    }

    #[test]
    fn one_box_per_run_with_rows() {
        let runs = vec![
            Run::new("a", vec![row("DOID:1", 4, 4, 4), row("DOID:2", 4, 4, 0)]),
            Run::new("empty", Vec::new()),
            Run::new("c", vec![row("DOID:1", 2, 2, 1)]),
        ];

        let boxes = recall_boxes(&runs);
        let slots: Vec<usize> = boxes.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(slots, vec![0, 2]);
        let [_, lower, median, upper, _] = boxes[0].1.values();
        assert_eq!((lower, median, upper), (0.25, 0.5, 0.75));
        assert_eq!(boxes[1].1.median(), 0.5);
    }

    #[test]
    fn rate_axes_cover_unit_interval() {
        assert_eq!(hit_rate_axis(), 0.0..1.0);
        let recall = recall_axis();
        assert_eq!(recall.start, 0.0);
        assert!(recall.end > 1.0);
    }

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let names = vec!["All drugs".to_string(), "Top 30".to_string()];
        let label = category_label(&names);
        assert_eq!(label(&0.0), "All drugs");
        assert_eq!(label(&1.0), "Top 30");
        assert_eq!(label(&0.5), "");
        assert_eq!(label(&2.0), "");
        assert_eq!(label(&-1.0), "");
    }
}
