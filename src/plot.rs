use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

// ---------------------------------------------------------------------------
// Recorded-vs-model comparison figures
// ---------------------------------------------------------------------------

const FIGURE_SIZE: (u32, u32) = (1_000, 560);
const COMBINED_SIZE: (u32, u32) = (1_400, 1_000);

/// One quantity to draw: the recorded series against the model curve.
pub struct Panel<'a> {
    pub title: &'a str,
    pub y_label: &'a str,
    pub recorded: (&'a [f64], &'a [f64]),
    pub model: (&'a [f64], &'a [f64]),
}

/// Draw a single-quantity comparison to a PNG file.
pub fn comparison_plot(path: &Path, panel: &Panel) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_panel(&root, panel)?;
    root.present()?;
    Ok(())
}

/// Draw four quantities as a 2x2 grid in one PNG file.
pub fn combined_plot(path: &Path, panels: &[Panel]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, COMBINED_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    for (area, panel) in root.split_evenly((2, 2)).iter().zip(panels) {
        draw_panel(area, panel)?;
    }
    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    panel: &Panel,
) -> Result<(), Box<dyn Error>> {
    let (_, x_max) = series_bounds(&[panel.recorded.0, panel.model.0])?;
    let (y_min, y_max) = series_bounds(&[panel.recorded.1, panel.model.1])?;

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(36)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(panel.y_label)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            panel
                .recorded
                .0
                .iter()
                .zip(panel.recorded.1)
                .map(|(&x, &y)| (x, y)),
            &BLUE,
        ))?
        .label("recorded")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            panel.model.0.iter().zip(panel.model.1).map(|(&x, &y)| (x, y)),
            &RED,
        ))?
        .label("model")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Joint bounds across several series, padded so lines clear the frame.
fn series_bounds(series: &[&[f64]]) -> Result<(f64, f64), Box<dyn Error>> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for values in series {
        for &v in *values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !(min.is_finite() && max.is_finite()) {
        return Err("no data points".into());
    }
    let pad = 0.05 * (max - min).max(1.0);
    Ok((min - pad, max + pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_every_series_with_padding() {
        let a = [0.0, 10.0];
        let b = [-5.0, 3.0];
        let (min, max) = series_bounds(&[&a, &b]).unwrap();
        assert!(min < -5.0);
        assert!(max > 10.0);
    }

    #[test]
    fn empty_series_is_an_error() {
        let empty: [f64; 0] = [];
        assert!(series_bounds(&[&empty]).is_err());
    }

    #[test]
    fn flat_series_still_gets_a_visible_range() {
        let flat = [5.0, 5.0, 5.0];
        let (min, max) = series_bounds(&[&flat]).unwrap();
        assert!(max - min >= 0.1, "flat data should not collapse the axis");
    }
}
