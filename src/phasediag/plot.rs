//! # 稳定区域图表生成
//!
//! 使用 `plotters` 绘制三元体系宿主稳定区域在 (Δμ_1, Δμ_2)
//! 平面上的投影多边形，顶点即化学势极限。
//!
//! ## 依赖关系
//! - 被 `commands/chempots/calc.rs` 调用
//! - 使用 `phasediag/limits.rs` 的 HostRegion
//! - 使用 `plotters` 渲染图表

use crate::error::{ChemlimError, Result};
use crate::phasediag::limits::HostRegion;

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// 绘制三元体系稳定区域（输出格式由扩展名决定: .svg 为 SVG，否则 PNG）
pub fn plot_stability_region(
    region: &HostRegion,
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    if region.elements.len() != 3 {
        return Err(ChemlimError::InvalidArgument(
            "stability-region plotting requires a ternary host".to_string(),
        ));
    }

    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_region_chart(&root, region)?;
        root.present()
            .map_err(|e| ChemlimError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_region_chart(&root, region)?;
        root.present()
            .map_err(|e| ChemlimError::Other(e.to_string()))?;
    }

    Ok(())
}

/// 在绘图区上绘制稳定区域多边形
fn draw_region_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    region: &HostRegion,
) -> Result<()> {
    root.fill(&WHITE)
        .map_err(|e| ChemlimError::Other(e.to_string()))?;

    // 顶点按质心极角排序，得到多边形边界顺序
    let points: Vec<(f64, f64)> = region.vertices.iter().map(|v| (v.mu[0], v.mu[1])).collect();
    let ordered = order_by_angle(&points);

    let (x_min, x_max) = value_range(ordered.iter().map(|p| p.0));
    let (y_min, y_max) = value_range(ordered.iter().map(|p| p.1));

    let title = format!("{} stability region", region.host.formula);
    let mut chart = ChartBuilder::on(root)
        .caption(&title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| ChemlimError::Other(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(format!("Δμ_{} (eV)", region.elements[0]))
        .y_desc(format!("Δμ_{} (eV)", region.elements[1]))
        .draw()
        .map_err(|e| ChemlimError::Other(e.to_string()))?;

    // 填充区域
    if ordered.len() >= 3 {
        chart
            .draw_series(std::iter::once(Polygon::new(
                ordered.clone(),
                BLUE.mix(0.15).filled(),
            )))
            .map_err(|e| ChemlimError::Other(e.to_string()))?;
    }

    // 闭合边界
    if ordered.len() >= 2 {
        let mut boundary = ordered.clone();
        boundary.push(ordered[0]);
        chart
            .draw_series(LineSeries::new(boundary, BLUE.stroke_width(2)))
            .map_err(|e| ChemlimError::Other(e.to_string()))?;
    }

    // 顶点与标签
    chart
        .draw_series(region.vertices.iter().map(|v| {
            Circle::new((v.mu[0], v.mu[1]), 5, RED.filled())
        }))
        .map_err(|e| ChemlimError::Other(e.to_string()))?
        .label("Chemical potential limits")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

    chart
        .draw_series(region.vertices.iter().map(|v| {
            Text::new(v.name(), (v.mu[0], v.mu[1]), ("sans-serif", 14))
        }))
        .map_err(|e| ChemlimError::Other(e.to_string()))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| ChemlimError::Other(e.to_string()))?;

    Ok(())
}

/// 顶点按质心极角排序
fn order_by_angle(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let cx = points.iter().map(|p| p.0).sum::<f64>() / points.len() as f64;
    let cy = points.iter().map(|p| p.1).sum::<f64>() / points.len() as f64;

    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        let ang_a = (a.1 - cy).atan2(a.0 - cx);
        let ang_b = (b.1 - cy).atan2(b.0 - cx);
        ang_a.partial_cmp(&ang_b).unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}

/// 数据范围加 10% 边距（退化时 ±0.1）
fn value_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let span = max - min;
    if span < 1e-9 {
        (min - 0.1, max + 0.1)
    } else {
        (min - 0.1 * span, max + 0.1 * span)
    }
}
