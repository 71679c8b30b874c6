//! Shape coordinate ingestion for the landing-page animation.
//!
//! Two source formats feed the same `shapes_coordinates.json`: a workbook
//! with one sheet per shape, and a folder of per-shape CSV exports with
//! flexible column naming.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Reader};
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::sheet::{cell_number, cell_text};

/// Default output file, relative to the working directory.
pub const SHAPES_STORE: &str = "shapes_coordinates.json";

/// CSV file name -> shape slot. `art.csv` holds the letter outlines and maps
/// to the `text` shape; two historical names exist for the pattern export.
pub const CSV_FILE_MAPPING: [(&str, &str); 5] = [
    ("sphere.csv", "sphere"),
    ("star.csv", "star"),
    ("art.csv", "text"),
    ("pattern1.csv", "pattern"),
    ("pattern.csv", "pattern"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub index: i64,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapeSet {
    pub star: Vec<Coordinate>,
    pub sphere: Vec<Coordinate>,
    pub pattern: Vec<Coordinate>,
    pub text: Vec<Coordinate>,
}

impl ShapeSet {
    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Vec<Coordinate>> {
        match name {
            "star" => Some(&mut self.star),
            "sphere" => Some(&mut self.sphere),
            "pattern" => Some(&mut self.pattern),
            "text" => Some(&mut self.text),
            _ => None,
        }
    }

    pub fn shapes(&self) -> [(&'static str, &Vec<Coordinate>); 4] {
        [
            ("star", &self.star),
            ("sphere", &self.sphere),
            ("pattern", &self.pattern),
            ("text", &self.text),
        ]
    }

    pub fn total(&self) -> usize {
        self.shapes().iter().map(|(_, c)| c.len()).sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = serde_json::to_string_pretty(self)?;
        fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
    }
}

/// x/y multiplier applied when importing a shape's CSV export. The CAD
/// exports for these shapes are 1/10th of the site's coordinate space.
pub fn csv_scale(shape: &str) -> f64 {
    match shape {
        "sphere" | "star" | "text" => 10.0,
        _ => 1.0,
    }
}

/// Read a multi-sheet workbook: one sheet per shape, columns `index`, `x`,
/// `y` and optional `z`. Rows come out sorted by `index`. Sheets with other
/// names or missing columns are skipped with a warning.
pub fn from_workbook(path: &Path) -> Result<ShapeSet> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut set = ShapeSet::default();

    for sheet_name in workbook.sheet_names().to_owned() {
        let key = sheet_name.to_lowercase();
        if set.slot_mut(&key).is_none() {
            debug!(sheet = %sheet_name, "not a shape sheet; skipped");
            continue;
        }
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("failed to read sheet {sheet_name}"))?;
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            warn!(sheet = %sheet_name, "empty sheet");
            continue;
        };
        let headers: Vec<String> = header
            .iter()
            .map(|c| cell_text(c).unwrap_or_default().trim().to_string())
            .collect();
        let col = |name: &str| headers.iter().position(|h| h.as_str() == name);
        let (Some(index_col), Some(x_col), Some(y_col)) = (col("index"), col("x"), col("y"))
        else {
            warn!(sheet = %sheet_name, "missing index/x/y columns; skipped");
            continue;
        };
        let z_col = col("z");

        let mut coordinates = Vec::new();
        for row in rows {
            let parsed = (
                row.get(index_col).and_then(cell_number),
                row.get(x_col).and_then(cell_number),
                row.get(y_col).and_then(cell_number),
            );
            let (Some(index), Some(x), Some(y)) = parsed else {
                warn!(sheet = %sheet_name, "malformed row skipped");
                continue;
            };
            coordinates.push(Coordinate {
                index: index as i64,
                x,
                y,
                z: z_col.and_then(|c| row.get(c)).and_then(cell_number),
            });
        }
        coordinates.sort_by_key(|c| c.index);
        info!(shape = %key, count = coordinates.len(), "sheet processed");
        *set.slot_mut(&key).expect("checked above") = coordinates;
    }

    Ok(set)
}

/// Read per-shape CSV exports from a directory. Column naming is flexible:
/// `P(0)/P(1)/P(2)`, `x/y/z`, or positionally the non-index columns. Missing
/// z defaults to mid-depth 0.5; the sphere's z is then rescaled to 0..1.
pub fn from_csv_dir(dir: &Path) -> Result<ShapeSet> {
    let mut set = ShapeSet::default();
    let mut found_any = false;

    for (file_name, shape) in CSV_FILE_MAPPING {
        let path = dir.join(file_name);
        if !path.exists() {
            continue;
        }
        found_any = true;
        match read_shape_csv(&path, shape) {
            Ok(coordinates) => {
                info!(shape, file = file_name, count = coordinates.len(), "csv processed");
                *set.slot_mut(shape).expect("known shape") = coordinates;
            }
            Err(err) => {
                warn!(file = file_name, error = %err, "csv skipped");
            }
        }
    }

    if !found_any {
        warn!(dir = %dir.display(), "no shape CSV files found");
    }

    normalize_sphere_depth(&mut set.sphere);
    Ok(set)
}

fn read_shape_csv(path: &Path, shape: &str) -> Result<Vec<Coordinate>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let index_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("index"));
    let exact = |name: &str| headers.iter().position(|h| h.as_str() == name);

    let (x_col, y_col, z_col) = if exact("P(0)").is_some() {
        (exact("P(0)"), exact("P(1)"), exact("P(2)"))
    } else if exact("x").is_some() {
        (exact("x"), exact("y"), exact("z"))
    } else {
        // Positional: the non-index columns in file order.
        let mut rest = (0..headers.len()).filter(|i| Some(*i) != index_col);
        (rest.next(), rest.next(), rest.next())
    };

    let (Some(index_col), Some(x_col), Some(y_col)) = (index_col, x_col, y_col) else {
        anyhow::bail!("required columns not found in {}", path.display());
    };

    let scale = csv_scale(shape);
    let mut coordinates = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "unreadable row skipped");
                continue;
            }
        };
        match parse_csv_row(&record, index_col, x_col, y_col, z_col, scale) {
            Some(coordinate) => coordinates.push(coordinate),
            None => warn!(file = %path.display(), "malformed row skipped"),
        }
    }

    coordinates.sort_by_key(|c| c.index);
    Ok(coordinates)
}

fn parse_csv_row(
    record: &StringRecord,
    index_col: usize,
    x_col: usize,
    y_col: usize,
    z_col: Option<usize>,
    scale: f64,
) -> Option<Coordinate> {
    let number = |col: usize| record.get(col).and_then(|v| v.trim().parse::<f64>().ok());
    let index = number(index_col)? as i64;
    let x = number(x_col)? * scale;
    let y = number(y_col)? * scale;
    // A blank depth cell means mid-depth; a garbled one rejects the row.
    let z = match z_col {
        Some(col) => {
            let raw = record.get(col).map(str::trim).unwrap_or("");
            if raw.is_empty() {
                0.5
            } else {
                raw.parse::<f64>().ok()?
            }
        }
        None => 0.5,
    };
    Some(Coordinate {
        index,
        x,
        y,
        z: Some(z),
    })
}

/// Linearly rescale the sphere's z to 0..1 against the observed min/max
/// (0 = nearest, 1 = farthest). Other shapes keep their raw depth.
pub fn normalize_sphere_depth(sphere: &mut [Coordinate]) {
    let depths: Vec<f64> = sphere.iter().filter_map(|c| c.z).collect();
    let (Some(min), Some(max)) = (
        depths.iter().copied().reduce(f64::min),
        depths.iter().copied().reduce(f64::max),
    ) else {
        return;
    };
    let range = if max != min { max - min } else { 1.0 };
    for coordinate in sphere.iter_mut() {
        if let Some(z) = coordinate.z {
            coordinate.z = Some((z - min) / range);
        }
    }
}

/// Example geometry for the editable template files: a five-pointed star
/// with filler points, a layered sphere with depth, a grid pattern, and
/// block-letter outlines of the word "АРТ".
pub fn template_set() -> ShapeSet {
    use std::f64::consts::PI;

    let mut star = Vec::new();
    let (outer, inner, points) = (200.0, 100.0, 5usize);
    for i in 0..points * 2 {
        let angle = (i as f64 * PI) / points as f64 - PI / 2.0;
        let radius = if i % 2 == 0 { outer } else { inner };
        star.push(Coordinate {
            index: i as i64,
            x: radius * angle.cos(),
            y: radius * angle.sin(),
            z: None,
        });
    }
    for i in points * 2..50 {
        let angle = (i as f64 / 50.0) * PI * 2.0;
        let radius = outer * (0.5 + (i % 3) as f64 * 0.2);
        star.push(Coordinate {
            index: i as i64,
            x: radius * angle.cos(),
            y: radius * angle.sin(),
            z: None,
        });
    }

    let mut sphere = Vec::new();
    let layers = 3.0;
    for i in 0..50 {
        let angle = (i as f64 / 50.0) * PI * 2.0;
        let layer = (i as f64 / (50.0 / layers)).floor();
        let radius = 150.0 * (1.0 - layer * 0.3);
        sphere.push(Coordinate {
            index: i,
            x: radius * angle.cos(),
            y: radius * angle.sin(),
            z: Some(layer / layers),
        });
    }

    let mut pattern = Vec::new();
    let (cols, spacing) = (7i64, 140.0);
    for i in 0..50i64 {
        pattern.push(Coordinate {
            index: i,
            x: (i % cols - cols / 2) as f64 * spacing,
            y: (i / cols - cols / 2) as f64 * spacing,
            z: None,
        });
    }

    let letter_points: [(f64, f64); 28] = [
        // А
        (-200.0, -50.0),
        (-150.0, -50.0),
        (-100.0, -50.0),
        (-50.0, -50.0),
        (0.0, -50.0),
        (-200.0, 0.0),
        (0.0, 0.0),
        (-200.0, 50.0),
        (-150.0, 50.0),
        (-100.0, 50.0),
        (-50.0, 50.0),
        (0.0, 50.0),
        // Р
        (50.0, -50.0),
        (100.0, -50.0),
        (150.0, -50.0),
        (200.0, -50.0),
        (50.0, 0.0),
        (200.0, 0.0),
        (50.0, 50.0),
        (100.0, 50.0),
        (150.0, 50.0),
        // Т
        (250.0, -50.0),
        (300.0, -50.0),
        (350.0, -50.0),
        (400.0, -50.0),
        (450.0, -50.0),
        (350.0, 0.0),
        (350.0, 50.0),
    ];
    let text = letter_points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| Coordinate {
            index: i as i64,
            x: *x,
            y: *y,
            z: None,
        })
        .collect();

    ShapeSet {
        star,
        sphere,
        pattern,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(index: i64, z: f64) -> Coordinate {
        Coordinate {
            index,
            x: 0.0,
            y: 0.0,
            z: Some(z),
        }
    }

    #[test]
    fn sphere_depth_rescales_to_unit_range() {
        let mut sphere = vec![coord(0, -4.0), coord(1, 1.0), coord(2, 6.0)];
        normalize_sphere_depth(&mut sphere);
        assert_eq!(sphere[0].z, Some(0.0));
        assert_eq!(sphere[1].z, Some(0.5));
        assert_eq!(sphere[2].z, Some(1.0));
    }

    #[test]
    fn constant_depth_does_not_divide_by_zero() {
        let mut sphere = vec![coord(0, 2.0), coord(1, 2.0)];
        normalize_sphere_depth(&mut sphere);
        assert_eq!(sphere[0].z, Some(0.0));
        assert_eq!(sphere[1].z, Some(0.0));
    }

    #[test]
    fn csv_scale_is_per_shape() {
        assert_eq!(csv_scale("sphere"), 10.0);
        assert_eq!(csv_scale("star"), 10.0);
        assert_eq!(csv_scale("text"), 10.0);
        assert_eq!(csv_scale("pattern"), 1.0);
    }

    #[test]
    fn csv_rows_scale_and_default_depth() {
        let record = StringRecord::from(vec!["3", "1.5", "-2"]);
        let c = parse_csv_row(&record, 0, 1, 2, None, 10.0).unwrap();
        assert_eq!(c.index, 3);
        assert_eq!(c.x, 15.0);
        assert_eq!(c.y, -20.0);
        assert_eq!(c.z, Some(0.5));
    }

    #[test]
    fn malformed_csv_rows_are_rejected() {
        let record = StringRecord::from(vec!["3", "oops", "-2"]);
        assert!(parse_csv_row(&record, 0, 1, 2, None, 1.0).is_none());
    }

    #[test]
    fn garbled_depth_rejects_the_row_but_blank_defaults() {
        let record = StringRecord::from(vec!["1", "2", "3", "junk"]);
        assert!(parse_csv_row(&record, 0, 1, 2, Some(3), 1.0).is_none());

        let record = StringRecord::from(vec!["1", "2", "3", ""]);
        let c = parse_csv_row(&record, 0, 1, 2, Some(3), 1.0).unwrap();
        assert_eq!(c.z, Some(0.5));
    }

    #[test]
    fn csv_dir_handles_every_header_variant() {
        let dir = std::env::temp_dir().join(format!(
            "shape-csv-headers-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        // P(0)/P(1)/P(2) naming, rows out of order
        std::fs::write(
            dir.join("sphere.csv"),
            "index,P(0),P(1),P(2)\n1,2,3,9\n0,1,2,4\n2,3,4,14\n",
        )
        .unwrap();
        // plain x/y naming, no depth column
        std::fs::write(dir.join("pattern.csv"), "index,x,y\n0,5,6\n").unwrap();
        // neither naming scheme: non-index columns picked positionally
        std::fs::write(dir.join("star.csv"), "Point Index,a,b\n0,1,2\n").unwrap();
        // the letter outlines live in art.csv and land in the text slot
        std::fs::write(dir.join("art.csv"), "index,x,y\n0,7,8\n").unwrap();

        let set = from_csv_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let indices: Vec<i64> = set.sphere.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(set.sphere[0].x, 10.0);
        assert_eq!(set.sphere[0].y, 20.0);
        assert_eq!(set.sphere[0].z, Some(0.0));
        assert_eq!(set.sphere[1].z, Some(0.5));
        assert_eq!(set.sphere[2].z, Some(1.0));

        assert_eq!(set.pattern[0].x, 5.0);
        assert_eq!(set.pattern[0].y, 6.0);
        assert_eq!(set.pattern[0].z, Some(0.5));

        assert_eq!(set.star[0].x, 10.0);
        assert_eq!(set.star[0].y, 20.0);

        assert_eq!(set.text[0].x, 70.0);
        assert_eq!(set.text[0].y, 80.0);
    }

    #[test]
    fn template_has_all_four_shapes_sorted() {
        let set = template_set();
        assert_eq!(set.star.len(), 50);
        assert_eq!(set.sphere.len(), 50);
        assert_eq!(set.pattern.len(), 50);
        assert_eq!(set.text.len(), 28);
        assert!(set.sphere.iter().all(|c| c.z.is_some()));
        assert!(set
            .star
            .windows(2)
            .all(|pair| pair[0].index < pair[1].index));
    }

    #[test]
    fn shape_json_omits_missing_depth() {
        let set = ShapeSet {
            star: vec![Coordinate {
                index: 0,
                x: 1.0,
                y: 2.0,
                z: None,
            }],
            ..Default::default()
        };
        let rendered = serde_json::to_string(&set).unwrap();
        assert!(rendered.contains("\"star\":[{\"index\":0,\"x\":1.0,\"y\":2.0}]"));
    }
}
