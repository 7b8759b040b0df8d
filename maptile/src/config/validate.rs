//! Structural validation of the configuration document.

use maptile_shared::{MaptileError, MaptileResult};

use super::document::{AppConfig, Destination, SourceConfig};

const MAX_ZOOM: u8 = 30;

impl AppConfig {
    /// Every problem found in the document, in document order.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.global.temp_download_dir.trim().is_empty() {
            problems.push("global.temp_download_dir must not be empty".to_string());
        }

        for (i, source) in self.sources.iter().enumerate() {
            source_problems(i, source, &mut problems);
        }

        for (i, destination) in self.output.destinations.iter().enumerate() {
            match destination {
                Destination::Local { path } => {
                    if path.trim().is_empty() {
                        problems.push(format!("destination {i} (local) is missing 'path'"));
                    }
                }
                Destination::Minio(minio) => {
                    let fields = [
                        ("endpoint", &minio.endpoint),
                        ("access_key", &minio.access_key),
                        ("secret_key", &minio.secret_key),
                        ("bucket_name", &minio.bucket_name),
                    ];
                    for (field, value) in fields {
                        if value.trim().is_empty() {
                            problems.push(format!("destination {i} (minio) is missing '{field}'"));
                        }
                    }
                }
            }
        }

        match self.output.format.as_str() {
            "files" => {}
            "mbtiles" => match &self.mbtiles {
                None => problems
                    .push("output.format is 'mbtiles' but the 'mbtiles' section is missing".into()),
                Some(mbtiles) if mbtiles.min_zoom > mbtiles.max_zoom => problems.push(format!(
                    "mbtiles.min_zoom ({}) is greater than mbtiles.max_zoom ({})",
                    mbtiles.min_zoom, mbtiles.max_zoom
                )),
                Some(_) => {}
            },
            other => problems.push(format!(
                "output.format must be 'files' or 'mbtiles', got '{other}'"
            )),
        }

        problems
    }

    /// Fail with all problems joined, if there are any.
    pub fn validate(&self) -> MaptileResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(MaptileError::Config(problems.join("; ")))
        }
    }
}

fn source_problems(i: usize, source: &SourceConfig, problems: &mut Vec<String>) {
    let label = if source.name.is_empty() {
        format!("source {i}")
    } else {
        format!("source {i} ({})", source.name)
    };

    if source.name.trim().is_empty() {
        problems.push(format!("{label} is missing 'name'"));
    }
    if source.kind.trim().is_empty() {
        problems.push(format!("{label} is missing 'type'"));
    }
    if source.url_template.trim().is_empty() {
        problems.push(format!("{label} is missing 'url_template'"));
    }
    if source.zoom_levels.is_empty() {
        problems.push(format!("{label} has no zoom_levels"));
    }
    if let Some(zoom) = source.zoom_levels.iter().find(|z| **z > MAX_ZOOM) {
        problems.push(format!("{label} zoom level {zoom} exceeds {MAX_ZOOM}"));
    }

    let b = source.bounds;
    if !(-90.0..=90.0).contains(&b.min_lat) || !(-90.0..=90.0).contains(&b.max_lat) {
        problems.push(format!("{label} latitude bounds must be within [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&b.min_lon) || !(-180.0..=180.0).contains(&b.max_lon) {
        problems.push(format!("{label} longitude bounds must be within [-180, 180]"));
    }
    if b.min_lat > b.max_lat {
        problems.push(format!("{label} min_lat is greater than max_lat"));
    }
    if b.min_lon > b.max_lon {
        problems.push(format!("{label} min_lon is greater than max_lon"));
    }
}
