use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::tabula::layout::annotate::Annotation;
use crate::tabula::layout::error::Result;

/// Serialises the annotation as block-style YAML, truncating any existing
/// file at `path`.
pub fn write_annotation(path: &Path, annotation: &Annotation) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, annotation)?;
    writer.flush()?;
    debug!(output = %path.display(), "successfully written yaml output");
    Ok(())
}

/// Loads an annotation previously written by [`write_annotation`].
pub fn read_annotation(path: &Path) -> Result<Annotation> {
    let file = File::open(path)?;
    Ok(serde_yaml::from_reader(file)?)
}
