use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::tabula::layout::annotate::YamlAnnotator;
use crate::tabula::layout::config::{self, PipelineConfig};
use crate::tabula::layout::error::Result;
use crate::tabula::layout::model::{Block, FileType, LayoutGraph, SheetMeta};
use crate::tabula::layout::registry::StageRegistry;

/// Builds the per-sheet output name `{base}_{index}[_{sheet}]{extension}`.
pub fn output_file_name(
    extension: &str,
    meta: Option<&SheetMeta>,
    index: usize,
    base_name: &str,
) -> String {
    let mut name = format!("{base_name}_{index}");
    if let Some(meta) = meta {
        name.push('_');
        name.push_str(&meta.name);
    }
    name.push_str(extension);
    name
}

/// Analyses one input file and writes an annotation for every sheet with a
/// detected layout. Returns the written paths in sheet order.
///
/// Stage failures are contained per sheet; everything else (reading the
/// file, building an annotation, writing it) propagates.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %file.display(), output = %output_dir.display())
)]
pub fn run_table_understanding(
    file: &Path,
    config: &PipelineConfig,
    registry: &StageRegistry,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let base_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(?config, "using configuration");

    let file_type = FileType::from_path(file);
    let pipeline = registry.build_pipeline(config)?;
    let results = pipeline.get_layout_from_file(file)?;
    debug!(sheet_count = results.len(), "number of sheets");

    let mut written = Vec::new();
    let sheets = results.sheets.iter().zip(&results.blocks).zip(&results.layouts);
    for (index, ((sheet, blocks), layout)) in sheets.enumerate() {
        print_details(index, blocks, layout.as_ref());

        let Some(layout) = layout else {
            continue;
        };

        let mut annotator = YamlAnnotator::new(file_type);
        annotator.get_annotation(blocks, layout)?;
        debug!(annotation = ?annotator.annotation(), "sheet annotation");

        let path = output_dir.join(output_file_name(
            ".yaml",
            sheet.meta.as_ref(),
            index,
            &base_name,
        ));
        annotator.write_yaml(annotator.annotation(), &path)?;
        written.push(path);
    }
    info!(annotations = written.len(), "annotations written");

    if config.colorize {
        if file_type == FileType::Xls {
            warn!("colorizing not enabled in xls files");
        } else {
            warn!("block colorizing is not available in this build; skipping");
        }
    }
    if config.output_dataframe {
        warn!("dataframe extraction is not available in this build; skipping");
    }

    Ok(written)
}

/// Processes every file listed in `files` with the configuration at
/// `config_path`. The first propagated error aborts the batch.
#[instrument(level = "info", skip_all, fields(files = %files.display()))]
pub fn run_batch(
    files: &Path,
    config_path: &Path,
    registry: &StageRegistry,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let config = PipelineConfig::load(config_path)?;
    let file_list = config::load_file_list(files)?;
    info!(file_count = file_list.len(), "processing files");

    let mut written = Vec::new();
    for file in &file_list {
        debug!(input = %file.display(), "processing file");
        written.extend(run_table_understanding(file, &config, registry, output_dir)?);
    }
    Ok(written)
}

fn print_details(index: usize, blocks: &[Block], layout: Option<&LayoutGraph>) {
    debug!(sheet_index = index, block_count = blocks.len(), "blocks found");
    for (block_id, block) in blocks.iter().enumerate() {
        debug!(block_id, %block, "block");
    }
    if let Some(layout) = layout {
        layout.log_layout();
    }
}
