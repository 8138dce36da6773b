use std::collections::HashMap;

use tracing::debug;

use crate::tabula::layout::config::{ComponentParams, ComponentSpec, PipelineConfig};
use crate::tabula::layout::error::{LayoutError, Result};
use crate::tabula::layout::pipeline::EndToEnd;
use crate::tabula::layout::stages::{BlockExtractor, CellClassifier, LayoutDetector};

type Factory<T> = Box<dyn Fn(&ComponentParams) -> Result<Box<T>>>;

/// Named factories for the pipeline's stage implementations.
///
/// The configuration refers to components by name; the registry turns those
/// names into instances.
#[derive(Default)]
pub struct StageRegistry {
    classifiers: HashMap<String, Factory<dyn CellClassifier>>,
    extractors: HashMap<String, Factory<dyn BlockExtractor>>,
    detectors: HashMap<String, Factory<dyn LayoutDetector>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_classifier<F, C>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ComponentParams) -> Result<C> + 'static,
        C: CellClassifier + 'static,
    {
        self.classifiers.insert(
            name.into(),
            Box::new(move |params: &ComponentParams| {
                Ok(Box::new(factory(params)?) as Box<dyn CellClassifier>)
            }),
        );
        self
    }

    pub fn register_extractor<F, E>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ComponentParams) -> Result<E> + 'static,
        E: BlockExtractor + 'static,
    {
        self.extractors.insert(
            name.into(),
            Box::new(move |params: &ComponentParams| {
                Ok(Box::new(factory(params)?) as Box<dyn BlockExtractor>)
            }),
        );
        self
    }

    pub fn register_detector<F, D>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ComponentParams) -> Result<D> + 'static,
        D: LayoutDetector + 'static,
    {
        self.detectors.insert(
            name.into(),
            Box::new(move |params: &ComponentParams| {
                Ok(Box::new(factory(params)?) as Box<dyn LayoutDetector>)
            }),
        );
        self
    }

    /// Instantiates the three components named by `config`.
    pub fn build_pipeline(&self, config: &PipelineConfig) -> Result<EndToEnd> {
        let cell_classifier =
            get_component(&self.classifiers, "cell_classifier", &config.cell_classifier)?;
        let block_extractor =
            get_component(&self.extractors, "block_extractor", &config.block_extractor)?;
        let layout_detector =
            get_component(&self.detectors, "layout_detector", &config.layout_detector)?;
        Ok(EndToEnd::from_boxed(
            cell_classifier,
            block_extractor,
            layout_detector,
        ))
    }
}

fn get_component<T: ?Sized>(
    factories: &HashMap<String, Factory<T>>,
    role: &'static str,
    spec: &ComponentSpec,
) -> Result<Box<T>> {
    let factory = factories
        .get(spec.name())
        .ok_or_else(|| LayoutError::UnknownComponent {
            role,
            name: spec.name().to_string(),
        })?;
    debug!(role, name = spec.name(), "instantiating component");
    factory(&spec.params())
}
