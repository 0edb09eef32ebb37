//! Orchestrates custom property extraction: parse → walk → emit.
//!
//! The heavy lifting lives in the module crates (`css_syntax` for the
//! rule tree, `css_properties_values` for classification and the walk);
//! this crate supplies the caller-facing options, target-path
//! derivation, and the emitting sink.

#![forbid(unsafe_code)]

use anyhow::{Context as _, Result};
use css_syntax::Stylesheet;
use std::fs;
use std::path::{Path, PathBuf};

pub use css_properties_values::PropertyDescriptor;
pub use css_syntax::parse_stylesheet;

/// Fallback source identifier when the caller supplies none.
const DEFAULT_SOURCE_NAME: &str = "index.css";

/// Suffix appended to the source identifier to derive the target path.
const TARGET_SUFFIX: &str = ".properties.json";

/// A caller-supplied emission sink: `(source, descriptors, target)`.
///
/// Its result is forwarded unchanged as the result of [`process`]; the
/// orchestrator never interprets it. A sink dispatching asynchronous
/// work reports submission success here.
pub type DescriptorSink = Box<dyn FnOnce(Option<&str>, &[PropertyDescriptor], &Path) -> Result<()>>;

/// Options for one extraction pass. Everything is optional: by default
/// detection is off and the descriptor list is written as pretty JSON
/// to the derived target path.
#[derive(Default)]
pub struct ExtractOptions {
    /// Infer syntaxes from plain custom property declarations.
    pub detect: bool,
    /// Source identifier (typically the input CSS filename).
    pub from: Option<String>,
    /// Target override; derived from `from` when absent.
    pub to: Option<PathBuf>,
    /// Custom sink replacing the default JSON file write.
    pub sink: Option<DescriptorSink>,
}

/// Extract descriptors from the stylesheet and emit them.
///
/// Consumed registration blocks are removed from `stylesheet`. The sink
/// is invoked even when no descriptor was found (an empty list is a
/// valid result, not an error).
///
/// # Errors
/// Returns whatever the sink returns; for the default sink that is a
/// serialization or file-write failure.
pub fn process(stylesheet: &mut Stylesheet, options: ExtractOptions) -> Result<()> {
    let ExtractOptions {
        detect,
        from,
        to,
        sink,
    } = options;
    let descriptors = collect_descriptors(stylesheet, detect);
    let target = to.unwrap_or_else(|| derive_target_path(from.as_deref()));
    emit(from.as_deref(), &descriptors, &target, sink)
}

/// Extract the ordered descriptor list without emitting it, for
/// callers that want the data rather than an artifact.
pub fn collect_descriptors(stylesheet: &mut Stylesheet, detect: bool) -> Vec<PropertyDescriptor> {
    css_properties_values::extract_descriptors(stylesheet, detect).into_descriptors()
}

/// Derive the default target path from the source identifier.
fn derive_target_path(source: Option<&str>) -> PathBuf {
    let stem = source.unwrap_or(DEFAULT_SOURCE_NAME);
    PathBuf::from(format!("{stem}{TARGET_SUFFIX}"))
}

/// Forward the ordered descriptor list to the sink, returning the
/// sink's own result.
fn emit(
    source: Option<&str>,
    descriptors: &[PropertyDescriptor],
    target: &Path,
    sink: Option<DescriptorSink>,
) -> Result<()> {
    log::debug!(
        "emitting {} property descriptor(s) to {}",
        descriptors.len(),
        target.display()
    );
    match sink {
        Some(custom_sink) => custom_sink(source, descriptors, target),
        None => write_descriptors_json(descriptors, target),
    }
}

/// Default sink: serialize the list with 2-space indentation and write
/// it to the target path.
///
/// # Errors
/// Returns an error when serialization or the file write fails.
fn write_descriptors_json(descriptors: &[PropertyDescriptor], target: &Path) -> Result<()> {
    let serialized =
        serde_json::to_string_pretty(descriptors).context("serializing property descriptors")?;
    fs::write(target, serialized)
        .with_context(|| format!("writing property descriptors to {}", target.display()))?;
    Ok(())
}
