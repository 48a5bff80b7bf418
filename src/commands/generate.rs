//! Generate command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::aggregator::FileIndex;
use crate::classifier;
use crate::emit::{emit_all, Encoder, RuleSetJsonEncoder};
use crate::generator::build_record_sets;

/// Run the generate command: classify the input directory, resolve
/// exclusions, normalize and hand every category to the encoders.
pub fn run(input_dir: &Path, output_dir: &Path) -> Result<()> {
    let records = classifier::process_dir(input_dir)?;
    if records.is_empty() {
        warn!("No list files found in {:?}", input_dir);
        return Ok(());
    }

    let index = FileIndex::build(records);
    let record_sets = build_record_sets(&index);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let json_encoder = RuleSetJsonEncoder;
    let encoders: [&dyn Encoder; 1] = [&json_encoder];
    let failures = emit_all(&record_sets, &encoders, output_dir);

    let (network_total, domain_total) = record_sets.iter().fold((0, 0), |(n, d), (_, records)| {
        (n + records.networks.len(), d + records.domains.len())
    });
    info!(
        "Generated {} categor(ies): {} networks, {} domain patterns",
        record_sets.len(),
        network_total,
        domain_total
    );

    if failures > 0 {
        anyhow::bail!("{} artifact(s) failed to encode", failures);
    }

    Ok(())
}
