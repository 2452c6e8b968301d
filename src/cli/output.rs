//! CLI output formatting

use crate::core::{Manifest, Pipeline};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Format one pipeline as a heading plus numbered steps
pub fn format_pipeline(name: &str, pipeline: &Pipeline) -> String {
    let mut out = format!(
        "  {} ({} steps)",
        style(name).bold(),
        style(pipeline.len()).cyan()
    );
    for (index, step) in pipeline.steps().iter().enumerate() {
        out.push_str(&format!("\n    {}. {}", index + 1, style(step.label()).dim()));
    }
    out
}

/// Format a decoded manifest for display
pub fn format_manifest(manifest: &Manifest) -> String {
    [
        format!("  Name: {}", style(manifest.display_name()).bold()),
        format_pipeline("deploy", &manifest.commands.deploy),
        format_pipeline("success", &manifest.commands.success),
        format_pipeline("failure", &manifest.commands.failure),
    ]
    .join("\n")
}
