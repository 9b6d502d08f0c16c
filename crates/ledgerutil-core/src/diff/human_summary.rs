//! Human-readable summary renderer for comparison results.

use crate::diff::model::{ComparisonResult, DiffKind, DiffRecord, RecordSide};
use crate::snapshot::model::display_bytes;

/// Render a Markdown/text summary of a [`ComparisonResult`].
///
/// Informational only; the JSON report is the authoritative output.
pub fn render_human_summary(result: &ComparisonResult) -> String {
    let mut out = String::new();

    out.push_str("## Snapshot Comparison\n\n");

    out.push_str(&format!(
        "| | Snapshot | Channel | Height | Public State Hash |\n\
         |---|---|---|---|---|\n\
         | A | `{}` | {} | {} | `{}` |\n\
         | B | `{}` | {} | {} | `{}` |\n\n",
        result.first.label,
        result.first.channel_name,
        result.first.height,
        result.first.public_state_hash.short_hex(12),
        result.second.label,
        result.second.channel_name,
        result.second.height,
        result.second.public_state_hash.short_hex(12),
    ));

    if result.identical {
        out.push_str("_Hashes differ but no differences were found in the state data._\n");
        return out;
    }

    out.push_str(&format!(
        "**Total differences**: {}  \n\
         **Only in A**: {}  \n**Only in B**: {}  \n**Value differs**: {}\n\n",
        result.total_difference_count,
        result.counts.only_in_first,
        result.counts.only_in_second,
        result.counts.value_differs,
    ));

    out.push_str("### Namespaces\n\n");
    out.push_str("| Namespace | Only in A | Only in B | Value differs |\n|---|---|---|---|\n");
    for (name, counts) in &result.namespace_counts {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            name, counts.only_in_first, counts.only_in_second, counts.value_differs
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "### First {} differences\n\n",
        result.sampled_differences.len()
    ));
    if result.sampled_differences.is_empty() {
        out.push_str("_No records sampled (limit 0)._\n");
    }
    for record in &result.sampled_differences {
        out.push_str(&format!("- {}\n", render_record(record)));
    }

    let omitted = result
        .total_difference_count
        .saturating_sub(result.sampled_differences.len() as u64);
    if omitted > 0 {
        out.push_str(&format!("\n_{} more not shown._\n", omitted));
    }

    out
}

fn render_record(record: &DiffRecord) -> String {
    let key = display_bytes(&record.key);
    let value = |side: &Option<RecordSide>| {
        side.as_ref()
            .map(|s| display_bytes(&s.value))
            .unwrap_or_default()
    };
    match record.kind {
        DiffKind::OnlyInFirst => format!(
            "`{}` {}: only in A ({})",
            record.namespace,
            key,
            value(&record.first)
        ),
        DiffKind::OnlyInSecond => format!(
            "`{}` {}: only in B ({})",
            record.namespace,
            key,
            value(&record.second)
        ),
        DiffKind::ValueDiffers => format!(
            "`{}` {}: {} -> {}",
            record.namespace,
            key,
            value(&record.first),
            value(&record.second)
        ),
    }
}
