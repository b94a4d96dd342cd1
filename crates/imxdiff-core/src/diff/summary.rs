//! Human-readable summary renderer for multi-version diffs.

use crate::diff::model::MultiDiff;
use crate::diff::timeline::render_timeline;

/// Render a plain-text Markdown summary of a [`MultiDiff`].
///
/// Lists, per container, the objects whose status at that container is
/// CHANGED, then every changed field of every changed object with its
/// timeline. Informational only.
pub fn render_human_summary(diff: &MultiDiff) -> String {
    let mut out = String::new();

    out.push_str("## Multi-Version Diff\n\n");
    let labels: Vec<&str> = diff
        .container_order
        .iter()
        .map(|c| diff.alias_of(c))
        .collect();
    let changed = diff.changed_objects();
    out.push_str(&format!(
        "**Containers**: {}  \n**Objects**: {} ({} changed)\n\n",
        labels.join(", "),
        diff.objects.len(),
        changed.len()
    ));

    if changed.is_empty() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    out.push_str("### Changes per container\n\n");
    for container_id in &diff.container_order {
        let in_container = diff.changed_in(container_id);
        if in_container.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "- **{}** ({}): {}\n",
            diff.alias_of(container_id),
            in_container.len(),
            in_container
                .iter()
                .map(|o| o.puic.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    out.push('\n');

    out.push_str("### Changed objects\n\n");
    for object in changed {
        out.push_str(&format!("#### {} `{}`\n\n", object.tag, object.puic));
        for field in object.changed_fields() {
            out.push_str(&format!(
                "- `{}`: {}\n",
                field.field,
                render_timeline(field, &diff.aliases)
            ));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_empty_diff() {
        let diff = MultiDiff {
            container_order: Vec::new(),
            aliases: BTreeMap::new(),
            objects: BTreeMap::new(),
        };
        let summary = render_human_summary(&diff);
        assert!(summary.contains("**Objects**: 0 (0 changed)"));
        assert!(summary.contains("_No changes detected._"));
    }
}
