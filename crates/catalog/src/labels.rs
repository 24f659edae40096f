//! Display labels for axes and options, and synthesized variant names.
//!
//! Labels come from an externally supplied [`LabelTable`]. When the table has no
//! entry for a locale, the code itself is humanized (`dark_blue` → `Dark Blue`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LocalizedText;
use crate::axis::VariantAxis;
use crate::variant::AxisValueEntry;

/// Localization table: attribute code → locale → label, and
/// attribute code → option code → locale → label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelTable {
    #[serde(default)]
    axes: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    options: BTreeMap<String, BTreeMap<String, LocalizedText>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis_label(
        mut self,
        attribute_code: impl Into<String>,
        locale: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.axes
            .entry(attribute_code.into())
            .or_default()
            .insert(locale.into(), label.into());
        self
    }

    pub fn with_option_label(
        mut self,
        attribute_code: impl Into<String>,
        option_code: impl Into<String>,
        locale: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.options
            .entry(attribute_code.into())
            .or_default()
            .entry(option_code.into())
            .or_default()
            .insert(locale.into(), label.into());
        self
    }

    pub fn axis_label(&self, attribute_code: &str, locale: &str) -> String {
        self.axes
            .get(attribute_code)
            .and_then(|labels| labels.get(locale))
            .cloned()
            .unwrap_or_else(|| humanize(attribute_code))
    }

    pub fn option_label(&self, attribute_code: &str, option_code: &str, locale: &str) -> String {
        self.option_entries(attribute_code, option_code)
            .and_then(|labels| labels.get(locale))
            .cloned()
            .unwrap_or_else(|| humanize(option_code))
    }

    /// Every label the table knows for an option, plus `default_locale`
    /// (humanized when the table has no entry for it).
    pub fn option_labels(
        &self,
        attribute_code: &str,
        option_code: &str,
        default_locale: &str,
    ) -> LocalizedText {
        let mut labels = self
            .option_entries(attribute_code, option_code)
            .cloned()
            .unwrap_or_default();
        labels
            .entry(default_locale.to_string())
            .or_insert_with(|| humanize(option_code));
        labels
    }

    fn option_entries(&self, attribute_code: &str, option_code: &str) -> Option<&LocalizedText> {
        self.options
            .get(attribute_code)
            .and_then(|options| options.get(option_code))
    }
}

/// Turn a machine code into a display label.
///
/// Splits on `_`, `-` and whitespace and upper-cases the first letter of each
/// word; the rest of each word is kept as written.
pub fn humanize(code: &str) -> String {
    code.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a variant display name from its parent's name.
///
/// Labels are appended in axis position order as `"{parent} - {label1}, {label2}"`.
/// Entries for attribute codes not found in `axes` are ignored. With no
/// labelled values the parent name is returned unchanged.
pub fn compose_display_name(
    parent_name: &str,
    axis_values: &[AxisValueEntry],
    axes: &[VariantAxis],
    labels: &LabelTable,
    locale: &str,
) -> String {
    let mut ordered: Vec<(i32, &str, &AxisValueEntry)> = axis_values
        .iter()
        .filter_map(|entry| {
            axes.iter()
                .find(|axis| axis.attribute_code == entry.attribute_code)
                .map(|axis| (axis.position, axis.attribute_code.as_str(), entry))
        })
        .collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    if ordered.is_empty() {
        return parent_name.to_string();
    }

    let suffix = ordered
        .iter()
        .map(|(_, code, entry)| labels.option_label(code, &entry.option_code, locale))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{parent_name} - {suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisInputKind;
    use forgecat_core::{AxisId, ProductId};

    fn axis(code: &str, position: i32) -> VariantAxis {
        VariantAxis {
            id: AxisId::new(),
            parent_id: ProductId::new(),
            attribute_code: code.to_string(),
            position,
            input_kind: AxisInputKind::Select,
            min: None,
            max: None,
            step: None,
        }
    }

    fn value(code: &str, option: &str) -> AxisValueEntry {
        AxisValueEntry {
            axis_id: AxisId::new(),
            attribute_code: code.to_string(),
            option_code: option.to_string(),
        }
    }

    #[test]
    fn humanize_splits_and_capitalizes() {
        assert_eq!(humanize("dark_blue"), "Dark Blue");
        assert_eq!(humanize("anti-slip"), "Anti Slip");
        assert_eq!(humanize("XL"), "XL");
        assert_eq!(humanize("__"), "");
    }

    #[test]
    fn table_entry_wins_over_fallback() {
        let table = LabelTable::new().with_option_label("color", "red", "de", "Rot");
        assert_eq!(table.option_label("color", "red", "de"), "Rot");
        assert_eq!(table.option_label("color", "red", "fr"), "Red");
        assert_eq!(table.axis_label("color", "de"), "Color");
    }

    #[test]
    fn option_labels_always_cover_default_locale() {
        let table = LabelTable::new().with_option_label("color", "red", "de", "Rot");
        let labels = table.option_labels("color", "red", "en");
        assert_eq!(labels.get("de").map(String::as_str), Some("Rot"));
        assert_eq!(labels.get("en").map(String::as_str), Some("Red"));
    }

    #[test]
    fn display_name_follows_axis_position_not_input_order() {
        let axes = vec![axis("size", 2), axis("color", 1)];
        let values = vec![value("size", "xl"), value("color", "navy_blue")];
        let table = LabelTable::new().with_option_label("size", "xl", "en", "XL");

        let name = compose_display_name("Work Shirt", &values, &axes, &table, "en");
        assert_eq!(name, "Work Shirt - Navy Blue, XL");
    }

    #[test]
    fn display_name_without_values_is_parent_name() {
        let name = compose_display_name("Work Shirt", &[], &[], &LabelTable::new(), "en");
        assert_eq!(name, "Work Shirt");
    }
}
