//! Selection resolver
//!
//! Turns a [`SelectionRequest`] into concrete diameter groups, ascending by
//! diameter, each with the label text engraved next to it.

use cixkit_core::{
    format_mm, ConfigError, Diameter, SelectionRequest, SpindleId, ToolInventory,
    DEFAULT_DIAMETER_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One diameter's spindles, in drilling order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGroup {
    /// Nominal diameter of the group
    pub diameter: Diameter,
    /// Spindles to drill with, in order
    pub spindles: Vec<SpindleId>,
    /// Engraved label, e.g. `5.0mm - 3`
    pub label_text: String,
}

impl ResolvedGroup {
    /// Create a group and derive its label
    pub fn new(diameter: Diameter, spindles: Vec<SpindleId>) -> Self {
        let label_text = label_text(diameter, spindles.len());
        Self {
            diameter,
            spindles,
            label_text,
        }
    }
}

/// Label engraved for a diameter group
pub fn label_text(diameter: Diameter, count: usize) -> String {
    format!("{:.1}mm - {}", diameter.mm(), count)
}

/// Resolve a selection against the inventory
///
/// `AllTools` yields every inventory diameter with its spindles in ascending
/// id order. `Custom` keeps each spindle list exactly as given; only the
/// groups are sorted by diameter.
pub fn resolve(
    request: &SelectionRequest,
    inventory: &ToolInventory,
) -> Result<Vec<ResolvedGroup>, ConfigError> {
    let groups: Vec<ResolvedGroup> = match request {
        SelectionRequest::AllTools => inventory
            .diameter_groups()
            .iter()
            .map(|(diameter, spindles)| ResolvedGroup::new(*diameter, spindles.clone()))
            .collect(),
        SelectionRequest::Custom(selection) => {
            if selection.is_empty() {
                return Err(ConfigError::EmptySelection);
            }

            let mut groups: Vec<ResolvedGroup> = Vec::with_capacity(selection.len());
            for (diameter, spindles) in selection.entries() {
                if spindles.is_empty() {
                    return Err(ConfigError::EmptySpindleList {
                        diameter: format_mm(diameter.mm()),
                    });
                }
                if groups
                    .iter()
                    .any(|group| group.diameter.matches(*diameter, DEFAULT_DIAMETER_TOLERANCE))
                {
                    return Err(ConfigError::DuplicateDiameter {
                        diameter: format_mm(diameter.mm()),
                    });
                }
                groups.push(ResolvedGroup::new(*diameter, spindles.clone()));
            }
            groups.sort_by_key(|group| group.diameter);
            groups
        }
    };

    debug!(groups = groups.len(), "Resolved tool selection");
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cixkit_core::CustomSelection;

    fn inventory() -> ToolInventory {
        ToolInventory::load(
            r#"<Tooling>
                <Spindle Name="10" Child="D8"/>
                <Spindle Name="9" Child="D5"/>
                <Spindle Name="7" Child="D5"/>
                <Spindle Name="12" Child="D8"/>
                <Spindle Name="8" Child="D5"/>
            </Tooling>"#,
        )
        .unwrap()
    }

    fn ids(group: &ResolvedGroup) -> Vec<u32> {
        group.spindles.iter().map(|id| id.get()).collect()
    }

    #[test]
    fn test_all_tools_groups_ascending() {
        let groups = resolve(&SelectionRequest::AllTools, &inventory()).unwrap();
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].diameter.mm(), 5.0);
        assert_eq!(ids(&groups[0]), vec![7, 8, 9]);
        assert_eq!(groups[0].label_text, "5.0mm - 3");

        assert_eq!(groups[1].diameter.mm(), 8.0);
        assert_eq!(ids(&groups[1]), vec![10, 12]);
        assert_eq!(groups[1].label_text, "8.0mm - 2");
    }

    #[test]
    fn test_all_tools_merges_near_equal_diameters() {
        let inventory = ToolInventory::load(
            r#"<Tooling>
                <Spindle Name="1" Child="D5"/>
                <Spindle Name="2" Child="D5.005"/>
            </Tooling>"#,
        )
        .unwrap();
        let groups = resolve(&SelectionRequest::AllTools, &inventory).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec![1, 2]);
        assert_eq!(
            groups[0].spindles,
            inventory.spindles_for(groups[0].diameter, DEFAULT_DIAMETER_TOLERANCE)
        );
        assert_eq!(groups[0].label_text, "5.0mm - 2");
    }

    #[test]
    fn test_custom_preserves_spindle_order() {
        let selection = CustomSelection::from_pairs(vec![(5.0, vec![9, 7, 8])]).unwrap();
        let groups = resolve(&SelectionRequest::Custom(selection), &inventory()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec![9, 7, 8]);
        assert_eq!(groups[0].label_text, "5.0mm - 3");
    }

    #[test]
    fn test_custom_groups_sorted_by_diameter() {
        let selection =
            CustomSelection::from_pairs(vec![(12.0, vec![2]), (5.0, vec![8, 7]), (8.0, vec![12])])
                .unwrap();
        let groups = resolve(&SelectionRequest::Custom(selection), &inventory()).unwrap();
        let diameters: Vec<f64> = groups.iter().map(|g| g.diameter.mm()).collect();
        assert_eq!(diameters, vec![5.0, 8.0, 12.0]);
        assert_eq!(ids(&groups[0]), vec![8, 7]);
    }

    #[test]
    fn test_custom_does_not_check_inventory() {
        // Unknown spindles resolve fine; the validator reports them.
        let selection = CustomSelection::from_pairs(vec![(6.0, vec![99])]).unwrap();
        let groups = resolve(&SelectionRequest::Custom(selection), &inventory()).unwrap();
        assert_eq!(ids(&groups[0]), vec![99]);
    }

    #[test]
    fn test_custom_rejects_empty_map() {
        let result = resolve(
            &SelectionRequest::Custom(CustomSelection::new()),
            &inventory(),
        );
        assert_eq!(result, Err(ConfigError::EmptySelection));
    }

    #[test]
    fn test_custom_rejects_empty_spindle_list() {
        let selection =
            CustomSelection::from_pairs(vec![(5.0, vec![7]), (8.0, Vec::new())]).unwrap();
        let result = resolve(&SelectionRequest::Custom(selection), &inventory());
        assert_eq!(
            result,
            Err(ConfigError::EmptySpindleList {
                diameter: "8.0".to_string()
            })
        );
    }

    #[test]
    fn test_custom_rejects_duplicate_diameter() {
        let selection =
            CustomSelection::from_pairs(vec![(5.0, vec![7]), (5.005, vec![8])]).unwrap();
        let result = resolve(&SelectionRequest::Custom(selection), &inventory());
        assert!(matches!(result, Err(ConfigError::DuplicateDiameter { .. })));
    }

    #[test]
    fn test_all_tools_on_empty_inventory() {
        let empty = ToolInventory::load("<Tooling/>").unwrap();
        let groups = resolve(&SelectionRequest::AllTools, &empty).unwrap();
        assert!(groups.is_empty());
    }
}
