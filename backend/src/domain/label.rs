//! Labels grouped in coloured categories, attached to users and colleagues.

use serde::{Deserialize, Serialize};

use super::Error;

/// Label identifier.
pub type LabelId = i32;
/// Label category identifier.
pub type LabelCategoryId = i32;

/// Category holding brand labels, used by the CSV imports.
pub const BRAND_CATEGORY: &str = "Merk";

/// Named, coloured grouping of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LabelCategory {
    /// Stable identifier.
    pub id: LabelCategoryId,
    /// Unique name.
    pub name: String,
    /// `#RRGGBB` colour.
    pub color: String,
}

/// A label within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Label {
    /// Stable identifier.
    pub id: LabelId,
    /// Name, unique within the category.
    pub name: String,
    /// Owning category.
    pub category_id: LabelCategoryId,
}

/// Category together with its labels, sorted case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct LabelCategoryWithLabels {
    /// The category.
    #[serde(flatten)]
    pub category: LabelCategory,
    /// Labels in display order.
    pub labels: Vec<Label>,
}

impl LabelCategoryWithLabels {
    /// Group `labels` under their categories. Categories keep their order;
    /// labels are ordered by lower-cased name.
    #[must_use]
    pub fn group(categories: Vec<LabelCategory>, labels: &[Label]) -> Vec<Self> {
        categories
            .into_iter()
            .map(|category| {
                let mut own: Vec<Label> = labels
                    .iter()
                    .filter(|label| label.category_id == category.id)
                    .cloned()
                    .collect();
                own.sort_by_key(|label| label.name.to_lowercase());
                Self {
                    category,
                    labels: own,
                }
            })
            .collect()
    }
}

/// Validate a `#RRGGBB` colour, normalising to upper case.
///
/// # Errors
/// Rejects anything other than `#` followed by six hex digits.
///
/// # Examples
/// ```
/// use wies::domain::label_color;
///
/// assert_eq!(label_color("#dce3ea").unwrap(), "#DCE3EA");
/// assert!(label_color("red").is_err());
/// ```
pub fn label_color(raw: &str) -> Result<String, Error> {
    let value = raw.trim();
    let valid = value.len() == 7
        && value.starts_with('#')
        && value.chars().skip(1).all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(value.to_ascii_uppercase())
    } else {
        Err(Error::invalid_field(
            "color",
            "invalid_color",
            "color must look like #RRGGBB",
        ))
    }
}

/// Validate a category or label name.
///
/// # Errors
/// Rejects blank names and names over 100 characters.
pub fn label_name(raw: &str) -> Result<String, Error> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::invalid_field(
            "name",
            "empty_name",
            "name must not be empty",
        ));
    }
    if value.chars().count() > 100 {
        return Err(Error::invalid_field(
            "name",
            "name_too_long",
            "name must be at most 100 characters",
        ));
    }
    Ok(value.to_owned())
}

/// Category seeded by `setup`.
#[derive(Debug, Clone, Copy)]
pub struct DefaultCategory {
    /// Category name.
    pub name: &'static str,
    /// Category colour.
    pub color: &'static str,
    /// Labels created in the category.
    pub labels: &'static [&'static str],
}

/// Categories and labels created on first setup.
pub const DEFAULT_LABELS: &[DefaultCategory] = &[
    DefaultCategory {
        name: BRAND_CATEGORY,
        color: "#DCE3EA",
        labels: &[
            "Rijksconsultants",
            "I-Interim Rijk",
            "Rijks ICT Gilde",
            "Rijks I-Traineeship",
            "Innoveren met Impact",
            "RADIO",
            "Leer en ontwikkel campus",
            "Intercoach",
            "Mindful Rijk",
            "Gateway review",
            "Delta review",
        ],
    },
    DefaultCategory {
        name: "Expertise",
        color: "#B3D7EE",
        labels: &[
            "Strategie, beleid, governance en compliance",
            "Architectuur en technologie",
            "Agile, project- programma- en portfoliomanagement",
            "Proces- en ketenmanagement",
            "Verander- en transformatiemanagement",
            "Interimmanagement en advies",
            "AI",
            "ICT",
            "Software en data engineering",
            "Cloud en platform technologie",
            "Security en privacy",
            "Opleiding, training en ontwikkeling",
            "Kennis- en innovatiemanagement",
        ],
    },
    DefaultCategory {
        name: "Thema",
        color: "#FFE9B8",
        labels: &[
            "Digitale weerbaarheid",
            "Artificiële intelligentie",
            "Netwerksamenwerking",
            "Ambtelijk en digitaal vakmanschap",
            "Innovatieve en lerende overheid",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#FFE9B8", true)]
    #[case("#ffe9b8", true)]
    #[case("FFE9B8", false)]
    #[case("#FFE9B", false)]
    #[case("#GGGGGG", false)]
    fn validates_colours(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(label_color(raw).is_ok(), ok);
    }

    #[rstest]
    fn groups_labels_case_insensitively() {
        let categories = vec![LabelCategory {
            id: 1,
            name: "Merk".to_owned(),
            color: "#DCE3EA".to_owned(),
        }];
        let labels = [
            Label { id: 1, name: "beta".to_owned(), category_id: 1 },
            Label { id: 2, name: "Alpha".to_owned(), category_id: 1 },
            Label { id: 3, name: "Other".to_owned(), category_id: 2 },
        ];
        let grouped = LabelCategoryWithLabels::group(categories, &labels);
        let names: Vec<_> = grouped
            .first()
            .expect("one category")
            .labels
            .iter()
            .map(|label| label.name.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "beta"]);
    }

    #[rstest]
    fn default_labels_are_valid() {
        for category in DEFAULT_LABELS {
            assert!(label_color(category.color).is_ok(), "{}", category.name);
            for label in category.labels {
                assert!(label_name(label).is_ok(), "{label}");
            }
        }
    }
}
