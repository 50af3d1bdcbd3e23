//! Government organisations and their hierarchy.
//!
//! Organisations form a forest: root types (ministries, municipalities,
//! independent bodies) stand alone while sub types hang below a parent of an
//! allowed type. Renames keep a history and dissolved organisations may point
//! to a successor.

mod hierarchy;
mod registry_export;
pub mod sync;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Error;
use super::text_enum::string_enum;

pub use hierarchy::{
    CategoryNode, OrganizationIndex, OrganizationListQuery, TreeNode, TreeSearchHit,
};

/// Organisation identifier.
pub type OrganizationId = i32;

const TOOI_PREFIX: &str = "https://identifier.overheid.nl/tooi/";
const OIN_LENGTH: usize = 20;

/// Kind of organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
#[expect(missing_docs, reason = "variant names are the registry vocabulary")]
pub enum OrganizationType {
    Ministerie,
    Gemeente,
    Provincie,
    Waterschap,
    ZelfstandigBestuursorgaan,
    RechtspersoonWettelijkeTaak,
    Stichting,
    Staatsdeelneming,
    HoogCollegeVanStaat,
    Rechtspraak,
    Politie,
    KabinetVanDeKoning,
    PubliekrechtelijkeInstelling,
    SpeciaalSectorbedrijf,
    GemeenschappelijkeRegeling,
    CaribischOpenbaarLichaam,
    DirectoraatGeneraal,
    Directie,
    Afdeling,
    Agentschap,
    SharedServiceOrganisatie,
    Planbureau,
    Adviescollege,
    Inspectie,
    Organisatieonderdeel,
}

string_enum!(OrganizationType, "organization type", {
    Ministerie => "ministerie",
    Gemeente => "gemeente",
    Provincie => "provincie",
    Waterschap => "waterschap",
    ZelfstandigBestuursorgaan => "zelfstandig_bestuursorgaan",
    RechtspersoonWettelijkeTaak => "rechtspersoon_wettelijke_taak",
    Stichting => "stichting",
    Staatsdeelneming => "staatsdeelneming",
    HoogCollegeVanStaat => "hoog_college_van_staat",
    Rechtspraak => "rechtspraak",
    Politie => "politie",
    KabinetVanDeKoning => "kabinet_van_de_koning",
    PubliekrechtelijkeInstelling => "publiekrechtelijke_instelling",
    SpeciaalSectorbedrijf => "speciaal_sectorbedrijf",
    GemeenschappelijkeRegeling => "gemeenschappelijke_regeling",
    CaribischOpenbaarLichaam => "caribisch_openbaar_lichaam",
    DirectoraatGeneraal => "directoraat_generaal",
    Directie => "directie",
    Afdeling => "afdeling",
    Agentschap => "agentschap",
    SharedServiceOrganisatie => "shared_service_organisatie",
    Planbureau => "planbureau",
    Adviescollege => "adviescollege",
    Inspectie => "inspectie",
    Organisatieonderdeel => "organisatieonderdeel",
});

impl OrganizationType {
    /// Every type in catalogue order.
    pub const ALL: [Self; 25] = [
        Self::Ministerie,
        Self::Gemeente,
        Self::Provincie,
        Self::Waterschap,
        Self::ZelfstandigBestuursorgaan,
        Self::RechtspersoonWettelijkeTaak,
        Self::Stichting,
        Self::Staatsdeelneming,
        Self::HoogCollegeVanStaat,
        Self::Rechtspraak,
        Self::Politie,
        Self::KabinetVanDeKoning,
        Self::PubliekrechtelijkeInstelling,
        Self::SpeciaalSectorbedrijf,
        Self::GemeenschappelijkeRegeling,
        Self::CaribischOpenbaarLichaam,
        Self::DirectoraatGeneraal,
        Self::Directie,
        Self::Afdeling,
        Self::Agentschap,
        Self::SharedServiceOrganisatie,
        Self::Planbureau,
        Self::Adviescollege,
        Self::Inspectie,
        Self::Organisatieonderdeel,
    ];

    /// Dutch display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ministerie => "Ministerie",
            Self::Gemeente => "Gemeente",
            Self::Provincie => "Provincie",
            Self::Waterschap => "Waterschap",
            Self::ZelfstandigBestuursorgaan => "Zelfstandig Bestuursorgaan",
            Self::RechtspersoonWettelijkeTaak => "Rechtspersoon met Wettelijke Taak",
            Self::Stichting => "Stichting",
            Self::Staatsdeelneming => "Staatsdeelneming",
            Self::HoogCollegeVanStaat => "Hoog College van Staat",
            Self::Rechtspraak => "Rechtspraak",
            Self::Politie => "Politie",
            Self::KabinetVanDeKoning => "Kabinet van de Koning",
            Self::PubliekrechtelijkeInstelling => "Publiekrechtelijke Instelling",
            Self::SpeciaalSectorbedrijf => "Speciaal Sectorbedrijf",
            Self::GemeenschappelijkeRegeling => "Gemeenschappelijke Regeling",
            Self::CaribischOpenbaarLichaam => "Caribisch Openbaar Lichaam",
            Self::DirectoraatGeneraal => "Directoraat-Generaal",
            Self::Directie => "Directie",
            Self::Afdeling => "Afdeling",
            Self::Agentschap => "Agentschap",
            Self::SharedServiceOrganisatie => "Shared Service Organisatie",
            Self::Planbureau => "Planbureau",
            Self::Adviescollege => "Adviescollege",
            Self::Inspectie => "Inspectie",
            Self::Organisatieonderdeel => "Organisatieonderdeel",
        }
    }

    /// Root types never have a parent.
    #[must_use]
    pub const fn is_root(self) -> bool {
        !matches!(
            self,
            Self::DirectoraatGeneraal
                | Self::Directie
                | Self::Afdeling
                | Self::Agentschap
                | Self::SharedServiceOrganisatie
                | Self::Planbureau
                | Self::Adviescollege
                | Self::Inspectie
                | Self::Organisatieonderdeel
        )
    }

    /// Classification used by the public organisation registry, if importable.
    #[must_use]
    pub const fn registry_name(self) -> Option<&'static str> {
        match self {
            Self::Ministerie => Some("Ministerie"),
            Self::Gemeente => Some("Gemeente"),
            Self::Provincie => Some("Provincie"),
            Self::Waterschap => Some("Waterschap"),
            Self::ZelfstandigBestuursorgaan => Some("Zelfstandig bestuursorgaan"),
            Self::HoogCollegeVanStaat => Some("Hoog College van Staat"),
            Self::Rechtspraak => Some("Rechtspraak"),
            Self::Politie => Some("Politie en brandweer"),
            Self::KabinetVanDeKoning => Some("Kabinet van de Koning"),
            Self::GemeenschappelijkeRegeling => Some("Gemeenschappelijke regeling"),
            Self::CaribischOpenbaarLichaam => Some("Caribisch openbaar lichaam"),
            Self::Agentschap => Some("Agentschap"),
            Self::Adviescollege => Some("Adviescollege"),
            Self::Organisatieonderdeel => Some("Organisatieonderdeel"),
            _ => None,
        }
    }

    /// Map a registry classification onto a type.
    #[must_use]
    pub fn from_registry_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.registry_name() == Some(name))
    }

    /// Parent types allowed below which this type may sit; `None` means any.
    #[must_use]
    pub const fn allowed_parents(self) -> Option<&'static [Self]> {
        match self {
            Self::DirectoraatGeneraal => Some(&[Self::Ministerie]),
            Self::Directie => Some(&[
                Self::DirectoraatGeneraal,
                Self::Ministerie,
                Self::Agentschap,
                Self::Gemeente,
                Self::Provincie,
                Self::Waterschap,
            ]),
            Self::Afdeling => Some(&[
                Self::Directie,
                Self::DirectoraatGeneraal,
                Self::Agentschap,
                Self::Gemeente,
                Self::Provincie,
            ]),
            Self::Agentschap | Self::SharedServiceOrganisatie | Self::Planbureau => {
                Some(&[Self::Ministerie])
            }
            Self::Inspectie | Self::Adviescollege => {
                Some(&[Self::Ministerie, Self::DirectoraatGeneraal])
            }
            _ => None,
        }
    }
}

/// A name an organisation carried until a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PreviousName {
    /// Former name.
    pub name: String,
    /// Last day the name was in use.
    pub until: NaiveDate,
}

/// Persisted organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Organization {
    /// Stable identifier.
    pub id: OrganizationId,
    /// Current name.
    pub name: String,
    /// Abbreviation; may be empty.
    pub abbreviation: String,
    /// Kind of organisation.
    pub organization_type: OrganizationType,
    /// Parent in the hierarchy.
    pub parent_id: Option<OrganizationId>,
    /// False once dissolved.
    pub is_active: bool,
    /// Registry identifier (`https://identifier.overheid.nl/tooi/...`).
    pub tooi_identifier: Option<String>,
    /// 20-digit government identification number.
    pub oin_number: Option<String>,
    /// Rename history, oldest first.
    pub previous_names: Vec<PreviousName>,
    /// Organisation that took over after dissolution.
    pub successor_id: Option<OrganizationId>,
    /// Registry page for this organisation.
    pub source_url: Option<String>,
}

impl Organization {
    /// Abbreviation when set, otherwise the name.
    #[must_use]
    pub fn short_label(&self) -> &str {
        if self.abbreviation.is_empty() {
            &self.name
        } else {
            &self.abbreviation
        }
    }

    /// Case-insensitive match on name, abbreviation or any former name.
    #[must_use]
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.abbreviation.to_lowercase().contains(needle_lower)
            || self
                .previous_names
                .iter()
                .any(|previous| previous.name.to_lowercase().contains(needle_lower))
    }

    /// Change the name, recording the old one as valid until `today`.
    ///
    /// Renaming to the current name is a no-op.
    pub fn rename(&mut self, raw_name: &str, today: NaiveDate) {
        let new_name = raw_name.trim();
        if new_name.is_empty() || new_name == self.name {
            return;
        }
        let old = std::mem::replace(&mut self.name, new_name.to_owned());
        self.previous_names.push(PreviousName {
            name: old,
            until: today,
        });
    }

    /// Mark as dissolved, optionally recording the successor.
    ///
    /// # Errors
    /// Rejects an organisation succeeding itself.
    pub fn dissolve(&mut self, successor: Option<OrganizationId>) -> Result<(), Error> {
        if successor == Some(self.id) {
            return Err(Error::invalid_field(
                "successor_id",
                "self_successor",
                "an organization cannot succeed itself",
            ));
        }
        self.is_active = false;
        if successor.is_some() {
            self.successor_id = successor;
        }
        Ok(())
    }
}

/// Editable organisation fields, as received from forms and imports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct OrganizationDraft {
    /// Name.
    pub name: String,
    /// Abbreviation.
    #[serde(default)]
    pub abbreviation: String,
    /// Kind.
    pub organization_type: OrganizationType,
    /// Parent.
    #[serde(default)]
    pub parent_id: Option<OrganizationId>,
    /// Registry identifier.
    #[serde(default)]
    pub tooi_identifier: Option<String>,
    /// Government identification number.
    #[serde(default)]
    pub oin_number: Option<String>,
    /// Registry page.
    #[serde(default)]
    pub source_url: Option<String>,
}

impl OrganizationDraft {
    /// Trim text fields, turn blanks into `None` and validate identifiers.
    ///
    /// # Errors
    /// Returns a field error for a blank name, a malformed TOOI identifier or
    /// an OIN that is not exactly 20 digits.
    pub fn normalised(self) -> Result<Self, Error> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(Error::invalid_field(
                "name",
                "empty_name",
                "organization name must not be empty",
            ));
        }
        let tooi_identifier = blank_to_none(self.tooi_identifier);
        if let Some(tooi) = &tooi_identifier {
            if !tooi.starts_with(TOOI_PREFIX) {
                return Err(Error::invalid_field(
                    "tooi_identifier",
                    "invalid_tooi",
                    format!("TOOI identifier must start with {TOOI_PREFIX}"),
                ));
            }
        }
        let oin_number = blank_to_none(self.oin_number);
        if let Some(oin) = &oin_number {
            if oin.len() != OIN_LENGTH || !oin.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::invalid_field(
                    "oin_number",
                    "invalid_oin",
                    "OIN number must be exactly 20 digits",
                ));
            }
        }
        Ok(Self {
            name,
            abbreviation: self.abbreviation.trim().to_owned(),
            organization_type: self.organization_type,
            parent_id: self.parent_id,
            tooi_identifier,
            oin_number,
            source_url: blank_to_none(self.source_url),
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft() -> OrganizationDraft {
        OrganizationDraft {
            name: " Ministerie van Financiën ".to_owned(),
            abbreviation: "FIN".to_owned(),
            organization_type: OrganizationType::Ministerie,
            parent_id: None,
            tooi_identifier: Some("https://identifier.overheid.nl/tooi/id/ministerie/mnre1090".to_owned()),
            oin_number: Some(" ".to_owned()),
            source_url: None,
        }
    }

    pub(super) fn organization(id: OrganizationId, name: &str) -> Organization {
        Organization {
            id,
            name: name.to_owned(),
            abbreviation: String::new(),
            organization_type: OrganizationType::Ministerie,
            parent_id: None,
            is_active: true,
            tooi_identifier: None,
            oin_number: None,
            previous_names: Vec::new(),
            successor_id: None,
            source_url: None,
        }
    }

    #[rstest]
    fn normalises_draft_fields() {
        let normalised = draft().normalised().expect("valid draft");
        assert_eq!(normalised.name, "Ministerie van Financiën");
        assert_eq!(normalised.oin_number, None);
    }

    #[rstest]
    #[case(Some("https://example.org/tooi/1"), None, "invalid_tooi")]
    #[case(None, Some("1234"), "invalid_oin")]
    #[case(None, Some("0000000000000000000x"), "invalid_oin")]
    fn rejects_malformed_identifiers(
        #[case] tooi: Option<&str>,
        #[case] oin: Option<&str>,
        #[case] code: &str,
    ) {
        let mut input = draft();
        input.tooi_identifier = tooi.map(str::to_owned);
        input.oin_number = oin.map(str::to_owned);
        let error = input.normalised().expect_err("invalid identifier");
        assert_eq!(
            error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some(code)
        );
    }

    #[rstest]
    fn accepts_twenty_digit_oin() {
        let mut input = draft();
        input.oin_number = Some("00000001003214345000".to_owned());
        assert!(input.normalised().is_ok());
    }

    #[rstest]
    fn rename_records_previous_name() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        let mut org = organization(1, "Digitale Overheid");
        org.rename("Digitalisering", today);
        org.rename("Digitalisering", today);
        assert_eq!(org.name, "Digitalisering");
        assert_eq!(
            org.previous_names,
            vec![PreviousName {
                name: "Digitale Overheid".to_owned(),
                until: today
            }]
        );
        assert!(org.matches_search("digitale"));
    }

    #[rstest]
    fn dissolve_sets_successor_and_deactivates() {
        let mut org = organization(1, "Oud");
        org.dissolve(Some(2)).expect("dissolve");
        assert!(!org.is_active);
        assert_eq!(org.successor_id, Some(2));
        assert!(org.dissolve(Some(1)).is_err());
    }

    #[rstest]
    fn registry_names_map_back_to_types() {
        assert_eq!(
            OrganizationType::from_registry_name("Politie en brandweer"),
            Some(OrganizationType::Politie)
        );
        assert_eq!(OrganizationType::from_registry_name("Stichting"), None);
    }

    #[rstest]
    fn root_types_match_catalogue() {
        let roots = OrganizationType::ALL
            .into_iter()
            .filter(|kind| kind.is_root())
            .count();
        assert_eq!(roots, 16);
    }
}
