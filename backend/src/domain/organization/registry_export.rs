//! Reader for the registry's `exportOO.xml` download.
//!
//! The export nests `organisatie` elements inside `organisaties` lists. Only
//! elements in the export namespace count, and only the direct children of
//! an organisation describe it: names of functions or addresses further down
//! are skipped.

use std::mem;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::sync::RegistryEntry;
use crate::domain::Error;

/// Schema URI of the export without its version suffix.
const EXPORT_NAMESPACE: &[u8] = b"https://organisaties.overheid.nl/static/schema/oo/export/";

struct OpenOrganisation {
    entry: RegistryEntry,
    /// Path length while the `organisatie` element is the innermost one.
    depth: usize,
}

#[derive(Default)]
struct ExportReader {
    /// Local names of the open elements; empty for foreign namespaces.
    path: Vec<Vec<u8>>,
    open: Vec<OpenOrganisation>,
    roots: Vec<RegistryEntry>,
    text: String,
}

impl ExportReader {
    /// Whether an `organisatie` opened now belongs to the forest: either a
    /// top-level list under the document root or a child list of the
    /// innermost open organisation.
    fn at_organisation_list(&self) -> bool {
        if self.path.last().map(Vec::as_slice) != Some(b"organisaties".as_slice()) {
            return false;
        }
        match self.open.last() {
            Some(parent) => parent.depth + 1 == self.path.len(),
            None => self.path.len() == 2,
        }
    }

    fn open_element(&mut self, name: Vec<u8>, start: &BytesStart<'_>) -> Result<(), Error> {
        match name.as_slice() {
            b"organisatie" if self.at_organisation_list() => {
                let entry = RegistryEntry {
                    system_id: attribute(start, b"systeemId")?.unwrap_or_default(),
                    tooi: attribute(start, b"resourceIdentifierTOOI")?,
                    ..RegistryEntry::default()
                };
                self.open.push(OpenOrganisation {
                    entry,
                    depth: self.path.len() + 1,
                });
            }
            b"relatieMetMinisterie" => {
                let depth = self.path.len();
                let first_relation = self
                    .open
                    .last_mut()
                    .filter(|org| org.depth == depth && org.entry.related_ministry_tooi.is_none());
                if let Some(org) = first_relation {
                    org.entry.related_ministry_tooi = attribute(start, b"resourceIdentifierTOOI")?;
                }
            }
            _ => {}
        }
        self.path.push(name);
        self.text.clear();
        Ok(())
    }

    fn close_element(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };
        let text = mem::take(&mut self.text);
        let value = text.trim();
        let depth = self.path.len();
        let Some(org) = self.open.last_mut() else {
            return;
        };
        if name == b"organisatie" && depth + 1 == org.depth {
            self.finish_organisation();
        } else if depth == org.depth {
            match name.as_slice() {
                b"naam" if org.entry.name.is_empty() => value.clone_into(&mut org.entry.name),
                b"afkorting" if !value.is_empty() => org.entry.abbreviations.push(value.to_owned()),
                _ => {}
            }
        } else if depth == org.depth + 1
            && name == b"type"
            && self.path.last().map(Vec::as_slice) == Some(b"types".as_slice())
            && !value.is_empty()
        {
            org.entry.types.push(value.to_owned());
        }
    }

    fn finish_organisation(&mut self) {
        let Some(org) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.entry.children.push(org.entry),
            None => self.roots.push(org.entry),
        }
    }
}

fn malformed(error: &dyn std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed registry export: {error}"))
}

/// Value of the attribute with `local` name in any namespace, trimmed;
/// blank values count as absent.
fn attribute(start: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, Error> {
    for attr in start.attributes() {
        let attr = attr.map_err(|err| malformed(&err))?;
        if attr.key.local_name().as_ref() == local {
            let value = attr.unescape_value().map_err(|err| malformed(&err))?;
            let trimmed = value.trim();
            return Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()));
        }
    }
    Ok(None)
}

fn element_name(namespace: &ResolveResult<'_>, start: &BytesStart<'_>) -> Vec<u8> {
    match namespace {
        ResolveResult::Bound(Namespace(uri)) if uri.starts_with(EXPORT_NAMESPACE) => {
            start.local_name().as_ref().to_vec()
        }
        _ => Vec::new(),
    }
}

impl RegistryEntry {
    /// Read the organisation forest from an `exportOO.xml` document.
    ///
    /// # Errors
    /// Returns [`crate::domain::ErrorCode::InvalidRequest`] when the document
    /// is not well-formed XML.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::RegistryEntry;
    ///
    /// let xml = r#"<p:overheidsorganisaties
    ///     xmlns:p="https://organisaties.overheid.nl/static/schema/oo/export/2.6.9">
    ///   <p:organisaties>
    ///     <p:organisatie p:systeemId="28212263">
    ///       <p:naam>Financiën</p:naam>
    ///       <p:types><p:type>Ministerie</p:type></p:types>
    ///     </p:organisatie>
    ///   </p:organisaties>
    /// </p:overheidsorganisaties>"#;
    /// let entries = RegistryEntry::parse_export(xml).unwrap();
    /// assert_eq!(entries[0].label(), "Ministerie van Financiën");
    /// assert_eq!(entries[0].system_id, "28212263");
    /// ```
    pub fn parse_export(xml: &str) -> Result<Vec<Self>, Error> {
        let mut reader = NsReader::from_str(xml);
        let mut state = ExportReader::default();
        loop {
            let (namespace, event) = reader.read_resolved_event().map_err(|err| malformed(&err))?;
            match event {
                Event::Start(start) => {
                    let name = element_name(&namespace, &start);
                    state.open_element(name, &start)?;
                }
                Event::Empty(start) => {
                    let name = element_name(&namespace, &start);
                    state.open_element(name, &start)?;
                    state.close_element();
                }
                Event::End(_) => state.close_element(),
                Event::Text(text) => {
                    let unescaped = text.unescape().map_err(|err| malformed(&err))?;
                    state.text.push_str(&unescaped);
                }
                Event::CData(data) => state.text.push_str(&String::from_utf8_lossy(&data)),
                Event::Eof => break,
                _ => {}
            }
        }
        if !state.path.is_empty() {
            return Err(malformed(&"document ends inside an open element"));
        }
        Ok(state.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:overheidsorganisaties xmlns:p="https://organisaties.overheid.nl/static/schema/oo/export/2.6.9"
    xmlns:x="urn:example:other">
  <p:organisaties>
    <p:organisatie p:systeemId="28212263"
        p:resourceIdentifierTOOI="https://identifier.overheid.nl/tooi/id/ministerie/mnre1090">
      <p:naam> Financiën </p:naam>
      <p:afkorting>FIN</p:afkorting>
      <p:types><p:type>Ministerie</p:type></p:types>
      <p:functies>
        <p:functie><p:naam>Minister</p:naam></p:functie>
      </p:functies>
      <x:naam>Ignored</x:naam>
      <p:organisaties>
        <p:organisatie systeemId="28212300">
          <p:naam>Belastingdienst</p:naam>
          <p:afkorting>BD</p:afkorting>
          <p:afkorting></p:afkorting>
          <p:types>
            <p:type>Agentschap</p:type>
            <p:type>Organisatieonderdeel</p:type>
          </p:types>
          <p:relatieMetMinisterie
              p:resourceIdentifierTOOI="https://identifier.overheid.nl/tooi/id/ministerie/mnre1090"/>
          <p:organisaties>
            <p:organisatie p:systeemId="28212301">
              <p:naam>Directie Digitalisering &amp; Data</p:naam>
            </p:organisatie>
          </p:organisaties>
        </p:organisatie>
      </p:organisaties>
    </p:organisatie>
    <p:organisatie p:systeemId="55" p:resourceIdentifierTOOI="">
      <p:naam><![CDATA[Gemeente Utrecht]]></p:naam>
      <p:types><p:type>Gemeente</p:type></p:types>
    </p:organisatie>
  </p:organisaties>
</p:overheidsorganisaties>"#;

    fn parsed() -> Vec<RegistryEntry> {
        RegistryEntry::parse_export(EXPORT).expect("well-formed export")
    }

    #[test]
    fn reads_the_organisation_forest() {
        let roots = parsed();
        let names: Vec<_> = roots.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["Financiën", "Gemeente Utrecht"]);

        let ministry = roots.first().expect("ministry");
        assert_eq!(ministry.system_id, "28212263");
        assert_eq!(
            ministry.tooi.as_deref(),
            Some("https://identifier.overheid.nl/tooi/id/ministerie/mnre1090")
        );
        assert_eq!(ministry.types, ["Ministerie"]);
        assert_eq!(ministry.abbreviations, ["FIN"]);
        assert_eq!(ministry.children.len(), 1);

        let agency = ministry.children.first().expect("agency");
        assert_eq!(agency.name, "Belastingdienst");
        assert_eq!(agency.system_id, "28212300");
        assert_eq!(agency.types, ["Agentschap", "Organisatieonderdeel"]);
        assert_eq!(agency.abbreviations, ["BD"]);
        assert_eq!(agency.related_ministry_tooi, ministry.tooi);
        assert_eq!(
            agency
                .children
                .iter()
                .map(|entry| entry.name.as_str())
                .collect::<Vec<_>>(),
            ["Directie Digitalisering & Data"]
        );
    }

    #[test]
    fn names_outside_the_organisation_are_skipped() {
        let roots = parsed();
        let ministry = roots.first().expect("ministry");
        assert_ne!(ministry.name, "Minister");
        assert_ne!(ministry.name, "Ignored");
    }

    #[test]
    fn blank_identifiers_count_as_missing() {
        let roots = parsed();
        let municipality = roots.get(1).expect("municipality");
        assert_eq!(municipality.tooi, None);
        assert_eq!(municipality.system_id, "55");
        assert!(municipality.children.is_empty());
    }

    #[test]
    fn foreign_namespaces_are_not_organisations() {
        let xml = r#"<root xmlns:q="urn:example:other">
            <q:organisaties><q:organisatie><q:naam>X</q:naam></q:organisatie></q:organisaties>
        </root>"#;
        assert!(RegistryEntry::parse_export(xml).expect("well-formed").is_empty());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let xml = r#"<p:overheidsorganisaties
            xmlns:p="https://organisaties.overheid.nl/static/schema/oo/export/2.6.9">
          <p:organisaties><p:organisatie></p:organisaties>"#;
        let error = RegistryEntry::parse_export(xml).expect_err("mismatched tags");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }
}
