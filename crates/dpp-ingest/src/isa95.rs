//! ISA-95/B2MML XML connector.
//!
//! B2MML documents carry repeating business elements (`MaterialLot`,
//! `ProductionResponse`, `SegmentResponse`); each matched element becomes one
//! record. Descendant text flattens to `path/Tag` keys, attributes to
//! `path/Tag/@attr`, and `Property` elements additionally get an XPath-like
//! predicate key `parent/Property[@ID='<id>']/Value` so mappings can address
//! repeated properties by id instead of position.

use crate::connector::{Connector, source_text};
use dpp_model::{ConnectorError, DataRecord, Source};
use quick_xml::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use serde_json::Value;
use tracing::debug;

/// Standard B2MML namespace.
pub const B2MML_NAMESPACE: &str = "http://www.mesa.org/xml/B2MML";

/// Element extracted as a record when the mapping names no other root.
pub const DEFAULT_ROOT_ELEMENT: &str = "MaterialLot";

/// Connector for ISA-95 B2MML XML sources.
///
/// The repeating element is matched by local name within the document's own
/// namespace (detected from the document root, B2MML when the root carries
/// none). When nothing matches in that namespace, the search retries
/// namespace-free. The document root itself is a candidate, so a bare
/// `<MaterialLot>…</MaterialLot>` document yields one record.
pub struct Isa95Connector {
    root_element: String,
    namespace: String,
}

impl Isa95Connector {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_ELEMENT)
    }

    /// Extracts `root` elements instead of the default `MaterialLot`.
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root_element: root.into(),
            namespace: B2MML_NAMESPACE.to_string(),
        }
    }

    pub fn root_element(&self) -> &str {
        &self.root_element
    }
}

impl Default for Isa95Connector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for Isa95Connector {
    fn name(&self) -> &'static str {
        "isa95"
    }

    fn description(&self) -> &'static str {
        "ISA-95 B2MML XML parser"
    }

    fn parse(&self, source: &Source) -> Result<Vec<DataRecord>, ConnectorError> {
        let xml = source_text(source)?;
        let tree = read_tree(&xml)?;

        // The document's own namespace wins over the configured default.
        let namespace = tree
            .namespace
            .clone()
            .unwrap_or_else(|| self.namespace.clone());

        let mut matches = Vec::new();
        collect_matches(&tree, &self.root_element, Some(&namespace), &mut matches);
        if matches.is_empty() {
            collect_matches(&tree, &self.root_element, None, &mut matches);
        }
        if matches.is_empty() {
            return Err(ConnectorError::NoRootElements {
                tag: self.root_element.clone(),
            });
        }

        debug!(
            root = %self.root_element,
            count = matches.len(),
            "extracted ISA-95 elements"
        );
        Ok(matches.into_iter().map(flatten).collect())
    }
}

/// Parsed XML element, namespace-resolved, with only the content the
/// flattening needs: local names, plain attributes, and pre-first-child text.
struct XmlElement {
    local: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

fn malformed(error: impl std::fmt::Display) -> ConnectorError {
    ConnectorError::MalformedXml {
        detail: error.to_string(),
    }
}

fn read_tree(xml: &str) -> Result<XmlElement, ConnectorError> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let decoder = reader.decoder();
        match reader.read_resolved_event().map_err(malformed)? {
            (resolve, Event::Start(start)) => {
                stack.push(begin_element(&resolve, &start, decoder)?);
            }
            (resolve, Event::Empty(start)) => {
                let element = begin_element(&resolve, &start, decoder)?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::Text(text)) => {
                if let Some(current) = stack.last_mut()
                    && current.children.is_empty()
                {
                    let decoded = text.decode().map_err(malformed)?;
                    current.text.push_str(&unescape(&decoded).map_err(malformed)?);
                }
            }
            (_, Event::CData(cdata)) => {
                if let Some(current) = stack.last_mut()
                    && current.children.is_empty()
                {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed("unexpected end of document"));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

fn begin_element(
    resolve: &ResolveResult<'_>,
    start: &BytesStart<'_>,
    decoder: Decoder,
) -> Result<XmlElement, ConnectorError> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let namespace = match resolve {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    };

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(malformed)?;
        let key = attribute.key.as_ref();
        // Namespace declarations and namespaced attributes are not data.
        if key == b"xmlns" || key.contains(&b':') {
            continue;
        }
        let name = String::from_utf8_lossy(key).into_owned();
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(malformed)?
            .into_owned();
        attributes.push((name, value));
    }

    Ok(XmlElement {
        local,
        namespace,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ConnectorError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(malformed("multiple root elements")),
    }
}

/// Document-order search for elements with the given local name. `namespace`
/// of `None` matches only elements that carry no namespace, mirroring a
/// namespace-free XPath search.
fn collect_matches<'a>(
    element: &'a XmlElement,
    target: &str,
    namespace: Option<&str>,
    out: &mut Vec<&'a XmlElement>,
) {
    let ns_matches = match namespace {
        Some(expected) => element.namespace.as_deref() == Some(expected),
        None => element.namespace.is_none(),
    };
    if ns_matches && element.local == target {
        out.push(element);
    }
    for child in &element.children {
        collect_matches(child, target, namespace, out);
    }
}

fn flatten(element: &XmlElement) -> DataRecord {
    let mut record = DataRecord::new();
    flatten_into(element, &mut record, "");
    record
}

fn flatten_into(element: &XmlElement, record: &mut DataRecord, prefix: &str) {
    let path = if prefix.is_empty() {
        element.local.clone()
    } else {
        format!("{prefix}/{}", element.local)
    };

    let text = element.text.trim();
    if !text.is_empty() {
        record.insert(path.clone(), Value::String(text.to_string()));
    }
    for (name, value) in &element.attributes {
        record.insert(format!("{path}/@{name}"), Value::String(value.clone()));
    }
    for child in &element.children {
        flatten_into(child, record, &path);
    }

    // B2MML convention: Property elements carry an id and a value. Repeated
    // siblings share the flat `…/Property/Value` key (last one wins), so each
    // property also gets a predicate key that survives repetition.
    if element.local == "Property" {
        synthesize_property_key(record, prefix, &path);
    }
}

fn synthesize_property_key(record: &mut DataRecord, prefix: &str, path: &str) {
    let child_id = non_empty(record.get(&format!("{path}/ID")));
    let (id, from_attribute) = match child_id {
        Some(id) => (id, false),
        None => match non_empty(record.get(&format!("{path}/@ID"))) {
            Some(id) => (id, true),
            None => return,
        },
    };
    let Some(value) = non_empty(record.get(&format!("{path}/Value"))) else {
        return;
    };

    if from_attribute {
        // Keep the element-style key addressable when the id came in as an
        // attribute, so both spellings resolve.
        record.insert(format!("{path}/ID"), Value::String(id.clone()));
    }
    let key = if prefix.is_empty() {
        format!("Property[@ID='{id}']/Value")
    } else {
        format!("{prefix}/Property[@ID='{id}']/Value")
    };
    record.insert(key, Value::String(value));
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(xml: &str) -> Vec<DataRecord> {
        Isa95Connector::new().parse(&Source::text(xml)).unwrap()
    }

    #[test]
    fn flattens_material_lot_with_property_predicate() {
        let records = parse(
            "<MaterialLot>\
               <ID>BAT-001</ID>\
               <Property ID=\"capacity\"><Value>100</Value></Property>\
             </MaterialLot>",
        );

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.get("MaterialLot/ID"), Some(&json!("BAT-001")));
        assert_eq!(record.get("MaterialLot/Property/ID"), Some(&json!("capacity")));
        assert_eq!(
            record.get("MaterialLot/Property[@ID='capacity']/Value"),
            Some(&json!("100"))
        );
    }

    #[test]
    fn property_with_id_child_element() {
        let records = parse(
            "<MaterialLot>\
               <Property><ID>voltage</ID><Value>3.7</Value></Property>\
             </MaterialLot>",
        );
        assert_eq!(
            records[0].get("MaterialLot/Property[@ID='voltage']/Value"),
            Some(&json!("3.7"))
        );
    }

    #[test]
    fn repeated_properties_each_keep_a_predicate_key() {
        let records = parse(
            "<MaterialLot>\
               <Property><ID>a</ID><Value>1</Value></Property>\
               <Property><ID>b</ID><Value>2</Value></Property>\
             </MaterialLot>",
        );
        let record = &records[0];
        assert_eq!(
            record.get("MaterialLot/Property[@ID='a']/Value"),
            Some(&json!("1"))
        );
        assert_eq!(
            record.get("MaterialLot/Property[@ID='b']/Value"),
            Some(&json!("2"))
        );
        // The flat keys collapse to the last sibling.
        assert_eq!(record.get("MaterialLot/Property/Value"), Some(&json!("2")));
    }

    #[test]
    fn extracts_namespaced_b2mml_elements() {
        let records = parse(
            "<MaterialLotInformation xmlns=\"http://www.mesa.org/xml/B2MML\">\
               <MaterialLot><ID>L1</ID></MaterialLot>\
               <MaterialLot><ID>L2</ID></MaterialLot>\
             </MaterialLotInformation>",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("MaterialLot/ID"), Some(&json!("L1")));
        assert_eq!(records[1].get("MaterialLot/ID"), Some(&json!("L2")));
    }

    #[test]
    fn foreign_namespace_falls_back_to_plain_names() {
        // Root namespace is detected and used for the search; elements in it
        // match even though it is not B2MML.
        let records = parse(
            "<Batch xmlns=\"urn:example:factory\">\
               <MaterialLot><ID>X</ID></MaterialLot>\
             </Batch>",
        );
        assert_eq!(records[0].get("MaterialLot/ID"), Some(&json!("X")));
    }

    #[test]
    fn attributes_flatten_with_at_prefix() {
        let records = parse(
            "<MaterialLot status=\"released\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:type=\"Lot\">\
               <ID>L9</ID>\
             </MaterialLot>",
        );
        let record = &records[0];
        assert_eq!(record.get("MaterialLot/@status"), Some(&json!("released")));
        // Namespace declarations and namespaced attributes are skipped.
        assert!(record.get("MaterialLot/@xmlns:xsi").is_none());
        assert!(record.get("MaterialLot/@xsi:type").is_none());
    }

    #[test]
    fn text_after_first_child_is_ignored() {
        let records = parse("<MaterialLot><Note>keep<Sub/>drop</Note></MaterialLot>");
        assert_eq!(records[0].get("MaterialLot/Note"), Some(&json!("keep")));
    }

    #[test]
    fn custom_root_element() {
        let connector = Isa95Connector::with_root("ProductionResponse");
        let records = connector
            .parse(&Source::text(
                "<ProductionSchedule>\
                   <ProductionResponse><ID>PR-1</ID></ProductionResponse>\
                 </ProductionSchedule>",
            ))
            .unwrap();
        assert_eq!(records[0].get("ProductionResponse/ID"), Some(&json!("PR-1")));
    }

    #[test]
    fn missing_root_elements_is_an_error() {
        let error = Isa95Connector::new()
            .parse(&Source::text("<Other><ID>1</ID></Other>"))
            .unwrap_err();
        assert!(matches!(error, ConnectorError::NoRootElements { ref tag } if tag == "MaterialLot"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let error = Isa95Connector::new()
            .parse(&Source::text("<MaterialLot><ID>1</MaterialLot>"))
            .unwrap_err();
        assert!(matches!(error, ConnectorError::MalformedXml { .. }));
    }

    #[test]
    fn empty_elements_and_entities() {
        let records = parse(
            "<MaterialLot><ID>A&amp;B</ID><Flag ready=\"yes\"/></MaterialLot>",
        );
        let record = &records[0];
        assert_eq!(record.get("MaterialLot/ID"), Some(&json!("A&B")));
        assert_eq!(record.get("MaterialLot/Flag/@ready"), Some(&json!("yes")));
        assert!(record.get("MaterialLot/Flag").is_none());
    }
}
