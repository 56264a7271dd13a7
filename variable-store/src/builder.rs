//! Aggregate event document construction
//!
//! Batched variable changes travel inside a single XML document:
//!
//! ```text
//! <Event xmlns="urn:schemas-upnp-org:metadata-1-0/RCS/">
//!   <InstanceID val="0">
//!     <Volume val="20"/>
//!     <Mute val="0"/>
//!   </InstanceID>
//! </Event>
//! ```
//!
//! The same document shape is used for change notifications and for the
//! initial full-state snapshot delivered to new subscribers.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// Builds the aggregate event document for one batch of variable values.
///
/// Values are written in the order they were added; callers pass each
/// variable name at most once. Attribute values are escaped by the XML
/// writer, so raw text such as `<` or `"` is safe to add.
#[derive(Debug, Clone)]
pub struct LastChangeBuilder {
    namespace: String,
    values: Vec<(String, String)>,
}

impl LastChangeBuilder {
    /// Create a builder for the given event namespace URI.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            values: Vec::new(),
        }
    }

    /// Add one variable value to the document.
    pub fn add(&mut self, name: &str, value: &str) {
        self.values.push((name.to_string(), value.to_string()));
    }

    /// Whether any values have been added.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values added so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Serialize the document to its XML text form.
    pub fn build(&self) -> String {
        let mut writer = Writer::new(Vec::new());
        self.write_document(&mut writer)
            .expect("in-memory XML write cannot fail");
        String::from_utf8(writer.into_inner()).expect("XML writer emits UTF-8")
    }

    fn write_document(&self, writer: &mut Writer<Vec<u8>>) -> quick_xml::Result<()> {
        let mut root = BytesStart::new("Event");
        root.push_attribute(("xmlns", self.namespace.as_str()));
        writer.write_event(Event::Start(root))?;

        let mut instance = BytesStart::new("InstanceID");
        instance.push_attribute(("val", "0"));
        writer.write_event(Event::Start(instance))?;

        for (name, value) in &self.values {
            let mut element = BytesStart::new(name.as_str());
            element.push_attribute(("val", value.as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("InstanceID")))?;
        writer.write_event(Event::End(BytesEnd::new("Event")))?;
        Ok(())
    }
}
