use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Decoded SAML response document
#[derive(Debug)]
pub struct SamlResponse {
    decoded_xml: Vec<u8>,
}

impl SamlResponse {
    /// Create from the Base64-encoded assertion returned by the IdP
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = STANDARD
            .decode(encoded.trim())
            .context("Failed to decode SAML assertion from base64")?;
        Ok(Self {
            decoded_xml: decoded,
        })
    }

    /// Collect every AttributeValue text in the assertion's AttributeStatement,
    /// in document order
    pub fn attribute_values(&self) -> Result<Vec<String>> {
        let mut reader = Reader::from_reader(self.decoded_xml.as_slice());
        reader.config_mut().trim_text(true);

        let mut values = Vec::new();
        let mut in_attribute_value = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"AttributeValue" {
                        in_attribute_value = true;
                    }
                }
                Ok(Event::Text(e)) if in_attribute_value => {
                    let value = String::from_utf8_lossy(e.as_ref()).to_string();
                    values.push(value);
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"AttributeValue" {
                        in_attribute_value = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => bail!("Error parsing SAML assertion: {}", e),
                _ => {}
            }
            buf.clear();
        }

        Ok(values)
    }

    /// Get the raw decoded XML content
    pub fn as_bytes(&self) -> &[u8] {
        &self.decoded_xml
    }
}
